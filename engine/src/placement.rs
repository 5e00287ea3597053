use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use util::{IndexMap, IndexSet};

/// Where an entity is, either on the map or inside another entity.
///
/// An entity has at most one place at a time. Items on the floor are `At` a
/// location, items in an inventory are `In` the carrying actor. Inserting an
/// entity in a new place removes it from the old one, so an item can never be
/// both carried and on the ground.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Place {
    In(Entity),
    At(Location),
}

use Place::*;

impl From<Entity> for Place {
    fn from(e: Entity) -> Self {
        In(e)
    }
}

impl From<Location> for Place {
    fn from(loc: Location) -> Self {
        At(loc)
    }
}

/// Spatial index, used for efficiently finding locations of entities and
/// entities at locations.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Entity, Place>", into = "BTreeMap<Entity, Place>")]
pub struct Placement {
    places: BTreeMap<Entity, Place>,
    entities: IndexMap<Place, IndexSet<Entity>>,
}

impl Placement {
    pub fn entities_at(
        &self,
        loc: Location,
    ) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .get(&Place::from(loc))
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn entities_in(
        &self,
        container: &Entity,
    ) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .get(&Place::from(*container))
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn all_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.places.keys().cloned()
    }

    pub fn get(&self, e: &Entity) -> Option<Place> {
        self.places.get(e).copied()
    }

    /// Map position of an entity, items inside containers are at their
    /// carrier's position.
    pub fn entity_pos(&self, e: &Entity) -> Option<Location> {
        match self.places.get(e) {
            None => None,
            Some(At(loc)) => Some(*loc),
            Some(In(e)) => self.entity_pos(e),
        }
    }

    pub fn remove(&mut self, e: &Entity) {
        if let Some(place) = self.places.get(e).copied() {
            self.places.remove(e);
            if let Some(set) = self.entities.get_mut(&place) {
                set.shift_remove(e);
            }
            // The entities_at bins are left in place as they empty out, the
            // same bins get emptied and refilled constantly so this reduces
            // churn.
        }
    }

    pub fn contains(&self, container: &Entity, e: &Entity) -> bool {
        for i in self.entities_in(container) {
            if e == &i {
                return true;
            }
            if self.contains(&i, e) {
                return true;
            }
        }
        false
    }

    pub fn insert(&mut self, place: Place, e: Entity) {
        if let In(container) = place {
            assert!(
                container != e && !self.contains(&e, &container),
                "Placement::insert: Containment loop"
            );
        }
        self.remove(&e);
        self.places.insert(e, place);
        self.entities.entry(place).or_default().insert(e);
    }
}

impl From<BTreeMap<Entity, Place>> for Placement {
    fn from(s: BTreeMap<Entity, Place>) -> Self {
        let mut ret = Self::default();
        for (e, p) in s {
            ret.insert(p, e);
        }
        ret
    }
}

impl From<Placement> for BTreeMap<Entity, Place> {
    fn from(s: Placement) -> Self {
        s.places
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(n: u64) -> Entity {
        Entity(hecs::Entity::from_bits((1 << 32) | n).unwrap())
    }

    #[test]
    fn exclusive_placement() {
        let mut p = Placement::default();
        let item = e(1);
        let carrier = e(2);
        let loc = Location::new(3, 4);

        p.insert(loc.into(), item);
        assert_eq!(p.entity_pos(&item), Some(loc));
        assert_eq!(p.entities_at(loc).count(), 1);

        // Picking the item up takes it off the floor.
        p.insert(carrier.into(), item);
        assert_eq!(p.entities_at(loc).count(), 0);
        assert_eq!(p.entities_in(&carrier).count(), 1);
        // Held items have no position of their own until the carrier does.
        assert_eq!(p.entity_pos(&item), None);

        p.insert(loc.into(), carrier);
        assert_eq!(p.entity_pos(&item), Some(loc));

        p.remove(&carrier);
        assert_eq!(p.entity_pos(&carrier), None);
        // The item is still inside the removed carrier.
        assert_eq!(p.entities_in(&carrier).count(), 1);
    }

    #[test]
    #[should_panic]
    fn containment_loops_rejected() {
        let mut p = Placement::default();
        p.insert(e(1).into(), e(2));
        p.insert(e(2).into(), e(1));
    }
}
