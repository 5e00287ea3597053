//! Entity logic for usable items.

use serde::{Deserialize, Serialize};

use crate::{prelude::*, INVENTORY_CAPACITY};

/// Broad item category that decides how activating the item resolves.
#[derive(
    Copy, Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    // Have a baked-in None value so this can be used directly as a component
    #[default]
    None,
    Potion,
    Scroll,
    Ration,
    Corpse,
}

/// Payload invoked when an item is consumed or cast.
#[derive(
    Copy, Clone, Default, Debug, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Power {
    #[default]
    None,
    /// Restore hit points, capped at the target's maximum.
    Heal(i32),
    /// Strike the nearest visible fighter within range.
    Bolt { damage: i32, range: i32 },
}

impl Entity {
    pub fn is_item(&self, r: &impl AsRef<Runtime>) -> bool {
        !self.is_mob(r)
    }

    /// Decide what actually happens when the actor tries to activate this
    /// item.
    ///
    /// Drinkables turn into a drink action, edibles into an eat action.
    /// Directly castable items validate their target here and stay
    /// activations.
    pub(crate) fn plan_activate(
        &self,
        r: &impl AsRef<Runtime>,
        user: &Entity,
    ) -> Result<Action, Impossible> {
        let r = r.as_ref();
        match self.get::<ItemKind>(r) {
            ItemKind::Potion => Ok(Action::Drink(*self)),
            ItemKind::Ration => Ok(Action::Eat(*self)),
            ItemKind::Scroll => {
                // Make sure the cast has a target before committing the turn.
                self.bolt_target(r, user)?;
                Ok(Action::Activate(*self))
            }
            ItemKind::None | ItemKind::Corpse => Err(Impossible::new(
                format!("You can do nothing with the {}.", self.name(r)),
            )),
        }
    }

    pub fn is_drinkable(&self, r: &impl AsRef<Runtime>) -> bool {
        self.get::<ItemKind>(r) == ItemKind::Potion
    }

    pub fn is_edible(&self, r: &impl AsRef<Runtime>) -> bool {
        self.get::<ItemKind>(r) == ItemKind::Ration
    }

    /// Resolve the fighter a bolt from this item would hit.
    pub(crate) fn bolt_target(
        &self,
        r: &impl AsRef<Runtime>,
        user: &Entity,
    ) -> Result<Entity, Impossible> {
        let r = r.as_ref();
        let Power::Bolt { range, .. } = self.get::<Power>(r) else {
            return Err(Impossible::new(format!(
                "The {} fizzles.",
                self.name(r)
            )));
        };
        let Some(user_loc) = user.loc(r) else {
            return Err(Impossible::new("You are nowhere."));
        };

        let target = r
            .fighters()
            .filter(|e| e != user)
            .filter(|e| e.loc(r).is_some_and(|loc| r.fov().can_see(loc)))
            .min_by_key(|e| {
                e.loc(r).map_or(i32::MAX, |loc| user_loc.distance_to(loc))
            });

        let Some(target) = target else {
            return Err(Impossible::new("No enemy is close enough to strike."));
        };
        let dist = target.loc(r).map_or(i32::MAX, |a| user_loc.distance_to(a));
        if dist > range {
            return Err(Impossible::new(
                "The enemy is too far away to strike.",
            ));
        }
        Ok(target)
    }

    /// Cast the item's bolt power, consuming the item.
    pub(crate) fn cast(&self, r: &mut impl AsMut<Runtime>, user: &Entity) {
        let r = r.as_mut();
        let Power::Bolt { damage, .. } = self.get::<Power>(r) else {
            panic!("Entity::cast: {} has no bolt power", self.name(r));
        };
        let target = self
            .bolt_target(r, user)
            .expect("Entity::cast: activation was not planned");

        msg!(
            "A lightning bolt strikes the {} for {} damage!",
            target.name(r),
            damage
        );
        target.damage(r, damage);
        self.consume(r);
    }

    /// Drink the item, applying its power to the drinker.
    pub(crate) fn drink(&self, r: &mut impl AsMut<Runtime>, user: &Entity) {
        let r = r.as_mut();
        self.consume(r);
        self.apply_power(r, user);
    }

    /// Eat the item, applying its power to the eater.
    pub(crate) fn eat(&self, r: &mut impl AsMut<Runtime>, user: &Entity) {
        let r = r.as_mut();
        msg!("{} eat the {}.", user.name(r), self.name(r));
        self.consume(r);
        self.apply_power(r, user);
    }

    fn apply_power(&self, r: &mut impl AsMut<Runtime>, target: &Entity) {
        let r = r.as_mut();
        match self.get::<Power>(r) {
            Power::Heal(amount) => {
                target.heal(r, amount);
                msg!("{} heal {} hp.", target.name(r), amount);
            }
            Power::Bolt { .. } | Power::None => {}
        }
    }

    /// Remove this item from play.
    fn consume(&self, r: &mut impl AsMut<Runtime>) {
        self.destroy(r);
    }

    /// Move an item from the floor into this actor's pack.
    pub(crate) fn take(&self, r: &mut impl AsMut<Runtime>, item: &Entity) {
        let r = r.as_mut();
        msg!("{} pick up the {}.", self.name(r), item.name(r));
        item.place(r, *self);
    }

    pub fn pack_is_full(&self, r: &impl AsRef<Runtime>) -> bool {
        self.contents(r).count() >= INVENTORY_CAPACITY
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn potion_heals_up_to_max() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@!.#
            #####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let potion = r
            .items_at(Location::new(2, 1))
            .next()
            .expect("potion not spawned");

        potion.place(&mut r, player);
        assert!(player.carries(&r, &potion));

        player.damage(&mut r, 10);
        assert_eq!(player.hp(&r), 20);

        let action = player.plan(&r, Action::Activate(potion)).unwrap();
        assert_eq!(action, Action::Drink(potion));
        player.act(&mut r, action);
        assert_eq!(player.hp(&r), 24);
        assert!(!player.carries(&r, &potion));

        // Healing never exceeds max hp.
        let potion2 = r.spawn_potion(Location::new(3, 1));
        potion2.place(&mut r, player);
        player.heal(&mut r, 100);
        assert_eq!(player.hp(&r), 30);
        player.act(&mut r, Action::Drink(potion2));
        assert_eq!(player.hp(&r), 30);
    }

    #[test]
    fn rations_get_eaten() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ####
            #@,#
            ####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let ration = r.items_at(Location::new(2, 1)).next().unwrap();
        ration.place(&mut r, player);

        player.damage(&mut r, 5);
        let action = player.plan(&r, Action::Activate(ration)).unwrap();
        assert_eq!(action, Action::Eat(ration));
        player.act(&mut r, action);

        assert!(!player.carries(&r, &ration));
        assert_eq!(player.hp(&r), 26);
    }

    #[test]
    fn corpses_resist_activation() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ####
            #@.#
            ####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let corpse = r.spawn((
            crate::ecs::Name("Orc Corpse".into()),
            crate::item::ItemKind::Corpse,
        ));
        corpse.place(&mut r, player);

        assert!(player.plan(&r, Action::Activate(corpse)).is_err());
        assert!(player.plan(&r, Action::Drink(corpse)).is_err());
        assert!(player.plan(&r, Action::Eat(corpse)).is_err());
    }

    #[test]
    fn bolt_strikes_nearest_visible() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #########
            #@.o...o#
            #########",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let scroll = r.spawn_scroll(Location::new(1, 1));
        scroll.place(&mut r, player);

        let near = r.fighter_at(Location::new(3, 1)).unwrap();

        let action = player.plan(&r, Action::Activate(scroll)).unwrap();
        assert_eq!(action, Action::Activate(scroll));
        player.act(&mut r, action);

        // 20 damage fells an orc outright.
        assert!(r.fighter_at(Location::new(3, 1)).is_none());
        assert!(!near.is_alive(&r));
        // The far orc is untouched.
        assert!(r.fighter_at(Location::new(7, 1)).is_some());
        // The scroll is spent.
        assert!(!player.carries(&r, &scroll));
    }

    #[test]
    fn bolt_range_limits() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ##########
            #@.....o.#
            ##########",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let scroll = r.spawn_scroll(Location::new(1, 1));
        scroll.place(&mut r, player);

        // Only target is 6 tiles out, past the bolt's reach.
        assert!(player.plan(&r, Action::Activate(scroll)).is_err());
    }
}
