//! Entities doing things

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prelude::*;

/// Signal raised when an action can not be performed.
///
/// Carries the player-facing reason. This is the routine "that didn't work"
/// outcome of planning, not a program error, the turn handler reports it and
/// moves on.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{0}")]
pub struct Impossible(pub String);

impl Impossible {
    pub fn new(reason: impl Into<String>) -> Self {
        Impossible(reason.into())
    }
}

/// Atomic single-turn actions.
///
/// Actions go through two phases. `Entity::plan` validates the action
/// against the current world state without changing anything and resolves it
/// into its final form, a directional move may come back as a melee attack
/// when a monster is standing in the way. `Entity::act` then performs the
/// mutation and pays the actor's time cost.
///
/// Planning a fully planned action returns it unchanged, which is how the
/// turn loop tells a resolved action from a half-delegated one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Step into an adjacent cell, attacking its occupant if there is one.
    MoveTo(Location),
    /// `MoveTo` aimed with a direction instead of a cell.
    Move(IVec2),
    /// Single straight-line step towards a possibly distant destination.
    MoveTowards(Location),
    /// Melee attack into an adjacent cell.
    Attack(Location),
    /// Close in on the player and attack them.
    AttackPlayer,
    /// Pick up an item from the floor under the actor.
    Pickup,
    /// Use an item from the actor's pack.
    Activate(Entity),
    /// Drink an item from the actor's pack.
    Drink(Entity),
    /// Eat an item from the actor's pack.
    Eat(Entity),
    /// Put down an item from the actor's pack.
    Drop(Entity),
}

impl Entity {
    /// Resolve an action against current world state without mutating it.
    ///
    /// Returns the final executable action or the reason it can't be done.
    pub fn plan(
        &self,
        r: &impl AsRef<Runtime>,
        action: Action,
    ) -> Result<Action, Impossible> {
        use Action::*;
        let r = r.as_ref();

        let Some(loc) = self.loc(r) else {
            return Err(Impossible::new("You are nowhere."));
        };

        match action {
            MoveTo(dest) => {
                if loc.distance_to(dest) > 1 {
                    // Only ever called with adjacent cells, getting here
                    // means broken delegation upstream.
                    return Err(Impossible(format!(
                        "Can't move from {loc} to {dest}."
                    )));
                }
                if dest == loc {
                    // Standing in place is a valid turn.
                    return Ok(MoveTo(dest));
                }
                if r.fighter_at(dest).is_some() {
                    return self.plan(r, Attack(dest));
                }
                if r.is_blocked(dest) {
                    return Err(Impossible::new("That way is blocked."));
                }
                Ok(MoveTo(dest))
            }

            Move(dir) => self.plan(r, MoveTo(loc + dir)),

            MoveTowards(dest) => {
                self.plan(r, Move(loc.step_towards(dest)))
            }

            Attack(pos) => {
                if loc.distance_to(pos) > 1 {
                    return Err(Impossible::new(
                        "That space is too far away to attack.",
                    ));
                }
                Ok(Attack(pos))
            }

            AttackPlayer => {
                let target = r
                    .player()
                    .filter(|p| p != self)
                    .and_then(|p| p.loc(r));
                let Some(target) = target else {
                    return Err(Impossible::new("There is nothing to hunt."));
                };
                self.plan(r, MoveTowards(target))
            }

            Pickup => {
                if r.items_at(loc).next().is_none() {
                    return Err(Impossible::new(
                        "There is nothing to pick up.",
                    ));
                }
                if self.pack_is_full(r) {
                    return Err(Impossible::new(
                        "You can't carry anything more.",
                    ));
                }
                Ok(Pickup)
            }

            Activate(item) => {
                if !self.carries(r, &item) {
                    return Err(Impossible::new("You don't have that."));
                }
                item.plan_activate(r, self)
            }

            Drink(item) => {
                if !self.carries(r, &item) {
                    return Err(Impossible::new("You don't have that."));
                }
                if !item.is_drinkable(r) {
                    return Err(Impossible::new("You can't drink that."));
                }
                Ok(Drink(item))
            }

            Eat(item) => {
                if !self.carries(r, &item) {
                    return Err(Impossible::new("You don't have that."));
                }
                if !item.is_edible(r) {
                    return Err(Impossible::new("You can't eat that."));
                }
                Ok(Eat(item))
            }

            Drop(item) => {
                if !self.carries(r, &item) {
                    return Err(Impossible::new("You don't have that."));
                }
                Ok(Drop(item))
            }
        }
    }

    /// Execute a fully planned action.
    ///
    /// This is the only phase that mutates world state. It trusts that a
    /// matching `plan` call succeeded on the current world state and only
    /// re-asserts cheap core invariants. Consumes the actor's turn by
    /// rescheduling it through the time cost of the action.
    pub fn act(&self, r: &mut impl AsMut<Runtime>, action: Action) {
        use Action::*;
        let r = r.as_mut();
        let cost = r.config.action_cost;

        match action {
            MoveTo(dest) => {
                let loc = self.loc(r).expect("Action::act: actor not on map");
                debug_assert!(loc.distance_to(dest) <= 1);
                self.place(r, dest);
                if self.is_player(r) {
                    r.update_fov();
                }
                self.reschedule(r, cost);
            }

            Attack(pos) => {
                let loc = self.loc(r).expect("Action::act: actor not on map");
                assert!(
                    loc.distance_to(pos) <= 1,
                    "Action::act: attack out of reach"
                );
                let target = r
                    .fighter_at(pos)
                    .expect("Action::act: attack without a target");

                let damage =
                    self.stats(r).power - target.stats(r).defense;

                let who = if self.is_player(r) {
                    format!("You attack the {}", target.name(r))
                } else {
                    format!("{} attacks {}", self.name(r), target.name(r))
                };

                if damage > 0 {
                    msg!("{who} for {damage} hit points.");
                    target.damage(r, damage);
                } else {
                    msg!("{who} but does no damage.");
                }
                self.reschedule(r, cost);
            }

            Pickup => {
                let loc = self.loc(r).expect("Action::act: actor not on map");
                let item = r
                    .items_at(loc)
                    .next()
                    .expect("Action::act: pickup from empty floor");
                self.take(r, &item);
                self.reschedule(r, cost);
            }

            Activate(item) => {
                debug_assert!(self.carries(r, &item));
                item.cast(r, self);
                self.reschedule(r, cost);
            }

            Drink(item) => {
                debug_assert!(self.carries(r, &item));
                item.drink(r, self);
                self.reschedule(r, cost);
            }

            Eat(item) => {
                debug_assert!(self.carries(r, &item));
                item.eat(r, self);
                self.reschedule(r, cost);
            }

            Drop(item) => {
                let loc = self.loc(r).expect("Action::act: actor not on map");
                debug_assert!(self.carries(r, &item));
                item.place(r, loc);
                msg!("You drop the {}.", item.name(r));
                self.reschedule(r, cost);
            }

            Move(_) | MoveTowards(_) | AttackPlayer => {
                // These always delegate away during planning.
                panic!("Action::act: unresolved action {action:?}");
            }
        }
    }
}
