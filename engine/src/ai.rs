//! Mobs figuring out what to do on their own.

use std::collections::VecDeque;

use pathfinding::prelude::astar;

use crate::prelude::*;

/// Source of commands for the player actor.
///
/// When the player's turn comes up, the turn handler keeps asking the input
/// source for commands until one of them works. The whole simulation runs on
/// one thread, so a source backed by an interactive prompt simply blocks in
/// place until the human makes up their mind.
pub trait InputSource {
    fn next_command(&mut self, r: &Runtime, player: Entity) -> Action;
}

/// Canned command sequence, used by tests and the headless driver.
#[derive(Clone, Default, Debug)]
pub struct Script {
    queue: VecDeque<Action>,
}

impl Script {
    pub fn push(&mut self, action: Action) {
        self.queue.push_back(action);
    }
}

impl FromIterator<Action> for Script {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        Script {
            queue: iter.into_iter().collect(),
        }
    }
}

impl InputSource for Script {
    fn next_command(&mut self, _r: &Runtime, _player: Entity) -> Action {
        // An exhausted script rests in place so the turn always resolves.
        self.queue.pop_front().unwrap_or(Action::Move(IVec2::ZERO))
    }
}

impl Entity {
    /// Decide and plan the monster's action for this turn.
    ///
    /// Hunts the player on sight: paths towards them, falls back to a
    /// straight-line lumber when pathfinding stops being worth it, attacks
    /// when adjacent. Out of sight or out of options, idles in place.
    pub(crate) fn plan_turn(
        &self,
        r: &impl AsRef<Runtime>,
    ) -> Result<Action, Impossible> {
        let r = r.as_ref();
        let Some(loc) = self.loc(r) else {
            return Err(Impossible::new("You are nowhere."));
        };

        let player_loc = r
            .player()
            .filter(|p| p.is_fighter(r))
            .and_then(|p| p.loc(r));

        // Monsters only react when the player can see them, which by
        // symmetry is when they can see the player.
        if let Some(player_loc) = player_loc {
            if r.fov().can_see(loc) {
                if let Some(path) = self.path_towards(r, player_loc) {
                    if path.len() >= r.config.path_limit {
                        // The route is so roundabout that optimal pathing
                        // isn't worth the bother, lumber straight towards
                        // the player instead.
                        if let Ok(action) =
                            self.plan(r, Action::MoveTowards(player_loc))
                        {
                            return Ok(action);
                        }
                    } else if loc.is_adjacent_to(player_loc) {
                        return self.plan(r, Action::AttackPlayer);
                    } else if let Some(&step) = path.first() {
                        return self.plan(r, Action::MoveTo(step));
                    }
                }
            }
        }

        // Nothing better to do, pace in place to pass the turn.
        self.plan(r, Action::Move(IVec2::ZERO))
    }

    /// Shortest walkable path to the destination, excluding the start cell.
    ///
    /// Cells under other live fighters count as blocked so monsters don't
    /// try to walk through each other, except for the destination itself
    /// which is forced open so the search can terminate on an occupied
    /// target.
    pub(crate) fn path_towards(
        &self,
        r: &impl AsRef<Runtime>,
        dest: Location,
    ) -> Option<Vec<Location>> {
        let r = r.as_ref();
        let start = self.loc(r)?;

        let blocked: HashSet<Location> = r
            .fighters()
            .filter(|e| e != self)
            .filter_map(|e| e.loc(r))
            .filter(|&loc| loc != dest)
            .collect();

        let (path, _) = astar(
            &start,
            |&loc| {
                loc.neighbors()
                    .filter(|n| {
                        r.terrain.tile(*n).is_walkable()
                            && !blocked.contains(n)
                    })
                    .map(|n| (n, 1))
                    .collect::<Vec<_>>()
            },
            |loc| loc.distance_to(dest),
            |loc| *loc == dest,
        )?;

        Some(path.into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn monster_closes_in() {
        let r = Runtime::new(&WorldSpec::new(
            "
            #######
            #@..o.#
            #######",
        ))
        .unwrap();
        let orc = r.fighter_at(Location::new(4, 1)).unwrap();

        // One step along the shortest path.
        assert_eq!(
            orc.plan_turn(&r),
            Ok(Action::MoveTo(Location::new(3, 1)))
        );
    }

    #[test]
    fn adjacent_monster_attacks() {
        let r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@o.#
            #####",
        ))
        .unwrap();
        let orc = r.fighter_at(Location::new(2, 1)).unwrap();

        assert_eq!(
            orc.plan_turn(&r),
            Ok(Action::Attack(Location::new(1, 1)))
        );
    }

    #[test]
    fn unseen_monster_idles() {
        let r = Runtime::new(&WorldSpec::new(
            "
            #######
            #@#.o.#
            #######",
        ))
        .unwrap();
        let orc = r.fighter_at(Location::new(4, 1)).unwrap();

        // Behind a wall, out of the player's sight, the orc stays put.
        let orc_loc = orc.loc(&r).unwrap();
        assert_eq!(orc.plan_turn(&r), Ok(Action::MoveTo(orc_loc)));
    }

    #[test]
    fn monsters_route_around_each_other() {
        let r = Runtime::new(&WorldSpec::new(
            "
            ######
            #....#
            #@To.#
            #....#
            ######",
        ))
        .unwrap();
        let orc = r.fighter_at(Location::new(3, 2)).unwrap();

        // The troll occupies the direct step, the orc swings around it.
        let step = match orc.plan_turn(&r) {
            Ok(Action::MoveTo(step)) => step,
            other => panic!("unexpected plan {other:?}"),
        };
        assert_ne!(step, Location::new(2, 2));
        assert!(step.is_adjacent_to(Location::new(3, 2)));
        assert!(r.fighter_at(step).is_none());
    }

    #[test]
    fn long_paths_fall_back_to_straight_lines() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #################################
            #@............................o#
            #################################",
        ))
        .unwrap();
        // Long enough sight that the two spot each other across the hall.
        r.config_mut().fov_radius = 30;
        r.update_fov();

        let orc = r.fighter_at(Location::new(30, 1)).unwrap();
        let orc_loc = orc.loc(&r).unwrap();
        let player_loc = r.player().unwrap().loc(&r).unwrap();

        // The route is past the pathfinding cutoff, so instead of walking
        // the computed path the orc takes a straight-line step.
        let path = orc.path_towards(&r, player_loc).unwrap();
        assert!(path.len() >= r.config().path_limit);

        let step = match orc.plan_turn(&r) {
            Ok(Action::MoveTo(step)) => step,
            other => panic!("unexpected plan {other:?}"),
        };
        assert_eq!(step, orc_loc + ivec2(-1, 0));
        assert_eq!(
            orc_loc.vec_towards(step),
            orc_loc.step_towards(player_loc)
        );
    }
}
