use serde::{Deserialize, Serialize};

use crate::{
    ecs::{Ecs, Health, Icon, IsMob, Name, Scheduled, Stats},
    item::{ItemKind, Power},
    prelude::*,
    Fov, Placement, Terrain,
};

/// Tuning knobs for the simulation.
///
/// The defaults are the values the game is balanced around, they're runtime
/// data rather than hardcoded so scenarios and tests can tweak them.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Time a standard action takes.
    pub action_cost: i64,
    /// Delay before an actor whose turn failed to resolve tries again.
    pub stall_delay: i64,
    /// Path length beyond which monsters stop trusting pathfinding and
    /// lumber straight at their target instead.
    pub path_limit: usize,
    /// How far the player can see.
    pub fov_radius: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            action_cost: 100,
            stall_delay: 100,
            path_limit: 25,
            fov_radius: 10,
        }
    }
}

/// Main data container for game engine runtime.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Runtime {
    pub(crate) turns: TurnQueue,
    pub(crate) player: Option<Entity>,
    pub(crate) terrain: Terrain,
    pub(crate) fov: Fov,
    pub(crate) ecs: Ecs,
    pub(crate) placement: Placement,
    pub(crate) config: Config,
}

impl AsRef<Runtime> for Runtime {
    fn as_ref(&self) -> &Runtime {
        self
    }
}

impl AsMut<Runtime> for Runtime {
    fn as_mut(&mut self) -> &mut Runtime {
        self
    }
}

impl Runtime {
    /// Current simulation time.
    pub fn now(&self) -> Instant {
        self.turns.now()
    }

    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    pub fn turn_queue(&self) -> &TurnQueue {
        &self.turns
    }

    pub fn fov(&self) -> &Fov {
        &self.fov
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn tile(&self, loc: Location) -> Tile {
        self.terrain.tile(loc)
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Location, Tile)> + '_ {
        self.terrain.iter()
    }

    /// All live fighters on the map.
    pub fn fighters(&self) -> impl Iterator<Item = Entity> + '_ {
        self.placement
            .all_entities()
            .filter(move |e| e.is_fighter(self))
    }

    /// The live fighter standing on the cell, if any.
    pub fn fighter_at(&self, loc: Location) -> Option<Entity> {
        self.placement.entities_at(loc).find(|e| e.is_fighter(self))
    }

    /// Items lying on the cell.
    pub fn items_at(
        &self,
        loc: Location,
    ) -> impl Iterator<Item = Entity> + '_ {
        self.placement
            .entities_at(loc)
            .filter(move |e| e.is_item(self))
    }

    /// Whether the cell can't be stepped into, out-of-map cells, walls and
    /// cells with a live fighter on them all block.
    pub fn is_blocked(&self, loc: Location) -> bool {
        self.terrain.tile(loc).blocks_movement()
            || self.fighter_at(loc).is_some()
    }

    /// Process the next scheduled event.
    ///
    /// Advances the clock to the event's tick and runs the turn handler of
    /// the actor whose turn it is. The handler must consume the ticket by
    /// rescheduling or unscheduling it; a handler that leaves the ticket at
    /// the head of the queue would spin the simulation in place forever, so
    /// that's checked here and treated as a fatal bug.
    ///
    /// When the event belongs to the player, the handler blocks on `input`
    /// for a command.
    pub fn invoke_next(&mut self, input: &mut dyn InputSource) {
        let Some(ticket) = self.turns.begin_next() else {
            return;
        };

        ticket.actor().take_turn(self, input, ticket);

        assert!(
            !self.turns.is_active(&ticket),
            "Runtime::invoke_next: {ticket:?} was not rescheduled"
        );

        self.gc();
    }

    /// Remove dead entities from the ECS.
    pub(crate) fn gc(&mut self) {
        let kill_list: Vec<Entity> =
            self.ecs.iter().filter(|e| !e.is_alive(self)).collect();
        for e in kill_list {
            self.ecs.0.despawn(e.0).expect("Ecs: bad entity id");
        }
    }

    /// Return whether the game is still going or has ended one way or the
    /// other.
    pub fn scenario_status(&self) -> ScenarioStatus {
        let Some(player) = self.player else {
            return ScenarioStatus::Lost;
        };
        if !player.is_fighter(self) {
            return ScenarioStatus::Lost;
        }
        if self.fighters().all(|e| e == player) {
            return ScenarioStatus::Won;
        }
        ScenarioStatus::Ongoing
    }

    pub fn spawn(&mut self, loadout: impl hecs::DynamicBundle) -> Entity {
        Entity(self.ecs.spawn(loadout))
    }

    /// Spawn a combat-capable actor and enter it into the turn rotation.
    fn spawn_fighter(
        &mut self,
        name: &str,
        icon: char,
        hp: i32,
        stats: Stats,
        loc: Location,
    ) -> Entity {
        let e = self.spawn((
            Name(name.into()),
            Icon(icon),
            IsMob(true),
            Health::new(hp),
            stats,
        ));
        e.place(self, loc);
        let ticket = self.turns.schedule(0, e);
        e.set(self, Scheduled(Some(ticket)));
        e
    }

    /// Spawn a new player entity if there isn't currently a player.
    pub fn spawn_player(&mut self, loc: Location) -> Entity {
        if let Some(player) = self.player {
            return player;
        }
        let player = self.spawn_fighter(
            "You",
            '@',
            30,
            Stats {
                power: 5,
                defense: 2,
            },
            loc,
        );
        self.player = Some(player);
        player
    }

    pub fn spawn_orc(&mut self, loc: Location) -> Entity {
        self.spawn_fighter(
            "Orc",
            'o',
            10,
            Stats {
                power: 3,
                defense: 0,
            },
            loc,
        )
    }

    pub fn spawn_troll(&mut self, loc: Location) -> Entity {
        self.spawn_fighter(
            "Troll",
            'T',
            16,
            Stats {
                power: 4,
                defense: 1,
            },
            loc,
        )
    }

    pub fn spawn_potion(&mut self, loc: Location) -> Entity {
        let e = self.spawn((
            Name("Healing Potion".into()),
            Icon('!'),
            ItemKind::Potion,
            Power::Heal(4),
        ));
        e.place(self, loc);
        e
    }

    pub fn spawn_scroll(&mut self, loc: Location) -> Entity {
        let e = self.spawn((
            Name("Lightning Scroll".into()),
            Icon('?'),
            ItemKind::Scroll,
            Power::Bolt {
                damage: 20,
                range: 3,
            },
        ));
        e.place(self, loc);
        e
    }

    pub fn spawn_ration(&mut self, loc: Location) -> Entity {
        let e = self.spawn((
            Name("Ration".into()),
            Icon(','),
            ItemKind::Ration,
            Power::Heal(1),
        ));
        e.place(self, loc);
        e
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn stale_tickets_clean_themselves_up() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@.o#
            #####",
        ))
        .unwrap();
        let orc = r.fighter_at(Location::new(3, 1)).unwrap();

        // Kill the orc while its ticket is buried in the queue.
        orc.damage(&mut r, 999);
        assert!(!orc.is_alive(&r));
        assert_eq!(r.turn_queue().len(), 2);

        // Player turn runs, then the orc's orphaned ticket comes up and
        // quietly drops out without invoking the dead orc.
        let mut input = Script::default();
        r.invoke_next(&mut input);
        r.invoke_next(&mut input);
        assert_eq!(r.turn_queue().len(), 1);
        assert_eq!(r.turn_queue().peek().map(|t| t.actor()), r.player());
    }

    #[test]
    fn event_loop_runs_in_schedule_order() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ######
            #@..o#
            ######",
        ))
        .unwrap();
        let mut input = Script::default();

        // Both actors start at tick zero, player spawned first.
        assert_eq!(r.now(), Instant::default());
        r.invoke_next(&mut input);
        // Player rested, still at tick 0 processing the orc.
        r.invoke_next(&mut input);
        assert_eq!(r.now(), Instant::default());
        // Next round comes up at 100.
        r.invoke_next(&mut input);
        assert_eq!(r.now(), Instant::default() + 100);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ######
            #@o!.#
            ######",
        ))
        .unwrap();
        let mut input = Script::default();
        r.invoke_next(&mut input);

        let save = serde_json::to_string(&r).unwrap();
        let r2: Runtime = serde_json::from_str(&save).unwrap();

        assert_eq!(r2.now(), r.now());
        assert_eq!(r2.player(), r.player());
        assert_eq!(r2.turn_queue().len(), r.turn_queue().len());
        assert_eq!(r2.turn_queue().peek(), r.turn_queue().peek());
        assert_eq!(
            r2.fighter_at(Location::new(2, 1)),
            r.fighter_at(Location::new(2, 1))
        );
        assert_eq!(r2.items_at(Location::new(3, 1)).count(), 1);

        // The reloaded world keeps simulating from where it left off.
        let mut r2 = r2;
        r2.invoke_next(&mut input);
        assert_eq!(r2.now(), Instant::default());
    }

    #[test]
    fn win_and_loss_detection() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@.o#
            #####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let orc = r.fighter_at(Location::new(3, 1)).unwrap();

        assert!(matches!(r.scenario_status(), ScenarioStatus::Ongoing));
        orc.damage(&mut r, 999);
        assert!(matches!(r.scenario_status(), ScenarioStatus::Won));
        player.damage(&mut r, 999);
        assert!(matches!(r.scenario_status(), ScenarioStatus::Lost));
    }
}
