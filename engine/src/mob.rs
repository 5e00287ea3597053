//! Entity logic for active creatures.

use crate::{
    ecs::{Health, Icon, IsMob, Name, Scheduled, Stats},
    item::ItemKind,
    prelude::*,
};

impl Entity {
    pub fn is_player(&self, r: &impl AsRef<Runtime>) -> bool {
        let r = r.as_ref();
        r.player == Some(*self)
    }

    pub fn is_mob(&self, r: &impl AsRef<Runtime>) -> bool {
        self.get::<IsMob>(r).0
    }

    /// A mob that's still in the fight, occupies its cell and can be hit.
    pub fn is_fighter(&self, r: &impl AsRef<Runtime>) -> bool {
        self.is_mob(r) && self.is_alive(r) && self.hp(r) > 0
    }

    pub fn stats(&self, r: &impl AsRef<Runtime>) -> Stats {
        self.get::<Stats>(r)
    }

    pub fn hp(&self, r: &impl AsRef<Runtime>) -> i32 {
        self.get::<Health>(r).hp
    }

    pub fn max_hp(&self, r: &impl AsRef<Runtime>) -> i32 {
        self.get::<Health>(r).max_hp
    }

    /// The actor's live scheduler ticket, `None` when it's been retired.
    pub(crate) fn ticket(&self, r: &impl AsRef<Runtime>) -> Option<Ticket> {
        self.get::<Scheduled>(r).0
    }

    /// Handle one scheduled turn of this actor.
    ///
    /// The scheduler contract requires the ticket to be consumed before this
    /// returns, every branch below ends in a reschedule or an unschedule.
    pub(crate) fn take_turn(
        &self,
        r: &mut Runtime,
        input: &mut dyn InputSource,
        ticket: Ticket,
    ) {
        if self.ticket(r) != Some(ticket) {
            // A stale entry, the actor was retired or got a new ticket
            // through some other path. Drop it and move on.
            r.turns.unschedule(&ticket);
            return;
        }

        if self.is_player(r) {
            self.player_turn(r, input, ticket);
        } else {
            self.monster_turn(r);
        }
    }

    /// Run player commands until one of them consumes the turn.
    ///
    /// Blocks on the input source inside the game loop, everything stays on
    /// one thread. Rejected commands report their reason and ask again.
    fn player_turn(
        &self,
        r: &mut Runtime,
        input: &mut dyn InputSource,
        ticket: Ticket,
    ) {
        while self.ticket(r) == Some(ticket) {
            let command = input.next_command(r, *self);
            match self.plan(r, command) {
                Ok(action) => self.act(r, action),
                Err(reason) => msg!("{reason}"),
            }
        }
    }

    fn monster_turn(&self, r: &mut Runtime) {
        let stall = r.config.stall_delay;
        match self.plan_turn(r) {
            Ok(action) => {
                // A planned action must be a fixed point of planning,
                // anything else means a half-resolved delegation chain
                // leaked out of the controller. Don't let one broken
                // monster take down the whole simulation, put it back in
                // the queue and keep going.
                if self.plan(r, action) == Ok(action) {
                    self.act(r, action);
                } else {
                    log::error!(
                        "{} returned unresolved action {action:?}",
                        self.name(r)
                    );
                    self.reschedule(r, stall);
                }
            }
            Err(reason) => {
                msg!("{reason}");
                self.reschedule(r, stall);
            }
        }
    }

    /// Consume the actor's turn, scheduling its next one after `interval`.
    ///
    /// Does nothing if the actor has been retired mid-turn, a dead actor
    /// does not come back into rotation.
    pub(crate) fn reschedule(
        &self,
        r: &mut impl AsMut<Runtime>,
        interval: i64,
    ) {
        let r = r.as_mut();
        let Some(ticket) = self.ticket(r) else {
            return;
        };
        let next = r.turns.reschedule(&ticket, interval);
        self.set(r, Scheduled(Some(next)));
    }

    /// Restore hit points, capped at the maximum.
    pub fn heal(&self, r: &mut impl AsMut<Runtime>, amount: i32) {
        let r = r.as_mut();
        self.with_mut::<Health, _>(r, |h| {
            h.hp = (h.hp + amount).min(h.max_hp);
        });
    }

    /// Take a hit, dying when hit points run out.
    pub fn damage(&self, r: &mut impl AsMut<Runtime>, amount: i32) {
        let r = r.as_mut();
        debug_assert!(amount >= 0);
        let hp =
            self.with_mut::<Health, _>(r, |h| {
                h.hp -= amount;
                h.hp
            });
        if hp <= 0 {
            self.die(r);
        }
    }

    /// Remove the actor from play, dropping its corpse and belongings.
    ///
    /// Callable from anywhere, including from the middle of the actor's own
    /// turn, and idempotent, a second call on an already retired actor does
    /// nothing.
    pub(crate) fn die(&self, r: &mut impl AsMut<Runtime>) {
        let r = r.as_mut();
        let Some(loc) = self.loc(r) else {
            // Already off the map.
            return;
        };

        if self.is_player(r) {
            msg!("You die.");
        } else {
            msg!("The {} dies.", self.name(r));
        }

        // Everything the actor carried spills onto its death cell.
        let held: Vec<Entity> = self.contents(r).collect();
        for item in held {
            item.place(r, loc);
        }

        let corpse = r.spawn((
            Name(format!("{} Corpse", self.name(r))),
            Icon('%'),
            ItemKind::Corpse,
        ));
        corpse.place(r, loc);

        // Drop out of the turn rotation. Only the active heap entry can be
        // removed directly; a ticket buried deeper in the queue stays there
        // and gets swept up by the stale-ticket check when its time comes.
        if let Some(ticket) = self.ticket(r) {
            if r.turns.is_active(&ticket) {
                r.turns.unschedule(&ticket);
            }
            self.set(r, Scheduled::default());
        }

        self.destroy(r);
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn damage_arithmetic() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@o.#
            #####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let orc = r.fighter_at(Location::new(2, 1)).unwrap();

        // Attacker power 5 against defense 0 takes 5 hp off.
        let hit = player.plan(&r, Action::Move(ivec2(1, 0))).unwrap();
        player.act(&mut r, hit);
        assert_eq!(orc.hp(&r), 5);
        assert!(orc.is_fighter(&r));

        // Orc power 3 against player defense 2 takes 1.
        let hit_back = orc.plan(&r, Action::AttackPlayer).unwrap();
        orc.act(&mut r, hit_back);
        assert_eq!(player.hp(&r), 29);

        // Armored up to defense 2, the same attack now lands for 3.
        orc.set(&mut r, crate::ecs::Stats { power: 3, defense: 2 });
        let hit = player.plan(&r, Action::Move(ivec2(1, 0))).unwrap();
        player.act(&mut r, hit);
        assert_eq!(orc.hp(&r), 2);
    }

    #[test]
    fn no_damage_floor() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@T.#
            #####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let troll = r.fighter_at(Location::new(2, 1)).unwrap();

        // Power 2 against defense 5 does nothing, hp never goes up from
        // being hit either.
        troll.set(&mut r, crate::ecs::Stats { power: 2, defense: 5 });
        player.set(&mut r, crate::ecs::Stats { power: 2, defense: 5 });

        let hp = troll.hp(&r);
        let hit = player.plan(&r, Action::Move(ivec2(1, 0))).unwrap();
        player.act(&mut r, hit);
        assert_eq!(troll.hp(&r), hp);
    }

    #[test]
    fn death_drops_corpse_and_loot() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            #####
            #@o.#
            #####",
        ))
        .unwrap();
        let player = r.player().unwrap();
        let orc = r.fighter_at(Location::new(2, 1)).unwrap();
        let orc_loc = orc.loc(&r).unwrap();

        // Stuff the orc's pockets.
        let loot: Vec<Entity> =
            (0..3).map(|_| {
                let item = r.spawn_ration(Location::new(3, 1));
                item.place(&mut r, orc);
                item
            }).collect();

        orc.damage(&mut r, 999);

        assert!(!orc.is_alive(&r));
        assert!(r.fighter_at(orc_loc).is_none());
        // Three rations and one corpse on the death cell.
        assert_eq!(r.items_at(orc_loc).count(), 4);
        for item in loot {
            assert_eq!(item.loc(&r), Some(orc_loc));
        }
        let corpse = r
            .items_at(orc_loc)
            .find(|e| e.name(&r) == "Orc Corpse")
            .expect("no corpse dropped");
        assert_eq!(corpse.icon(&r), '%');

        // Dying twice does not double-drop.
        orc.die(&mut r);
        assert_eq!(r.items_at(orc_loc).count(), 4);
    }

    #[test]
    fn retire_during_own_turn() {
        let mut r = Runtime::new(&WorldSpec::new(
            "
            ####
            #@.#
            ####",
        ))
        .unwrap();
        let player = r.player().unwrap();

        // The player's ticket is the active heap entry; dying mid-turn must
        // pop it since nobody else will.
        let ticket = player.ticket(&r).unwrap();
        assert!(r.turn_queue().is_active(&ticket));
        player.die(&mut r);
        assert!(player.ticket(&r).is_none());
        assert!(r.turn_queue().is_empty());

        // Rescheduling a retired actor is a no-op.
        player.reschedule(&mut r, 100);
        assert!(r.turn_queue().is_empty());
    }
}
