use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Deserialize, Serialize};

use crate::Entity;

/// An opaque representation of a time instant.
///
/// The unit of time is an abstract scheduler tick, standard actions take 100
/// ticks.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct Instant(pub(crate) i64);

impl std::ops::Add<i64> for Instant {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        Instant(self.0 + rhs)
    }
}

impl std::ops::AddAssign<i64> for Instant {
    fn add_assign(&mut self, rhs: i64) {
        self.0 += rhs;
    }
}

impl std::ops::Sub<Instant> for Instant {
    type Output = i64;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.0 - rhs.0
    }
}

/// A single scheduled turn of an actor.
///
/// Tickets are plain value tokens, two tickets with the same fields are the
/// same scheduling entry. The queue hands them out and the actor keeps a copy
/// of its latest one, so "is this still my live turn" is a cheap equality
/// check with no shared ownership involved.
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
pub struct Ticket {
    tick: Instant,
    seq: u64,
    actor: Entity,
}

impl Ticket {
    pub fn tick(&self) -> Instant {
        self.tick
    }

    /// The actor whose turn handler this ticket invokes.
    ///
    /// Binding by entity id instead of a callback keeps the queue
    /// serializable across save and load.
    pub fn actor(&self) -> Entity {
        self.actor
    }
}

/// Discrete event scheduler that drives actor turns.
///
/// A min-heap of tickets ordered by time, with ties broken in first-in,
/// first-out order so a replayed schedule always resolves the same way.
#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnQueue {
    now: Instant,
    next_seq: u64,
    heap: BinaryHeap<Reverse<Ticket>>,
}

impl TurnQueue {
    /// Current time, the tick of the latest event that began processing.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Add an actor's turn to the queue.
    ///
    /// `interval` is the time to wait from the current time. Returns the new
    /// ticket, the caller is expected to record it on the actor for liveness
    /// checks.
    pub fn schedule(&mut self, interval: i64, actor: Entity) -> Ticket {
        let ticket = Ticket {
            tick: self.now + interval,
            seq: self.next_seq,
            actor,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(ticket));
        ticket
    }

    /// Replace the active ticket with a new one scheduled after `interval`.
    ///
    /// `ticket` must be the active ticket, the one whose turn is currently
    /// being processed. Anything else is a bug in the caller and panics.
    pub fn reschedule(&mut self, ticket: &Ticket, interval: i64) -> Ticket {
        self.unschedule(ticket);
        self.schedule(interval, ticket.actor)
    }

    /// Explicitly remove the active ticket.
    ///
    /// `ticket` must be the active ticket, same contract as `reschedule`.
    pub fn unschedule(&mut self, ticket: &Ticket) {
        assert!(
            self.is_active(ticket),
            "TurnQueue::unschedule: {ticket:?} is not the active ticket"
        );
        self.heap.pop();
    }

    /// The earliest pending ticket.
    pub fn peek(&self) -> Option<&Ticket> {
        self.heap.peek().map(|Reverse(t)| t)
    }

    /// Whether the ticket is the one whose turn it currently is.
    pub fn is_active(&self, ticket: &Ticket) -> bool {
        self.peek() == Some(ticket)
    }

    /// Advance the clock to the next event and return its ticket.
    ///
    /// The ticket stays at the head of the queue. Whoever handles the event
    /// must consume it with `reschedule` or `unschedule` before handing
    /// control back to the event loop, the loop asserts this.
    pub(crate) fn begin_next(&mut self) -> Option<Ticket> {
        let &Reverse(ticket) = self.heap.peek()?;
        self.now = ticket.tick;
        Some(ticket)
    }
}
