use std::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A map cell coordinate.
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
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    /// Number of king moves needed to reach the other location.
    pub fn distance_to(&self, other: Location) -> i32 {
        self.vec_towards(other).cheb_len()
    }

    pub fn is_adjacent_to(&self, other: Location) -> bool {
        self.distance_to(other) == 1
    }

    pub fn vec_towards(&self, other: Location) -> IVec2 {
        IVec2::from(other) - IVec2::from(*self)
    }

    /// Single step towards the other location, rounded to the dominant axis.
    pub fn step_towards(&self, other: Location) -> IVec2 {
        self.vec_towards(other).unit_step()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = Location> + '_ {
        DIR_8.iter().map(move |&d| *self + d)
    }
}

impl Add<IVec2> for Location {
    type Output = Location;

    fn add(self, rhs: IVec2) -> Self::Output {
        Location::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<IVec2> for Location {
    fn from(v: IVec2) -> Self {
        Location::new(v.x, v.y)
    }
}

impl From<Location> for IVec2 {
    fn from(loc: Location) -> Self {
        ivec2(loc.x, loc.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
