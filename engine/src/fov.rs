//! Terrain visibility tracking.

use serde::{Deserialize, Serialize};
use util::bresenham_line;

use crate::prelude::*;

/// Which map cells the player sees now and has seen before.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Fov {
    visible: HashSet<Location>,
    explored: HashSet<Location>,
}

impl Fov {
    /// Whether the cell is in the player's current field of view.
    pub fn can_see(&self, loc: Location) -> bool {
        self.visible.contains(&loc)
    }

    /// Whether the cell has ever been in the player's field of view.
    pub fn is_explored(&self, loc: Location) -> bool {
        self.explored.contains(&loc)
    }

    pub(crate) fn reveal(&mut self, visible: HashSet<Location>) {
        self.explored.extend(visible.iter().copied());
        self.visible = visible;
    }
}

impl Runtime {
    /// Recompute the visible cell set around the player.
    ///
    /// Called whenever the player moves. A cell is visible when it's within
    /// the sight radius and the line towards it crosses no opaque cells.
    pub fn update_fov(&mut self) {
        let Some(origin) = self.player().and_then(|p| p.loc(self)) else {
            return;
        };

        let radius = self.config.fov_radius;
        let mut visible = HashSet::default();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let loc = origin + ivec2(dx, dy);
                if self.sight_line_clear(origin, loc) {
                    visible.insert(loc);
                }
            }
        }

        self.fov.reveal(visible);
    }

    /// Whether every cell on the line from `a` strictly before `b` is
    /// transparent. A wall at `b` itself is still seen.
    fn sight_line_clear(&self, a: Location, b: Location) -> bool {
        bresenham_line(a, b)
            .all(|p| !self.terrain.tile(p.into()).blocks_sight())
    }
}
