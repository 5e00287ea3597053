use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::prelude::*;

/// Game world terrain tiles.
///
/// Cells that were never written read back as the default wall tile, so
/// everything outside the generated map is impassable.
#[serde_as]
#[derive(Clone, Default, Deref, DerefMut, Serialize, Deserialize)]
pub struct Terrain(#[serde_as(as = "Vec<(_, _)>")] HashMap<Location, Tile>);

impl Terrain {
    pub fn tile(&self, loc: Location) -> Tile {
        self.0.get(&loc).copied().unwrap_or_default()
    }

    pub fn set(&mut self, loc: Location, tile: Tile) {
        self.0.insert(loc, tile);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, Tile)> + '_ {
        self.0.iter().map(|(&loc, &t)| (loc, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_wall() {
        let mut t = Terrain::default();
        assert_eq!(t.tile(Location::new(3, 3)), Tile::Wall);
        t.set(Location::new(3, 3), Tile::Floor);
        assert_eq!(t.tile(Location::new(3, 3)), Tile::Floor);
        assert!(t.tile(Location::new(-1, 0)).blocks_movement());
    }
}
