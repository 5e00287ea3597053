use serde::{Deserialize, Serialize};

/// Specific terrain in a single game world map cell.
#[derive(
    Copy, Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize,
)]
#[serde(try_from = "char", into = "char")]
pub enum Tile {
    #[default]
    Wall,
    Floor,
}

use Tile::*;

impl Tile {
    pub fn blocks_sight(self) -> bool {
        matches!(self, Wall)
    }

    pub fn is_walkable(self) -> bool {
        !self.blocks_movement()
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, Wall)
    }
}

impl TryFrom<char> for Tile {
    type Error = &'static str;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '.' => Ok(Floor),
            '#' => Ok(Wall),
            _ => Err("invalid terrain char"),
        }
    }
}

impl From<Tile> for char {
    fn from(val: Tile) -> Self {
        // NB. This must match Tile's TryFrom inputs above.
        match val {
            Floor => '.',
            Wall => '#',
        }
    }
}
