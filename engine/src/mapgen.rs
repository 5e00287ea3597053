//! Building runtimes from map descriptions.

use anyhow::bail;
use util::AsciiMap;

use crate::prelude::*;

/// Description of a game world as an ASCII map.
///
/// ```text
/// #####
/// #@.o#
/// #!..#
/// #####
/// ```
///
/// `#` wall, `.` floor, `@` player start, `o` orc, `T` troll,
/// `!` healing potion, `?` lightning scroll, `,` ration. Everything except
/// walls sits on a floor tile.
#[derive(Clone, Default, Debug)]
pub struct WorldSpec {
    map: String,
}

impl WorldSpec {
    pub fn new(map: impl Into<String>) -> Self {
        WorldSpec { map: map.into() }
    }

    pub fn dim(&self) -> IVec2 {
        AsciiMap::new(&self.map).dim()
    }
}

impl Runtime {
    /// Build and populate a game world.
    ///
    /// Actors are entered into the turn rotation in map reading order, so
    /// the same map always produces the same turn sequence.
    pub fn new(spec: &WorldSpec) -> anyhow::Result<Self> {
        let mut ret = Runtime::default();

        for (pos, c) in AsciiMap::new(&spec.map).iter() {
            let loc = Location::from(pos);
            let tile = if c == '#' { Tile::Wall } else { Tile::Floor };
            ret.terrain.set(loc, tile);

            match c {
                '#' | '.' => {}
                '@' => {
                    if ret.player.is_some() {
                        bail!("multiple player entry points");
                    }
                    ret.spawn_player(loc);
                }
                'o' => {
                    ret.spawn_orc(loc);
                }
                'T' => {
                    ret.spawn_troll(loc);
                }
                '!' => {
                    ret.spawn_potion(loc);
                }
                '?' => {
                    ret.spawn_scroll(loc);
                }
                ',' => {
                    ret.spawn_ration(loc);
                }
                _ => bail!("unknown map glyph {c:?}"),
            }
        }

        if ret.player.is_none() {
            bail!("map does not specify a player entry point");
        }

        ret.update_fov();

        Ok(ret)
    }
}
