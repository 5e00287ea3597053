use glam::{ivec2, IVec2};

/// ASCII maps embedded in source code or loaded from text files.
///
/// Normalizes away the indentation that raw string literals pick up from
/// surrounding code so the top-left map cell always lands at origin.
#[derive(Clone, Default, Debug)]
pub struct AsciiMap {
    map: String,
}

impl AsciiMap {
    pub fn new(map: impl AsRef<str>) -> Self {
        let map = map.as_ref().trim_end();

        let mut y_skip = 0;
        let mut x_skip = usize::MAX;

        for line in map.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                y_skip += 1;
                continue;
            }

            x_skip =
                x_skip.min(line.chars().take_while(|c| c.is_whitespace()).count());
        }

        if x_skip == usize::MAX {
            return AsciiMap::default();
        }

        let mut ret = String::new();
        for line in map.lines().skip(y_skip) {
            for c in line.trim_end().chars().skip(x_skip) {
                ret.push(c);
            }
            ret.push('\n');
        }

        AsciiMap { map: ret }
    }

    /// Iterate the non-whitespace cells of the map.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        self.map.lines().enumerate().flat_map(|(y, line)| {
            line.chars().enumerate().filter_map(move |(x, c)| {
                (!c.is_whitespace()).then_some((ivec2(x as i32, y as i32), c))
            })
        })
    }

    /// Width and height of the map's bounding box.
    pub fn dim(&self) -> IVec2 {
        let w = self.map.lines().map(|a| a.chars().count()).max().unwrap_or(0);
        let h = self.map.lines().count();
        ivec2(w as i32, h as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indented_literal() {
        let map = AsciiMap::new(
            "
            ##
            .#",
        );
        assert_eq!(map.dim(), ivec2(2, 2));

        let cells: Vec<(IVec2, char)> = map.iter().collect();
        assert_eq!(
            cells,
            vec![
                (ivec2(0, 0), '#'),
                (ivec2(1, 0), '#'),
                (ivec2(0, 1), '.'),
                (ivec2(1, 1), '#'),
            ]
        );
    }

    #[test]
    fn empty() {
        assert_eq!(AsciiMap::new("   \n  ").iter().count(), 0);
        assert_eq!(AsciiMap::new("").dim(), ivec2(0, 0));
    }

    #[test]
    fn holes() {
        // Interior whitespace is not part of the map.
        let map = AsciiMap::new("# #");
        assert_eq!(map.iter().count(), 2);
        assert_eq!(map.dim(), ivec2(3, 1));
    }
}
