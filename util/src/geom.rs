use glam::{ivec2, IVec2};

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

pub trait VecExt: Sized + Default {
    /// Absolute size of vector in taxicab metric.
    fn taxi_len(&self) -> i32;

    /// Absolute size of vector in king move metric.
    fn cheb_len(&self) -> i32;

    /// Vec points to one of the 8 neighboring cells.
    fn is_adjacent(&self) -> bool {
        self.cheb_len() == 1
    }

    /// Single king move step along this vector.
    ///
    /// Each component is the rounded quotient of the component and the king
    /// move length, so a long mostly-horizontal vector steps horizontally
    /// instead of veering diagonally.
    fn unit_step(&self) -> Self;
}

impl VecExt for IVec2 {
    fn taxi_len(&self) -> i32 {
        self.x.abs() + self.y.abs()
    }

    fn cheb_len(&self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    fn unit_step(&self) -> IVec2 {
        let dist = self.cheb_len();
        if dist == 0 {
            return IVec2::ZERO;
        }
        ivec2(
            (self.x as f32 / dist as f32).round() as i32,
            (self.y as f32 / dist as f32).round() as i32,
        )
    }
}

/// Plot a line from `a` towards `b`, `b` itself is not included.
pub fn bresenham_line(
    a: impl Into<IVec2>,
    b: impl Into<IVec2>,
) -> impl Iterator<Item = IVec2> {
    let (a, b): (IVec2, IVec2) = (a.into(), b.into());

    let d = b - a;
    let step = d.signum();
    let d = d.abs() * ivec2(1, -1);
    let mut p = a;
    let mut err = d.x + d.y;

    std::iter::from_fn(move || {
        if p == b {
            None
        } else {
            let ret = p;

            let e2 = 2 * err;
            if e2 >= d.y {
                err += d.y;
                p.x += step.x;
            }
            if e2 <= d.x {
                err += d.x;
                p.y += step.y;
            }
            Some(ret)
        }
    })
}
