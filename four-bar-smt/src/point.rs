//! Planar points made of terms, and the distance relations between them.
use crate::*;

/// Coordinate axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
}

impl Axis {
    /// Lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

/// Name of the unknown holding coordinate `axis` of `joint` in pose `i`.
///
/// The name only depends on its arguments, e.g. `("C", Axis::X, 3)` gives
/// `C_x_3`.
pub fn joint_var(joint: &str, axis: Axis, i: usize) -> String {
    format!("{joint}_{}_{i}", axis.name())
}

/// A resolved planar point, each coordinate is a term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    /// X coordinate
    pub x: Term,
    /// Y coordinate
    pub y: Term,
}

impl Coord {
    /// Create a point from coordinate expressions.
    pub const fn new(x: Term, y: Term) -> Self {
        Self { x, y }
    }

    /// Create a point from the names of its two unknowns.
    pub fn vars<S1, S2>(x: S1, y: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::new(Term::var(x), Term::var(y))
    }

    /// The unknowns of `joint` in pose `i`. See [`joint_var()`].
    pub fn indexed(joint: &str, i: usize) -> Self {
        Self::vars(joint_var(joint, Axis::X, i), joint_var(joint, Axis::Y, i))
    }

    /// Constant point. Return none if any coordinate is not finite.
    pub fn constant([x, y]: [f64; 2]) -> Option<Self> {
        Some(Self::new(Term::from_f64(x)?, Term::from_f64(y)?))
    }

    /// Squared Euclidean distance to another point.
    pub fn dist2(&self, rhs: &Self) -> Term {
        (&self.x - &rhs.x).square() + (&self.y - &rhs.y).square()
    }

    /// Formula fixing this point onto another point.
    pub fn coincide(&self, rhs: &Self) -> [Formula; 2] {
        [
            self.x.clone().equals(rhs.x.clone()),
            self.y.clone().equals(rhs.y.clone()),
        ]
    }

    /// Replace variable `var` in both coordinates.
    pub fn subst(&self, var: &str, to: &Term) -> Self {
        Self::new(self.x.subst(var, to), self.y.subst(var, to))
    }
}

/// Distance equation `|p - q|^2 = len^2`.
///
/// The square root is never taken, so the formula stays polynomial.
pub fn dist_eq(p: &Coord, q: &Coord, len: &Term) -> Formula {
    q.dist2(p).equals(len.square())
}

/// Distance equation from the unknowns of `joint` in pose `i` to `pivot`.
pub fn dist_eq_indexed(joint: &str, i: usize, pivot: &Coord, len: &Term) -> Formula {
    dist_eq(&Coord::indexed(joint, i), pivot, len)
}

/// Collinearity of three points: the cross product of `q - p` and `r - p`
/// vanishes.
///
/// A ready-made body for [`LinkageSyn::linearity()`].
pub fn collinear(p: &Coord, q: &Coord, r: &Coord) -> Formula {
    let cross = (&q.x - &p.x) * (&r.y - &p.y) - (&q.y - &p.y) * (&r.x - &p.x);
    cross.equals(Term::int(0))
}
