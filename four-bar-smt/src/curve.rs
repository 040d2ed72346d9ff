//! Curve matching: every point of curve A lies within a tolerance of some
//! point of curve B.
//!
//! The requirement is a one-sided Hausdorff test, written with a universal
//! quantifier over the parameter of A nesting an existential quantifier over
//! the parameter of B:
//!
//! ```text
//! forall t in [lo, hi]. exists t2 in [lo, hi]. |A(t) - B(t2)|^2 < eps^2
//! ```
use crate::{expr::check_name, *};
use std::collections::BTreeSet;

/// Planar parametric curve `(X(t), Y(t))`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamCurve {
    /// Name of the parameter variable
    pub param: String,
    /// X coordinate expression
    pub x: Term,
    /// Y coordinate expression
    pub y: Term,
}

impl ParamCurve {
    /// Create a curve from its parameter name and coordinate expressions.
    pub fn new<S: Into<String>>(param: S, x: Term, y: Term) -> Self {
        Self { param: param.into(), x, y }
    }

    /// The point at parameter `t`.
    pub fn at(&self, t: &Term) -> Coord {
        Coord::new(self.x.clone(), self.y.clone()).subst(&self.param, t)
    }

    /// Unknowns of the curve, the parameter excluded.
    pub fn unknowns(&self) -> BTreeSet<String> {
        let mut set = self.x.vars();
        set.extend(self.y.vars());
        set.remove(&self.param);
        set
    }
}

/// Closed parameter interval `[lo, hi]`.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interval {
    /// Lower bound
    pub lo: f64,
    /// Upper bound
    pub hi: f64,
}

impl Default for Interval {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Interval {
    /// The unit interval `[0, 1]`.
    pub const UNIT: Self = Self::new(0., 1.);

    /// Create a new interval.
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    fn bounds(&self) -> Result<(Real, Real)> {
        let err = || Error::InvalidInterval { lo: self.lo, hi: self.hi };
        let lo = exact(self.lo).ok_or_else(err)?;
        let hi = exact(self.hi).ok_or_else(err)?;
        if lo > hi {
            return Err(err());
        }
        Ok((lo, hi))
    }

    /// Membership formula `lo <= t <= hi`.
    pub fn contains(&self, t: &Term) -> Result<Formula> {
        let (lo, hi) = self.bounds()?;
        Ok(range(&lo, &hi, t))
    }
}

fn range(lo: &Real, hi: &Real, t: &Term) -> Formula {
    Formula::and([
        Term::from(lo.clone()).le(t.clone()),
        t.clone().le(Term::from(hi.clone())),
    ])
}

/// Shape of the curve matching formula.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// `forall t. (t in I => exists t2. t2 in I and close)`
    ///
    /// Bounded coverage of curve A by curve B.
    Guarded,
    /// `t in I and forall t. exists t2. [t2 in I and] close`
    ///
    /// The range of `t` is asserted on a free unknown outside the
    /// quantifier, so the universal quantifier ranges over every real. This
    /// is **not** bounded coverage and can disagree with
    /// [`MatchMode::Guarded`] in both directions.
    Unguarded {
        /// Keep the range check of `t2` inside the existential quantifier
        inner_range: bool,
    },
}

fn fresh(base: &str, used: &BTreeSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}_{i}"))
        .find(|s| !used.contains(s))
        .unwrap_or_default()
}

/// Build the formula "every point of `a` is within `eps` of some point of
/// `b`" over `interval`.
///
/// The bound variables are named `t` and `t2`, renamed with a numeric suffix
/// if the curves already use these names as unknowns. Names that cannot be
/// written as symbols fail with [`Error::InvalidName`]. A point interval
/// (`lo == hi`) in guarded mode reduces to the comparison of the two single
/// points.
///
/// ```
/// use four_bar_smt::{build_curve_match_formula, Interval, MatchMode, ParamCurve, Term};
///
/// let t = Term::var("t");
/// let a = ParamCurve::new("t", t.clone(), Term::int(0));
/// let b = ParamCurve::new("t", t.clone(), t.square());
/// let f = build_curve_match_formula(&a, &b, 0.01, &Interval::UNIT, MatchMode::Guarded).unwrap();
/// assert!(f.free_vars().is_empty());
/// assert!(build_curve_match_formula(&a, &b, 0., &Interval::UNIT, MatchMode::Guarded).is_err());
/// ```
pub fn build_curve_match_formula(
    a: &ParamCurve,
    b: &ParamCurve,
    eps: f64,
    interval: &Interval,
    mode: MatchMode,
) -> Result<Formula> {
    let eps = match exact(eps) {
        Some(e) if eps > 0. => Term::from(e),
        _ => return Err(Error::InvalidTolerance(eps)),
    };
    let (lo, hi) = interval.bounds()?;
    let mut used = a.unknowns();
    used.extend(b.unknowns());
    check_name(&a.param)?;
    check_name(&b.param)?;
    used.iter().try_for_each(|v| check_name(v))?;
    let t = fresh("t", &used);
    used.insert(t.clone());
    let t2 = fresh("t2", &used);
    let (tv, t2v) = (Term::var(&t), Term::var(&t2));
    let eps2 = eps.square();
    let close = |p: &Term, q: &Term| a.at(p).dist2(&b.at(q)).lt(eps2.clone());
    let f = match mode {
        MatchMode::Guarded if lo == hi => {
            let p = Term::from(lo);
            close(&p, &p)
        }
        MatchMode::Guarded => {
            let inner = range(&lo, &hi, &t2v) & close(&tv, &t2v);
            Formula::forall(&t, range(&lo, &hi, &tv).implies(Formula::exists(&t2, inner)))
        }
        MatchMode::Unguarded { inner_range } => {
            tracing::warn!(
                inner_range,
                "unguarded curve matching quantifies over every real, not bounded coverage"
            );
            let inner = if inner_range {
                range(&lo, &hi, &t2v) & close(&tv, &t2v)
            } else {
                close(&tv, &t2v)
            };
            range(&lo, &hi, &tv) & Formula::forall(&t, Formula::exists(&t2, inner))
        }
    };
    tracing::debug!(mode = ?mode, t = %t, t2 = %t2, "curve matching formula built");
    Ok(f)
}
