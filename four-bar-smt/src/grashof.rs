//! Grashof mobility condition of the four-bar loop.
//!
//! The link `AC` is taken as the shortest link. The strict slack keeps the
//! solutions away from the change point, where `s + l = p + q` and the
//! linkage can flip between circuits.
use crate::*;

/// Default slack of the Grashof inequalities.
pub const SLACK: f64 = 0.01;

/// Grashof inequalities over the loop `AB`, `AC`, `BD`, `CD`.
///
/// + `AB`, `BD` and `CD` are not shorter than `AC`
/// + Any two of `AB`, `BD`, `CD` sum to at least `AC` plus the third plus
///   `slack`
pub fn grashof(ab: &Term, ac: &Term, bd: &Term, cd: &Term, slack: &Term) -> [Formula; 6] {
    [
        ab.clone().ge(ac.clone()),
        bd.clone().ge(ac.clone()),
        cd.clone().ge(ac.clone()),
        (cd + bd).ge(ac + ab + slack),
        (ab + cd).ge(ac + bd + slack),
        (ab + bd).ge(ac + cd + slack),
    ]
}

/// Numeric counterpart of [`grashof()`].
pub fn is_grashof([ab, ac, bd, cd]: [f64; 4], slack: f64) -> bool {
    ab >= ac
        && bd >= ac
        && cd >= ac
        && cd + bd >= ac + ab + slack
        && ab + cd >= ac + bd + slack
        && ab + bd >= ac + cd + slack
}

/// Return true if the lengths close a loop whose shortest link fully
/// rotates (`s + l < p + q`).
pub fn is_rotatable(mut planar_loop: [f64; 4]) -> bool {
    planar_loop.sort_unstable_by(f64::total_cmp);
    let [s, p, q, l] = planar_loop;
    s > 0. && l < s + p + q && s + l < p + q
}
