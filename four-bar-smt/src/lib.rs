//! Four🍀bar SMT generates real-arithmetic constraint models for four-bar
//! linkage synthesis and curve matching, and checks them with an external
//! SMT solver.
//!
//! ```
//! use four_bar_smt::*;
//!
//! let a = ParamCurve::new("t", Term::var("t"), Term::int(0));
//! let b = ParamCurve::new("s", Term::var("s") * Term::var("k"), Term::int(0));
//! let f = build_curve_match_formula(&a, &b, 0.01, &Interval::UNIT, MatchMode::Guarded)?;
//! assert_eq!(f.free_vars().into_iter().collect::<Vec<_>>(), ["k"]);
//! # Ok::<(), Error>(())
//! ```
#![cfg_attr(doc_cfg, feature(doc_cfg))]
#![warn(missing_docs)]
pub use crate::curve::*;
pub use crate::error::*;
pub use crate::expr::*;
pub use crate::grashof::*;
pub use crate::linkage::*;
pub use crate::model::*;
pub use crate::point::*;
pub use crate::render::*;
pub use crate::solver::*;

#[cfg(feature = "csv")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "csv")))]
pub mod csv;
mod curve;
mod error;
mod expr;
mod grashof;
mod linkage;
mod model;
mod point;
mod render;
pub mod sexp;
mod solver;
#[cfg(test)]
mod tests;
