//! Rendering of models. The notation is always given by the caller.
use crate::*;
use num_traits::{Signed as _, Zero as _};

/// Number notation.
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Fractions and root objects
    Exact,
    /// Fixed number of decimal places, `?` marks a truncated value
    Decimal,
}

/// Rendering configuration.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderCfg {
    /// Number notation
    pub notation: Notation,
    /// Decimal places of [`Notation::Decimal`]
    pub precision: usize,
}

impl Default for RenderCfg {
    fn default() -> Self {
        Self::decimal(10)
    }
}

impl RenderCfg {
    /// Exact notation.
    pub const fn exact() -> Self {
        Self { notation: Notation::Exact, precision: 0 }
    }

    /// Decimal notation with `precision` places.
    pub const fn decimal(precision: usize) -> Self {
        Self { notation: Notation::Decimal, precision }
    }
}

fn decimal_str(r: &Real, precision: usize) -> String {
    let ten = Real::from_integer(10.into());
    let abs = r.abs();
    let int = abs.trunc().to_integer();
    let mut rem = abs.fract();
    let mut digits = String::new();
    for _ in 0..precision {
        rem = rem * &ten;
        digits += &rem.trunc().to_integer().to_string();
        rem = rem.fract();
    }
    let digits = digits.trim_end_matches('0');
    let mut s = String::new();
    if r.is_negative() && !(int.is_zero() && digits.is_empty() && rem.is_zero()) {
        s.push('-');
    }
    s += &int.to_string();
    if !digits.is_empty() {
        s.push('.');
        s += digits;
    }
    if !rem.is_zero() {
        s.push('?');
    }
    s
}

impl RealValue {
    /// Render the value.
    pub fn render(&self, cfg: &RenderCfg) -> String {
        match (self, cfg.notation) {
            (Self::Rational(r), Notation::Exact) => r.to_string(),
            (Self::Rational(r), Notation::Decimal) => decimal_str(r, cfg.precision),
            (Self::Algebraic(a), Notation::Decimal) => match a.approx().and_then(exact) {
                // Approximations are never exact
                Some(x) => {
                    let s = decimal_str(&x, cfg.precision);
                    if s.ends_with('?') {
                        s
                    } else {
                        s + "?"
                    }
                }
                None => a.to_string(),
            },
            (Self::Algebraic(a), Notation::Exact) => a.to_string(),
        }
    }
}

impl Model {
    /// Render the model, one `name -> value` line per unknown.
    pub fn render(&self, cfg: &RenderCfg) -> String {
        self.iter()
            .map(|(k, v)| format!("{k} -> {}\n", v.render(cfg)))
            .collect()
    }
}
