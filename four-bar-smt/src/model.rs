//! Models returned by the decision procedure.
//!
//! Nonlinear real solving routinely returns irrational witnesses, so the
//! values are kept exact: a rational number, or a real root of a polynomial
//! with rational coefficients. Floating point only appears on request.
use crate::{sexp::Sexp, *};
use num_traits::{One as _, Zero as _};
use std::collections::BTreeMap;

/// Exact value of an unknown.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RealValue {
    /// Rational number
    Rational(Real),
    /// Real algebraic number
    Algebraic(AlgebraicNumber),
}

impl RealValue {
    /// Get the rational value, if the value is rational.
    pub fn as_rational(&self) -> Option<&Real> {
        match self {
            Self::Rational(r) => Some(r),
            Self::Algebraic(_) => None,
        }
    }

    /// Floating point approximation.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Rational(r) => Some(real_to_f64(r)),
            Self::Algebraic(a) => a.approx(),
        }
    }

    /// Read a value in SMT-LIB form, e.g. `1.5`, `(- 2.0)`, `(/ 1.0 3.0)` or
    /// `(root-obj (+ (^ x 2) (- 2)) 1)`.
    pub fn from_sexp(s: &Sexp) -> Result<Self> {
        if let Some(("root-obj", [poly, k])) = s.as_app() {
            let coeffs = parse_poly(poly)?;
            let index = k
                .as_atom()
                .and_then(|k| k.parse().ok())
                .filter(|&k| k > 0)
                .ok_or_else(|| malformed(s))?;
            return Ok(Self::Algebraic(AlgebraicNumber::new(coeffs, index)));
        }
        parse_rational(s).map(Self::Rational)
    }
}

impl From<Real> for RealValue {
    fn from(r: Real) -> Self {
        Self::Rational(r)
    }
}

/// The `index`-th real root (1-based, ascending) of a polynomial.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgebraicNumber {
    /// Coefficients in ascending degree
    pub coeffs: Vec<Real>,
    /// Root index, starts from 1
    pub index: usize,
}

impl AlgebraicNumber {
    /// Create a new value. Leading zero coefficients are removed.
    pub fn new(mut coeffs: Vec<Real>, index: usize) -> Self {
        while coeffs.last().is_some_and(Real::is_zero) {
            coeffs.pop();
        }
        Self { coeffs, index }
    }

    /// Degree of the polynomial.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Isolate the root numerically.
    ///
    /// Return none if the polynomial has fewer real roots than the index.
    pub fn approx(&self) -> Option<f64> {
        let p = self.coeffs.iter().map(real_to_f64).collect::<Vec<_>>();
        real_roots(&p).get(self.index.checked_sub(1)?).copied()
    }
}

impl std::fmt::Display for AlgebraicNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "root-obj(")?;
        let mut first = true;
        for (k, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let neg = c < &Real::zero();
            match (first, neg) {
                (true, true) => write!(f, "-")?,
                (true, false) => (),
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            first = false;
            let mag = if neg { -c } else { c.clone() };
            if k == 0 || !mag.is_one() {
                write!(f, "{mag}")?;
            }
            match k {
                0 => (),
                1 => write!(f, "x")?,
                k => write!(f, "x^{k}")?,
            }
        }
        if first {
            write!(f, "0")?;
        }
        write!(f, ", {})", self.index)
    }
}

fn malformed(s: &Sexp) -> Error {
    Error::Protocol(format!("malformed value {s}"))
}

fn parse_rational(s: &Sexp) -> Result<Real> {
    if let Sexp::Atom(a) = s {
        return decimal(a).ok_or_else(|| malformed(s));
    }
    match s.as_app() {
        Some(("-", [a])) => Ok(-parse_rational(a)?),
        Some(("-", [a, rest @ ..])) => rest
            .iter()
            .try_fold(parse_rational(a)?, |acc, b| Ok(acc - parse_rational(b)?)),
        Some(("+", args)) => args
            .iter()
            .try_fold(Real::zero(), |acc, a| Ok(acc + parse_rational(a)?)),
        Some(("*", args)) => args
            .iter()
            .try_fold(Real::one(), |acc, a| Ok(acc * parse_rational(a)?)),
        Some(("/", [a, b])) => {
            let d = parse_rational(b)?;
            if d.is_zero() {
                return Err(malformed(s));
            }
            Ok(parse_rational(a)? / d)
        }
        _ => Err(malformed(s)),
    }
}

type Poly = Vec<Real>;

fn poly_add(a: &[Real], b: &[Real]) -> Poly {
    let zero = Real::zero();
    (0..a.len().max(b.len()))
        .map(|i| a.get(i).unwrap_or(&zero) + b.get(i).unwrap_or(&zero))
        .collect()
}

fn poly_mul(a: &[Real], b: &[Real]) -> Poly {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![Real::zero(); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

fn parse_poly(s: &Sexp) -> Result<Poly> {
    let app = match s {
        Sexp::Atom(a) if a == "x" => return Ok(vec![Real::zero(), Real::one()]),
        Sexp::Atom(_) => return parse_rational(s).map(|c| vec![c]),
        Sexp::List(_) => s.as_app().ok_or_else(|| malformed(s))?,
    };
    match app {
        ("+", args) => args
            .iter()
            .try_fold(Vec::new(), |acc, a| Ok(poly_add(&acc, &parse_poly(a)?))),
        ("-", [a]) => Ok(parse_poly(a)?.into_iter().map(|c| -c).collect()),
        ("-", [a, rest @ ..]) => rest.iter().try_fold(parse_poly(a)?, |acc, b| {
            let neg = parse_poly(b)?.into_iter().map(|c| -c).collect::<Vec<_>>();
            Ok(poly_add(&acc, &neg))
        }),
        ("*", args) => args
            .iter()
            .try_fold(vec![Real::one()], |acc, a| Ok(poly_mul(&acc, &parse_poly(a)?))),
        ("^", [a, n]) => {
            let n = n
                .as_atom()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| malformed(s))?;
            let base = parse_poly(a)?;
            Ok((0..n).fold(vec![Real::one()], |acc, _| poly_mul(&acc, &base)))
        }
        ("/", [a, b]) => {
            let d = parse_rational(b)?;
            if d.is_zero() {
                return Err(malformed(s));
            }
            Ok(parse_poly(a)?.into_iter().map(|c| c / &d).collect())
        }
        _ => Err(malformed(s)),
    }
}

fn horner(p: &[f64], x: f64) -> f64 {
    p.iter().rev().fold(0., |acc, c| acc * x + c)
}

fn bisect(p: &[f64], mut a: f64, mut b: f64) -> f64 {
    let mut fa = horner(p, a);
    for _ in 0..200 {
        let m = 0.5 * (a + b);
        let fm = horner(p, m);
        if fm == 0. || m == a || m == b {
            return m;
        }
        if (fa < 0.) == (fm < 0.) {
            a = m;
            fa = fm;
        } else {
            b = m;
        }
    }
    0.5 * (a + b)
}

// Real roots in ascending order, isolated between the critical points
fn real_roots(p: &[f64]) -> Vec<f64> {
    let Some(deg) = p.iter().rposition(|c| *c != 0.) else {
        return Vec::new();
    };
    let p = &p[..=deg];
    match deg {
        0 => return Vec::new(),
        1 => return vec![-p[0] / p[1]],
        _ => (),
    }
    let dp = p
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * i as f64)
        .collect::<Vec<_>>();
    let bound = 1. + p[..deg].iter().map(|c| (c / p[deg]).abs()).fold(0., f64::max);
    let crit = real_roots(&dp)
        .into_iter()
        .filter(|x| x.abs() < bound)
        .collect::<Vec<_>>();
    let scale = p.iter().map(|c| c.abs()).fold(0., f64::max);
    let mut pts = vec![-bound];
    pts.extend(&crit);
    pts.push(bound);
    let mut roots = crit
        .into_iter()
        .filter(|&c| horner(p, c).abs() <= 1e-12 * scale)
        .collect::<Vec<_>>();
    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        if horner(p, a) * horner(p, b) < 0. {
            roots.push(bisect(p, a, b));
        }
    }
    roots.sort_unstable_by(f64::total_cmp);
    roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.abs().max(1.));
    roots
}

/// Satisfying assignment of the free unknowns.
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    values: BTreeMap<String, RealValue>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value.
    pub fn insert<S, V>(&mut self, name: S, value: V)
    where
        S: Into<String>,
        V: Into<RealValue>,
    {
        self.values.insert(name.into(), value.into());
    }

    /// Get a value by the unknown name.
    pub fn get(&self, name: &str) -> Option<&RealValue> {
        self.values.get(name)
    }

    /// Iterate the values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RealValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of the assigned unknowns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Floating point approximation of every value.
    pub fn to_f64_map(&self) -> Result<BTreeMap<String, f64>> {
        self.iter()
            .map(|(k, v)| match v.to_f64() {
                Some(x) => Ok((k.to_string(), x)),
                None => Err(Error::Protocol(format!("{k} has no real approximation"))),
            })
            .collect()
    }

    /// Check a quantifier-free formula against this model within `tol`.
    ///
    /// This is the round-trip check of a solver answer: the model of a
    /// formula must satisfy the same formula when evaluated numerically.
    pub fn verify(&self, f: &Formula, tol: f64) -> Result<bool> {
        f.holds(&self.to_f64_map()?, tol)
    }
}

impl<S: Into<String>> FromIterator<(S, RealValue)> for Model {
    fn from_iter<I: IntoIterator<Item = (S, RealValue)>>(iter: I) -> Self {
        let values = iter.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn value(s: &str) -> RealValue {
        RealValue::from_sexp(&Sexp::parse(s).unwrap()).unwrap()
    }

    #[test]
    fn rational_values() {
        let half = Real::new(1.into(), 2.into());
        assert_eq!(value("0.5"), RealValue::Rational(half.clone()));
        assert_eq!(value("(/ 1.0 2.0)"), RealValue::Rational(half.clone()));
        assert_eq!(value("(- (/ 1.0 2.0))"), RealValue::Rational(-half));
        assert!(RealValue::from_sexp(&Sexp::parse("(/ 1.0 0.0)").unwrap()).is_err());
    }

    #[test]
    fn algebraic_values() {
        let v = value("(root-obj (+ (^ x 2) (- 2)) 1)");
        let RealValue::Algebraic(a) = &v else {
            panic!("expect an algebraic number");
        };
        assert_eq!(a.degree(), 2);
        assert_eq!(a.to_string(), "root-obj(x^2 - 2, 1)");
        assert_abs_diff_eq!(v.to_f64().unwrap(), -std::f64::consts::SQRT_2, epsilon = 1e-12);
        let v = value("(root-obj (+ (^ x 2) (- 2)) 2)");
        assert_abs_diff_eq!(v.to_f64().unwrap(), std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert_eq!(value("(root-obj (+ (^ x 2) 1) 1)").to_f64(), None);
    }

    #[test]
    fn roots_with_multiplicity() {
        // (x - 1)^2 (x + 2) = x^3 - 3x + 2
        let roots = real_roots(&[2., -3., 0., 1.]);
        assert_eq!(roots.len(), 2);
        assert_abs_diff_eq!(roots[0], -2., epsilon = 1e-9);
        assert_abs_diff_eq!(roots[1], 1., epsilon = 1e-9);
    }
}
