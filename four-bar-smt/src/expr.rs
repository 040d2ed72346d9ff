//! Formula tree over real-valued unknowns.
//!
//! Terms and formulas are plain values. They can be combined with the usual
//! operators, and lowered into SMT-LIB text by [`Formula::to_sexp()`].
//!
//! ```
//! use four_bar_smt::{Formula, Term};
//!
//! let x = Term::var("x");
//! let y = Term::var("y");
//! let f = (x.square() + y.square()).equals(Term::int(1)) & x.lt(Term::int(0));
//! assert_eq!(f.conjuncts().len(), 2);
//! assert_eq!(
//!     f.to_string(),
//!     "(and (= (+ (* x x) (* y y)) 1.0) (< x 0.0))"
//! );
//! ```
use crate::{sexp::Sexp, Error, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed as _, ToPrimitive as _, Zero as _};
use std::collections::{BTreeMap, BTreeSet};

/// Exact real number type of the constants.
pub type Real = BigRational;

/// Parse a plain decimal literal (`-12.5`, `3`, `.25`) into an exact value.
pub fn decimal(s: &str) -> Option<Real> {
    let (neg, s) = match s.strip_prefix('-') {
        Some(s) => (true, s),
        None => (false, s),
    };
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{int}{frac}");
    let numer = BigInt::parse_bytes(digits.as_bytes(), 10)?;
    let denom = num_traits::pow(BigInt::from(10), frac.len());
    let r = Real::new(numer, denom);
    Some(if neg { -r } else { r })
}

/// Convert a float by its shortest decimal representation, so `0.01` becomes
/// exactly `1/100`.
///
/// Return none if the value is not finite.
pub fn exact(x: f64) -> Option<Real> {
    if x.is_finite() {
        decimal(&x.to_string())
    } else {
        None
    }
}

pub(crate) fn real_to_f64(r: &Real) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

/// Real-valued term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// Unknown or bound variable
    Var(String),
    /// Exact constant
    Const(Real),
    /// Addition
    Add(Box<Term>, Box<Term>),
    /// Subtraction
    Sub(Box<Term>, Box<Term>),
    /// Multiplication
    Mul(Box<Term>, Box<Term>),
    /// Negation
    Neg(Box<Term>),
}

impl Term {
    /// Create a variable.
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Var(name.into())
    }

    /// Create a constant.
    pub fn constant(r: Real) -> Self {
        Self::Const(r)
    }

    /// Create an integer constant.
    pub fn int(n: i64) -> Self {
        Self::Const(Real::from_integer(n.into()))
    }

    /// Create a constant from a float, see [`exact()`].
    pub fn from_f64(x: f64) -> Option<Self> {
        exact(x).map(Self::Const)
    }

    /// Return `self * self`.
    pub fn square(&self) -> Self {
        self * self
    }

    /// Formula `self = rhs`.
    pub fn equals(self, rhs: Self) -> Formula {
        Formula::Cmp(Cmp::Eq, self, rhs)
    }

    /// Formula `self < rhs`.
    pub fn lt(self, rhs: Self) -> Formula {
        Formula::Cmp(Cmp::Lt, self, rhs)
    }

    /// Formula `self <= rhs`.
    pub fn le(self, rhs: Self) -> Formula {
        Formula::Cmp(Cmp::Le, self, rhs)
    }

    /// Formula `self > rhs`.
    pub fn gt(self, rhs: Self) -> Formula {
        Formula::Cmp(Cmp::Gt, self, rhs)
    }

    /// Formula `self >= rhs`.
    pub fn ge(self, rhs: Self) -> Formula {
        Formula::Cmp(Cmp::Ge, self, rhs)
    }

    /// Replace every occurrence of variable `var` with `to`.
    pub fn subst(&self, var: &str, to: &Self) -> Self {
        match self {
            Self::Var(v) if v == var => to.clone(),
            Self::Var(_) | Self::Const(_) => self.clone(),
            Self::Add(a, b) => a.subst(var, to) + b.subst(var, to),
            Self::Sub(a, b) => a.subst(var, to) - b.subst(var, to),
            Self::Mul(a, b) => a.subst(var, to) * b.subst(var, to),
            Self::Neg(a) => -a.subst(var, to),
        }
    }

    /// Variables in this term.
    pub fn vars(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_vars(&mut set);
        set
    }

    fn collect_vars(&self, set: &mut BTreeSet<String>) {
        match self {
            Self::Var(v) => {
                set.insert(v.clone());
            }
            Self::Const(_) => (),
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) => {
                a.collect_vars(set);
                b.collect_vars(set);
            }
            Self::Neg(a) => a.collect_vars(set),
        }
    }

    /// Evaluate numerically with the values of `env`.
    pub fn eval(&self, env: &BTreeMap<String, f64>) -> Result<f64> {
        Ok(match self {
            Self::Var(v) => *env.get(v).ok_or_else(|| Error::Unbound(v.clone()))?,
            Self::Const(r) => real_to_f64(r),
            Self::Add(a, b) => a.eval(env)? + b.eval(env)?,
            Self::Sub(a, b) => a.eval(env)? - b.eval(env)?,
            Self::Mul(a, b) => a.eval(env)? * b.eval(env)?,
            Self::Neg(a) => -a.eval(env)?,
        })
    }

    /// Lower into an SMT-LIB term.
    pub fn to_sexp(&self) -> Sexp {
        let bin = |op, a: &Self, b: &Self| Sexp::app(op, [a.to_sexp(), b.to_sexp()]);
        match self {
            Self::Var(v) => symbol(v),
            Self::Const(r) => real_sexp(r),
            Self::Add(a, b) => bin("+", a, b),
            Self::Sub(a, b) => bin("-", a, b),
            Self::Mul(a, b) => bin("*", a, b),
            Self::Neg(a) => Sexp::app("-", [a.to_sexp()]),
        }
    }
}

impl From<Real> for Term {
    fn from(r: Real) -> Self {
        Self::Const(r)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.to_sexp().fmt(f)
    }
}

macro_rules! impl_bin_ops {
    ($(($op:ident, $method:ident, $variant:ident)),+ $(,)?) => {$(
        impl std::ops::$op for Term {
            type Output = Term;
            fn $method(self, rhs: Term) -> Term {
                Term::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl std::ops::$op<&Term> for Term {
            type Output = Term;
            fn $method(self, rhs: &Term) -> Term {
                Term::$variant(Box::new(self), Box::new(rhs.clone()))
            }
        }

        impl std::ops::$op<Term> for &Term {
            type Output = Term;
            fn $method(self, rhs: Term) -> Term {
                Term::$variant(Box::new(self.clone()), Box::new(rhs))
            }
        }

        impl std::ops::$op<&Term> for &Term {
            type Output = Term;
            fn $method(self, rhs: &Term) -> Term {
                Term::$variant(Box::new(self.clone()), Box::new(rhs.clone()))
            }
        }
    )+};
}

impl_bin_ops!((Add, add, Add), (Sub, sub, Sub), (Mul, mul, Mul));

impl std::ops::Neg for Term {
    type Output = Term;
    fn neg(self) -> Term {
        Term::Neg(Box::new(self))
    }
}

impl std::ops::Neg for &Term {
    type Output = Term;
    fn neg(self) -> Term {
        Term::Neg(Box::new(self.clone()))
    }
}

/// Comparison operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cmp {
    /// `=`
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Cmp {
    /// SMT-LIB symbol of the operator.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Boolean formula over real terms, with quantifiers over real variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Constant truth value
    Bool(bool),
    /// Comparison of two terms
    Cmp(Cmp, Term, Term),
    /// Negation
    Not(Box<Formula>),
    /// Conjunction (`true` if empty)
    And(Vec<Formula>),
    /// Disjunction (`false` if empty)
    Or(Vec<Formula>),
    /// Implication
    Implies(Box<Formula>, Box<Formula>),
    /// Universal quantifier over a real variable
    Forall(String, Box<Formula>),
    /// Existential quantifier over a real variable
    Exists(String, Box<Formula>),
}

impl Formula {
    /// Conjunction of formulas, nested conjunctions are flattened.
    pub fn and<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut v = Vec::new();
        for f in iter {
            match f {
                Self::And(inner) => v.extend(inner),
                f => v.push(f),
            }
        }
        Self::And(v)
    }

    /// Disjunction of formulas, nested disjunctions are flattened.
    pub fn or<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut v = Vec::new();
        for f in iter {
            match f {
                Self::Or(inner) => v.extend(inner),
                f => v.push(f),
            }
        }
        Self::Or(v)
    }

    /// Formula `self => rhs`.
    pub fn implies(self, rhs: Self) -> Self {
        Self::Implies(Box::new(self), Box::new(rhs))
    }

    /// Bind `var` universally.
    pub fn forall<S: Into<String>>(var: S, body: Self) -> Self {
        Self::Forall(var.into(), Box::new(body))
    }

    /// Bind `var` existentially.
    pub fn exists<S: Into<String>>(var: S, body: Self) -> Self {
        Self::Exists(var.into(), Box::new(body))
    }

    /// Top-level conjuncts. A formula that is not a conjunction is its own
    /// single conjunct.
    pub fn conjuncts(&self) -> &[Self] {
        match self {
            Self::And(v) => v,
            f => std::slice::from_ref(f),
        }
    }

    /// Return true if the formula contains no quantifier.
    pub fn is_quantifier_free(&self) -> bool {
        match self {
            Self::Bool(_) | Self::Cmp(..) => true,
            Self::Not(f) => f.is_quantifier_free(),
            Self::And(v) | Self::Or(v) => v.iter().all(Self::is_quantifier_free),
            Self::Implies(a, b) => a.is_quantifier_free() && b.is_quantifier_free(),
            Self::Forall(..) | Self::Exists(..) => false,
        }
    }

    /// Unbound variables, the unknowns of this formula, in sorted order.
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut set);
        set
    }

    fn collect_free(&self, bound: &mut Vec<String>, set: &mut BTreeSet<String>) {
        match self {
            Self::Bool(_) => (),
            Self::Cmp(_, a, b) => {
                let vars = a.vars().into_iter().chain(b.vars());
                set.extend(vars.filter(|v| !bound.contains(v)));
            }
            Self::Not(f) => f.collect_free(bound, set),
            Self::And(v) | Self::Or(v) => v.iter().for_each(|f| f.collect_free(bound, set)),
            Self::Implies(a, b) => {
                a.collect_free(bound, set);
                b.collect_free(bound, set);
            }
            Self::Forall(var, f) | Self::Exists(var, f) => {
                bound.push(var.clone());
                f.collect_free(bound, set);
                bound.pop();
            }
        }
    }

    /// Check that every variable name, bound ones included, is a valid
    /// symbol. See [`is_valid_name()`].
    pub fn check_names(&self) -> Result<()> {
        match self {
            Self::Bool(_) => Ok(()),
            Self::Cmp(_, a, b) => {
                let mut vars = a.vars().into_iter().chain(b.vars());
                vars.try_for_each(|v| check_name(&v))
            }
            Self::Not(f) => f.check_names(),
            Self::And(v) | Self::Or(v) => v.iter().try_for_each(Self::check_names),
            Self::Implies(a, b) => {
                a.check_names()?;
                b.check_names()
            }
            Self::Forall(var, f) | Self::Exists(var, f) => {
                check_name(var)?;
                f.check_names()
            }
        }
    }

    /// Check the formula numerically with the values of `env`.
    ///
    /// Comparisons are relaxed by `tol`, so exact witnesses that went through
    /// floating point still pass. Quantified formulas cannot be checked.
    pub fn holds(&self, env: &BTreeMap<String, f64>, tol: f64) -> Result<bool> {
        Ok(match self {
            Self::Bool(b) => *b,
            Self::Cmp(op, a, b) => {
                let d = a.eval(env)? - b.eval(env)?;
                match op {
                    Cmp::Eq => d.abs() <= tol,
                    Cmp::Lt => d < tol,
                    Cmp::Le => d <= tol,
                    Cmp::Gt => d > -tol,
                    Cmp::Ge => d >= -tol,
                }
            }
            Self::Not(f) => !f.holds(env, tol)?,
            Self::And(v) => {
                for f in v {
                    if !f.holds(env, tol)? {
                        return Ok(false);
                    }
                }
                true
            }
            Self::Or(v) => {
                for f in v {
                    if f.holds(env, tol)? {
                        return Ok(true);
                    }
                }
                false
            }
            Self::Implies(a, b) => !a.holds(env, tol)? || b.holds(env, tol)?,
            Self::Forall(..) | Self::Exists(..) => return Err(Error::Quantified),
        })
    }

    /// Lower into an SMT-LIB term.
    pub fn to_sexp(&self) -> Sexp {
        let quant = |q, var: &str, f: &Self| {
            let binder = Sexp::List(vec![Sexp::List(vec![symbol(var), Sexp::atom("Real")])]);
            Sexp::app(q, [binder, f.to_sexp()])
        };
        match self {
            Self::Bool(b) => Sexp::atom(b.to_string()),
            Self::Cmp(op, a, b) => Sexp::app(op.symbol(), [a.to_sexp(), b.to_sexp()]),
            Self::Not(f) => Sexp::app("not", [f.to_sexp()]),
            Self::And(v) => match v.as_slice() {
                [] => Sexp::atom("true"),
                [f] => f.to_sexp(),
                v => Sexp::app("and", v.iter().map(Self::to_sexp)),
            },
            Self::Or(v) => match v.as_slice() {
                [] => Sexp::atom("false"),
                [f] => f.to_sexp(),
                v => Sexp::app("or", v.iter().map(Self::to_sexp)),
            },
            Self::Implies(a, b) => Sexp::app("=>", [a.to_sexp(), b.to_sexp()]),
            Self::Forall(var, f) => quant("forall", var, f),
            Self::Exists(var, f) => quant("exists", var, f),
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.to_sexp().fmt(f)
    }
}

impl std::ops::BitAnd for Formula {
    type Output = Formula;
    fn bitand(self, rhs: Formula) -> Formula {
        Formula::and([self, rhs])
    }
}

impl std::ops::BitOr for Formula {
    type Output = Formula;
    fn bitor(self, rhs: Formula) -> Formula {
        Formula::or([self, rhs])
    }
}

impl std::ops::Not for Formula {
    type Output = Formula;
    fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }
}

const RESERVED: [&str; 13] = [
    "!",
    "_",
    "as",
    "BINARY",
    "DECIMAL",
    "exists",
    "forall",
    "HEXADECIMAL",
    "let",
    "match",
    "NUMERAL",
    "par",
    "STRING",
];

fn is_simple_symbol(s: &str) -> bool {
    const EXTRA: &str = "~!@$%^&*_-+=<>.?/";
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && !RESERVED.contains(&s)
        && s.chars().all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c))
}

/// Return true if `name` can be written as an SMT-LIB symbol.
///
/// Names are quoted with `|...|` when needed, so only the empty name and
/// names containing `|` or `\` are rejected.
///
/// ```
/// use four_bar_smt::{is_valid_name, Term};
///
/// assert!(is_valid_name("exists"));
/// assert_eq!(Term::var("exists").to_string(), "|exists|");
/// assert!(!is_valid_name("a|b"));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['|', '\\'])
}

pub(crate) fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

// SMT-LIB symbol of a variable name, quoted if needed
pub(crate) fn symbol_str(name: &str) -> String {
    if is_simple_symbol(name) {
        name.to_string()
    } else {
        format!("|{name}|")
    }
}

fn symbol(name: &str) -> Sexp {
    Sexp::atom(symbol_str(name))
}

fn real_sexp(r: &Real) -> Sexp {
    let num = |n: &BigInt| Sexp::atom(format!("{n}.0"));
    let mag = if r.is_integer() {
        num(&r.numer().abs())
    } else {
        Sexp::app("/", [num(&r.numer().abs()), num(r.denom())])
    };
    if r.is_negative() && !r.is_zero() {
        Sexp::app("-", [mag])
    } else {
        mag
    }
}
