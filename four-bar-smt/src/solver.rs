//! Boundary to the external real-arithmetic decision procedure.
//!
//! The procedure is a black box behind [`DecisionProcedure`]. It receives a
//! whole formula per query and answers with an [`Outcome`]. This module never
//! retries a query, and never turns an undecided answer into a verdict.
#[cfg(feature = "smtlib")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "smtlib")))]
pub use self::smtlib::SmtSolver;
use crate::*;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

#[cfg(feature = "smtlib")]
mod smtlib;

/// Answer of the decision procedure.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Satisfiable, with a value for every free unknown
    Sat(Model),
    /// Proved unsatisfiable
    Unsat,
    /// Undecided within the resource bounds, with the reason
    Unknown(String),
    /// Interrupted by the configured time limit
    Timeout(Duration),
    /// Interrupted by the caller
    Cancelled,
}

impl Outcome {
    /// Return true if satisfiable.
    pub fn is_sat(&self) -> bool {
        matches!(self, Self::Sat(_))
    }

    /// Return true if proved unsatisfiable.
    pub fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }

    /// Take the model, or turn the outcome into its error.
    pub fn into_model(self) -> Result<Model> {
        match self {
            Self::Sat(model) => Ok(model),
            Self::Unsat => Err(Error::SolverUnsatisfiable),
            Self::Unknown(reason) => Err(Error::SolverUnknown(reason)),
            Self::Timeout(t) => Err(Error::SolverTimeout(t)),
            Self::Cancelled => Err(Error::SolverCancelled),
        }
    }
}

/// A satisfiability checker of quantified nonlinear real formulas.
pub trait DecisionProcedure {
    /// Check one query. The free variables of the query are its unknowns.
    ///
    /// Errors are reserved for failures of the procedure itself, all answers
    /// are reported by the [`Outcome`].
    fn check(&mut self, query: &Formula) -> Result<Outcome>;
}

impl<P: DecisionProcedure + ?Sized> DecisionProcedure for Box<P> {
    fn check(&mut self, query: &Formula) -> Result<Outcome> {
        (**self).check(query)
    }
}

/// Check a query and return its model.
pub fn synthesize<P>(procedure: &mut P, query: &Formula) -> Result<Model>
where
    P: DecisionProcedure + ?Sized,
{
    procedure.check(query)?.into_model()
}

/// Shared flag to cancel solver calls from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a new flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return true if the flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Solver process configuration.
///
/// Everything here is passed to the solver as-is.
///
/// ```
/// use four_bar_smt::SolverCfg;
///
/// let cfg = SolverCfg::new().timeout_ms(500).option(":auto_config", "true");
/// assert_eq!(cfg.program, "z3");
/// assert_eq!(cfg.timeout().unwrap().as_millis(), 500);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverCfg {
    /// Solver executable
    pub program: String,
    /// Arguments of the executable, the solver must read SMT-LIB from stdin
    pub args: Vec<String>,
    /// Time limit of each check in milliseconds
    pub timeout_ms: Option<u64>,
    /// `set-option` pairs, e.g. `(":auto_config", "true")`
    pub options: Vec<(String, String)>,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self {
            program: "z3".to_string(),
            args: vec!["-smt2".to_string(), "-in".to_string()],
            timeout_ms: None,
            options: Vec::new(),
        }
    }
}

impl SolverCfg {
    /// Create the default configuration, Z3 over stdin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration from RON text.
    #[cfg(feature = "serde")]
    #[cfg_attr(doc_cfg, doc(cfg(feature = "serde")))]
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Set the solver executable and its arguments.
    pub fn program<S, I>(self, program: S, args: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        Self { program: program.into(), args, ..self }
    }

    /// Set the time limit in milliseconds.
    pub fn timeout_ms(self, ms: u64) -> Self {
        Self { timeout_ms: Some(ms), ..self }
    }

    /// Append a `set-option` pair.
    pub fn option<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.options.push((key.into(), value.into()));
        self
    }

    /// The time limit.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
