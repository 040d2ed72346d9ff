use std::time::Duration;

/// Error type of the formula builders and the decision procedure boundary.
///
/// Builder errors are raised before any formula leaves the crate. Solver
/// errors come from [`Outcome::into_model()`](crate::Outcome::into_model) and
/// are kept apart from each other, an undecided query is never reported as an
/// unsatisfiable one.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required unknown is missing from the topology
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
    /// Variable name that cannot be written as an SMT-LIB symbol
    #[error("invalid variable name: {0:?}")]
    InvalidName(String),
    /// Tolerance must be positive
    #[error("invalid tolerance: {0} (must be positive)")]
    InvalidTolerance(f64),
    /// Grashof slack must be positive
    #[error("invalid slack: {0} (must be positive)")]
    InvalidSlack(f64),
    /// Parameter interval with `lo > hi` or non-finite bounds
    #[error("invalid interval: [{lo}, {hi}]")]
    InvalidInterval {
        /// Lower bound
        lo: f64,
        /// Upper bound
        hi: f64,
    },
    /// Target point with a non-finite coordinate
    #[error("invalid target point at index {0}")]
    InvalidTarget(usize),
    /// Per-target constraints are required but no target is given
    #[error("per-target constraints are required but the target set is empty")]
    EmptyTargetSet,
    /// The decision procedure could not decide the query
    #[error("solver returned unknown: {0}")]
    SolverUnknown(String),
    /// The query has no solution
    #[error("solver proved the query unsatisfiable")]
    SolverUnsatisfiable,
    /// The query was interrupted by the caller's time limit
    #[error("solver timed out after {0:?}")]
    SolverTimeout(Duration),
    /// The query was cancelled by the caller
    #[error("solver call was cancelled")]
    SolverCancelled,
    /// Numeric evaluation met a variable without a value
    #[error("unbound variable: {0}")]
    Unbound(String),
    /// Numeric evaluation met a quantifier
    #[error("cannot evaluate a quantified formula numerically")]
    Quantified,
    /// Malformed response of the decision procedure
    #[error("protocol error: {0}")]
    Protocol(String),
    /// Failed to talk to the decision procedure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type with the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
