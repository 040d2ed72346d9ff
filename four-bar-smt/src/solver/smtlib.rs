use super::*;
use crate::{expr::symbol_str, sexp::Sexp};
use easy_smt::{Context, ContextBuilder, Response, SExpr, SExprData};
use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Instant,
};

// Interval of the cancellation polls
const POLL: Duration = Duration::from_millis(20);

/// Decision procedure talking SMT-LIB v2 to a solver process.
///
/// Each query spawns a fresh process, so the unknown names of different
/// queries never meet in one solver context.
///
/// ```no_run
/// use four_bar_smt::*;
///
/// let targets = [[0., 1.], [1., 0.], [0., -1.], [-1., 0.]];
/// let f = build_linkage_formula(&Topology::standard(), &targets, TargetMode::Distance)?;
/// let mut solver = SmtSolver::new(SolverCfg::new().timeout_ms(10_000));
/// let model = synthesize(&mut solver, &f)?;
/// print!("{}", model.render(&RenderCfg::decimal(6)));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct SmtSolver {
    cfg: SolverCfg,
    cancel: CancelFlag,
}

impl SmtSolver {
    /// Create a new solver with the configuration.
    pub fn new(cfg: SolverCfg) -> Self {
        Self { cfg, cancel: CancelFlag::new() }
    }

    /// Share a cancellation flag with this solver.
    ///
    /// A check started after the flag is raised spawns no process. A check in
    /// progress returns [`Outcome::Cancelled`] within a few milliseconds of
    /// the flag being raised, whatever the solver answers. The abandoned
    /// process is killed once it answers or hits its time limit.
    pub fn with_cancel(self, cancel: CancelFlag) -> Self {
        Self { cancel, ..self }
    }

    /// The configuration.
    pub fn cfg(&self) -> &SolverCfg {
        &self.cfg
    }
}

fn lower(ctx: &Context, s: &Sexp) -> SExpr {
    match s {
        Sexp::Atom(a) => ctx.atom(a.as_str()),
        Sexp::List(v) => ctx.list(v.iter().map(|s| lower(ctx, s)).collect()),
    }
}

fn lift(ctx: &Context, e: SExpr) -> Sexp {
    match ctx.get(e) {
        SExprData::Atom(a) | SExprData::String(a) => Sexp::atom(a),
        SExprData::List(v) => Sexp::List(v.iter().map(|e| lift(ctx, *e)).collect()),
    }
}

// Text of a `(:reason-unknown <reason>)` answer
fn reason_text(info: &Sexp) -> String {
    let reason = match info.as_list() {
        Some([key, reason]) if key.as_atom() == Some(":reason-unknown") => reason,
        _ => info,
    };
    match reason {
        Sexp::Atom(a) => a.trim_matches('"').to_string(),
        s => s.to_string(),
    }
}

// The solver gave up, decide whether it ran out of time
fn undecided(reason: String, limit: Option<Duration>, elapsed: Duration) -> Outcome {
    let Some(limit) = limit else {
        return Outcome::Unknown(reason);
    };
    if reason.contains("timeout") || reason.contains("canceled") || elapsed >= limit {
        Outcome::Timeout(limit)
    } else {
        Outcome::Unknown(reason)
    }
}

// One solver session, from spawning the process to reading the model
fn session(cfg: &SolverCfg, query: &Formula) -> Result<Outcome> {
    let mut ctx = ContextBuilder::new()
        .solver(cfg.program.clone(), cfg.args.clone())
        .build()?;
    ctx.set_option(":produce-models", ctx.atom("true"))?;
    for (key, value) in &cfg.options {
        ctx.set_option(key.as_str(), ctx.atom(value.as_str()))?;
    }
    if let Some(ms) = cfg.timeout_ms {
        ctx.set_option(":timeout", ctx.atom(ms.to_string()))?;
    }
    let names = query.free_vars().into_iter().collect::<Vec<_>>();
    let mut consts = Vec::with_capacity(names.len());
    for name in &names {
        consts.push(ctx.declare_const(symbol_str(name), ctx.atom("Real"))?);
    }
    ctx.assert(lower(&ctx, &query.to_sexp()))?;
    tracing::info!(program = %cfg.program, unknowns = names.len(), "checking query");
    let start = Instant::now();
    let resp = ctx.check()?;
    let elapsed = start.elapsed();
    let outcome = match resp {
        Response::Sat => {
            let mut model = Model::new();
            if !consts.is_empty() {
                let values = ctx.get_value(consts)?;
                if values.len() != names.len() {
                    let msg = format!("expect {} values, got {}", names.len(), values.len());
                    return Err(Error::Protocol(msg));
                }
                for (name, (_, v)) in names.into_iter().zip(values) {
                    model.insert(name, RealValue::from_sexp(&lift(&ctx, v))?);
                }
            }
            Outcome::Sat(model)
        }
        Response::Unsat => Outcome::Unsat,
        Response::Unknown => {
            let cmd = ctx.list(vec![ctx.atom("get-info"), ctx.atom(":reason-unknown")]);
            ctx.raw_send(cmd)?;
            let info = ctx.raw_recv()?;
            let reason = reason_text(&lift(&ctx, info));
            undecided(reason, cfg.timeout(), elapsed)
        }
    };
    tracing::debug!(?elapsed, "solver answered");
    Ok(outcome)
}

impl DecisionProcedure for SmtSolver {
    fn check(&mut self, query: &Formula) -> Result<Outcome> {
        if self.cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        query.check_names()?;
        let (tx, rx) = mpsc::channel();
        let (cfg, query) = (self.cfg.clone(), query.clone());
        // The context is dropped with the worker, which kills the process
        thread::Builder::new()
            .name("smt-session".to_string())
            .spawn(move || {
                let _ = tx.send(session(&cfg, &query));
            })?;
        let outcome = loop {
            match rx.recv_timeout(POLL) {
                Ok(_) if self.cancel.is_cancelled() => break Outcome::Cancelled,
                Ok(res) => break res?,
                Err(RecvTimeoutError::Timeout) if self.cancel.is_cancelled() => {
                    tracing::info!("solver call cancelled");
                    break Outcome::Cancelled;
                }
                Err(RecvTimeoutError::Timeout) => (),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Protocol("solver session ended without an answer".into()));
                }
            }
        };
        let verdict = match &outcome {
            Outcome::Sat(_) => "sat",
            Outcome::Unsat => "unsat",
            Outcome::Unknown(_) => "unknown",
            Outcome::Timeout(_) => "timeout",
            Outcome::Cancelled => "cancelled",
        };
        tracing::debug!(verdict, "query checked");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_of_unknown() {
        let info = r#"(:reason-unknown "(incomplete (theory arithmetic))")"#;
        let info = Sexp::parse(info).unwrap();
        assert_eq!(reason_text(&info), "(incomplete (theory arithmetic))");
        let info = Sexp::parse("(:reason-unknown timeout)").unwrap();
        assert_eq!(reason_text(&info), "timeout");
        assert_eq!(reason_text(&Sexp::atom("unsupported")), "unsupported");
    }

    #[test]
    fn timeout_or_unknown() {
        let limit = Some(Duration::from_millis(100));
        let short = Duration::from_millis(5);
        assert_eq!(
            undecided("timeout".to_string(), limit, short),
            Outcome::Timeout(Duration::from_millis(100))
        );
        assert_eq!(
            undecided("incomplete".to_string(), limit, short),
            Outcome::Unknown("incomplete".to_string())
        );
        // Elapsed time is the fallback
        assert!(matches!(
            undecided("incomplete".to_string(), limit, Duration::from_secs(1)),
            Outcome::Timeout(_)
        ));
        assert_eq!(
            undecided("timeout".to_string(), None, short),
            Outcome::Unknown("timeout".to_string())
        );
    }
}
