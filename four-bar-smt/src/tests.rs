use crate::*;
use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const UNIT_CIRCLE: [[f64; 2]; 4] = [[0., 1.], [1., 0.], [0., -1.], [-1., 0.]];

fn pose_vars(n: usize) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    for i in 0..n {
        for joint in ["C", "D", "E"] {
            set.insert(joint_var(joint, Axis::X, i));
            set.insert(joint_var(joint, Axis::Y, i));
        }
    }
    set
}

fn env<const N: usize>(values: [(&str, f64); N]) -> BTreeMap<String, f64> {
    values.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn int(n: i64) -> RealValue {
    RealValue::Rational(Real::from_integer(n.into()))
}

#[test]
fn unit_circle_scenario() {
    let f = build_linkage_formula(&Topology::standard(), &UNIT_CIRCLE, TargetMode::Distance)
        .unwrap();
    // 1 ground link + 6 Grashof + 3 per target
    assert_eq!(f.conjuncts().len(), 19);
    assert!(f.is_quantifier_free());
    assert_eq!(
        f.conjuncts()[0].to_string(),
        "(= (+ (* (- b_x a_x) (- b_x a_x)) (* (- b_y a_y) (- b_y a_y))) (* AB AB))"
    );
    assert_eq!(
        f.conjuncts()[4].to_string(),
        "(>= (+ CD BD) (+ (+ AC AB) (/ 1.0 100.0)))"
    );
    // Distance mode never mentions the targets
    assert_eq!(
        build_linkage_formula(&Topology::standard(), &[[5., 5.]; 4], TargetMode::Distance).unwrap(),
        f
    );
}

#[test]
fn interpolate_pins_traced_joint() {
    let topo = Topology::standard();
    let f = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Interpolate).unwrap();
    assert_eq!(f.conjuncts().len(), 7 + 5 * UNIT_CIRCLE.len());
    let text = f.to_string();
    assert!(text.contains("(= E_x_1 1.0)"));
    assert!(text.contains("(= E_y_2 (- 1.0))"));
}

#[test]
fn empty_target_set() {
    let syn = LinkageSyn::new(Topology::standard(), TargetMode::Interpolate);
    assert_eq!(syn.build(&[]).unwrap().conjuncts().len(), 7);
    let syn = syn.require_targets();
    assert!(matches!(syn.build(&[]), Err(Error::EmptyTargetSet)));
    assert_eq!(syn.build(&UNIT_CIRCLE[..1]).unwrap().conjuncts().len(), 12);
}

#[test]
fn invalid_topology() {
    let cases = [
        Topology::standard().without(Role::CE),
        Topology::standard().with(Role::BY, ""),
        Topology::standard().with(Role::AB, "AC"),
        Topology::standard().with(Role::AX, "C_x_0"),
        Topology::new(),
    ];
    for topo in cases {
        let res = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Distance);
        assert!(matches!(res, Err(Error::InvalidTopology(_))), "{topo:?}");
    }
    // Custom names are fine, `C_x` alone is not a pose unknown
    let topo = Topology::standard()
        .with(Role::AX, "C_x")
        .with(Role::AB, "ground");
    let f = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Distance).unwrap();
    assert!(f.free_vars().contains("ground"));
    assert!(!f.free_vars().contains("AB"));
}

#[test]
fn invalid_targets_and_slack() {
    let syn = LinkageSyn::new(Topology::standard(), TargetMode::Distance);
    let res = syn.build(&[[0., 1.], [f64::NAN, 0.]]);
    assert!(matches!(res, Err(Error::InvalidTarget(1))));
    let res = syn.build(&[[f64::INFINITY, 0.]]);
    assert!(matches!(res, Err(Error::InvalidTarget(0))));
    for slack in [0., -0.5, f64::NAN, f64::INFINITY] {
        let syn = LinkageSyn::new(Topology::standard(), TargetMode::Distance).slack(slack);
        assert!(matches!(syn.build(&UNIT_CIRCLE), Err(Error::InvalidSlack(_))));
    }
}

#[test]
fn build_options() {
    let f = LinkageSyn::new(Topology::standard(), TargetMode::Distance)
        .nonneg_links()
        .linearity(|_, pose: &Pose| collinear(&pose.c, &pose.d, &pose.e))
        .build(&UNIT_CIRCLE)
        .unwrap();
    assert_eq!(f.conjuncts().len(), 19 + 5 + UNIT_CIRCLE.len());
    assert!(f.free_vars().contains("CE"));
    assert!(f.conjuncts().contains(&Term::var("CE").ge(Term::int(0))));
    assert!(f.conjuncts().contains(&collinear(
        &Coord::indexed("C", 3),
        &Coord::indexed("D", 3),
        &Coord::indexed("E", 3)
    )));
    let f = LinkageSyn::new(Topology::standard(), TargetMode::Distance)
        .slack(0.5)
        .build(&[])
        .unwrap();
    assert!(f.to_string().contains("(/ 1.0 2.0)"));
}

#[test]
fn idempotent_build() {
    let topo = Topology::standard();
    let a = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Interpolate).unwrap();
    let b = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Interpolate).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
    let t = Term::var("t");
    let curve = ParamCurve::new("t", t.clone(), t.square());
    let a = build_curve_match_formula(&curve, &curve, 0.1, &Interval::UNIT, MatchMode::Guarded);
    let b = build_curve_match_formula(&curve, &curve, 0.1, &Interval::UNIT, MatchMode::Guarded);
    assert_eq!(a.unwrap().to_string(), b.unwrap().to_string());
}

#[test]
fn round_trip_handmade_model() {
    // A = (0, 0), B = (3, 0), AC = 1, AB = BD = CD = 3
    let mut model = [
        ("a_x", 0),
        ("a_y", 0),
        ("b_x", 3),
        ("b_y", 0),
        ("AB", 3),
        ("AC", 1),
        ("BD", 3),
        ("CD", 3),
        ("CE", 0),
    ]
    .into_iter()
    .map(|(k, v)| (k, int(v)))
    .collect::<Model>();
    for i in 0..UNIT_CIRCLE.len() {
        for (joint, [x, y]) in [("C", [1, 0]), ("D", [3, 3]), ("E", [4, 0])] {
            model.insert(joint_var(joint, Axis::X, i), int(x));
            model.insert(joint_var(joint, Axis::Y, i), int(y));
        }
    }
    let f = build_linkage_formula(&Topology::standard(), &UNIT_CIRCLE, TargetMode::Distance)
        .unwrap();
    assert!(model.verify(&f, 1e-9).unwrap());
    model.insert("AB", int(2));
    assert!(!model.verify(&f, 1e-9).unwrap());
    // Unassigned unknowns are reported
    let partial = Model::from_iter([("AB", int(3))]);
    assert!(matches!(partial.verify(&f, 1e-9), Err(Error::Unbound(_))));
}

#[test]
fn verify_algebraic_witness() {
    let sqrt2 = RealValue::from_sexp(&sexp::Sexp::parse("(root-obj (+ (^ x 2) (- 2)) 2)").unwrap())
        .unwrap();
    let model = Model::from_iter([("x", sqrt2)]);
    let x = Term::var("x");
    let f = x.square().equals(Term::int(2)) & x.gt(Term::int(0));
    assert!(model.verify(&f, 1e-9).unwrap());
    assert_abs_diff_eq!(model.to_f64_map().unwrap()["x"], 2f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn render_model() {
    let third = RealValue::Rational(Real::new(1.into(), 3.into()));
    let sqrt2 = RealValue::Algebraic(AlgebraicNumber::new(
        vec![
            Real::from_integer((-2).into()),
            Real::from_integer(0.into()),
            Real::from_integer(1.into()),
        ],
        2,
    ));
    let model = Model::from_iter([("x", third), ("y", sqrt2)]);
    assert_eq!(model.render(&RenderCfg::exact()), "x -> 1/3\ny -> root-obj(x^2 - 2, 2)\n");
    assert_eq!(model.render(&RenderCfg::decimal(4)), "x -> 0.3333?\ny -> 1.4142?\n");
}

#[test]
fn curve_match_shape() {
    let t = Term::var("t");
    let a = ParamCurve::new("t", t.clone(), Term::int(0));
    let b = ParamCurve::new("t", t.clone() + Term::from_f64(0.5).unwrap(), Term::int(0));
    let guarded =
        build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, MatchMode::Guarded).unwrap();
    assert!(guarded.free_vars().is_empty());
    assert!(matches!(&guarded, Formula::Forall(v, _) if v == "t"));
    assert_eq!(
        guarded.to_string(),
        "(forall ((t Real)) (=> (and (<= 0.0 t) (<= t 1.0)) (exists ((t2 Real)) \
         (and (<= 0.0 t2) (<= t2 1.0) (< (+ (* (- t (+ t2 (/ 1.0 2.0))) (- t (+ t2 (/ 1.0 2.0)))) \
         (* (- 0.0 0.0) (- 0.0 0.0))) (* (/ 1.0 10.0) (/ 1.0 10.0)))))))"
    );
    let mode = MatchMode::Unguarded { inner_range: false };
    let unguarded = build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, mode).unwrap();
    assert_ne!(guarded.to_string(), unguarded.to_string());
    // The outer range is asserted on a free `t`
    assert_eq!(unguarded.free_vars().into_iter().collect::<Vec<_>>(), ["t"]);
    assert_eq!(unguarded.conjuncts().len(), 3);
    assert!(matches!(&unguarded.conjuncts()[2], Formula::Forall(..)));
    let mode = MatchMode::Unguarded { inner_range: true };
    let inner = build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, mode).unwrap();
    assert!(inner.to_string().contains("(<= t2 1.0)"));
    assert!(!unguarded.to_string().contains("(<= t2 1.0)"));
}

#[test]
fn curve_match_renames_bound_vars() {
    let s = Term::var("s");
    // `t` and `t2` are unknowns of the curves
    let a = ParamCurve::new("s", &s * Term::var("t"), Term::int(0));
    let b = ParamCurve::new("s", s.clone(), Term::var("t2"));
    let f = build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, MatchMode::Guarded).unwrap();
    let free = f.free_vars().into_iter().collect::<Vec<_>>();
    assert_eq!(free, ["t", "t2"]);
    let text = f.to_string();
    assert!(text.starts_with("(forall ((t_1 Real))"));
    assert!(text.contains("(exists ((t2_1 Real))"));
}

#[test]
fn curve_match_single_point() {
    let t = Term::var("t");
    let a = ParamCurve::new("t", t.clone(), Term::int(0));
    let near = ParamCurve::new("t", t.clone(), Term::from_f64(0.005).unwrap());
    let far = ParamCurve::new("t", t.clone(), Term::from_f64(0.5).unwrap());
    let point = Interval::new(0.5, 0.5);
    let f = build_curve_match_formula(&a, &near, 0.01, &point, MatchMode::Guarded).unwrap();
    assert!(f.is_quantifier_free());
    assert!(f.free_vars().is_empty());
    assert!(f.holds(&BTreeMap::new(), 0.).unwrap());
    let f = build_curve_match_formula(&a, &far, 0.01, &point, MatchMode::Guarded).unwrap();
    assert!(!f.holds(&BTreeMap::new(), 0.).unwrap());
}

#[test]
fn curve_match_errors() {
    let t = Term::var("t");
    let a = ParamCurve::new("t", t.clone(), t.clone());
    for eps in [0., -1., f64::NAN, f64::INFINITY] {
        let res = build_curve_match_formula(&a, &a, eps, &Interval::UNIT, MatchMode::Guarded);
        assert!(matches!(res, Err(Error::InvalidTolerance(_))), "{eps}");
    }
    let intervals = [
        Interval::new(1., 0.),
        Interval::new(f64::NAN, 1.),
        Interval::new(0., f64::INFINITY),
    ];
    for interval in intervals {
        let res = build_curve_match_formula(&a, &a, 0.1, &interval, MatchMode::Guarded);
        assert!(matches!(res, Err(Error::InvalidInterval { .. })), "{interval:?}");
    }
    assert!(matches!(
        Formula::forall("t", Formula::Bool(true)).holds(&BTreeMap::new(), 0.),
        Err(Error::Quantified)
    ));
}

#[test]
fn guarded_and_unguarded_bodies_disagree() {
    let t = Term::var("t");
    let a = ParamCurve::new("t", t.clone(), Term::int(0));
    let b = ParamCurve::new("t", t.clone() + Term::from_f64(0.5).unwrap(), Term::int(0));
    let guarded =
        build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, MatchMode::Guarded).unwrap();
    let mode = MatchMode::Unguarded { inner_range: false };
    let unguarded = build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, mode).unwrap();
    let Formula::Forall(_, body) = &guarded else { panic!("expect forall") };
    let Formula::Implies(_, ex) = body.as_ref() else { panic!("expect implication") };
    let Formula::Exists(_, guarded_inner) = ex.as_ref() else { panic!("expect exists") };
    let Formula::Forall(_, ex) = &unguarded.conjuncts()[2] else { panic!("expect forall") };
    let Formula::Exists(_, unguarded_inner) = ex.as_ref() else { panic!("expect exists") };
    // Unguarded: every `t` has the witness `t2 = t - 0.5`
    for i in 0..=10 {
        let t = i as f64 / 10.;
        let env = env([("t", t), ("t2", t - 0.5)]);
        assert!(unguarded_inner.holds(&env, 0.).unwrap());
    }
    // Guarded: the witness of `t = 0` is out of range, and no point in range is close
    assert!(!guarded_inner.holds(&env([("t", 0.), ("t2", -0.5)]), 0.).unwrap());
    for i in 0..=100 {
        let env = env([("t", 0.), ("t2", i as f64 / 100.)]);
        assert!(!guarded_inner.holds(&env, 0.).unwrap());
    }
}

#[test]
fn invalid_names() {
    assert_eq!(Term::var("exists").to_string(), "|exists|");
    assert_eq!(Term::var("_").to_string(), "|_|");
    assert_eq!(Term::var("a_b").to_string(), "a_b");
    let topo = Topology::standard().with(Role::AB, "exists");
    let f = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Distance).unwrap();
    assert!(f.to_string().contains("(* |exists| |exists|)"));
    assert!(f.check_names().is_ok());
    for name in ["a|b", "a\\b"] {
        let topo = Topology::standard().with(Role::AB, name);
        let res = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Distance);
        assert!(matches!(res, Err(Error::InvalidTopology(_))), "{name}");
        let t = Term::var("t");
        let a = ParamCurve::new("t", t.clone() * Term::var(name), Term::int(0));
        let res = build_curve_match_formula(&a, &a, 0.1, &Interval::UNIT, MatchMode::Guarded);
        assert!(matches!(res, Err(Error::InvalidName(n)) if n == name));
        let a = ParamCurve::new(name, Term::var(name), Term::int(0));
        let res = build_curve_match_formula(&a, &a, 0.1, &Interval::UNIT, MatchMode::Guarded);
        assert!(matches!(res, Err(Error::InvalidName(_))));
        let f = Formula::exists(name, Term::var(name).gt(Term::int(0)));
        assert!(matches!(f.check_names(), Err(Error::InvalidName(_))));
    }
}

#[test]
fn exact_constants() {
    assert_eq!(exact(0.01), Some(Real::new(1.into(), 100.into())));
    assert_eq!(exact(-2.5), Some(Real::new((-5).into(), 2.into())));
    assert_eq!(exact(3.), Some(Real::from_integer(3.into())));
    assert_eq!(exact(f64::NAN), None);
    assert_eq!(Term::from_f64(-0.25).unwrap().to_string(), "(- (/ 1.0 4.0))");
    assert_eq!(Term::var("a b").to_string(), "|a b|");
}

struct Scripted(Vec<Outcome>);

impl DecisionProcedure for Scripted {
    fn check(&mut self, _: &Formula) -> Result<Outcome> {
        self.0
            .pop()
            .ok_or_else(|| Error::Protocol("script exhausted".to_string()))
    }
}

#[test]
fn outcome_mapping() {
    let query = Formula::Bool(true);
    let model = Model::from_iter([("x", int(1))]);
    let mut procedure = Scripted(vec![
        Outcome::Cancelled,
        Outcome::Timeout(std::time::Duration::from_millis(10)),
        Outcome::Unknown("incomplete".to_string()),
        Outcome::Unsat,
        Outcome::Sat(model.clone()),
    ]);
    assert_eq!(synthesize(&mut procedure, &query).unwrap(), model);
    assert!(matches!(synthesize(&mut procedure, &query), Err(Error::SolverUnsatisfiable)));
    assert!(matches!(
        synthesize(&mut procedure, &query),
        Err(Error::SolverUnknown(r)) if r == "incomplete"
    ));
    assert!(matches!(synthesize(&mut procedure, &query), Err(Error::SolverTimeout(_))));
    let mut boxed: Box<dyn DecisionProcedure> = Box::new(procedure);
    assert!(matches!(synthesize(&mut boxed, &query), Err(Error::SolverCancelled)));
    assert!(matches!(boxed.check(&query), Err(Error::Protocol(_))));
}

proptest! {
    #[test]
    fn pose_unknowns_per_target(n in 0usize..24) {
        let targets = (0..n).map(|i| [i as f64, -(i as f64)]).collect::<Vec<_>>();
        let topo = Topology::standard();
        let f = build_linkage_formula(&topo, &targets, TargetMode::Interpolate).unwrap();
        let poses = f
            .free_vars()
            .into_iter()
            .filter(|v| Role::ALL.iter().all(|r| topo.name(*r) != Some(v.as_str())))
            .collect::<BTreeSet<_>>();
        // 3N pairs of unknowns, one pair per joint per target
        prop_assert_eq!(poses.len(), 6 * n);
        prop_assert_eq!(poses, pose_vars(n));
    }

    #[test]
    fn grashof_is_rotatable(
        ac in 0.05..2f64,
        ab in 0.05..8f64,
        bd in 0.05..8f64,
        cd in 0.05..8f64,
    ) {
        prop_assume!(is_grashof([ab, ac, bd, cd], SLACK));
        prop_assert!(ac <= ab && ac <= bd && ac <= cd);
        prop_assert!(is_rotatable([ab, ac, bd, cd]));
    }

    #[test]
    fn grashof_symbolic_matches_numeric(
        ac in 0.05..4f64,
        ab in 0.05..4f64,
        bd in 0.05..4f64,
        cd in 0.05..4f64,
    ) {
        let [vab, vac, vbd, vcd] = ["AB", "AC", "BD", "CD"].map(Term::var);
        let slack = Term::from_f64(SLACK).unwrap();
        let f = Formula::and(grashof(&vab, &vac, &vbd, &vcd, &slack));
        let env = env([("AB", ab), ("AC", ac), ("BD", bd), ("CD", cd)]);
        prop_assert_eq!(f.holds(&env, 0.).unwrap(), is_grashof([ab, ac, bd, cd], SLACK));
    }
}

#[cfg(feature = "serde")]
#[test]
fn solver_cfg_from_ron() {
    let ron = r#"(
        program: "cvc5",
        args: ["--lang=smt2"],
        timeout_ms: Some(500),
        options: [(":seed", "7")],
    )"#;
    let cfg = SolverCfg::from_ron(ron).unwrap();
    assert_eq!(cfg.program, "cvc5");
    assert_eq!(cfg.timeout(), Some(std::time::Duration::from_millis(500)));
    assert_eq!(cfg.options, [(":seed".to_string(), "7".to_string())]);
    // Missing fields fall back to the defaults
    let cfg = SolverCfg::from_ron("(timeout_ms: Some(10))").unwrap();
    assert_eq!(cfg, SolverCfg::new().timeout_ms(10));
}

#[cfg(feature = "smtlib")]
mod smtlib {
    use super::*;
    use std::time::{Duration, Instant};

    fn z3() -> SmtSolver {
        SmtSolver::new(SolverCfg::new().timeout_ms(20_000))
    }

    // A shell loop speaking just enough SMT-LIB for one query over `x`
    #[cfg(unix)]
    fn scripted_solver(delay: &str, answer: &str, reason: &str) -> SolverCfg {
        let script = format!(
            "while read -r line; do case \"$line\" in \
             *check-sat*) sleep {delay}; echo {answer} ;; \
             *get-value*) echo '((x 1.0))' ;; \
             *get-info*) echo '{reason}' ;; \
             *) echo success ;; esac; done"
        );
        SolverCfg::new().program("sh", ["-c".to_string(), script])
    }

    fn positive_x() -> Formula {
        Term::var("x").gt(Term::int(0))
    }

    #[test]
    fn cancelled_before_call() {
        let cancel = CancelFlag::new();
        // An absent program is never spawned
        let mut solver = SmtSolver::new(SolverCfg::new().program("no-such-solver", ["-in"]))
            .with_cancel(cancel.clone());
        cancel.cancel();
        let outcome = solver.check(&Formula::Bool(true)).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
    }

    #[test]
    fn missing_program_is_io_error() {
        let mut solver = SmtSolver::new(SolverCfg::new().program("no-such-solver-4b", ["-in"]));
        assert!(matches!(solver.check(&Formula::Bool(true)), Err(Error::Io(_))));
    }

    #[test]
    fn invalid_name_is_not_sent() {
        let mut solver = SmtSolver::new(SolverCfg::new().program("no-such-solver-4b", ["-in"]));
        let f = Term::var("a|b").gt(Term::int(0));
        assert!(matches!(solver.check(&f), Err(Error::InvalidName(_))));
    }

    #[cfg(unix)]
    #[test]
    fn scripted_sat_model() {
        let mut solver = SmtSolver::new(scripted_solver("0", "sat", ""));
        let model = synthesize(&mut solver, &positive_x()).unwrap();
        assert_eq!(model, Model::from_iter([("x", int(1))]));
    }

    #[cfg(unix)]
    #[test]
    fn cancelled_during_call() {
        let cancel = CancelFlag::new();
        let cfg = scripted_solver("1", "sat", "");
        let mut solver = SmtSolver::new(cfg).with_cancel(cancel.clone());
        let raise = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            cancel.cancel();
        });
        let start = Instant::now();
        let outcome = solver.check(&positive_x()).unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(start.elapsed() < Duration::from_millis(900));
        raise.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unknown_carries_solver_reason() {
        let reason = r#"(:reason-unknown "(incomplete (theory arithmetic))")"#;
        let mut solver = SmtSolver::new(scripted_solver("0", "unknown", reason));
        match solver.check(&positive_x()).unwrap() {
            Outcome::Unknown(r) => assert!(r.contains("incomplete (theory arithmetic)"), "{r}"),
            outcome => panic!("unexpected {outcome:?}"),
        }
        // The reason tells a timeout apart, however short the call was
        let cfg = scripted_solver("0", "unknown", "(:reason-unknown timeout)").timeout_ms(60_000);
        let outcome = SmtSolver::new(cfg).check(&positive_x()).unwrap();
        assert_eq!(outcome, Outcome::Timeout(Duration::from_secs(60)));
        assert!(matches!(outcome.into_model(), Err(Error::SolverTimeout(_))));
    }

    #[test]
    #[ignore = "requires z3"]
    fn nonlinear_example() {
        let [x, y, z] = ["x", "y", "z"].map(Term::var);
        let half = Term::from_f64(0.5).unwrap();
        let f = Formula::and([
            (x.square() + y.square()).equals(Term::int(1)),
            (&x * x.square() + &z * z.square()).lt(half),
            !z.clone().equals(Term::int(0)),
        ]);
        let model = synthesize(&mut z3(), &f).unwrap();
        assert_eq!(model.len(), 3);
        assert!(model.verify(&f, 1e-6).unwrap());
    }

    #[test]
    #[ignore = "requires z3"]
    fn unit_circle_model_round_trip() {
        let topo = Topology::standard();
        let f = build_linkage_formula(&topo, &UNIT_CIRCLE, TargetMode::Distance).unwrap();
        let model = synthesize(&mut z3(), &f).unwrap();
        assert_eq!(model.len(), f.free_vars().len());
        assert!(model.verify(&f, 1e-6).unwrap());
        let f64_map = model.to_f64_map().unwrap();
        let lengths = ["AB", "AC", "BD", "CD"].map(|k| f64_map[k]);
        assert!(is_grashof(lengths, SLACK - 1e-9));
    }

    #[test]
    #[ignore = "requires z3"]
    fn guarded_and_unguarded_disagree() {
        let t = Term::var("t");
        let a = ParamCurve::new("t", t.clone(), Term::int(0));
        let b = ParamCurve::new("t", t.clone() + Term::from_f64(0.5).unwrap(), Term::int(0));
        let guarded =
            build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, MatchMode::Guarded).unwrap();
        let mode = MatchMode::Unguarded { inner_range: false };
        let unguarded = build_curve_match_formula(&a, &b, 0.1, &Interval::UNIT, mode).unwrap();
        let mut solver = z3();
        assert_eq!(solver.check(&guarded).unwrap(), Outcome::Unsat);
        assert!(solver.check(&unguarded).unwrap().is_sat());
    }
}
