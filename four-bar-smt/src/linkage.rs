//! Constraint model of a planar four-bar linkage passing through target
//! points.
//!
//! ```
//! use four_bar_smt::{build_linkage_formula, TargetMode, Topology};
//!
//! let targets = [[0., 1.], [1., 0.], [0., -1.], [-1., 0.]];
//! let f = build_linkage_formula(&Topology::standard(), &targets, TargetMode::Distance).unwrap();
//! // 1 ground link + 6 Grashof + 3 per target
//! assert_eq!(f.conjuncts().len(), 19);
//! ```
use crate::*;
use std::collections::{BTreeMap, BTreeSet};

/// Named unknowns of the four-bar topology.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    /// Length of the ground link `AB`
    AB,
    /// Length of the driver link `AC`
    AC,
    /// Length of the follower link `BD`
    BD,
    /// Length of the coupler link `CD`
    CD,
    /// Length of the coupler extension `CE`
    CE,
    /// X coordinate of the ground joint `A`
    AX,
    /// Y coordinate of the ground joint `A`
    AY,
    /// X coordinate of the ground joint `B`
    BX,
    /// Y coordinate of the ground joint `B`
    BY,
}

impl Role {
    /// All roles. A valid topology names each of them.
    pub const ALL: [Self; 9] = [
        Self::AB,
        Self::AC,
        Self::BD,
        Self::CD,
        Self::CE,
        Self::AX,
        Self::AY,
        Self::BX,
        Self::BY,
    ];

    /// Conventional name of the unknown.
    pub const fn default_name(&self) -> &'static str {
        match self {
            Self::AB => "AB",
            Self::AC => "AC",
            Self::BD => "BD",
            Self::CD => "CD",
            Self::CE => "CE",
            Self::AX => "a_x",
            Self::AY => "a_y",
            Self::BX => "b_x",
            Self::BY => "b_y",
        }
    }
}

/// Names of the link-length and ground-joint unknowns.
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    names: BTreeMap<Role, String>,
}

impl Topology {
    /// Create an empty topology. Every role must be named before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Topology with the conventional names, see [`Role::default_name()`].
    pub fn standard() -> Self {
        Role::ALL
            .into_iter()
            .fold(Self::new(), |topo, role| topo.with(role, role.default_name()))
    }

    /// Name the unknown of a role.
    pub fn with<S: Into<String>>(mut self, role: Role, name: S) -> Self {
        self.names.insert(role, name.into());
        self
    }

    /// Remove the name of a role.
    pub fn without(mut self, role: Role) -> Self {
        self.names.remove(&role);
        self
    }

    /// Get the name of a role.
    pub fn name(&self, role: Role) -> Option<&str> {
        self.names.get(&role).map(String::as_str)
    }

    fn resolve(&self) -> Result<Unknowns> {
        let mut seen = BTreeSet::new();
        for role in Role::ALL {
            let name = match self.name(role) {
                Some(name) if !name.is_empty() => name,
                _ => return Err(Error::InvalidTopology(format!("missing unknown {role:?}"))),
            };
            if !is_valid_name(name) {
                let msg = format!("unknown {name:?} cannot be written as a symbol");
                return Err(Error::InvalidTopology(msg));
            }
            if !seen.insert(name) {
                return Err(Error::InvalidTopology(format!("duplicated unknown {name:?}")));
            }
            if is_pose_var(name) {
                let msg = format!("unknown {name:?} clashes with the pose unknowns");
                return Err(Error::InvalidTopology(msg));
            }
        }
        let var = |role| Term::var(self.name(role).unwrap_or_default());
        Ok(Unknowns {
            ab: var(Role::AB),
            ac: var(Role::AC),
            bd: var(Role::BD),
            cd: var(Role::CD),
            ce: var(Role::CE),
            a: Coord::new(var(Role::AX), var(Role::AY)),
            b: Coord::new(var(Role::BX), var(Role::BY)),
        })
    }
}

struct Unknowns {
    ab: Term,
    ac: Term,
    bd: Term,
    cd: Term,
    ce: Term,
    a: Coord,
    b: Coord,
}

fn is_pose_var(name: &str) -> bool {
    let mut it = name.splitn(3, '_');
    match (it.next(), it.next(), it.next()) {
        (Some("C" | "D" | "E"), Some("x" | "y"), Some(i)) => {
            !i.is_empty() && i.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

/// How the traced joint `E` relates to the target points.
///
/// There is no default, the caller always chooses.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TargetMode {
    /// `E_i` must coincide with target `i` (exact interpolation)
    Interpolate,
    /// Only the distance relations of each pose are required
    Distance,
}

/// The traced joints of one pose, see [`Coord::indexed()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pose {
    /// Joint `C`
    pub c: Coord,
    /// Joint `D`
    pub d: Coord,
    /// Joint `E`
    pub e: Coord,
}

impl Pose {
    /// The unknowns of pose `i`.
    pub fn at(i: usize) -> Self {
        Self {
            c: Coord::indexed("C", i),
            d: Coord::indexed("D", i),
            e: Coord::indexed("E", i),
        }
    }
}

/// Caller-supplied linearity constraint of pose `i`.
pub type Linearity = dyn Fn(usize, &Pose) -> Formula + Send + Sync;

/// Builder of the linkage constraint model.
pub struct LinkageSyn {
    topo: Topology,
    mode: TargetMode,
    // Slack of the Grashof inequalities
    slack: f64,
    // Zero targets is an error
    require_targets: bool,
    // Add `len >= 0` for the link lengths
    nonneg_links: bool,
    linearity: Option<Box<Linearity>>,
}

impl LinkageSyn {
    /// Create a new builder.
    pub fn new(topo: Topology, mode: TargetMode) -> Self {
        Self {
            topo,
            mode,
            slack: grashof::SLACK,
            require_targets: false,
            nonneg_links: false,
            linearity: None,
        }
    }

    /// Set the slack of the Grashof inequalities. Must be positive.
    pub fn slack(self, slack: f64) -> Self {
        Self { slack, ..self }
    }

    /// Fail with [`Error::EmptyTargetSet`] if no target is given.
    pub fn require_targets(self) -> Self {
        Self { require_targets: true, ..self }
    }

    /// Constrain all link lengths to be nonnegative.
    pub fn nonneg_links(self) -> Self {
        Self { nonneg_links: true, ..self }
    }

    /// Add a linearity constraint to every pose, e.g. [`collinear()`].
    pub fn linearity<F>(self, f: F) -> Self
    where
        F: Fn(usize, &Pose) -> Formula + Send + Sync + 'static,
    {
        Self { linearity: Some(Box::new(f)), ..self }
    }

    /// The target mode.
    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    /// Build the conjunction of all constraints.
    pub fn build(&self, targets: &[[f64; 2]]) -> Result<Formula> {
        let u = self.topo.resolve()?;
        let slack = match exact(self.slack) {
            Some(s) if self.slack > 0. => Term::from(s),
            _ => return Err(Error::InvalidSlack(self.slack)),
        };
        if self.require_targets && targets.is_empty() {
            return Err(Error::EmptyTargetSet);
        }
        let targets = targets
            .iter()
            .enumerate()
            .map(|(i, &p)| Coord::constant(p).ok_or(Error::InvalidTarget(i)))
            .collect::<Result<Vec<_>>>()?;
        let mut cs = Vec::with_capacity(12 + targets.len() * 6);
        // Ground link
        cs.push(dist_eq(&u.a, &u.b, &u.ab));
        cs.extend(grashof(&u.ab, &u.ac, &u.bd, &u.cd, &slack));
        if self.nonneg_links {
            cs.extend([&u.ab, &u.ac, &u.bd, &u.cd, &u.ce].map(|l| l.clone().ge(Term::int(0))));
        }
        // Poses
        for (i, target) in targets.iter().enumerate() {
            let pose = Pose::at(i);
            cs.push(dist_eq_indexed("C", i, &u.a, &u.ac));
            cs.push(dist_eq_indexed("D", i, &u.b, &u.bd));
            cs.push(dist_eq(&pose.e, &pose.c, &u.cd));
            if self.mode == TargetMode::Interpolate {
                cs.extend(pose.e.coincide(target));
            }
            if let Some(f) = &self.linearity {
                cs.push(f(i, &pose));
            }
        }
        tracing::debug!(
            targets = targets.len(),
            constraints = cs.len(),
            mode = ?self.mode,
            "linkage formula built"
        );
        Ok(Formula::And(cs))
    }
}

/// Build the linkage constraint model with the default options.
///
/// See [`LinkageSyn`] for more options.
pub fn build_linkage_formula(
    topo: &Topology,
    targets: &[[f64; 2]],
    mode: TargetMode,
) -> Result<Formula> {
    LinkageSyn::new(topo.clone(), mode).build(targets)
}
