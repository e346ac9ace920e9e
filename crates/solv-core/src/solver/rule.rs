//! The central constraint object: a rule is a disjunction of signed solvable
//! literals, the atomic unit propagated by CDCL.
//!
//! Grounded on a `RuleType`/`Rule` split seen in comparable resolver
//! implementations, widened to the closed rule-class taxonomy this solver
//! uses (package/job/infarch/dup/update/best/yumobs/choice/learnt). libsolv's
//! binary/long storage split is a cache-locality optimisation, not a
//! contract; this crate keeps one `Vec<Literal>` representation per rule and
//! notes the tradeoff in DESIGN.md.

use std::fmt;

use crate::pool::PackageId;

/// A literal in SAT terms: `+p` means "install p", `-p` means "do not install p".
pub type Literal = i32;

pub fn lit_pkg(lit: Literal) -> PackageId {
    lit.unsigned_abs()
}

pub fn lit_sign(lit: Literal) -> bool {
    lit > 0
}

/// Closed set of rule classes, in construction order. Each class owns a
/// half-open range `[start, end)` in the rule array (`RuleSet`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleClass {
    Package,
    Job,
    Infarch,
    Dup,
    UpdateFeature,
    Best,
    Yumobs,
    Choice,
    Learnt,
}

impl RuleClass {
    /// All classes in construction order.
    pub const ORDER: [RuleClass; 9] = [
        RuleClass::Package,
        RuleClass::Job,
        RuleClass::Infarch,
        RuleClass::Dup,
        RuleClass::UpdateFeature,
        RuleClass::Best,
        RuleClass::Yumobs,
        RuleClass::Choice,
        RuleClass::Learnt,
    ];
}

/// Finer-grained tag within a class, used for problem-rule ranking
/// (`Problem::representative_rule`) and human-readable messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// `A -> providers(B)`, from a requires dependency.
    Requires,
    /// No provider exists for a requires dependency at build time.
    NothingProvidesDep,
    /// `-A | -p` from a conflicts dependency.
    Conflict,
    /// `-A | -p` from an obsoletes dependency.
    Obsolete,
    /// `-A | -B` implicit same-name exclusion.
    SameName,
    /// Multiversion patch-conflict expansion with sibling disjunction.
    MultiversionConflict,
    /// Job-derived rule (install/erase/lock/...).
    Job,
    /// An assertion injected directly from the job queue (single literal).
    JobAssert,
    /// Architecture downgrade forbidden.
    Infarch,
    /// Distupgrade restriction.
    Dup,
    /// Update rule (filtered by current allow-flags).
    Update,
    /// Feature rule (unfiltered candidate set).
    Feature,
    /// SOLVER_FORCEBEST constraint.
    Best,
    /// Yum-style obsolete group incompatibility.
    Yumobs,
    /// Weak preference for update-path providers.
    Choice,
    /// Conflict-analysis learnt clause.
    Learnt,
}

/// A rule (clause) over solvable-signed-id literals; the atomic unit
/// propagated by CDCL.
#[derive(Debug, Clone)]
pub struct Rule {
    literals: Vec<Literal>,
    class: RuleClass,
    kind: RuleKind,
    id: u32,
    /// Weak rules (choice rules, and any rule explicitly marked weak by a
    /// `SOLVER_WEAK` job flag) may be auto-disabled by conflict analysis.
    weak: bool,
    disabled: bool,
    /// Index of the job this rule originated from, if any (job rules only).
    job_index: Option<usize>,
    /// Source package id, for error messages / problem formatting.
    pub source: Option<PackageId>,
    /// Target name string, for error messages / problem formatting.
    pub target_name: Option<String>,
}

impl Rule {
    pub fn new(literals: Vec<Literal>, class: RuleClass, kind: RuleKind) -> Self {
        Self {
            literals,
            class,
            kind,
            id: 0,
            weak: matches!(kind, RuleKind::Choice),
            disabled: false,
            job_index: None,
            source: None,
            target_name: None,
        }
    }

    pub fn assertion(lit: Literal, class: RuleClass, kind: RuleKind) -> Self {
        Self::new(vec![lit], class, kind)
    }

    pub fn learned(literals: Vec<Literal>) -> Self {
        Self::new(literals, RuleClass::Learnt, RuleKind::Learnt)
    }

    pub fn with_job_index(mut self, idx: usize) -> Self {
        self.job_index = Some(idx);
        self
    }

    pub fn with_source(mut self, source: PackageId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn weak(mut self, weak: bool) -> Self {
        self.weak = weak;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn class(&self) -> RuleClass {
        self.class
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable a rule without losing its literals, so it can be re-enabled
    /// later. A disabled rule must contribute nothing to propagation.
    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn job_index(&self) -> Option<usize> {
        self.job_index
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .literals
            .iter()
            .map(|&l| if l > 0 { format!("+{l}") } else { format!("{l}") })
            .collect();
        write!(f, "[{}] ({:?}/{:?})", parts.join(" "), self.class, self.kind)
    }
}
