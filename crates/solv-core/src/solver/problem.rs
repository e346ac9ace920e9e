//! Problem/Solution data types.
//!
//! A problem is an unsatisfiable subset of enabled rules, expressed as rule
//! ids; a solution is a minimal job modification that makes one problem
//! disappear. Minimization itself (`create_solutions`) lives in
//! `solver.rs` since it must re-enter the CDCL loop; this module holds the
//! data shapes and the `representative_rule` ranking, grounded on
//! `src/problems.c`'s `solver_findproblemrule` from openSUSE libsolv.

use crate::pool::PackageId;

use super::rule::{RuleClass, RuleKind};
use super::ruleset::RuleSet;

/// An unsatisfiable subset of enabled rules.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub rules: Vec<u32>,
    /// Optional human-readable message for rules with no matching provider
    /// (e.g. `NOTHING_PROVIDES_DEP`), kept alongside the rule id.
    pub message: Option<String>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn add_rule(&mut self, rule_id: u32) {
        if !self.rules.contains(&rule_id) {
            self.rules.push(rule_id);
        }
    }

    /// `solver_findproblemrule`: pick one representative rule, preferring
    /// assertion requires > jobassert requires > installed-involved requires
    /// > other requires > conflicts > update > job.
    pub fn representative_rule(&self, rules: &RuleSet) -> Option<u32> {
        fn rank(rule: &super::rule::Rule) -> u8 {
            match (rule.class(), rule.kind()) {
                (_, RuleKind::JobAssert) => 0,
                (RuleClass::Package, RuleKind::Requires) if rule.is_assertion() => 1,
                (RuleClass::Package, RuleKind::Requires) => 2,
                (RuleClass::Package, RuleKind::Conflict) | (RuleClass::Package, RuleKind::Obsolete) => 3,
                (RuleClass::UpdateFeature, _) => 4,
                (RuleClass::Job, _) => 5,
                _ => 6,
            }
        }
        self.rules
            .iter()
            .filter_map(|&id| rules.get(id).map(|r| (id, rank(r))))
            .min_by_key(|&(_, rank)| rank)
            .map(|(id, _)| id)
    }
}

/// A job modifier: one way to make a problem's rules satisfiable.
#[derive(Debug, Clone, PartialEq)]
pub enum JobModifier {
    /// Replace package `from` with `to` in the resolved set.
    Replace(PackageId, PackageId),
    /// Erase `p` from the job queue's required set.
    Erase(PackageId),
    /// Drop job at this index entirely.
    DelJob(usize),
    /// Allow an inferior-architecture package to stay.
    Infarch(PackageId),
    /// Allow `p`'s installed version to survive a distupgrade.
    Distupgrade(PackageId),
}

/// A minimal set of job modifiers resolving one problem.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub modifiers: Vec<JobModifier>,
}

/// All problems found by one `solve()` call, plus their (lazily built)
/// solutions.
#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
    solutions: Vec<Vec<Solution>>,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, problem: Problem) {
        self.solutions.push(Vec::new());
        self.problems.push(problem);
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Problem> {
        self.problems.get(idx)
    }

    pub fn set_solutions(&mut self, idx: usize, solutions: Vec<Solution>) {
        if idx < self.solutions.len() {
            self.solutions[idx] = solutions;
        }
    }

    pub fn solutions(&self, idx: usize) -> &[Solution] {
        self.solutions.get(idx).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
