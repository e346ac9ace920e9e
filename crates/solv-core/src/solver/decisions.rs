//! Decision state: `decisionmap`, `decisionq`, `decisionq_why`.
//!
//! Grounded on `src/decision.c` from openSUSE libsolv for the level-encoded
//! map and on its closed set of decision-reason tags, kept here as a stable
//! `ReasonCode` enum surfaced by introspection.

use std::collections::{HashMap, HashSet};

use crate::pool::PackageId;

use super::rule::Literal;
use super::ruleset::RuleSet;

/// Stable wire codes for "why is this package decided".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonCode {
    UnitRule,
    ResolveJob,
    Resolve,
    WeakDep,
    KeepInstalled,
    UpdateInstalled,
    CleandepsErase,
    ResolveOrphan,
    Unsolvable,
    Premise,
    Unrelated,
    Recommended,
    Supplemented,
}

/// Why a literal ended up on the trail.
#[derive(Debug, Clone, Copy)]
pub enum Reason {
    /// Propagated: forced true by unit propagation of this rule id.
    Rule(u32),
    /// A branch decision made by the policy-ordered heuristic, tagged with
    /// the high-level reason category for introspection.
    Policy(ReasonCode),
}

/// decisionmap\[p\] = 0 undecided; +L decided-installed at level L; -L
/// decided-not-installed at level L. decisionq is the append-only trail;
/// decisionq_why pairs each entry with its forcing reason.
pub struct Decisions {
    map: HashMap<PackageId, i32>,
    trail: Vec<(Literal, Reason)>,
    level: u32,
}

impl Decisions {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            trail: Vec::new(),
            level: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn increment_level(&mut self) -> u32 {
        self.level += 1;
        self.level
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    pub fn queue(&self) -> &[(Literal, Reason)] {
        &self.trail
    }

    /// Record `literal` true at the current level, with the given reason.
    pub fn decide(&mut self, literal: Literal, reason: Reason) {
        let pkg = literal.unsigned_abs();
        let signed_level = if literal > 0 { self.level as i32 } else { -(self.level as i32) };
        self.map.insert(pkg, signed_level);
        self.trail.push((literal, reason));
    }

    pub fn decided(&self, pkg: PackageId) -> bool {
        self.map.get(&pkg).copied().unwrap_or(0) != 0
    }

    pub fn undecided(&self, pkg: PackageId) -> bool {
        !self.decided(pkg)
    }

    pub fn decided_install(&self, pkg: PackageId) -> bool {
        self.map.get(&pkg).copied().unwrap_or(0) > 0
    }

    pub fn decided_not_install(&self, pkg: PackageId) -> bool {
        self.map.get(&pkg).copied().unwrap_or(0) < 0
    }

    /// True if `literal` is already true under the current assignment.
    pub fn satisfied(&self, literal: Literal) -> bool {
        let pkg = literal.unsigned_abs();
        let v = self.map.get(&pkg).copied().unwrap_or(0);
        if literal > 0 {
            v > 0
        } else {
            v < 0
        }
    }

    /// True if `literal` is false under the current assignment (i.e. its
    /// negation is already decided).
    pub fn conflict(&self, literal: Literal) -> bool {
        let pkg = literal.unsigned_abs();
        let v = self.map.get(&pkg).copied().unwrap_or(0);
        if v == 0 {
            return false;
        }
        if literal > 0 {
            v < 0
        } else {
            v > 0
        }
    }

    /// The decision level at which `literal`'s package was decided, or `None`.
    pub fn decision_level(&self, literal: Literal) -> Option<u32> {
        let pkg = literal.unsigned_abs();
        match self.map.get(&pkg).copied().unwrap_or(0) {
            0 => None,
            v => Some(v.unsigned_abs()),
        }
    }

    /// The reason recorded for the package underlying `literal`, if decided.
    pub fn reason(&self, literal: Literal) -> Option<Reason> {
        let pkg = literal.unsigned_abs();
        self.trail
            .iter()
            .rev()
            .find(|(l, _)| l.unsigned_abs() == pkg)
            .map(|(_, r)| *r)
    }

    /// The forcing rule id for a propagated literal, if any (used by
    /// conflict analysis to walk the implication graph backwards).
    pub fn decision_rule(&self, literal: Literal) -> Option<u32> {
        match self.reason(literal) {
            Some(Reason::Rule(id)) => Some(id),
            _ => None,
        }
    }

    /// Undo all decisions made at a level strictly greater than `level`.
    pub fn revert_to_level(&mut self, level: u32) {
        self.level = level;
        while let Some(&(lit, _)) = self.trail.last() {
            let pkg = lit.unsigned_abs();
            let cur = self.map.get(&pkg).copied().unwrap_or(0);
            if cur.unsigned_abs() as u32 > level {
                self.map.remove(&pkg);
                self.trail.pop();
            } else {
                break;
            }
        }
    }

    pub fn installed_packages(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.map.iter().filter(|&(_, &v)| v > 0).map(|(&p, _)| p)
    }

    /// Walk the implication graph backwards from `pkg`'s decision, collecting
    /// every literal that fed into it through a forcing rule, down to the
    /// premises. Order is not a single linear chain - a rule can have
    /// more than one other undecided-at-the-time literal - so this returns
    /// the set of contributing `(literal, reason, level)` triples reachable
    /// from `pkg`, closest decisions first.
    pub fn derivation(&self, pkg: PackageId, rules: &RuleSet) -> Vec<(Literal, Reason, u32)> {
        let mut out = Vec::new();
        let mut stack = vec![pkg];
        let mut visited: HashSet<PackageId> = HashSet::new();

        while let Some(p) = stack.pop() {
            if !visited.insert(p) {
                continue;
            }
            let Some(&(lit, reason)) = self.trail.iter().rev().find(|(l, _)| l.unsigned_abs() == p) else {
                continue;
            };
            let level = self.decision_level(lit).unwrap_or(0);
            out.push((lit, reason, level));

            if let Reason::Rule(rule_id) = reason {
                if let Some(rule) = rules.get(rule_id) {
                    for &other in rule.literals() {
                        let other_pkg = other.unsigned_abs();
                        if other_pkg != p && self.decided(other_pkg) {
                            stack.push(other_pkg);
                        }
                    }
                }
            }
        }
        out
    }
}

impl Default for Decisions {
    fn default() -> Self {
        Self::new()
    }
}
