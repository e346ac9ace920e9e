//! Watched-literal unit propagation.
//!
//! Only rules with >= 2 literals are watched here; unit/empty rules are
//! assertions and are handled directly by `Solver::process_assertions`.
//! Grounded on a `watch_graph.rs` relinking scheme seen in comparable
//! resolver implementations and on `src/rules.c`'s
//! `makeruledecisions`/`propagate` pair from openSUSE libsolv for the
//! "leave / move / unit / conflict" dispatch.

use std::collections::HashMap;

use super::rule::Literal;
use super::ruleset::RuleSet;

#[derive(Debug, Clone, Copy)]
struct Watched {
    rule_id: u32,
    w1: Literal,
    w2: Literal,
}

/// Watch invariant: for every enabled rule, w1 and w2 are
/// either undefined literals or assigned-true literals at the current
/// trail prefix. Maintained by `Propagator::propagate` below.
pub struct WatchGraph {
    /// Negated-literal -> rule ids currently watching it.
    lists: HashMap<Literal, Vec<u32>>,
    watched: HashMap<u32, (Literal, Literal)>,
}

impl WatchGraph {
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
            watched: HashMap::new(),
        }
    }

    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut graph = Self::new();
        for rule in rules.iter() {
            if rule.literals().len() >= 2 {
                graph.add_rule(rule);
            }
        }
        graph
    }

    pub fn add_rule(&mut self, rule: &super::rule::Rule) {
        let lits = rule.literals();
        if lits.len() < 2 {
            return;
        }
        let w1 = lits[0];
        let w2 = lits[1];
        self.watched.insert(rule.id(), (w1, w2));
        self.lists.entry(w1).or_default().push(rule.id());
        self.lists.entry(w2).or_default().push(rule.id());
    }

    fn list(&self, lit: Literal) -> Vec<u32> {
        self.lists.get(&lit).cloned().unwrap_or_default()
    }

    fn relink(&mut self, rule_id: u32, old: Literal, new: Literal) {
        if let Some(list) = self.lists.get_mut(&old) {
            list.retain(|&id| id != rule_id);
        }
        self.lists.entry(new).or_default().push(rule_id);
        if let Some((w1, w2)) = self.watched.get_mut(&rule_id) {
            if *w1 == old {
                *w1 = new;
            } else if *w2 == old {
                *w2 = new;
            }
        }
    }
}

impl Default for WatchGraph {
    fn default() -> Self {
        Self::new()
    }
}

pub enum PropagateResult {
    Ok,
    /// The remaining undefined literal was forced true by this rule id.
    Unit(Literal, u32),
    /// The rule could not be satisfied - conflict.
    Conflict(u32),
}

/// Drives one round of unit propagation after `literal` became true.
pub struct Propagator<'a> {
    graph: &'a mut WatchGraph,
    rules: &'a RuleSet,
}

impl<'a> Propagator<'a> {
    pub fn new(graph: &'a mut WatchGraph, rules: &'a RuleSet) -> Self {
        Self { graph, rules }
    }

    /// `is_satisfied(lit) -> Some(true/false)` if decided, `None` if undecided.
    pub fn propagate(&mut self, literal: Literal, is_satisfied: impl Fn(Literal) -> Option<bool>) -> Vec<PropagateResult> {
        let mut results = Vec::new();
        // Assigning `literal` true falsifies any rule watching its negation.
        let falsified = -literal;
        for rule_id in self.graph.list(falsified) {
            let Some(rule) = self.rules.get(rule_id) else { continue };
            if rule.is_disabled() {
                continue;
            }
            let Some(&(w1, w2)) = self.graph.watched.get(&rule_id) else { continue };
            let (mine, other) = if w1 == falsified { (w1, w2) } else { (w2, w1) };
            debug_assert_eq!(mine, falsified, "watch invariant violated for rule {rule_id}");

            match is_satisfied(other) {
                Some(true) => {
                    results.push(PropagateResult::Ok);
                    continue;
                }
                _ => {}
            }

            // Look for another literal to watch instead.
            let mut relinked = false;
            for &lit in rule.literals() {
                if lit == w1 || lit == w2 {
                    continue;
                }
                match is_satisfied(lit) {
                    Some(false) => continue,
                    _ => {
                        self.graph.relink(rule_id, falsified, lit);
                        relinked = true;
                        break;
                    }
                }
            }
            if relinked {
                continue;
            }

            match is_satisfied(other) {
                Some(false) => results.push(PropagateResult::Conflict(rule_id)),
                Some(true) => results.push(PropagateResult::Ok),
                None => results.push(PropagateResult::Unit(other, rule_id)),
            }
        }
        results
    }
}
