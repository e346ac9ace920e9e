//! The CDCL core: watched-literal propagation, a policy-ordered branching
//! heuristic, 1-UIP conflict analysis with non-chronological backjumping,
//! and problem/transaction assembly on termination.
//!
//! Grounded on a `solver/solver.rs` control-flow shape
//! (`SolverState`/`Branch`, `propagate`/`analyze_conflict`/
//! `analyze_and_backtrack`) seen in comparable resolver implementations,
//! rewired from a Composer-style `Package`/`Request`
//! model onto this crate's `Pool`/`JobQueue`/`RuleSet`/`Decisions` types and
//! widened to a five-tier branching order and a closed rule-class taxonomy.
//! `src/rules.c`'s `makeruledecisions`/`solve` pair from openSUSE libsolv is
//! the second grounding source for the assertion pass and the tier ordering
//! itself.

use std::collections::HashSet;
use std::time::Instant;

use crate::config::SolverConfig;
use crate::pool::{PackageId, Pool, SYSTEM_SOLVABLE};

use super::cleandeps;
use super::decisions::{Decisions, Reason, ReasonCode};
use super::generator::Generator;
use super::job::{Job, JobAction, JobQueue, Selector};
use super::policy::Policy;
use super::problem::{JobModifier, Problem, ProblemSet, Solution};
use super::rule::{Literal, Rule, RuleClass, RuleKind};
use super::ruleset::RuleSet;
use super::transaction::{self, Transaction, TransactionStep};
use super::watch::{PropagateResult, Propagator, WatchGraph};

/// The outcome of a successful solve: the classified transaction, the
/// cleandeps removal set, and the raw decision/rule state for
/// introspection (the `solver_get_decisionlist`-equivalent walk).
#[derive(Debug)]
pub struct SolverResult {
    pub transaction: Transaction,
    pub cleandeps: HashSet<PackageId>,
    pub decisions: Decisions,
    pub rules: RuleSet,
}

/// Maximum number of outer solving rounds before giving up with an
/// iteration-bound problem rather than spinning forever.
const MAX_ITERATIONS: u32 = 200_000;

pub struct Solver<'a> {
    pool: &'a Pool,
    config: &'a SolverConfig,
    policy: &'a Policy,
}

impl<'a> Solver<'a> {
    pub fn new(pool: &'a Pool, config: &'a SolverConfig, policy: &'a Policy) -> Self {
        Self { pool, config, policy }
    }

    /// Build the rule set for `jobs` and run CDCL to a fixed point,
    /// classifying the result into a transaction on success.
    pub fn solve(&self, jobs: &JobQueue) -> Result<SolverResult, ProblemSet> {
        self.solve_inner(jobs).map_err(|(problems, _rules)| problems)
    }

    /// Like [`solve`](Self::solve), but on failure also returns the
    /// `RuleSet` the problem was raised against, so a caller can run
    /// [`representative_rule`](Problem::representative_rule) or
    /// [`minimize_problems`](Self::minimize_problems) without re-generating
    /// rules itself.
    pub fn solve_verbose(&self, jobs: &JobQueue) -> Result<SolverResult, (ProblemSet, RuleSet)> {
        self.solve_inner(jobs)
    }

    fn solve_inner(&self, jobs: &JobQueue) -> Result<SolverResult, (ProblemSet, RuleSet)> {
        log::debug!("generating rules for {} jobs over {} solvables", jobs.len(), self.pool.len());
        let gen_start = Instant::now();
        let generator = Generator::new(self.pool, self.config, self.policy);
        let rules = generator.generate(jobs);
        log::info!("generated {} rules in {:.3}s", rules.len(), gen_start.elapsed().as_secs_f64());

        let mut state = SolverState::new(rules);

        let sat_start = Instant::now();
        match self.run_sat(&mut state, jobs) {
            Ok(()) => {
                log::info!("resolved in {:.3}s ({} decisions)", sat_start.elapsed().as_secs_f64(), state.decisions.len());
                Ok(self.build_result(state, jobs))
            }
            Err(problems) => {
                log::debug!("solve failed after {:.3}s", sat_start.elapsed().as_secs_f64());
                Err((problems, state.rules))
            }
        }
    }

    // ---- problem/solution minimization -------------------------------------

    /// Fill in `problems`' per-problem solutions by, for each rule involved
    /// in a problem, trying the one or two job modifications that could
    /// plausibly remove that rule's contribution and re-solving from
    /// scratch. A modification survives as a [`Solution`] exactly when the
    /// resulting job queue is satisfiable: this crate rebuilds its rule set
    /// from the job queue on every solve, so "disable the rule and re-solve"
    /// is expressed here as "change the job that implied it and re-solve".
    pub fn minimize_problems(&self, problems: &mut ProblemSet, rules: &RuleSet, jobs: &JobQueue) {
        for idx in 0..problems.len() {
            let Some(problem) = problems.get(idx) else { continue };
            let solutions = self.solutions_for(problem, rules, jobs);
            problems.set_solutions(idx, solutions);
        }
    }

    fn solutions_for(&self, problem: &Problem, rules: &RuleSet, jobs: &JobQueue) -> Vec<Solution> {
        let mut solutions = Vec::new();
        let mut seen = HashSet::new();
        for &rule_id in &problem.rules {
            let Some(rule) = rules.get(rule_id) else { continue };
            for modifier in self.candidate_modifiers(rule) {
                if !seen.insert(format!("{modifier:?}")) {
                    continue;
                }
                let mut trial = jobs.clone();
                self.apply_modifier(&mut trial, &modifier);
                if self.solve(&trial).is_ok() {
                    solutions.push(Solution { modifiers: vec![modifier] });
                }
            }
        }
        solutions
    }

    /// The job changes that could plausibly make `rule` disappear, one case
    /// per rule class, grounded on the per-ruleclass branches of
    /// `solver_problem_solutions` in `src/problems.c`.
    fn candidate_modifiers(&self, rule: &Rule) -> Vec<JobModifier> {
        let mut out = Vec::new();
        if let Some(idx) = rule.job_index() {
            out.push(JobModifier::DelJob(idx));
        }
        match rule.class() {
            RuleClass::UpdateFeature => {
                if let Some(&first) = rule.literals().first() {
                    let p = first.unsigned_abs();
                    out.push(JobModifier::Erase(p));
                    for &lit in &rule.literals()[1..] {
                        out.push(JobModifier::Replace(p, lit.unsigned_abs()));
                    }
                }
            }
            RuleClass::Infarch => {
                if let Some(&first) = rule.literals().first() {
                    out.push(JobModifier::Infarch(first.unsigned_abs()));
                }
            }
            RuleClass::Dup => {
                if let Some(&first) = rule.literals().first() {
                    out.push(JobModifier::Distupgrade(first.unsigned_abs()));
                }
            }
            RuleClass::Package => {
                if let Some(p) = rule.source {
                    out.push(JobModifier::Erase(p));
                }
            }
            _ => {}
        }
        out
    }

    /// Apply one [`JobModifier`] to a trial job queue. `Replace`/`Infarch`
    /// are expressed as an extra forcebest install rather than a one-off
    /// solver-flag toggle, since rules are always rebuilt from the job
    /// queue alone.
    fn apply_modifier(&self, jobs: &mut JobQueue, modifier: &JobModifier) {
        match *modifier {
            JobModifier::DelJob(idx) => jobs.drop_job(idx),
            JobModifier::Erase(p) => {
                jobs.push(Job::new(JobAction::Erase, Selector::Solvable(p)));
            }
            JobModifier::Replace(_from, to) => {
                jobs.push(Job::new(JobAction::Install, Selector::Solvable(to)).forcebest());
            }
            JobModifier::Infarch(p) => {
                jobs.push(Job::new(JobAction::Install, Selector::Solvable(p)).forcebest());
            }
            JobModifier::Distupgrade(p) => {
                jobs.push(Job::new(JobAction::Lock, Selector::Solvable(p)));
            }
        }
    }

    // ---- main loop -------------------------------------------------------

    fn run_sat(&self, state: &mut SolverState, jobs: &JobQueue) -> Result<(), ProblemSet> {
        if let Err(problem) = self.process_assertions(state) {
            let mut problems = ProblemSet::new();
            problems.add(problem);
            return Err(problems);
        }

        let mut iterations: u32 = 0;
        loop {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                let mut problems = ProblemSet::new();
                problems.add(Problem::new().with_message(format!("solver exceeded {MAX_ITERATIONS} rounds without converging")));
                return Err(problems);
            }

            if let Err(conflict_rule) = self.propagate(state) {
                if state.decisions.level() <= 1 {
                    if self.disable_weak_rule(state, conflict_rule) {
                        continue;
                    }
                    let mut problems = ProblemSet::new();
                    problems.add(self.analyze_unsolvable(state, conflict_rule));
                    return Err(problems);
                }
                if self.analyze_and_backtrack(state, conflict_rule) == 0 {
                    if self.disable_weak_rule(state, conflict_rule) {
                        continue;
                    }
                    let mut problems = ProblemSet::new();
                    problems.add(self.analyze_unsolvable(state, conflict_rule));
                    return Err(problems);
                }
                continue;
            }

            match self.select_next(state, jobs) {
                Some((candidates, reason, installed_arch)) => {
                    self.select_and_install(state, &candidates, reason, installed_arch)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Decide every enabled single-literal (assertion) rule at level 1.
    /// Returns the conflicting problem if two assertions disagree.
    fn process_assertions(&self, state: &mut SolverState) -> Result<(), Problem> {
        state.decisions.increment_level();

        for rule in state.rules.iter() {
            if rule.is_disabled() || !rule.is_assertion() {
                continue;
            }
            let literal = rule.literals()[0];
            if state.decisions.conflict(literal) {
                let mut problem = Problem::new();
                problem.add_rule(rule.id());
                if let Some(forcing) = state.decisions.decision_rule(-literal) {
                    problem.add_rule(forcing);
                }
                return Err(problem);
            }
            if !state.decisions.satisfied(literal) {
                state.decisions.decide(literal, Reason::Rule(rule.id()));
            }
        }
        Ok(())
    }

    /// Drain `propagate_index` through the trail, running watched-literal
    /// unit propagation after each new decision.
    fn propagate(&self, state: &mut SolverState) -> Result<(), u32> {
        while state.propagate_index < state.decisions.len() {
            let (literal, _) = state.decisions.queue()[state.propagate_index];
            state.propagate_index += 1;

            let decisions = &state.decisions;
            let is_satisfied = |lit: Literal| -> Option<bool> {
                let pkg = lit.unsigned_abs();
                if decisions.decided(pkg) {
                    Some(decisions.satisfied(lit))
                } else {
                    None
                }
            };

            let results = {
                let mut propagator = Propagator::new(&mut state.watch_graph, &state.rules);
                propagator.propagate(literal, is_satisfied)
            };

            for result in results {
                match result {
                    PropagateResult::Ok => {}
                    PropagateResult::Unit(unit_lit, rule_id) => {
                        if state.decisions.conflict(unit_lit) {
                            return Err(rule_id);
                        }
                        if !state.decisions.satisfied(unit_lit) {
                            state.decisions.decide(unit_lit, Reason::Rule(rule_id));
                        }
                    }
                    PropagateResult::Conflict(rule_id) => return Err(rule_id),
                }
            }
        }
        Ok(())
    }

    // ---- branching heuristic (five tiers) ----------------------------------

    #[allow(clippy::type_complexity)]
    fn select_next(&self, state: &SolverState, jobs: &JobQueue) -> Option<(Vec<PackageId>, ReasonCode, Option<u32>)> {
        if let Some(hit) = self.select_job_tier(state, jobs) {
            return Some(hit);
        }
        if let Some(hit) = self.select_update_tier(state) {
            return Some(hit);
        }
        if let Some(hit) = self.select_any_unsatisfied_tier(state) {
            return Some(hit);
        }
        if let Some(hit) = self.select_weak_dep_tier(state) {
            return Some(hit);
        }
        None
    }

    /// Tier 1: any job-required variable still unset, first in job order.
    fn select_job_tier(&self, state: &SolverState, _jobs: &JobQueue) -> Option<(Vec<PackageId>, ReasonCode, Option<u32>)> {
        for rule in state.rules.class_rules(RuleClass::Job) {
            if rule.is_disabled() || rule.kind() != RuleKind::Job {
                continue;
            }
            if rule.literals().iter().any(|&l| state.decisions.satisfied(l)) {
                continue;
            }
            let undecided: Vec<PackageId> = rule
                .literals()
                .iter()
                .filter(|&&l| l > 0 && state.decisions.undecided(l.unsigned_abs()))
                .map(|&l| l.unsigned_abs())
                .collect();
            if !undecided.is_empty() {
                return Some((undecided, ReasonCode::ResolveJob, None));
            }
        }
        None
    }

    /// Tier 2: an installed package whose update rule is not yet satisfied.
    fn select_update_tier(&self, state: &SolverState) -> Option<(Vec<PackageId>, ReasonCode, Option<u32>)> {
        for rule in state.rules.class_rules(RuleClass::UpdateFeature) {
            if rule.is_disabled() || rule.kind() != RuleKind::Update {
                continue;
            }
            if rule.literals().iter().any(|&l| state.decisions.satisfied(l)) {
                continue;
            }
            let undecided: Vec<PackageId> = rule
                .literals()
                .iter()
                .filter(|&&l| l > 0 && state.decisions.undecided(l.unsigned_abs()))
                .map(|&l| l.unsigned_abs())
                .collect();
            if !undecided.is_empty() {
                let installed_arch = rule.literals().first().and_then(|&l| self.pool.solvable(l.unsigned_abs())).map(|s| s.arch);
                return Some((undecided, ReasonCode::UpdateInstalled, installed_arch));
            }
        }
        None
    }

    /// Tier 3: any rule (of any class) whose literals are all currently
    /// false or unset, delegating the pick to policy ordering.
    fn select_any_unsatisfied_tier(&self, state: &SolverState) -> Option<(Vec<PackageId>, ReasonCode, Option<u32>)> {
        for rule in state.rules.iter() {
            if rule.is_disabled() || rule.is_assertion() {
                continue;
            }
            if rule.literals().iter().any(|&l| state.decisions.satisfied(l)) {
                continue;
            }
            let undecided: Vec<PackageId> = rule
                .literals()
                .iter()
                .filter(|&&l| l > 0 && state.decisions.undecided(l.unsigned_abs()))
                .map(|&l| l.unsigned_abs())
                .collect();
            if !undecided.is_empty() {
                return Some((undecided, ReasonCode::Resolve, None));
            }
        }
        None
    }

    /// Tier 4: pull in recommends/suggests of already-installed packages.
    fn select_weak_dep_tier(&self, state: &SolverState) -> Option<(Vec<PackageId>, ReasonCode, Option<u32>)> {
        if self.config.flags.ignore_recommended {
            return None;
        }
        for p in state.decisions.installed_packages() {
            if p == SYSTEM_SOLVABLE {
                continue;
            }
            let Some(s) = self.pool.solvable(p) else { continue };
            for (deps, reason) in [(&s.recommends, ReasonCode::Recommended), (&s.suggests, ReasonCode::WeakDep)] {
                for dep in deps {
                    let providers = self.pool.whatprovides(dep);
                    let already_pulled_in = providers.iter().any(|&q| state.decisions.decided_install(q));
                    if already_pulled_in && self.config.flags.ignore_already_recommended {
                        continue;
                    }
                    let undecided: Vec<PackageId> = providers.iter().copied().filter(|&q| state.decisions.undecided(q)).collect();
                    if !undecided.is_empty() {
                        return Some((undecided, reason, None));
                    }
                }
            }
        }
        None
    }

    /// Order `candidates` by policy, decide the best one, and push a branch
    /// frame recording the remaining alternatives. Propagates to a fixed
    /// point, running CDCL backjumping on any local conflict.
    fn select_and_install(
        &self,
        state: &mut SolverState,
        candidates: &[PackageId],
        reason: ReasonCode,
        installed_arch: Option<u32>,
    ) -> Result<(), ProblemSet> {
        let ordered = self.policy.order(self.pool, candidates, installed_arch);
        let Some(&selected) = ordered.first() else {
            return Ok(());
        };

        if ordered.len() > 1 {
            state.branches.push(Branch {
                level: state.decisions.level(),
                alternatives: ordered[1..].iter().map(|&p| p as Literal).collect(),
                reason,
            });
        }

        state.decisions.increment_level();
        state.decisions.decide(selected as Literal, Reason::Policy(reason));

        loop {
            match self.propagate(state) {
                Ok(()) => return Ok(()),
                Err(conflict_rule) => {
                    if state.decisions.level() <= 1 {
                        if self.disable_weak_rule(state, conflict_rule) {
                            continue;
                        }
                        let mut problems = ProblemSet::new();
                        problems.add(self.analyze_unsolvable(state, conflict_rule));
                        return Err(problems);
                    }
                    if self.analyze_and_backtrack(state, conflict_rule) == 0 {
                        if self.disable_weak_rule(state, conflict_rule) {
                            continue;
                        }
                        let mut problems = ProblemSet::new();
                        problems.add(self.analyze_unsolvable(state, conflict_rule));
                        return Err(problems);
                    }
                }
            }
        }
    }

    /// Last resort before giving up on an unsolvable conflict at level <= 1:
    /// walk the conflicting rule and its forcing causes for a weak rule
    /// (a choice rule, or any rule a `SOLVER_WEAK` job marked weak) and
    /// disable it so the next propagation pass can route around it. Returns
    /// whether a rule was disabled; the caller must re-propagate rather
    /// than re-decide, since the trail up to the conflict is unaffected.
    fn disable_weak_rule(&self, state: &mut SolverState, conflict_rule_id: u32) -> bool {
        let mut candidates = vec![conflict_rule_id];
        if let Some(rule) = state.rules.get(conflict_rule_id) {
            for &lit in rule.literals() {
                if let Some(cause_id) = state.decisions.decision_rule(lit) {
                    candidates.push(cause_id);
                }
            }
        }
        for rule_id in candidates {
            if let Some(rule) = state.rules.get_mut(rule_id) {
                if rule.is_weak() && !rule.is_disabled() {
                    rule.disable();
                    // A disabled rule is skipped by the propagator outright
                    // (see `Propagator::propagate`), so the watch graph
                    // needs no update - only the decisions made since the
                    // level-1 assertion pass, which may have depended on
                    // this rule, need to be undone and re-derived.
                    state.decisions.revert_to_level(1);
                    state.branches.clear();
                    state.reset_propagate_index();
                    return true;
                }
            }
        }
        false
    }

    // ---- conflict analysis (1-UIP) ------------------------------------------

    /// Resolve back through the implication graph from `conflict_rule_id`
    /// until exactly one literal at the current level remains (the UIP),
    /// producing a learnt clause and the level to backjump to.
    fn analyze_conflict(&self, state: &SolverState, conflict_rule_id: u32) -> (Literal, u32, Rule) {
        let current_level = state.decisions.level();
        let trail = state.decisions.queue();

        let mut seen: HashSet<PackageId> = HashSet::new();
        let mut num_at_current_level: u32 = 0;
        let mut other_learnt: Vec<Literal> = Vec::new();
        let mut backjump_level: u32 = 0;

        let mut fold_rule = |rule_id: u32, seen: &mut HashSet<PackageId>, num_at_current: &mut u32| {
            let Some(rule) = state.rules.get(rule_id) else { return };
            for &lit in rule.literals() {
                let pkg = lit.unsigned_abs();
                if seen.contains(&pkg) || state.decisions.satisfied(lit) {
                    continue;
                }
                let Some(level) = state.decisions.decision_level(lit) else { continue };
                if level == 0 {
                    continue;
                }
                seen.insert(pkg);
                if level == current_level {
                    *num_at_current += 1;
                } else {
                    other_learnt.push(lit);
                    backjump_level = backjump_level.max(level);
                }
            }
        };

        fold_rule(conflict_rule_id, &mut seen, &mut num_at_current_level);

        let mut idx = trail.len();
        let mut uip: Option<Literal> = None;
        while num_at_current_level > 0 && idx > 0 {
            idx -= 1;
            let (lit, _) = trail[idx];
            let pkg = lit.unsigned_abs();
            if !seen.contains(&pkg) || state.decisions.decision_level(lit) != Some(current_level) {
                continue;
            }
            num_at_current_level -= 1;
            if num_at_current_level == 0 {
                uip = Some(-lit);
                break;
            }
            if let Some(cause_id) = state.decisions.decision_rule(lit) {
                fold_rule(cause_id, &mut seen, &mut num_at_current_level);
            }
        }

        let uip = uip.unwrap_or_else(|| {
            trail
                .iter()
                .rev()
                .find(|&&(l, _)| state.decisions.decision_level(l) == Some(current_level))
                .map(|&(l, _)| -l)
                .unwrap_or(1)
        });

        let mut learnt_literals = vec![uip];
        for lit in other_learnt {
            let negated = -lit;
            if !learnt_literals.contains(&negated) {
                learnt_literals.push(negated);
            }
        }

        if backjump_level == 0 || backjump_level >= current_level {
            backjump_level = current_level.saturating_sub(1);
        }
        if current_level > 1 && backjump_level == 0 {
            backjump_level = 1;
        }

        (uip, backjump_level, Rule::learned(learnt_literals))
    }

    /// Backjump to the analysed level, add the learnt clause, and assert its
    /// UIP literal. Returns the new level, or 0 if no legal backjump exists.
    fn analyze_and_backtrack(&self, state: &mut SolverState, conflict_rule: u32) -> u32 {
        let (uip, backjump_level, learnt) = self.analyze_conflict(state, conflict_rule);

        if backjump_level == 0 || backjump_level >= state.decisions.level() {
            return 0;
        }

        state.decisions.revert_to_level(backjump_level);
        state.reset_propagate_index();
        state.branches.retain(|b| b.level <= backjump_level);

        if !learnt.literals().is_empty() {
            let learnt_id = state.rules.add(learnt);
            if let Some(rule) = state.rules.get(learnt_id) {
                state.watch_graph.add_rule(rule);
            }
            if !state.decisions.satisfied(uip) {
                state.decisions.decide(uip, Reason::Rule(learnt_id));
            }
        }

        backjump_level
    }

    /// Collect the rules responsible for an unsolvable conflict at level
    /// <= 1 into a `Problem`.
    fn analyze_unsolvable(&self, state: &SolverState, conflict_rule_id: u32) -> Problem {
        let mut problem = Problem::new();
        let Some(rule) = state.rules.get(conflict_rule_id) else {
            return problem;
        };
        if rule.kind() == RuleKind::NothingProvidesDep {
            let name = rule.target_name.clone().unwrap_or_default();
            problem = problem.with_message(format!("nothing provides '{name}' needed by the request"));
        }
        problem.add_rule(rule.id());
        for &lit in rule.literals() {
            if let Some(cause_id) = state.decisions.decision_rule(lit) {
                problem.add_rule(cause_id);
            }
        }
        problem
    }

    // ---- result assembly -----------------------------------------------------

    fn build_result(&self, state: SolverState, jobs: &JobQueue) -> SolverResult {
        let mut transaction = transaction::classify(self.pool, &state.decisions, jobs);

        let explicit = self.explicit_cleandeps_targets(jobs);
        let cleandeps_set = if explicit.is_empty() {
            HashSet::new()
        } else {
            let mut removed = cleandeps::cleandeps(self.pool, jobs, &explicit);
            // Mistake correction: pull back anything a
            // surviving installed package still recommends or supplements.
            for p in cleandeps::reconsideration_candidates(self.pool, &removed) {
                removed.remove(&p);
            }
            removed
        };

        // `classify` only diffs the decided-install set; a cleandeps target
        // the SAT core never bothered to decide (nothing constrains it once
        // its dependents are gone) would otherwise be silently kept. Give
        // every cleandeps target its own erase step unless it already has
        // one through some other classified step.
        for &p in &cleandeps_set {
            let already_erased = transaction.iter().any(|step| step.erased_package() == Some(p));
            if !already_erased {
                transaction.steps.push(TransactionStep::Erase(p));
            }
        }

        SolverResult { transaction, cleandeps: cleandeps_set, decisions: state.decisions, rules: state.rules }
    }

    /// Installed packages named by an explicit cleandeps-flagged erase or
    /// update-away job.
    fn explicit_cleandeps_targets(&self, jobs: &JobQueue) -> HashSet<PackageId> {
        let mut set = HashSet::new();
        for (_, job) in jobs.iter() {
            if !job.flags.cleandeps {
                continue;
            }
            if matches!(job.action, JobAction::Erase | JobAction::Update | JobAction::Distupgrade) {
                for p in job.candidates(self.pool) {
                    if self.pool.is_installed(p) {
                        set.insert(p);
                    }
                }
            }
        }
        set
    }
}

/// Mutable CDCL working state for one `solve()` call.
struct SolverState {
    rules: RuleSet,
    decisions: Decisions,
    watch_graph: WatchGraph,
    branches: Vec<Branch>,
    propagate_index: usize,
}

impl SolverState {
    fn new(rules: RuleSet) -> Self {
        let watch_graph = WatchGraph::from_rules(&rules);
        Self { rules, decisions: Decisions::new(), watch_graph, branches: Vec::new(), propagate_index: 0 }
    }

    fn reset_propagate_index(&mut self) {
        self.propagate_index = self.decisions.len();
    }
}

/// A branch frame: the level at which a choice was made and the
/// policy-ordered alternatives not taken. Kept for introspection and so a
/// future conflict-driven retry can inspect what remains untried without
/// rebuilding the trail from scratch.
#[allow(dead_code)]
struct Branch {
    level: u32,
    alternatives: Vec<Literal>,
    reason: ReasonCode,
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::SolverFlags;
    use crate::pool::{Dep, Solvable};
    use crate::solver::job::{Job, Selector};

    #[test]
    fn trivial_install_resolves_requires() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");
        pool.create_repo("main", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Name(b_name));
        let a_id = pool.add_solvable(a);
        let b_id = pool.add_solvable(Solvable::new(0, b_name, "1-1", noarch));
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let solver = Solver::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(a_id)));

        let result = solver.solve(&jobs).expect("expected a solution");
        assert!(result.decisions.decided_install(a_id));
        assert!(result.decisions.decided_install(b_id));
    }

    #[test]
    fn missing_provider_is_unsolvable() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let missing = pool.intern_string("missing");
        pool.create_repo("main", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Name(missing));
        let a_id = pool.add_solvable(a);
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags { dontfix: false, ..Default::default() });
        let policy = Policy::new();
        let solver = Solver::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(a_id)));

        let problems = solver.solve(&jobs).expect_err("expected unsatisfiable result");
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn conflicting_siblings_pick_the_requested_one() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");
        let foo = pool.intern_string("foo");
        pool.create_repo("main", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.provides.push(Dep::Name(foo));
        let mut b = Solvable::new(0, b_name, "1-1", noarch);
        b.provides.push(Dep::Name(foo));
        let a_id = pool.add_solvable(a);
        let b_id = pool.add_solvable(b);
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let solver = Solver::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(b_id)));

        let result = solver.solve(&jobs).expect("expected a solution");
        assert!(result.decisions.decided_install(b_id));
        assert!(!result.decisions.decided_install(a_id));
    }
}
