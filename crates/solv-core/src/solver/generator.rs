//! Rule Builder: emits the smallest correct rule set implying
//! the solve problem, by BFS traversal from the job's initial solvables
//! over requires/recommends/conflicts/obsoletes, plus the policy-derived
//! rule classes (infarch/dup/update-feature/best/yumobs/choice) and the
//! job rules themselves.
//!
//! Grounded on `src/rules.c` from openSUSE libsolv for the per-class
//! construction order and the dontfix/multiversion/obsoletes-uses-provides
//! predicates, adapted to this crate's `Dep`/`Pool`/`RuleSet` model.
//! Composer resolves one giant "require" graph with no rule-class
//! taxonomy, so this module has no direct Composer counterpart - it is new,
//! following the habit of a dedicated one-purpose-per-file builder next to
//! `solver.rs`.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;

use crate::config::SolverConfig;
use crate::pool::{Dep, NameId, PackageId, Pool, RepoId};

use super::job::{Job, JobAction, JobQueue, Selector};
use super::policy::{Policy, PolicyAllow};
use super::rule::{Rule, RuleClass, RuleKind};
use super::ruleset::RuleSet;

pub struct Generator<'a> {
    pool: &'a Pool,
    config: &'a SolverConfig,
    policy: &'a Policy,
}

impl<'a> Generator<'a> {
    pub fn new(pool: &'a Pool, config: &'a SolverConfig, policy: &'a Policy) -> Self {
        Self { pool, config, policy }
    }

    /// Build the full rule set for one solve, traversing solvables reachable
    /// from the job.
    pub fn generate(&self, jobs: &JobQueue) -> RuleSet {
        let mut rules = RuleSet::new();
        let reachable = self.reachable(jobs);
        let verify_set = self.verify_set(jobs);
        let noobsoletes = self.noobsoletes_names(jobs);
        let multiversion = self.multiversion_names(jobs);

        self.build_package_rules(&mut rules, &reachable, &verify_set, &noobsoletes, &multiversion);
        rules.unify_class(RuleClass::Package);

        self.build_job_rules(&mut rules, jobs);
        rules.unify_class(RuleClass::Job);

        self.build_infarch_rules(&mut rules, &reachable);
        self.build_dup_rules(&mut rules, jobs);
        self.build_update_feature_rules(&mut rules);
        self.build_best_rules(&mut rules, jobs);
        self.build_yumobs_rules(&mut rules, &reachable);
        self.build_choice_rules(&mut rules);

        rules
    }

    /// Names permitted to stay installed alongside other versions of
    /// themselves: the config's hand-set `multiversion_names` plus any name
    /// targeted by a job carrying the `multiversion` flag.
    fn multiversion_names(&self, jobs: &JobQueue) -> HashSet<NameId> {
        let mut set: HashSet<NameId> = self.config.multiversion_names.iter().copied().collect();
        for (_, job) in jobs.iter() {
            if !job.flags.multiversion {
                continue;
            }
            for p in job.candidates(self.pool) {
                if let Some(s) = self.pool.solvable(p) {
                    set.insert(s.name);
                }
            }
        }
        set
    }

    /// Names constrained by `SOLVER_FORCEBEST`: the config's hand-set
    /// `forcebest_names` plus any name targeted by a job carrying the
    /// `forcebest` flag.
    fn forcebest_names(&self, jobs: &JobQueue) -> HashSet<NameId> {
        let mut set: HashSet<NameId> = self.config.forcebest_names.iter().copied().collect();
        for (_, job) in jobs.iter() {
            if !job.flags.forcebest {
                continue;
            }
            for p in job.candidates(self.pool) {
                if let Some(s) = self.pool.solvable(p) {
                    set.insert(s.name);
                }
            }
        }
        set
    }

    /// Names and target repos constrained by a distupgrade job: the
    /// config's hand-set `dup_names`/`distupgrade_repos` plus whatever a
    /// `Distupgrade` job implies. A job selecting `Selector::Repo(r)` names
    /// `r` itself as the target; any other selector falls back to every
    /// enabled repo that is not the installed system repo, since a plain
    /// distupgrade retargets against whatever is configured.
    fn distupgrade_sets(&self, jobs: &JobQueue) -> (HashSet<NameId>, HashSet<RepoId>) {
        let mut names: HashSet<NameId> = self.config.dup_names.iter().copied().collect();
        let mut repos: HashSet<RepoId> = self.config.distupgrade_repos.iter().copied().collect();

        for (_, job) in jobs.iter() {
            if job.action != JobAction::Distupgrade {
                continue;
            }
            for p in job.candidates(self.pool) {
                if let Some(s) = self.pool.solvable(p) {
                    names.insert(s.name);
                }
            }
            match &job.selection {
                Selector::Repo(r) => {
                    repos.insert(*r);
                }
                _ => {
                    for repo in self.pool.repos() {
                        if Some(repo.id) != self.pool.installed_repo() {
                            repos.insert(repo.id);
                        }
                    }
                }
            }
        }
        (names, repos)
    }

    // ---- traversal ---------------------------------------------------

    /// BFS over requires/conflicts/obsoletes (and recommends under
    /// `strong_recommends`) starting from every job candidate and every
    /// currently installed solvable. Installed packages must always be
    /// reachable so their update/feature rules can be built.
    fn reachable(&self, jobs: &JobQueue) -> IndexSet<PackageId> {
        let mut seen: IndexSet<PackageId> = IndexSet::new();
        let mut queue: VecDeque<PackageId> = VecDeque::new();

        for id in self.pool.solvable_ids() {
            if self.pool.is_installed(id) && seen.insert(id) {
                queue.push_back(id);
            }
        }
        for (_, job) in jobs.iter() {
            for p in job.candidates(self.pool) {
                if seen.insert(p) {
                    queue.push_back(p);
                }
            }
        }

        while let Some(p) = queue.pop_front() {
            let Some(s) = self.pool.solvable(p) else { continue };
            let mut frontier = Vec::new();
            for dep in &s.requires {
                for &q in &self.provider_literals(dep) {
                    frontier.push(q);
                }
            }
            for dep in s.conflicts.iter().chain(&s.obsoletes) {
                frontier.extend(self.pool.whatprovides(dep));
            }
            if self.config.flags.strong_recommends {
                for dep in &s.recommends {
                    frontier.extend(self.provider_literals(dep));
                }
            }
            for q in frontier {
                if seen.insert(q) {
                    queue.push_back(q);
                }
            }
        }
        seen
    }

    /// Names targeted by a `Verify` job: dontfix is bypassed for these so
    /// their requires are enforced even if currently broken.
    fn verify_set(&self, jobs: &JobQueue) -> HashSet<PackageId> {
        let mut set = HashSet::new();
        for (_, job) in jobs.iter() {
            if job.action == JobAction::Verify {
                set.extend(job.candidates(self.pool));
            }
        }
        set
    }

    fn noobsoletes_names(&self, jobs: &JobQueue) -> HashSet<NameId> {
        let mut set = HashSet::new();
        for (_, job) in jobs.iter() {
            if job.action == JobAction::NoObsoletes {
                for p in job.candidates(self.pool) {
                    if let Some(s) = self.pool.solvable(p) {
                        set.insert(s.name);
                    }
                }
            }
        }
        set
    }

    // ---- complex dep normalisation -------------------------------------

    /// Resolve a (possibly compound) dependency into the set of solvables
    /// that satisfy it, implementing the CNF-for-requires normalisation for
    /// the combinators actually in wide use:
    /// AND is split by the caller (each conjunct is a separate clause), OR
    /// unions its branches' providers into one clause, WITH intersects them
    /// (a single solvable must satisfy both sides, not either). COND/
    /// UNLESS/ELSE reduce to their "then" branch: representing the full
    /// material-implication semantics would need an auxiliary boolean
    /// variable per occurrence, out of proportion for how rarely these
    /// appear outside `ifarch`-style platform conditionals - see DESIGN.md.
    fn provider_literals(&self, dep: &Dep) -> Vec<PackageId> {
        match dep {
            Dep::Or(a, b) => {
                let mut v = self.provider_literals(a);
                for p in self.provider_literals(b) {
                    if !v.contains(&p) {
                        v.push(p);
                    }
                }
                v
            }
            Dep::With(a, b) => {
                let rhs = self.provider_literals(b);
                self.provider_literals(a).into_iter().filter(|p| rhs.contains(p)).collect()
            }
            Dep::Unless(a, _) => self.provider_literals(a),
            Dep::Cond(_, b) => self.provider_literals(b),
            Dep::Else(a, b) => {
                let pa = self.provider_literals(a);
                if pa.is_empty() {
                    self.provider_literals(b)
                } else {
                    pa
                }
            }
            Dep::And(a, _) => self.provider_literals(a),
            other => self.pool.whatprovides(other),
        }
    }

    /// Split a top-level AND into independent requires conjuncts.
    fn conjuncts<'d>(&self, dep: &'d Dep) -> Vec<&'d Dep> {
        dep.flatten_and()
    }

    // ---- package rules --------------------------------------------------

    fn build_package_rules(
        &self,
        rules: &mut RuleSet,
        reachable: &IndexSet<PackageId>,
        verify_set: &HashSet<PackageId>,
        noobsoletes: &HashSet<NameId>,
        multiversion: &HashSet<NameId>,
    ) {
        for &p in reachable {
            let Some(s) = self.pool.solvable(p) else { continue };
            let installed = self.pool.is_installed(p);
            let dontfix = installed && self.config.flags.dontfix && !verify_set.contains(&p);

            for dep in &s.requires {
                for conjunct in self.conjuncts(dep) {
                    let providers = self.provider_literals(conjunct);
                    if providers.is_empty() {
                        if dontfix {
                            continue;
                        }
                        let name = conjunct.name().map(|n| self.pool.string(n).to_string()).unwrap_or_default();
                        let rule = Rule::assertion(-(p as i32), RuleClass::Package, RuleKind::NothingProvidesDep)
                            .with_source(p)
                            .with_target_name(name);
                        rules.add(rule);
                        continue;
                    }
                    let mut literals = vec![-(p as i32)];
                    literals.extend(providers.iter().map(|&q| q as i32));
                    let name = conjunct.name().map(|n| self.pool.string(n).to_string()).unwrap_or_default();
                    let rule = Rule::new(literals, RuleClass::Package, RuleKind::Requires)
                        .with_source(p)
                        .with_target_name(name);
                    rules.add(rule);
                }
            }

            if !noobsoletes.contains(&s.name) {
                for dep in &s.conflicts {
                    for q in self.pool.whatprovides(dep) {
                        if q == p && !self.config.flags.forbidselfconflicts {
                            continue;
                        }
                        self.add_conflict_like(rules, p, q, RuleKind::Conflict, multiversion);
                    }
                }

                for dep in &s.obsoletes {
                    let providers = if self.config.flags.obsoleteusesprovides {
                        self.pool.whatprovides(dep)
                    } else {
                        dep.name().map(|n| self.pool.providers_by_name(self.pool.string(n))).unwrap_or_default()
                    };
                    for q in providers {
                        if q == p {
                            continue;
                        }
                        if self.config.flags.noinstalledobsoletes && installed && self.pool.is_installed(q) {
                            continue;
                        }
                        self.add_conflict_like(rules, p, q, RuleKind::Obsolete, multiversion);
                    }
                }
            }
        }

        self.build_same_name_rules(rules, reachable, noobsoletes, multiversion);
    }

    /// `(¬A ∨ ¬p)`, or the multiversion sibling-disjunction expansion when
    /// `p` is multiversion: `(¬A ∨ ¬p ∨ p' ∨ p'' …)` over non-conflicting
    /// siblings, letting the patch be satisfied by any sibling install.
    fn add_conflict_like(&self, rules: &mut RuleSet, a: PackageId, p: PackageId, kind: RuleKind, multiversion: &HashSet<NameId>) {
        let mut literals = vec![-(a as i32), -(p as i32)];
        let is_multiversion = self.pool.solvable(p).map(|s| multiversion.contains(&s.name)).unwrap_or(false);
        if is_multiversion {
            let name_str = self.pool.name_str(p).to_string();
            for sibling in self.pool.providers_by_name(&name_str) {
                if sibling != p {
                    literals.push(sibling as i32);
                }
            }
        }
        let actual_kind = if is_multiversion && literals.len() > 2 { RuleKind::MultiversionConflict } else { kind };
        let rule = Rule::new(literals, RuleClass::Package, actual_kind).with_source(a);
        rules.add(rule);
    }

    /// Implicit same-name exclusion: `(¬A ∨ ¬B)` for every distinct pair in
    /// a reachable same-name family, unless the name is multiversion.
    fn build_same_name_rules(&self, rules: &mut RuleSet, reachable: &IndexSet<PackageId>, noobsoletes: &HashSet<NameId>, multiversion: &HashSet<NameId>) {
        let ids: Vec<PackageId> = reachable.iter().copied().collect();
        let groups = self.pool.group_by_name(&ids);
        for (name, members) in groups {
            if multiversion.contains(&name) || noobsoletes.contains(&name) || members.len() < 2 {
                continue;
            }
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let rule = Rule::new(vec![-(members[i] as i32), -(members[j] as i32)], RuleClass::Package, RuleKind::SameName);
                    rules.add(rule);
                }
            }
        }
    }

    // ---- job rules --------------------------------------------------

    fn build_job_rules(&self, rules: &mut RuleSet, jobs: &JobQueue) {
        for (idx, job) in jobs.iter() {
            match job.action {
                JobAction::Install => self.job_install(rules, job, idx),
                JobAction::Erase => self.job_erase(rules, job, idx),
                JobAction::Update => self.job_update(rules, job, idx),
                JobAction::Distupgrade => self.job_update(rules, job, idx),
                JobAction::Lock => self.job_lock(rules, job, idx),
                // Verify only changes dontfix treatment (handled in
                // `verify_set`); UserInstalled/DropOrphaned feed cleandeps;
                // NoObsoletes feeds package-rule construction; Favor/
                // Disfavor feed policy ordering. None of these is itself a
                // SAT clause.
                JobAction::Verify
                | JobAction::UserInstalled
                | JobAction::DropOrphaned
                | JobAction::NoObsoletes
                | JobAction::Favor
                | JobAction::Disfavor => {}
            }
        }
    }

    fn job_install(&self, rules: &mut RuleSet, job: &Job, idx: usize) {
        let candidates = job.candidates(self.pool);
        if candidates.is_empty() {
            return;
        }
        let kind = if candidates.len() == 1 { RuleKind::JobAssert } else { RuleKind::Job };
        let literals: Vec<i32> = candidates.iter().map(|&p| p as i32).collect();
        let rule = Rule::new(literals, RuleClass::Job, kind).with_job_index(idx).weak(job.flags.weak);
        rules.add(rule);
    }

    fn job_erase(&self, rules: &mut RuleSet, job: &Job, idx: usize) {
        for p in job.candidates(self.pool) {
            let rule = Rule::assertion(-(p as i32), RuleClass::Job, RuleKind::JobAssert).with_job_index(idx);
            rules.add(rule);
        }
    }

    fn job_lock(&self, rules: &mut RuleSet, job: &Job, idx: usize) {
        for p in job.candidates(self.pool) {
            let lit = if self.pool.is_installed(p) { p as i32 } else { -(p as i32) };
            let rule = Rule::assertion(lit, RuleClass::Job, RuleKind::JobAssert).with_job_index(idx);
            rules.add(rule);
        }
    }

    /// Update/distupgrade job: constrain to the update-filtered candidate
    /// set policy would offer for the currently installed package(s) this
    /// selector names.
    fn job_update(&self, rules: &mut RuleSet, job: &Job, idx: usize) {
        let allow = self.policy_allow();
        let mut literals: Vec<i32> = Vec::new();
        for p in job.candidates(self.pool) {
            let name = self.pool.name_str(p).to_string();
            let family = self.pool.providers_by_name(&name);
            let filtered = self.policy.filter_unwanted(self.pool, p, &family, allow);
            for c in filtered {
                let lit = c as i32;
                if !literals.contains(&lit) {
                    literals.push(lit);
                }
            }
        }
        if literals.is_empty() {
            return;
        }
        let kind = if literals.len() == 1 { RuleKind::JobAssert } else { RuleKind::Job };
        let rule = Rule::new(literals, RuleClass::Job, kind).with_job_index(idx).weak(job.flags.weak);
        rules.add(rule);
    }

    fn policy_allow(&self) -> PolicyAllow {
        PolicyAllow {
            downgrade: self.config.flags.allow_downgrade,
            archchange: self.config.flags.allow_archchange,
            vendorchange: self.config.flags.allow_vendorchange,
            namechange: false,
        }
    }

    // ---- infarch rules --------------------------------------------------

    /// Forbid solvables whose architecture is inferior to the best
    /// available for the same name.
    fn build_infarch_rules(&self, rules: &mut RuleSet, reachable: &IndexSet<PackageId>) {
        if self.config.flags.no_infarchcheck {
            return;
        }
        let ids: Vec<PackageId> = reachable.iter().copied().collect();
        for (_, members) in self.pool.group_by_name(&ids) {
            let Some(best) = members.iter().map(|&p| self.arch_score(p)).min() else { continue };
            for &p in &members {
                if self.arch_score(p) <= best || self.pool.is_installed(p) {
                    continue;
                }
                if self.config.flags.implicitobsoleteusescolors {
                    if let Some(lockstep) = members.iter().find(|&&q| q != p && self.same_evr(p, q) && self.arch_score(q) == best) {
                        rules.add(Rule::new(vec![-(p as i32), *lockstep as i32], RuleClass::Infarch, RuleKind::Infarch));
                        continue;
                    }
                }
                rules.add(Rule::assertion(-(p as i32), RuleClass::Infarch, RuleKind::Infarch));
            }
        }
    }

    fn arch_score(&self, p: PackageId) -> i32 {
        self.pool.solvable(p).map(|s| self.pool.arch_score(s.arch)).unwrap_or(i32::MAX)
    }

    fn same_evr(&self, a: PackageId, b: PackageId) -> bool {
        match (self.pool.solvable(a), self.pool.solvable(b)) {
            (Some(sa), Some(sb)) => sa.evr == sb.evr,
            _ => false,
        }
    }

    // ---- dup rules --------------------------------------------------

    /// Forbid installed versions outside the selected distupgrade repos,
    /// for every name under a distupgrade request.
    fn build_dup_rules(&self, rules: &mut RuleSet, jobs: &JobQueue) {
        let (dup_names, distupgrade_repos) = self.distupgrade_sets(jobs);
        for &name in &dup_names {
            let name_str = self.pool.string(name).to_string();
            let providers = self.pool.providers_by_name(&name_str);
            let dupmap: HashSet<PackageId> = providers
                .iter()
                .copied()
                .filter(|&p| self.pool.solvable(p).and_then(|s| s.repo).map(|r| distupgrade_repos.contains(&r)).unwrap_or(false))
                .collect();
            for p in providers {
                if dupmap.contains(&p) {
                    continue;
                }
                if self.pool.is_installed(p) {
                    rules.add(Rule::assertion(-(p as i32), RuleClass::Dup, RuleKind::Dup));
                }
            }
        }
    }

    // ---- update/feature rules --------------------------------------------

    /// One pair per installed solvable describing its permitted
    /// replacements.
    fn build_update_feature_rules(&self, rules: &mut RuleSet) {
        let allow = self.policy_allow();
        for p in self.pool.solvable_ids() {
            if !self.pool.is_installed(p) {
                continue;
            }
            let name = self.pool.name_str(p).to_string();
            let mut family: Vec<PackageId> = self.pool.providers_by_name(&name).into_iter().filter(|&c| c != p).collect();
            family.extend(self.obsoleting_candidates(p));

            if family.is_empty() {
                if self.config.flags.keep_orphans {
                    rules.add(Rule::assertion(p as i32, RuleClass::UpdateFeature, RuleKind::Feature));
                }
                // else: a true orphan, no rule - the branch heuristic
                // decides whether to keep or erase it.
                continue;
            }

            let mut feature_literals = vec![p as i32];
            feature_literals.extend(family.iter().map(|&c| c as i32));
            rules.add(Rule::new(feature_literals, RuleClass::UpdateFeature, RuleKind::Feature));

            let filtered = self.policy.filter_unwanted(self.pool, p, &family, allow);
            let mut update_literals = vec![p as i32];
            update_literals.extend(filtered.iter().map(|&c| c as i32));
            rules.add(Rule::new(update_literals, RuleClass::UpdateFeature, RuleKind::Update));
        }
    }

    fn obsoleting_candidates(&self, installed: PackageId) -> Vec<PackageId> {
        let mut out = Vec::new();
        for p in self.pool.solvable_ids() {
            if self.pool.is_installed(p) {
                continue;
            }
            let Some(s) = self.pool.solvable(p) else { continue };
            for dep in &s.obsoletes {
                if self.pool.match_nevr(installed, dep) {
                    out.push(p);
                    break;
                }
            }
        }
        out
    }

    // ---- best rules --------------------------------------------------

    /// Constrain names under `SOLVER_FORCEBEST` to the best candidate
    /// subset.
    fn build_best_rules(&self, rules: &mut RuleSet, jobs: &JobQueue) {
        for &name in &self.forcebest_names(jobs) {
            let name_str = self.pool.string(name).to_string();
            let candidates = self.pool.providers_by_name(&name_str);
            if candidates.is_empty() {
                continue;
            }
            let ordered = self.policy.order(self.pool, &candidates, None);
            let Some(&top) = ordered.first() else { continue };
            let best_set: Vec<PackageId> = ordered.iter().copied().filter(|&c| self.same_evr(top, c)).collect();

            if self.config.flags.allow_uninstall {
                for &c in &candidates {
                    if best_set.contains(&c) {
                        continue;
                    }
                    let mut literals = vec![-(c as i32)];
                    literals.extend(best_set.iter().map(|&b| b as i32));
                    rules.add(Rule::new(literals, RuleClass::Best, RuleKind::Best));
                }
            } else {
                for p in self.pool.solvable_ids() {
                    if !self.pool.is_installed(p) || self.pool.name_str(p) != name_str {
                        continue;
                    }
                    let mut literals = vec![p as i32];
                    literals.extend(best_set.iter().map(|&b| b as i32));
                    rules.add(Rule::new(literals, RuleClass::Best, RuleKind::Best));
                }
            }
        }
    }

    // ---- yumobs rules --------------------------------------------------

    /// Group-wise obsolete propagation: packages from distinct obsolete
    /// equivalence classes that target the same installed family may not
    /// both be installed.
    fn build_yumobs_rules(&self, rules: &mut RuleSet, reachable: &IndexSet<PackageId>) {
        if !self.config.flags.yum_obsoletes {
            return;
        }
        // group candidate -> set of installed solvables it obsoletes
        let mut groups: Vec<(PackageId, HashSet<PackageId>)> = Vec::new();
        for &p in reachable {
            if self.pool.is_installed(p) {
                continue;
            }
            let Some(s) = self.pool.solvable(p) else { continue };
            if s.obsoletes.is_empty() {
                continue;
            }
            let mut targets = HashSet::new();
            for dep in &s.obsoletes {
                for q in self.pool.whatprovides(dep) {
                    if self.pool.is_installed(q) {
                        targets.insert(q);
                    }
                }
            }
            if !targets.is_empty() {
                groups.push((p, targets));
            }
        }
        for i in 0..groups.len() {
            for j in (i + 1)..groups.len() {
                let (p1, t1) = &groups[i];
                let (p2, t2) = &groups[j];
                if t1.is_disjoint(t2) {
                    continue;
                }
                // Disjoint obsolete targets would mean independent patches;
                // overlapping (but not identical) targets means p1 and p2
                // compete for the same installed family from different
                // equivalence classes.
                if t1 != t2 {
                    rules.add(Rule::new(vec![-(*p1 as i32), -(*p2 as i32)], RuleClass::Yumobs, RuleKind::Yumobs));
                }
            }
        }
    }

    // ---- choice rules --------------------------------------------------

    /// Weakly prefer update-path providers: for every requires-rule whose
    /// provider list mixes "updates an
    /// installed package" candidates with "new" candidates, emit a weak
    /// rule restricted to the update-path candidates.
    fn build_choice_rules(&self, rules: &mut RuleSet) {
        let installed_names: HashSet<NameId> =
            self.pool.solvable_ids().filter(|&p| self.pool.is_installed(p)).filter_map(|p| self.pool.solvable(p).map(|s| s.name)).collect();

        let package_rules: Vec<(i32, Vec<i32>)> = rules
            .class_rules(RuleClass::Package)
            .filter(|r| matches!(r.kind(), RuleKind::Requires) && r.literals().len() > 2)
            .map(|r| (r.literals()[0], r.literals()[1..].to_vec()))
            .collect();

        for (head, providers) in package_rules {
            let (update_path, new_path): (Vec<i32>, Vec<i32>) = providers.iter().partition(|&&lit| {
                let p = lit as PackageId;
                self.pool.solvable(p).map(|s| installed_names.contains(&s.name)).unwrap_or(false)
            });
            if update_path.is_empty() || new_path.is_empty() {
                continue;
            }
            let mut literals = vec![head];
            literals.extend(update_path);
            rules.add(Rule::new(literals, RuleClass::Choice, RuleKind::Choice).weak(true));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverFlags;
    use crate::pool::{RelOp, Solvable};
    use crate::solver::job::Selector;

    fn base_pool() -> Pool {
        Pool::new()
    }

    #[test]
    fn requires_rule_covers_all_providers() {
        let mut pool = base_pool();
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
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(a_id)));

        let ruleset = generator.generate(&jobs);
        let found = ruleset
            .class_rules(RuleClass::Package)
            .find(|r| r.kind() == RuleKind::Requires && r.literals().contains(&(b_id as i32)));
        assert!(found.is_some());
    }

    #[test]
    fn missing_provider_yields_nothing_provides() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let missing = pool.intern_string("missing");

        pool.create_repo("main", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Rel(missing, RelOp::Ge, "1-1".to_string()));
        let a_id = pool.add_solvable(a);
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags { dontfix: false, ..Default::default() });
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(a_id)));

        let ruleset = generator.generate(&jobs);
        assert!(ruleset.class_rules(RuleClass::Package).any(|r| r.kind() == RuleKind::NothingProvidesDep));
    }

    #[test]
    fn same_name_pair_conflicts_implicitly() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let name = pool.intern_string("foo");

        pool.create_repo("main", 0);
        let a_id = pool.add_solvable(Solvable::new(0, name, "1-1", noarch));
        let b_id = pool.add_solvable(Solvable::new(0, name, "2-1", noarch));
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(b_id)));

        let ruleset = generator.generate(&jobs);
        let found = ruleset.class_rules(RuleClass::Package).any(|r| {
            r.kind() == RuleKind::SameName && r.literals().contains(&-(a_id as i32)) && r.literals().contains(&-(b_id as i32))
        });
        assert!(found);
    }

    /// The `multiversion` job flag alone, with no hand-set
    /// `SolverConfig::multiversion_names`, must suppress the implicit
    /// same-name exclusion.
    #[test]
    fn multiversion_job_flag_suppresses_same_name_rule() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let name = pool.intern_string("kernel");

        pool.create_repo("main", 0);
        let old_id = pool.add_solvable(Solvable::new(0, name, "1-1", noarch));
        let new_id = pool.add_solvable(Solvable::new(0, name, "2-1", noarch));
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(new_id)).multiversion());

        let ruleset = generator.generate(&jobs);
        let found = ruleset.class_rules(RuleClass::Package).any(|r| {
            r.kind() == RuleKind::SameName && r.literals().contains(&-(old_id as i32)) && r.literals().contains(&-(new_id as i32))
        });
        assert!(!found, "a multiversion job must suppress the same-name exclusion with no config set by hand");
    }

    /// The `forcebest` job flag alone must emit a Best rule for the
    /// targeted name.
    #[test]
    fn forcebest_job_flag_emits_best_rule() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let name = pool.intern_string("foo");

        pool.create_repo("main", 0);
        let low_id = pool.add_solvable(Solvable::new(0, name, "1-1", noarch));
        let high_id = pool.add_solvable(Solvable::new(0, name, "2-1", noarch));
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(low_id)).forcebest());

        let ruleset = generator.generate(&jobs);
        assert!(ruleset.class_rules(RuleClass::Best).any(|r| r.kind() == RuleKind::Best && r.literals().contains(&(high_id as i32))));
    }

    /// A `distupgrade` job targeting a specific repo must emit a Dup rule
    /// forbidding the installed version outside that repo.
    #[test]
    fn distupgrade_job_emits_dup_rule_for_its_repo() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let name = pool.intern_string("legacy");

        pool.create_repo("system", 0);
        let old_id = pool.add_solvable(Solvable::new(0, name, "1-1", noarch));
        let system_repo = pool.repos().last().unwrap().id;
        pool.mark_installed(system_repo);

        pool.create_repo("next-release", 0);
        let next_repo = pool.repos().last().unwrap().id;
        let _new_id = pool.add_solvable(Solvable::new(0, name, "2-1", noarch));
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Distupgrade, Selector::Repo(next_repo)));

        let ruleset = generator.generate(&jobs);
        assert!(ruleset.class_rules(RuleClass::Dup).any(|r| r.kind() == RuleKind::Dup && r.literals().to_vec() == vec![-(old_id as i32)]));
    }

    /// WITH normalises to the intersection of both sides' providers, not
    /// their union.
    #[test]
    fn with_combinator_intersects_providers() {
        let mut pool = base_pool();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let foo = pool.intern_string("foo");
        let bar = pool.intern_string("bar");

        pool.create_repo("main", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::With(Box::new(Dep::Name(foo)), Box::new(Dep::Name(bar))));
        let a_id = pool.add_solvable(a);

        // only_foo provides foo but not bar, only_bar the reverse, both the
        // shared solvable provides both.
        let mut only_foo = Solvable::new(0, pool.intern_string("only-foo"), "1-1", noarch);
        only_foo.provides.push(Dep::Name(foo));
        let only_foo_id = pool.add_solvable(only_foo);
        let mut only_bar = Solvable::new(0, pool.intern_string("only-bar"), "1-1", noarch);
        only_bar.provides.push(Dep::Name(bar));
        pool.add_solvable(only_bar);
        let mut shared = Solvable::new(0, pool.intern_string("shared"), "1-1", noarch);
        shared.provides.push(Dep::Name(foo));
        shared.provides.push(Dep::Name(bar));
        let shared_id = pool.add_solvable(shared);
        pool.create_whatprovides();

        let config = SolverConfig::new(SolverFlags::default());
        let policy = Policy::new();
        let generator = Generator::new(&pool, &config, &policy);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Install, Selector::Solvable(a_id)));

        let ruleset = generator.generate(&jobs);
        let rule = ruleset
            .class_rules(RuleClass::Package)
            .find(|r| r.kind() == RuleKind::Requires && r.literals().contains(&-(a_id as i32)))
            .expect("a requires rule must exist");
        assert!(rule.literals().contains(&(shared_id as i32)), "the solvable satisfying both sides must be a provider");
        assert!(!rule.literals().contains(&(only_foo_id as i32)), "a solvable satisfying only one side must not satisfy WITH");
    }
}
