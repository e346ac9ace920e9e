//! Transaction classification: diff the decided-install set
//! against what is currently installed, label each difference with one of
//! the closed action kinds, and order installs before the erases they make
//! safe.
//!
//! Grounded on a `transaction.rs` `calculate_operations`/
//! `topological_sort_operations` shape (diff-then-Kahn's-algorithm) seen in
//! comparable resolver implementations, rekeyed from `Arc<Package>`/`String`
//! requires onto this crate's `PackageId`/`Dep` model. The Composer-specific
//! plugin-install-ordering step (composer-plugin package type) has no
//! counterpart here, so it is dropped rather than translated.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use solv_semver::Comparator;

use crate::pool::{PackageId, Pool, SYSTEM_SOLVABLE};

use super::decisions::Decisions;
use super::job::{JobAction, JobQueue, Selector};

/// One classified step of a transaction, from the closed action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStep {
    Install(PackageId),
    Reinstall(PackageId),
    Downgrade { from: PackageId, to: PackageId },
    /// Same EVR, different arch/vendor/repo.
    Change { from: PackageId, to: PackageId },
    Upgrade { from: PackageId, to: PackageId },
    /// `by` obsoletes `obsoleted` via an explicit obsoletes match rather than
    /// a same-name replacement.
    Obsolete { by: PackageId, obsoleted: PackageId },
    Erase(PackageId),
    /// A second, parallel version installed alongside a surviving sibling
    /// (multiversion names only).
    MultiInstall(PackageId),
}

impl TransactionStep {
    /// The package this step installs, if any.
    pub fn installed_package(&self) -> Option<PackageId> {
        match *self {
            TransactionStep::Install(p) | TransactionStep::Reinstall(p) | TransactionStep::MultiInstall(p) => Some(p),
            TransactionStep::Downgrade { to, .. } | TransactionStep::Change { to, .. } | TransactionStep::Upgrade { to, .. } => Some(to),
            TransactionStep::Obsolete { by, .. } => Some(by),
            TransactionStep::Erase(_) => None,
        }
    }

    /// The package this step removes, if any.
    pub fn erased_package(&self) -> Option<PackageId> {
        match *self {
            TransactionStep::Erase(p) => Some(p),
            TransactionStep::Downgrade { from, .. } | TransactionStep::Change { from, .. } | TransactionStep::Upgrade { from, .. } => Some(from),
            TransactionStep::Obsolete { obsoleted, .. } => Some(obsoleted),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStep::Install(p) => write!(f, "install {p}"),
            TransactionStep::Reinstall(p) => write!(f, "reinstall {p}"),
            TransactionStep::Downgrade { from, to } => write!(f, "downgrade {from} -> {to}"),
            TransactionStep::Change { from, to } => write!(f, "change {from} -> {to}"),
            TransactionStep::Upgrade { from, to } => write!(f, "upgrade {from} -> {to}"),
            TransactionStep::Obsolete { by, obsoleted } => write!(f, "obsolete {obsoleted} by {by}"),
            TransactionStep::Erase(p) => write!(f, "erase {p}"),
            TransactionStep::MultiInstall(p) => write!(f, "multiinstall {p}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub steps: Vec<TransactionStep>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionStep> {
        self.steps.iter()
    }

    pub fn summary(&self, pool: &Pool) -> TransactionSummary {
        TransactionSummary::compute(pool, self)
    }
}

/// Per-kind counts plus the per-arch-change and per-vendor-change summary
/// counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionSummary {
    pub installs: usize,
    pub reinstalls: usize,
    pub downgrades: usize,
    pub changes: usize,
    pub upgrades: usize,
    pub obsoletes: usize,
    pub erases: usize,
    pub multiinstalls: usize,
    pub arch_changes: usize,
    pub vendor_changes: usize,
}

impl TransactionSummary {
    fn compute(pool: &Pool, transaction: &Transaction) -> Self {
        let mut summary = TransactionSummary::default();
        for step in &transaction.steps {
            match *step {
                TransactionStep::Install(_) => summary.installs += 1,
                TransactionStep::Reinstall(_) => summary.reinstalls += 1,
                TransactionStep::Downgrade { .. } => summary.downgrades += 1,
                TransactionStep::Change { .. } => summary.changes += 1,
                TransactionStep::Upgrade { .. } => summary.upgrades += 1,
                TransactionStep::Obsolete { .. } => summary.obsoletes += 1,
                TransactionStep::Erase(_) => summary.erases += 1,
                TransactionStep::MultiInstall(_) => summary.multiinstalls += 1,
            }
            if let (Some(from), Some(to)) = (step.erased_package(), step.installed_package()) {
                if let (Some(sf), Some(st)) = (pool.solvable(from), pool.solvable(to)) {
                    if sf.arch != st.arch {
                        summary.arch_changes += 1;
                    }
                    if sf.vendor != st.vendor {
                        summary.vendor_changes += 1;
                    }
                }
            }
        }
        summary
    }
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} install(s), {} upgrade(s), {} downgrade(s), {} change(s), {} obsolete(s), {} erase(s), {} reinstall(s), {} multiinstall(s) ({} arch change(s), {} vendor change(s))",
            self.installs,
            self.upgrades,
            self.downgrades,
            self.changes,
            self.obsoletes,
            self.erases,
            self.reinstalls,
            self.multiinstalls,
            self.arch_changes,
            self.vendor_changes,
        )
    }
}

/// Classify the decided-install set against what is currently installed,
/// then topologically order the result.
pub fn classify(pool: &Pool, decisions: &Decisions, jobs: &JobQueue) -> Transaction {
    let installed_before: HashSet<PackageId> = pool.solvable_ids().filter(|&p| pool.is_installed(p)).collect();
    let installed_after: HashSet<PackageId> = decisions.installed_packages().filter(|&p| p != SYSTEM_SOLVABLE).collect();

    let verify_targets = verify_job_targets(pool, jobs);

    let mut consumed_before: HashSet<PackageId> = HashSet::new();
    let mut steps = Vec::new();

    for &p in &installed_after {
        if installed_before.contains(&p) {
            consumed_before.insert(p);
            if verify_targets.contains(&p) {
                steps.push(TransactionStep::Reinstall(p));
            }
            continue;
        }
        let Some(sp) = pool.solvable(p) else { continue };

        let same_name: Vec<PackageId> = installed_before
            .iter()
            .copied()
            .filter(|q| !consumed_before.contains(q))
            .filter(|&q| pool.solvable(q).map(|sq| sq.name == sp.name).unwrap_or(false))
            .collect();

        let still_installed_same_name = same_name.iter().any(|q| installed_after.contains(q));
        if still_installed_same_name {
            steps.push(TransactionStep::MultiInstall(p));
            continue;
        }

        if let Some(&from) = same_name.first() {
            consumed_before.insert(from);
            let sf = pool.solvable(from).unwrap();
            let step = if Comparator::equal_to(&sf.evr, &sp.evr) {
                TransactionStep::Change { from, to: p }
            } else if Comparator::greater_than(&sp.evr, &sf.evr) {
                TransactionStep::Upgrade { from, to: p }
            } else {
                TransactionStep::Downgrade { from, to: p }
            };
            steps.push(step);
            continue;
        }

        let obsoleted = installed_before
            .iter()
            .copied()
            .filter(|q| !consumed_before.contains(q))
            .find(|&q| sp.obsoletes.iter().any(|dep| pool.match_nevr(q, dep)));
        if let Some(q) = obsoleted {
            consumed_before.insert(q);
            steps.push(TransactionStep::Obsolete { by: p, obsoleted: q });
            continue;
        }

        steps.push(TransactionStep::Install(p));
    }

    for &q in &installed_before {
        if !consumed_before.contains(&q) && !installed_after.contains(&q) {
            steps.push(TransactionStep::Erase(q));
        }
    }

    Transaction { steps: topological_sort(pool, steps) }
}

fn verify_job_targets(pool: &Pool, jobs: &JobQueue) -> HashSet<PackageId> {
    let mut set = HashSet::new();
    for (_, job) in jobs.iter() {
        if job.action != JobAction::Verify {
            continue;
        }
        match &job.selection {
            Selector::Solvable(id) => {
                set.insert(*id);
            }
            _ => set.extend(job.candidates(pool)),
        }
    }
    set
}

/// Order erases after the installs that (directly or transitively) replace
/// their package, and order installs so that a package with `requires` on
/// another install always follows it. Kahn's algorithm over the install-ish
/// steps; on a cycle (shouldn't occur outside a malformed repo) the
/// remaining steps are appended in their original relative order with a
/// warning, rather than silently dropped.
fn topological_sort(pool: &Pool, steps: Vec<TransactionStep>) -> Vec<TransactionStep> {
    let mut erases = Vec::new();
    let mut installish = Vec::new();
    for step in steps {
        match step {
            TransactionStep::Erase(_) => erases.push(step),
            other => installish.push(other),
        }
    }

    let mut id_to_idx: HashMap<PackageId, usize> = HashMap::new();
    for (i, step) in installish.iter().enumerate() {
        if let Some(p) = step.installed_package() {
            id_to_idx.insert(p, i);
        }
    }

    let mut in_degree = vec![0usize; installish.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); installish.len()];
    for (i, step) in installish.iter().enumerate() {
        let Some(p) = step.installed_package() else { continue };
        let Some(sp) = pool.solvable(p) else { continue };
        for dep in &sp.requires {
            for q in pool.whatprovides(dep) {
                if let Some(&dep_idx) = id_to_idx.get(&q) {
                    if dep_idx != i {
                        dependents[dep_idx].push(i);
                        in_degree[i] += 1;
                    }
                }
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..installish.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered_idx = Vec::with_capacity(installish.len());
    let mut visited = vec![false; installish.len()];
    while let Some(i) = queue.pop_front() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        ordered_idx.push(i);
        for &dep in &dependents[i] {
            in_degree[dep] -= 1;
            if in_degree[dep] == 0 {
                queue.push_back(dep);
            }
        }
    }

    if ordered_idx.len() < installish.len() {
        log::warn!(
            "transaction ordering found a requires cycle among {} package(s); breaking it at the lowest-priority edge and appending in original order",
            installish.len() - ordered_idx.len()
        );
        for i in 0..installish.len() {
            if !visited[i] {
                ordered_idx.push(i);
            }
        }
    }

    let mut result: Vec<TransactionStep> = ordered_idx.into_iter().map(|i| installish[i]).collect();
    result.extend(erases);
    result
}

/// Hook for an external "would these two to-be-installed packages co-own a
/// path" check. Returns every `(a, b, path)` triple the callback confirmed
/// as a real conflict.
pub fn check_file_conflicts(
    pool: &Pool,
    transaction: &Transaction,
    mut callback: impl FnMut(PackageId, PackageId, &str) -> bool,
) -> Vec<(PackageId, PackageId, String)> {
    let installs: Vec<PackageId> = transaction.steps.iter().filter_map(|s| s.installed_package()).collect();
    let mut conflicts = Vec::new();
    for i in 0..installs.len() {
        for j in (i + 1)..installs.len() {
            let (a, b) = (installs[i], installs[j]);
            let (Some(sa), Some(sb)) = (pool.solvable(a), pool.solvable(b)) else { continue };
            for file in &sa.files {
                if sb.files.contains(file) && callback(a, b, file) {
                    conflicts.push((a, b, file.clone()));
                }
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Dep, Solvable};
    use crate::solver::decisions::Reason;
    use crate::solver::job::{Job, Selector};

    fn decide_installed(decisions: &mut Decisions, ids: &[PackageId]) {
        decisions.increment_level();
        for &id in ids {
            decisions.decide(id as i32, Reason::Policy(super::super::decisions::ReasonCode::Resolve));
        }
    }

    #[test]
    fn fresh_install_with_no_predecessor_is_install() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        pool.create_repo("main", 0);
        let a_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        pool.create_whatprovides();

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[a_id]);

        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Install(a_id)]);
    }

    #[test]
    fn higher_evr_same_name_is_upgrade() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        pool.create_repo("system", 0);
        let old_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_repo("updates", 10);
        let new_id = pool.add_solvable(Solvable::new(0, a_name, "2-1", noarch));
        pool.create_whatprovides();

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[new_id]);

        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Upgrade { from: old_id, to: new_id }]);
    }

    #[test]
    fn lower_evr_same_name_is_downgrade() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        pool.create_repo("system", 0);
        let old_id = pool.add_solvable(Solvable::new(0, a_name, "2-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_repo("archive", 0);
        let new_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        pool.create_whatprovides();

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[new_id]);

        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Downgrade { from: old_id, to: new_id }]);
    }

    #[test]
    fn obsoletes_match_without_shared_name_is_obsolete() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");
        pool.create_repo("system", 0);
        let a_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_repo("main", 0);
        let mut b = Solvable::new(0, b_name, "1-1", noarch);
        b.obsoletes.push(Dep::Name(a_name));
        let b_id = pool.add_solvable(b);
        pool.create_whatprovides();

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[b_id]);

        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Obsolete { by: b_id, obsoleted: a_id }]);
    }

    #[test]
    fn dropped_package_is_erase() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        pool.create_repo("system", 0);
        let a_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_whatprovides();

        let decisions = Decisions::new();
        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Erase(a_id)]);
    }

    #[test]
    fn verify_job_on_unchanged_package_yields_reinstall() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        pool.create_repo("system", 0);
        let a_id = pool.add_solvable(Solvable::new(0, a_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_whatprovides();

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[a_id]);

        let mut jobs = JobQueue::new();
        jobs.push(Job::new(JobAction::Verify, Selector::Solvable(a_id)));

        let tx = classify(&pool, &decisions, &jobs);
        assert_eq!(tx.steps, vec![TransactionStep::Reinstall(a_id)]);
    }

    #[test]
    fn requires_ordering_installs_dependency_before_dependent() {
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

        let mut decisions = Decisions::new();
        decide_installed(&mut decisions, &[a_id, b_id]);

        let jobs = JobQueue::new();
        let tx = classify(&pool, &decisions, &jobs);
        let b_pos = tx.steps.iter().position(|s| *s == TransactionStep::Install(b_id)).unwrap();
        let a_pos = tx.steps.iter().position(|s| *s == TransactionStep::Install(a_id)).unwrap();
        assert!(b_pos < a_pos, "b must install before a since a requires b");
    }
}
