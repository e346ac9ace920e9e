//! Cleandeps: two-pass remove/add-back reachability for `SOLVER_CLEANDEPS`
//! erase/update jobs.
//!
//! Grounded on `src/cleandeps.c` from openSUSE libsolv: a naive "erase X"
//! only removes X itself, leaving whatever it pulled in behind. Cleandeps
//! additionally removes installed packages that become unreachable once X
//! is gone, while never touching anything the user (or another installed
//! package) still genuinely needs. Composer has no erase-time dependency
//! pruning, so this module follows the shape of `generator.rs` (one pass per
//! concern, operating directly on `Pool`) rather than a Composer source.

use std::collections::HashSet;

use crate::pool::{PackageId, Pool};

use super::job::{JobAction, JobQueue};

/// Packages pinned against automatic removal: explicitly
/// `SOLVER_USERINSTALLED`, either persisted on the solvable or requested by
/// a job this solve.
pub fn userinstalled_set(pool: &Pool, jobs: &JobQueue) -> HashSet<PackageId> {
    let mut set: HashSet<PackageId> = pool
        .solvable_ids()
        .filter(|&p| pool.solvable(p).map(|s| s.userinstalled).unwrap_or(false))
        .collect();
    for (_, job) in jobs.iter() {
        if job.action == JobAction::UserInstalled {
            set.extend(job.candidates(pool));
        }
    }
    set
}

/// Packages the user asked to drop even if nothing else requires their
/// removal (`SOLVER_DROP_ORPHANED` overrides `keep_orphans`).
pub fn drop_orphaned_set(pool: &Pool, jobs: &JobQueue) -> HashSet<PackageId> {
    let mut set = HashSet::new();
    for (_, job) in jobs.iter() {
        if job.action == JobAction::DropOrphaned {
            set.extend(job.candidates(pool));
        }
    }
    set
}

/// Expand an explicit erase/update-away set into the full set of installed
/// packages that must be removed under cleandeps semantics.
pub fn expand(pool: &Pool, explicit: &HashSet<PackageId>, userinstalled: &HashSet<PackageId>) -> HashSet<PackageId> {
    let mut removed: HashSet<PackageId> = explicit.iter().copied().filter(|p| !userinstalled.contains(p)).collect();

    // Pass 1: remove - repeatedly drop any remaining installed package that
    // no surviving installed package requires any longer.
    loop {
        let mut changed = false;
        for p in pool.solvable_ids() {
            if !pool.is_installed(p) || removed.contains(&p) || userinstalled.contains(&p) {
                continue;
            }
            if is_orphaned(pool, p, &removed) {
                removed.insert(p);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Pass 2: add back - anything a surviving installed package still
    // requires or recommends is pulled back out of the removal set.
    // Supplements are deliberately excluded: a package that only offers to
    // fill a gap does not get to veto its own removal.
    loop {
        let mut changed = false;
        let surviving: Vec<PackageId> = pool.solvable_ids().filter(|&p| pool.is_installed(p) && !removed.contains(&p)).collect();
        for p in surviving {
            let Some(s) = pool.solvable(p) else { continue };
            for dep in s.requires.iter().chain(&s.recommends) {
                for q in pool.whatprovides(dep) {
                    if removed.remove(&q) {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    removed
}

/// `true` if no surviving installed package requires `p`.
fn is_orphaned(pool: &Pool, p: PackageId, removed: &HashSet<PackageId>) -> bool {
    for q in pool.solvable_ids() {
        if !pool.is_installed(q) || removed.contains(&q) {
            continue;
        }
        let Some(sq) = pool.solvable(q) else { continue };
        for dep in &sq.requires {
            if pool.whatprovides(dep).contains(&p) {
                return false;
            }
        }
    }
    true
}

/// Mistake-correction pass: among packages cleandeps decided to remove,
/// find the ones a surviving installed package still recommends or
/// supplements - these are candidates the solver should try re-adding and
/// re-solving with their disabled update/feature rules re-enabled.
/// Re-running CDCL on the result is the caller's job; this module only
/// identifies the candidates.
pub fn reconsideration_candidates(pool: &Pool, removed: &HashSet<PackageId>) -> HashSet<PackageId> {
    let mut out = HashSet::new();
    let surviving: Vec<PackageId> = pool.solvable_ids().filter(|&p| pool.is_installed(p) && !removed.contains(&p)).collect();
    for &p in removed {
        for &q in &surviving {
            let Some(sq) = pool.solvable(q) else { continue };
            for dep in sq.recommends.iter().chain(&sq.supplements) {
                if pool.whatprovides(dep).contains(&p) {
                    out.insert(p);
                }
            }
        }
    }
    out
}

/// Top-level entry point: compute the full cleandeps removal set for one
/// solve given the explicitly erased/updated-away packages.
pub fn cleandeps(pool: &Pool, jobs: &JobQueue, explicit: &HashSet<PackageId>) -> HashSet<PackageId> {
    let userinstalled = userinstalled_set(pool, jobs);
    let mut removed = expand(pool, explicit, &userinstalled);
    for p in drop_orphaned_set(pool, jobs) {
        if pool.is_installed(p) && is_orphaned(pool, p, &removed) {
            removed.insert(p);
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Dep, Solvable};

    #[test]
    fn orphaned_dependency_is_swept_along() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");

        pool.create_repo("system", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Name(b_name));
        let a_id = pool.add_solvable(a);
        let b_id = pool.add_solvable(Solvable::new(0, b_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_whatprovides();

        let jobs = JobQueue::new();
        let mut explicit = HashSet::new();
        explicit.insert(a_id);
        let removed = cleandeps(&pool, &jobs, &explicit);
        assert!(removed.contains(&a_id));
        assert!(removed.contains(&b_id));
    }

    #[test]
    fn shared_dependency_survives() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");
        let c_name = pool.intern_string("c");

        pool.create_repo("system", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Name(c_name));
        let a_id = pool.add_solvable(a);
        let mut b = Solvable::new(0, b_name, "1-1", noarch);
        b.requires.push(Dep::Name(c_name));
        pool.add_solvable(b);
        let c_id = pool.add_solvable(Solvable::new(0, c_name, "1-1", noarch));
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_whatprovides();

        let jobs = JobQueue::new();
        let mut explicit = HashSet::new();
        explicit.insert(a_id);
        let removed = cleandeps(&pool, &jobs, &explicit);
        assert!(removed.contains(&a_id));
        assert!(!removed.contains(&c_id));
    }

    #[test]
    fn userinstalled_is_pinned() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let a_name = pool.intern_string("a");
        let b_name = pool.intern_string("b");

        pool.create_repo("system", 0);
        let mut a = Solvable::new(0, a_name, "1-1", noarch);
        a.requires.push(Dep::Name(b_name));
        let a_id = pool.add_solvable(a);
        let mut b = Solvable::new(0, b_name, "1-1", noarch);
        b.userinstalled = true;
        let b_id = pool.add_solvable(b);
        let repo = pool.repos().last().unwrap().id;
        pool.mark_installed(repo);
        pool.create_whatprovides();

        let jobs = JobQueue::new();
        let mut explicit = HashSet::new();
        explicit.insert(a_id);
        let removed = cleandeps(&pool, &jobs, &explicit);
        assert!(removed.contains(&a_id));
        assert!(!removed.contains(&b_id));
    }
}
