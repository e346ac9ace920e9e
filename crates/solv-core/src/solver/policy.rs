//! Policy: ordering, filtering, and illegality classification.
//!
//! Grounded on `src/policy.c` / `src/poolvendor.h` from openSUSE libsolv for
//! the ordering tiers and the vendor-equivalence-class idea, adapted to this
//! crate's `Pool`/`Solvable` model. EVR comparison is delegated to
//! `solv_semver::Comparator` as a primitive service, not reimplemented here.

use std::cmp::Ordering;

use solv_semver::Comparator;

use crate::pool::{Pool, PackageId};

/// Bits returned by `policy_is_illegal`, one per rule a replacement would break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Illegal {
    pub downgrade: bool,
    pub archchange: bool,
    pub vendorchange: bool,
    pub namechange: bool,
}

impl Illegal {
    pub fn is_legal(&self) -> bool {
        !(self.downgrade || self.archchange || self.vendorchange || self.namechange)
    }
}

/// Mirrors the solver's allow-flags that loosen `filter_unwanted`/`is_illegal`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyAllow {
    pub downgrade: bool,
    pub archchange: bool,
    pub vendorchange: bool,
    pub namechange: bool,
}

/// Selection policy: orders candidates and filters out unwanted replacements.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Prefer the lowest EVR instead of the highest (mainly for testing).
    pub prefer_lowest: bool,
    /// Strict repo-priority cut: never let a lower-priority repo's package
    /// outrank a higher-priority repo's package of the same name.
    pub strict_repo_priority: bool,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer_lowest(mut self, v: bool) -> Self {
        self.prefer_lowest = v;
        self
    }

    pub fn strict_repo_priority(mut self, v: bool) -> Self {
        self.strict_repo_priority = v;
        self
    }

    fn repo_priority(&self, pool: &Pool, pkg: PackageId) -> i32 {
        pool.solvable(pkg)
            .and_then(|s| s.repo)
            .and_then(|r| pool.repo(r))
            .map(|r| r.priority)
            .unwrap_or(0)
    }

    fn evr_cmp(&self, pool: &Pool, a: PackageId, b: PackageId) -> Ordering {
        let (ea, eb) = match (pool.solvable(a), pool.solvable(b)) {
            (Some(sa), Some(sb)) => (sa.evr.clone(), sb.evr.clone()),
            _ => return Ordering::Equal,
        };
        if Comparator::equal_to(&ea, &eb) {
            Ordering::Equal
        } else if Comparator::greater_than(&ea, &eb) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    /// Order candidates:
    /// 1. repo priority (desc) 2. arch score (asc, lower is better, with a
    /// same-arch-as-installed bonus when `installed_arch` is given)
    /// 3. EVR (desc, unless `prefer_lowest`) 4. vendor class 5. name.
    pub fn order(&self, pool: &Pool, candidates: &[PackageId], installed_arch: Option<u32>) -> Vec<PackageId> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|&a, &b| {
            self.repo_priority(pool, b)
                .cmp(&self.repo_priority(pool, a))
                .then_with(|| self.arch_rank(pool, a, installed_arch).cmp(&self.arch_rank(pool, b, installed_arch)))
                .then_with(|| {
                    let cmp = self.evr_cmp(pool, a, b);
                    if self.prefer_lowest {
                        cmp
                    } else {
                        cmp.reverse()
                    }
                })
                .then_with(|| pool.name_str(a).cmp(pool.name_str(b)))
        });
        sorted
    }

    fn arch_rank(&self, pool: &Pool, pkg: PackageId, installed_arch: Option<u32>) -> i32 {
        let Some(s) = pool.solvable(pkg) else { return i32::MAX };
        let bonus = match installed_arch {
            Some(a) if a == s.arch => -1,
            _ => 0,
        };
        pool.arch_score(s.arch) + bonus
    }

    /// Which rules would be broken by replacing `from` with `to`.
    pub fn is_illegal(&self, pool: &Pool, from: PackageId, to: PackageId, allow: PolicyAllow) -> Illegal {
        let (Some(sf), Some(st)) = (pool.solvable(from), pool.solvable(to)) else {
            return Illegal::default();
        };
        let mut illegal = Illegal::default();
        if !allow.downgrade && Comparator::less_than(&st.evr, &sf.evr) {
            illegal.downgrade = true;
        }
        if !allow.archchange && sf.arch != st.arch {
            illegal.archchange = true;
        }
        match (sf.vendor, st.vendor) {
            (Some(va), Some(vb)) if va != vb && !allow.vendorchange && !pool.same_vendor_class(va, vb) => {
                illegal.vendorchange = true;
            }
            _ => {}
        }
        if !allow.namechange && sf.name != st.name {
            illegal.namechange = true;
        }
        illegal
    }

    /// Remove candidates that would be illegal replacements for `installed`
    /// given the current allow-flags.
    pub fn filter_unwanted(&self, pool: &Pool, installed: PackageId, candidates: &[PackageId], allow: PolicyAllow) -> Vec<PackageId> {
        candidates
            .iter()
            .copied()
            .filter(|&c| self.is_illegal(pool, installed, c, allow).is_legal())
            .collect()
    }
}
