//! Pool and WhatProvides.
//!
//! Owns interned ids, solvables, and the name -> providers index; provides
//! the primitive lookups (`whatprovides`, `match_nevr`) every other
//! component consumes. Grounded on a `Pool`/`PoolEntry` split seen in
//! comparable resolver implementations (`solver/pool.rs`) and on
//! `src/policy.c` / `src/poolvendor.h` from openSUSE libsolv for the
//! vendor-class and architecture-score tables.

mod reldep;
mod repo;
mod solvable;

pub use reldep::{Dep, RelOp};
pub use repo::{Repo, RepoId};
pub use solvable::{PackageId, Solvable, ID_NULL, SYSTEM_SOLVABLE};

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use solv_semver::constraint::Operator;
use solv_semver::Comparator;

pub type StringId = u32;
pub type NameId = StringId;
pub type ArchId = StringId;
pub type VendorId = StringId;

pub const ID_EMPTY_STRING: StringId = 1;

/// Namespace predicate callback: `namespace(name, evr_argument) -> Option<providing-id>`.
/// Returning `None` means "namespace not satisfied" (the dep contributes no providers);
/// returning `Some(SYSTEM_SOLVABLE)` means "always true".
pub type NamespaceCallback = Box<dyn Fn(&Pool, NameId, Option<&str>) -> Option<PackageId>>;

/// Owns ids, solvables, repos, and the derived whatprovides index.
pub struct Pool {
    strings: Vec<String>,
    string_ids: HashMap<String, StringId>,

    solvables: Vec<Solvable>,
    repos: Vec<Repo>,
    installed_repo: Option<RepoId>,

    /// Precomputed name -> providers index. `None` until `create_whatprovides`
    /// has run at least once; invalidated by repo mutation.
    whatprovides: Option<HashMap<NameId, Vec<PackageId>>>,
    /// Lazily-computed cache for versioned/arch-qualified lookups.
    reldep_cache: RefCell<HashMap<String, Vec<PackageId>>>,
    /// File path -> providing solvables, built by `add_file_provides`.
    file_provides: HashMap<String, Vec<PackageId>>,

    /// Architecture id -> score; lower is better. Unknown archs are worst.
    arch_scores: HashMap<ArchId, i32>,
    /// Equivalence classes of vendors that may replace each other.
    vendor_classes: Vec<Vec<VendorId>>,

    namespace_callback: Option<NamespaceCallback>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl Pool {
    pub fn new() -> Self {
        let mut pool = Self {
            strings: vec![String::new(), String::new()],
            string_ids: HashMap::new(),
            solvables: Vec::new(),
            repos: Vec::new(),
            installed_repo: None,
            whatprovides: None,
            reldep_cache: RefCell::new(HashMap::new()),
            file_provides: HashMap::new(),
            arch_scores: HashMap::new(),
            vendor_classes: Vec::new(),
            namespace_callback: None,
        };
        // id 0 reserved NULL, id 1 is the empty string.
        pool.string_ids.insert(String::new(), ID_EMPTY_STRING);
        // Solvable id 0 is NULL; id 1 is the distinguished SYSTEMSOLVABLE.
        let noarch = pool.intern_string("noarch");
        let system_name = pool.intern_string("system");
        pool.solvables.push(Solvable::new(0, ID_EMPTY_STRING, "", noarch));
        let mut system = Solvable::new(SYSTEM_SOLVABLE, system_name, "", noarch);
        system.repo = None;
        pool.solvables.push(system);
        pool
    }

    // ---- interning -----------------------------------------------------

    pub fn intern_string(&mut self, s: impl AsRef<str>) -> StringId {
        let s = s.as_ref();
        if let Some(&id) = self.string_ids.get(s) {
            return id;
        }
        let id = self.strings.len() as StringId;
        self.strings.push(s.to_string());
        self.string_ids.insert(s.to_string(), id);
        id
    }

    pub fn lookup_string(&self, s: &str) -> Option<StringId> {
        self.string_ids.get(s).copied()
    }

    pub fn string(&self, id: StringId) -> &str {
        self.strings.get(id as usize).map(|s| s.as_str()).unwrap_or("")
    }

    // ---- repos -----------------------------------------------------------

    /// Begin a new repo; solvables added after this call (until the next
    /// `create_repo`) belong to it.
    pub fn create_repo(&mut self, name: impl Into<String>, priority: i32) -> RepoId {
        let id = self.repos.len() as RepoId;
        let start = self.solvables.len() as PackageId;
        self.repos.push(Repo {
            id,
            name: name.into(),
            priority,
            start,
            end: start,
            installed: false,
        });
        self.whatprovides = None;
        id
    }

    pub fn mark_installed(&mut self, repo: RepoId) {
        if let Some(r) = self.repos.get_mut(repo as usize) {
            r.installed = true;
        }
        self.installed_repo = Some(repo);
    }

    pub fn installed_repo(&self) -> Option<RepoId> {
        self.installed_repo
    }

    pub fn is_installed(&self, pkg: PackageId) -> bool {
        match self.solvables.get(pkg as usize).and_then(|s| s.repo) {
            Some(r) => self.repos.get(r as usize).map(|r| r.installed).unwrap_or(false),
            None => false,
        }
    }

    pub fn repo(&self, id: RepoId) -> Option<&Repo> {
        self.repos.get(id as usize)
    }

    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    /// Add a solvable to the most recently created repo, returning its id.
    pub fn add_solvable(&mut self, mut solvable: Solvable) -> PackageId {
        let id = self.solvables.len() as PackageId;
        solvable.id = id;
        if let Some(last) = self.repos.last_mut() {
            solvable.repo = Some(last.id);
            last.end = id + 1;
        }
        self.solvables.push(solvable);
        self.whatprovides = None;
        id
    }

    pub fn solvable(&self, id: PackageId) -> Option<&Solvable> {
        self.solvables.get(id as usize)
    }

    pub fn solvable_mut(&mut self, id: PackageId) -> Option<&mut Solvable> {
        self.solvables.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.solvables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvables.is_empty()
    }

    /// All real solvable ids (excludes the NULL and SYSTEM anchors).
    pub fn solvable_ids(&self) -> impl Iterator<Item = PackageId> + '_ {
        (2..self.solvables.len() as PackageId).filter(|&id| self.solvables[id as usize].repo.is_some() || id == SYSTEM_SOLVABLE)
    }

    pub fn name_str(&self, pkg: PackageId) -> &str {
        self.solvable(pkg).map(|s| self.string(s.name)).unwrap_or("")
    }

    // ---- policy hooks ----------------------------------------------------

    pub fn set_arch_score(&mut self, arch: ArchId, score: i32) {
        self.arch_scores.insert(arch, score);
    }

    pub fn arch_score(&self, arch: ArchId) -> i32 {
        self.arch_scores.get(&arch).copied().unwrap_or(i32::MAX)
    }

    /// Register a class of vendors that may freely replace each other.
    pub fn add_vendor_class(&mut self, vendors: Vec<VendorId>) {
        self.vendor_classes.push(vendors);
    }

    pub fn vendor_class_of(&self, vendor: VendorId) -> Option<usize> {
        self.vendor_classes.iter().position(|class| class.contains(&vendor))
    }

    pub fn same_vendor_class(&self, a: VendorId, b: VendorId) -> bool {
        if a == b {
            return true;
        }
        match (self.vendor_class_of(a), self.vendor_class_of(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    pub fn set_namespace_callback(&mut self, cb: NamespaceCallback) {
        self.namespace_callback = Some(cb);
    }

    // ---- whatprovides ------------------------------------------------------

    /// (Re)build the name -> providers index after repo changes. O(total provides).
    pub fn create_whatprovides(&mut self) {
        let mut index: HashMap<NameId, Vec<PackageId>> = HashMap::new();
        for s in &self.solvables {
            if s.id == ID_NULL {
                continue;
            }
            // A solvable implicitly provides its own name at its own evr.
            index.entry(s.name).or_default().push(s.id);
            for dep in &s.provides {
                for name in Self::simple_names(dep) {
                    let list = index.entry(name).or_default();
                    if !list.contains(&s.id) {
                        list.push(s.id);
                    }
                }
            }
        }
        self.whatprovides = Some(index);
        self.reldep_cache.borrow_mut().clear();
    }

    fn simple_names(dep: &Dep) -> Vec<NameId> {
        match dep {
            Dep::Name(n) | Dep::Rel(n, ..) | Dep::Arch(n, _) => vec![*n],
            Dep::And(a, b) | Dep::Or(a, b) | Dep::With(a, b) | Dep::Cond(a, b) | Dep::Unless(a, b) | Dep::Else(a, b) => {
                let mut v = Self::simple_names(a);
                v.extend(Self::simple_names(b));
                v
            }
            Dep::Namespace(_, _) => Vec::new(),
        }
    }

    /// Enrich providers with file-path dependencies. Called at most once per solve.
    pub fn add_file_provides(&mut self) {
        self.file_provides.clear();
        for s in &self.solvables {
            for file in &s.files {
                self.file_provides.entry(file.clone()).or_default().push(s.id);
            }
        }
    }

    fn name_providers(&self, name: NameId) -> Vec<PackageId> {
        self.whatprovides
            .as_ref()
            .and_then(|idx| idx.get(&name))
            .cloned()
            .unwrap_or_default()
    }

    /// Resolve the set of solvables satisfying a dependency expression.
    /// For a plain name, returns the precomputed list. For a reldep, lazily
    /// computes and caches the filtered subset.
    pub fn whatprovides(&self, dep: &Dep) -> Vec<PackageId> {
        match dep {
            Dep::Name(n) => {
                let path = self.string(*n);
                if let Some(providers) = self.file_provides.get(path) {
                    let mut combined = self.name_providers(*n);
                    for &p in providers {
                        if !combined.contains(&p) {
                            combined.push(p);
                        }
                    }
                    return combined;
                }
                self.name_providers(*n)
            }
            Dep::Rel(n, op, evr) => {
                let key = format!("{}{}{}", n, op, evr);
                if let Some(cached) = self.reldep_cache.borrow().get(&key) {
                    return cached.clone();
                }
                let result: Vec<PackageId> = self
                    .name_providers(*n)
                    .into_iter()
                    .filter(|&p| self.solvable(p).map(|s| self.match_evr(&s.evr, *op, evr)).unwrap_or(false))
                    .collect();
                self.reldep_cache.borrow_mut().insert(key, result.clone());
                result
            }
            Dep::Arch(n, arch) => self
                .name_providers(*n)
                .into_iter()
                .filter(|&p| self.solvable(p).map(|s| s.arch == *arch).unwrap_or(false))
                .collect(),
            Dep::Namespace(n, arg) => self
                .namespace_callback
                .as_ref()
                .and_then(|cb| cb(self, *n, arg.as_deref()))
                .into_iter()
                .collect(),
            // Structural combinators are not resolved through whatprovides directly;
            // the rule builder normalises them to CNF/DNF before querying.
            Dep::And(a, _) | Dep::Or(a, _) | Dep::With(a, _) | Dep::Cond(a, _) | Dep::Unless(a, _) | Dep::Else(a, _) => {
                self.whatprovides(a)
            }
        }
    }

    /// Compare a solvable's evr string against `op evr` using the EVR primitive.
    fn match_evr(&self, have: &str, op: RelOp, want: &str) -> bool {
        let operator = match op {
            RelOp::Lt => Operator::LessThan,
            RelOp::Le => Operator::LessThanOrEqual,
            RelOp::Eq => Operator::Equal,
            RelOp::Ge => Operator::GreaterThanOrEqual,
            RelOp::Gt => Operator::GreaterThan,
            RelOp::Ne => Operator::NotEqual,
            RelOp::Any => return true,
        };
        Comparator::compare(have, operator.as_str(), want)
    }

    /// The single source of truth for whether `solvable` satisfies `dep`,
    /// including architecture-qualified names.
    pub fn match_nevr(&self, solvable: PackageId, dep: &Dep) -> bool {
        let Some(s) = self.solvable(solvable) else {
            return false;
        };
        match dep {
            Dep::Name(n) => s.name == *n,
            Dep::Rel(n, op, evr) => s.name == *n && self.match_evr(&s.evr, *op, evr),
            Dep::Arch(n, arch) => s.name == *n && s.arch == *arch,
            Dep::Namespace(..) => self.whatprovides(dep).contains(&solvable),
            Dep::And(a, b) => self.match_nevr(solvable, a) && self.match_nevr(solvable, b),
            Dep::Or(a, b) => self.match_nevr(solvable, a) || self.match_nevr(solvable, b),
            Dep::With(a, b) => self.match_nevr(solvable, a) && self.match_nevr(solvable, b),
            Dep::Cond(a, b) => !self.match_nevr(solvable, a) || self.match_nevr(solvable, b),
            Dep::Unless(a, b) => self.match_nevr(solvable, a) && !self.match_nevr(solvable, b),
            Dep::Else(a, b) => self.match_nevr(solvable, a) || self.match_nevr(solvable, b),
        }
    }

    /// All providers of `name_str`, by name only (no version filter).
    pub fn providers_by_name(&self, name_str: &str) -> Vec<PackageId> {
        match self.lookup_string(name_str) {
            Some(n) => self.name_providers(n),
            None => Vec::new(),
        }
    }

    /// Group solvables by name, preserving first-seen order (used by policy
    /// and the rule builder to enumerate "same name" families).
    pub fn group_by_name(&self, ids: &[PackageId]) -> IndexMap<NameId, Vec<PackageId>> {
        let mut groups: IndexMap<NameId, Vec<PackageId>> = IndexMap::new();
        for &id in ids {
            if let Some(s) = self.solvable(id) {
                groups.entry(s.name).or_default().push(id);
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut pool = Pool::new();
        let a1 = pool.intern_string("libfoo");
        let a2 = pool.intern_string("libfoo");
        assert_eq!(a1, a2);
    }

    #[test]
    fn whatprovides_empty_for_unknown_name() {
        let mut pool = Pool::new();
        pool.create_whatprovides();
        assert!(pool.providers_by_name("nope").is_empty());
    }

    #[test]
    fn whatprovides_matches_versioned_requirement() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        pool.create_repo("main", 0);
        let name = pool.intern_string("libfoo");
        let low = Solvable::new(0, name, "1.0-1", noarch);
        let high = Solvable::new(0, name, "2.0-1", noarch);
        let low_id = pool.add_solvable(low);
        let high_id = pool.add_solvable(high);
        pool.create_whatprovides();

        let dep = Dep::Rel(name, RelOp::Ge, "2.0-1".to_string());
        let providers = pool.whatprovides(&dep);
        assert_eq!(providers, vec![high_id]);
        assert_ne!(providers, vec![low_id]);
    }

    #[test]
    fn with_requires_both_sides_on_the_same_solvable() {
        let mut pool = Pool::new();
        let noarch = pool.intern_string("noarch");
        let x86_64 = pool.intern_string("x86_64");
        pool.create_repo("main", 0);
        let name = pool.intern_string("foo");

        let old = Solvable::new(0, name, "1-1", noarch);
        let old_id = pool.add_solvable(old);
        let new = Solvable::new(0, name, "2-1", x86_64);
        let new_id = pool.add_solvable(new);
        pool.create_whatprovides();

        // WITH means a single solvable must satisfy both clauses, unlike OR.
        let with_dep = Dep::With(Box::new(Dep::Rel(name, RelOp::Ge, "2-1".to_string())), Box::new(Dep::Arch(name, x86_64)));
        assert!(!pool.match_nevr(old_id, &with_dep), "old satisfies neither the version nor the arch clause");
        assert!(pool.match_nevr(new_id, &with_dep));
    }
}
