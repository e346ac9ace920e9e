//! Fixture loading for testcase `repo` lines.
//!
//! Real repository metadata parsing (rpmmd/susetags/debian) is treated as
//! an external collaborator this crate never implements; what a testcase
//! needs instead is a small,
//! serde-derived JSON package list per repo file, plus a dependency-string
//! parser for the handful of forms a fixture actually writes
//! (`name`, `name op evr`). This mirrors how a Composer-style tool reads
//! its own `composer.json`/`composer.lock` JSON rather than re-implementing
//! a packaging format.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use solv_core::{Dep, NameId, Pool, RelOp, Solvable};
use solv_core::solver::testcase::TestcaseDoc;

#[derive(Debug, Deserialize)]
struct RepoFixture {
    #[serde(default)]
    packages: Vec<PackageFixture>,
}

#[derive(Debug, Deserialize)]
struct PackageFixture {
    name: String,
    #[serde(default = "default_evr")]
    evr: String,
    #[serde(default = "default_arch")]
    arch: String,
    vendor: Option<String>,
    #[serde(default)]
    provides: Vec<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    conflicts: Vec<String>,
    #[serde(default)]
    obsoletes: Vec<String>,
    #[serde(default)]
    recommends: Vec<String>,
    #[serde(default)]
    suggests: Vec<String>,
    #[serde(default)]
    supplements: Vec<String>,
    #[serde(default)]
    enhances: Vec<String>,
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    multiversion: bool,
    #[serde(default)]
    userinstalled: bool,
}

fn default_evr() -> String {
    "0-0".to_string()
}

fn default_arch() -> String {
    "noarch".to_string()
}

/// Parse one dependency string (`"libfoo"`, `"libfoo >= 2.0-1"`,
/// `"libfoo.x86_64"`, or `"namespace:modalias(foo)=bar"`) into a [`Dep`].
pub fn parse_dep(pool: &mut Pool, raw: &str) -> Result<Dep> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("empty dependency string");
    }
    if let Some(rest) = raw.strip_prefix("namespace:") {
        let (name, arg) = match rest.split_once('=') {
            Some((n, a)) => (n, Some(a.to_string())),
            None => (rest, None),
        };
        let name_id = pool.intern_string(name);
        return Ok(Dep::Namespace(name_id, arg));
    }

    let mut tokens = raw.split_whitespace();
    let first = tokens.next().unwrap();
    let op_tok = tokens.next();
    let evr_tok = tokens.next();

    if let (Some(op_str), Some(evr)) = (op_tok, evr_tok) {
        let op = parse_relop(op_str)?;
        let name_id = pool.intern_string(first);
        return Ok(Dep::Rel(name_id, op, evr.to_string()));
    }

    if let Some((name, arch)) = first.rsplit_once('.') {
        if !name.is_empty() && !arch.is_empty() && arch.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            let name_id = pool.intern_string(name);
            let arch_id = pool.intern_string(arch);
            return Ok(Dep::Arch(name_id, arch_id));
        }
    }

    Ok(Dep::Name(pool.intern_string(first)))
}

fn parse_relop(op: &str) -> Result<RelOp> {
    Ok(match op {
        "<" => RelOp::Lt,
        "<=" => RelOp::Le,
        "=" | "==" => RelOp::Eq,
        ">=" => RelOp::Ge,
        ">" => RelOp::Gt,
        "!=" => RelOp::Ne,
        other => bail!("unknown relational operator '{other}'"),
    })
}

fn parse_deps(pool: &mut Pool, raw: &[String]) -> Result<Vec<Dep>> {
    raw.iter().map(|s| parse_dep(pool, s)).collect()
}

/// Load every `repo` line's fixture file (resolved relative to `base_dir`)
/// into `pool`, create the `system` line's installed repo, register vendor
/// classes, and wire a fact-table namespace callback from `namespace`
/// lines. Rebuilds whatprovides once at the end.
pub fn load_testcase(pool: &mut Pool, base_dir: &Path, doc: &TestcaseDoc) -> Result<()> {
    let mut repo_ids = HashMap::new();

    for repo_line in &doc.repos {
        let repo_id = pool.create_repo(&repo_line.name, repo_line.priority);
        repo_ids.insert(repo_line.name.clone(), repo_id);

        let path = base_dir.join(&repo_line.file);
        let contents = fs::read_to_string(&path).with_context(|| format!("reading repo file {}", path.display()))?;
        let fixture: RepoFixture = serde_json::from_str(&contents).with_context(|| format!("parsing repo file {}", path.display()))?;

        for pkg in fixture.packages {
            add_package(pool, &pkg)?;
        }
    }

    if let Some(system) = &doc.system {
        pool.intern_string(&system.arch);
        if let Some(&repo_id) = repo_ids.get(&system.installed_repo) {
            pool.mark_installed(repo_id);
        } else {
            bail!("system line references unknown repo '{}'", system.installed_repo);
        }
    }

    for class in &doc.vendorclasses {
        let ids: Vec<NameId> = class.iter().map(|v| pool.intern_string(v)).collect();
        pool.add_vendor_class(ids);
    }

    if !doc.namespaces.is_empty() {
        let mut facts: HashMap<(NameId, Option<String>), String> = HashMap::new();
        for ns in &doc.namespaces {
            let name_id = pool.intern_string(&ns.name);
            let (arg, target) = match ns.args.split_first() {
                Some((target, [])) => (None, target.clone()),
                Some((arg, rest)) if !rest.is_empty() => (Some(arg.clone()), rest[0].clone()),
                _ => continue,
            };
            facts.insert((name_id, arg), target);
        }
        pool.set_namespace_callback(Box::new(move |pool, name, arg| {
            let key = (name, arg.map(str::to_string));
            let target = facts.get(&key)?;
            if target == "system" {
                return Some(solv_core::pool::SYSTEM_SOLVABLE);
            }
            pool.providers_by_name(target).into_iter().next()
        }));
    }

    pool.add_file_provides();
    pool.create_whatprovides();
    Ok(())
}

fn add_package(pool: &mut Pool, pkg: &PackageFixture) -> Result<()> {
    let name_id = pool.intern_string(&pkg.name);
    let arch_id = pool.intern_string(&pkg.arch);
    let mut solvable = Solvable::new(0, name_id, pkg.evr.clone(), arch_id);
    solvable.vendor = pkg.vendor.as_ref().map(|v| pool.intern_string(v));
    solvable.provides = parse_deps(pool, &pkg.provides)?;
    solvable.requires = parse_deps(pool, &pkg.requires)?;
    solvable.conflicts = parse_deps(pool, &pkg.conflicts)?;
    solvable.obsoletes = parse_deps(pool, &pkg.obsoletes)?;
    solvable.recommends = parse_deps(pool, &pkg.recommends)?;
    solvable.suggests = parse_deps(pool, &pkg.suggests)?;
    solvable.supplements = parse_deps(pool, &pkg.supplements)?;
    solvable.enhances = parse_deps(pool, &pkg.enhances)?;
    solvable.files = pkg.files.clone();
    solvable.multiversion = pkg.multiversion;
    solvable.userinstalled = pkg.userinstalled;
    pool.add_solvable(solvable);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_name() {
        let mut pool = Pool::new();
        let dep = parse_dep(&mut pool, "libfoo").unwrap();
        assert!(matches!(dep, Dep::Name(_)));
    }

    #[test]
    fn parses_versioned_requirement() {
        let mut pool = Pool::new();
        let dep = parse_dep(&mut pool, "libfoo >= 2.0-1").unwrap();
        match dep {
            Dep::Rel(_, RelOp::Ge, evr) => assert_eq!(evr, "2.0-1"),
            other => panic!("expected Rel, got {other:?}"),
        }
    }

    #[test]
    fn parses_arch_qualified_name() {
        let mut pool = Pool::new();
        let dep = parse_dep(&mut pool, "libfoo.x86_64").unwrap();
        assert!(matches!(dep, Dep::Arch(_, _)));
    }
}
