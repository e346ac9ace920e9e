//! `solv why` - show which packages in the loaded pool require a given
//! name, optionally walking the chain recursively. Same `-t`/`-r` flags and
//! tree-drawing output as a Composer `why` command, rekeyed from
//! composer.json requires onto this crate's `Pool`/`Dep` requires lists.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use solv_core::{PackageId, Pool};

#[derive(Args, Debug)]
pub struct WhyArgs {
    /// Path to a testcase file
    pub testcase: PathBuf,

    /// Name of the package to explain
    pub package: String,

    /// Print a dependency tree instead of a flat table
    #[arg(short = 't', long)]
    pub tree: bool,

    /// Recurse into dependents of dependents
    #[arg(short = 'r', long)]
    pub recursive: bool,
}

struct Dependent {
    package: PackageId,
    children: Vec<Dependent>,
}

pub fn execute(args: WhyArgs) -> Result<i32> {
    let (pool, _config, _doc) = super::load_testcase(&args.testcase).context("loading testcase")?;

    let targets = pool.providers_by_name(&args.package);
    if targets.is_empty() {
        eprintln!("Error: could not find package \"{}\" in the loaded pool", args.package);
        return Ok(1);
    }

    let recursive = args.tree || args.recursive;
    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for &target in &targets {
        results.extend(dependents_of(&pool, target, recursive, &mut seen));
    }

    if results.is_empty() {
        println!("There is no package depending on \"{}\"", args.package);
        return Ok(1);
    }

    if args.tree {
        print_tree(&pool, &results, 0);
    } else {
        print_table(&pool, &results);
    }
    Ok(0)
}

/// Every undecided, not-yet-visited package whose requires list is
/// satisfied by `target`, recursing into their own dependents when asked.
fn dependents_of(pool: &Pool, target: PackageId, recursive: bool, seen: &mut HashSet<PackageId>) -> Vec<Dependent> {
    let mut out = Vec::new();
    for id in pool.solvable_ids() {
        if !seen.insert(id) {
            continue;
        }
        let Some(s) = pool.solvable(id) else { continue };
        let depends = s.requires.iter().any(|dep| pool.whatprovides(dep).contains(&target)) || s.recommends.iter().any(|dep| pool.whatprovides(dep).contains(&target));
        if !depends {
            seen.remove(&id);
            continue;
        }
        let children = if recursive { dependents_of(pool, id, recursive, seen) } else { Vec::new() };
        out.push(Dependent { package: id, children });
    }
    out
}

fn print_table(pool: &Pool, results: &[Dependent]) {
    println!("{:<30} {:<15} {}", "Package", "Version", "Depends on");
    println!("{}", "-".repeat(70));
    let mut stack: Vec<&Dependent> = results.iter().collect();
    while let Some(dep) = stack.pop() {
        let Some(s) = pool.solvable(dep.package) else { continue };
        println!("{:<30} {:<15} {}", pool.name_str(dep.package), s.evr, "requires");
        stack.extend(dep.children.iter());
    }
}

fn print_tree(pool: &Pool, results: &[Dependent], depth: usize) {
    let count = results.len();
    for (idx, dep) in results.iter().enumerate() {
        let is_last = idx + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        let prefix = "    ".repeat(depth);
        let Some(s) = pool.solvable(dep.package) else { continue };
        println!("{prefix}{branch}{} {}", style(pool.name_str(dep.package)).bold(), s.evr);
        print_tree(pool, &dep.children, depth + 1);
    }
}
