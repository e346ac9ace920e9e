//! `solv solve` - resolve a testcase's jobs and print the transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use solv_core::solver::testcase;
use solv_core::{Policy, Solver, TransactionStep};

#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Path to a testcase file
    pub testcase: PathBuf,

    /// Prefer the lowest available EVR instead of the highest
    #[arg(long)]
    pub prefer_lowest: bool,
}

pub fn execute(args: SolveArgs) -> Result<i32> {
    let (pool, config, doc) = super::load_testcase(&args.testcase).context("loading testcase")?;
    let jobs = testcase::jobs_from_doc(&doc).context("parsing job lines")?;

    let policy = Policy::new().prefer_lowest(args.prefer_lowest);
    let solver = Solver::new(&pool, &config, &policy);

    match solver.solve(&jobs) {
        Ok(result) => {
            println!("{}", style("transaction:").green().bold());
            for step in result.transaction.iter() {
                println!("  {}", describe_step(&pool, step));
            }
            println!("{}", result.transaction.summary(&pool));
            if !result.cleandeps.is_empty() {
                println!("{}", style("cleandeps removed:").yellow());
                let mut names: Vec<&str> = result.cleandeps.iter().map(|&p| pool.name_str(p)).collect();
                names.sort_unstable();
                for name in names {
                    println!("  {name}");
                }
            }
            Ok(0)
        }
        Err(problems) => {
            println!("{} {} problem(s) found", style("unsolvable:").red().bold(), problems.len());
            for (idx, problem) in problems.iter().enumerate() {
                println!("  problem #{idx}: {}", problem.message.as_deref().unwrap_or("conflicting rules"));
            }
            println!("run `solv problems {}` for details", args.testcase.display());
            Ok(1)
        }
    }
}

fn describe_step(pool: &solv_core::Pool, step: &TransactionStep) -> String {
    let name = |p: u32| pool.name_str(p).to_string();
    match *step {
        TransactionStep::Install(p) => format!("install {}", name(p)),
        TransactionStep::Reinstall(p) => format!("reinstall {}", name(p)),
        TransactionStep::Downgrade { from, to } => format!("downgrade {} -> {}", name(from), name(to)),
        TransactionStep::Change { from, to } => format!("change {} -> {}", name(from), name(to)),
        TransactionStep::Upgrade { from, to } => format!("upgrade {} -> {}", name(from), name(to)),
        TransactionStep::Obsolete { by, obsoleted } => format!("obsolete {} by {}", name(obsoleted), name(by)),
        TransactionStep::Erase(p) => format!("erase {}", name(p)),
        TransactionStep::MultiInstall(p) => format!("multiinstall {}", name(p)),
    }
}
