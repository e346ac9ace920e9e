//! `solv problems` - resolve a testcase's jobs and, on failure, report each
//! problem's representative rule plus the job modifications that would
//! resolve it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use solv_core::solver::testcase;
use solv_core::{JobModifier, Policy, Rule, Solver};

#[derive(Args, Debug)]
pub struct ProblemsArgs {
    /// Path to a testcase file
    pub testcase: PathBuf,
}

pub fn execute(args: ProblemsArgs) -> Result<i32> {
    let (pool, config, doc) = super::load_testcase(&args.testcase).context("loading testcase")?;
    let jobs = testcase::jobs_from_doc(&doc).context("parsing job lines")?;

    let policy = Policy::new();
    let solver = Solver::new(&pool, &config, &policy);

    match solver.solve_verbose(&jobs) {
        Ok(_) => {
            println!("{}", style("no problems: the request is satisfiable").green());
            Ok(0)
        }
        Err((mut problems, rules)) => {
            solver.minimize_problems(&mut problems, &rules, &jobs);

            for (idx, problem) in problems.iter().enumerate() {
                println!("{} {idx}", style("problem").red().bold());
                if let Some(message) = &problem.message {
                    println!("  {message}");
                }
                if let Some(rule_id) = problem.representative_rule(&rules) {
                    if let Some(rule) = rules.get(rule_id) {
                        println!("  representative rule: {}", describe_rule(&pool, rule));
                    }
                }

                let solutions = problems.solutions(idx);
                if solutions.is_empty() {
                    println!("  no automatic solution found");
                } else {
                    println!("  {} solution(s):", solutions.len());
                    for (sidx, solution) in solutions.iter().enumerate() {
                        for modifier in &solution.modifiers {
                            println!("    {sidx}) {}", describe_modifier(&pool, modifier));
                        }
                    }
                }
            }
            Ok(1)
        }
    }
}

fn describe_rule(pool: &solv_core::Pool, rule: &Rule) -> String {
    let parts: Vec<String> = rule
        .literals()
        .iter()
        .map(|&l| {
            let name = pool.name_str(l.unsigned_abs());
            if l > 0 {
                format!("+{name}")
            } else {
                format!("-{name}")
            }
        })
        .collect();
    format!("[{}] ({:?}/{:?})", parts.join(" "), rule.class(), rule.kind())
}

fn describe_modifier(pool: &solv_core::Pool, modifier: &JobModifier) -> String {
    let name = |p: u32| pool.name_str(p).to_string();
    match *modifier {
        JobModifier::Replace(from, to) => format!("replace {} with {}", name(from), name(to)),
        JobModifier::Erase(p) => format!("allow erasing {}", name(p)),
        JobModifier::DelJob(idx) => format!("drop job #{idx}"),
        JobModifier::Infarch(p) => format!("allow {} to keep its architecture", name(p)),
        JobModifier::Distupgrade(p) => format!("allow {} to survive the distupgrade", name(p)),
    }
}
