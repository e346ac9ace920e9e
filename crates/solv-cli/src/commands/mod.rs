//! Subcommand modules, one file per command: an `Args` struct plus an
//! `execute()` function each, dispatched from `main.rs`.

pub mod problems;
pub mod solve;
pub mod why;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use solv_core::solver::testcase::{self, TestcaseDoc};
use solv_core::{Pool, SolverConfig, SolverFlags};

/// Read and parse a testcase file, then build the pool it describes.
/// Shared by every subcommand so a testcase is the single way these
/// commands accept input.
pub fn load_testcase(path: &Path) -> Result<(Pool, SolverConfig, TestcaseDoc)> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading testcase file {}", path.display()))?;
    let doc = testcase::parse(&contents).with_context(|| format!("parsing testcase file {}", path.display()))?;

    let mut flags = SolverFlags::default();
    testcase::apply_solverflags(&mut flags, &doc.solverflags).context("applying solverflags line")?;
    let config = SolverConfig::new(flags);

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut pool = Pool::new();
    crate::loader::load_testcase(&mut pool, &base_dir, &doc).context("loading repo fixtures")?;

    Ok((pool, config, doc))
}
