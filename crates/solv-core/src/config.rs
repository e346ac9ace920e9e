//! Solver configuration flags.
//!
//! A flat struct with `serde`-derived defaults, set via builder methods,
//! holding a closed solver-flag set rather than Composer's `config.json`
//! schema.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::pool::NameId;

/// `solver_set_flag`/`solver_get_flag` target. Every flag defaults to off
/// unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverFlags {
    pub allow_downgrade: bool,
    pub allow_archchange: bool,
    pub allow_vendorchange: bool,
    pub allow_uninstall: bool,
    pub no_updateprovide: bool,
    pub splitprovides: bool,
    pub ignore_recommended: bool,
    /// Defaults true in configurations where recommends are already honored.
    pub ignore_already_recommended: bool,
    pub no_infarchcheck: bool,
    pub best_obey_policy: bool,
    pub keep_orphans: bool,
    pub yum_obsoletes: bool,
    pub need_updateprovide: bool,

    // Generator-level knobs that are not part of the closed public flag
    // list but are needed to drive rule construction.
    pub dontfix: bool,
    pub obsoleteusesprovides: bool,
    pub noinstalledobsoletes: bool,
    pub forbidselfconflicts: bool,
    pub implicitobsoleteusescolors: bool,
    pub strong_recommends: bool,
}

impl Default for SolverFlags {
    fn default() -> Self {
        Self {
            allow_downgrade: false,
            allow_archchange: false,
            allow_vendorchange: false,
            allow_uninstall: false,
            no_updateprovide: false,
            splitprovides: false,
            ignore_recommended: false,
            ignore_already_recommended: true,
            no_infarchcheck: false,
            best_obey_policy: false,
            keep_orphans: false,
            yum_obsoletes: false,
            need_updateprovide: false,
            dontfix: true,
            obsoleteusesprovides: false,
            noinstalledobsoletes: false,
            forbidselfconflicts: false,
            implicitobsoleteusescolors: false,
            strong_recommends: false,
        }
    }
}

impl SolverFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-solve configuration that is not a simple boolean flag: which names
/// are multiversion, which repos are distupgrade targets, forced-best names.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    pub flags: SolverFlags,
    pub multiversion_names: HashSet<NameId>,
    pub distupgrade_repos: HashSet<crate::pool::RepoId>,
    pub forcebest_names: HashSet<NameId>,
    pub dup_names: HashSet<NameId>,
}

impl SolverConfig {
    pub fn new(flags: SolverFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }

    pub fn is_multiversion(&self, name: NameId) -> bool {
        self.multiversion_names.contains(&name)
    }
}
