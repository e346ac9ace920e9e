//! Job encoding: translates a user directive into the rules the builder
//! emits.
//!
//! A job is a user directive consumed by the rule builder. This crate
//! represents it as a typed `Job { action, selection, flags }` rather than
//! libsolv's raw `(how, what)` integer pair, but keeps `job2str`/
//! `str2job` round-tripping through the same human-readable strings the
//! testcase format ships, grounded on `ext/testcase.c`.

use std::fmt;

use crate::pool::{Pool, PackageId, RepoId};

/// Actions a job can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Install,
    Erase,
    Update,
    Lock,
    Distupgrade,
    Verify,
    UserInstalled,
    DropOrphaned,
    NoObsoletes,
    Favor,
    Disfavor,
}

impl JobAction {
    fn as_str(&self) -> &'static str {
        match self {
            JobAction::Install => "install",
            JobAction::Erase => "erase",
            JobAction::Update => "update",
            JobAction::Lock => "lock",
            JobAction::Distupgrade => "distupgrade",
            JobAction::Verify => "verify",
            JobAction::UserInstalled => "userinstalled",
            JobAction::DropOrphaned => "droporphaned",
            JobAction::NoObsoletes => "noobsoletes",
            JobAction::Favor => "favor",
            JobAction::Disfavor => "disfavor",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "install" => JobAction::Install,
            "erase" => JobAction::Erase,
            "update" => JobAction::Update,
            "lock" => JobAction::Lock,
            "distupgrade" => JobAction::Distupgrade,
            "verify" => JobAction::Verify,
            "userinstalled" => JobAction::UserInstalled,
            "droporphaned" => JobAction::DropOrphaned,
            "noobsoletes" => JobAction::NoObsoletes,
            "favor" => JobAction::Favor,
            "disfavor" => JobAction::Disfavor,
            _ => return None,
        })
    }
}

/// What a job applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// A single resolved solvable.
    Solvable(PackageId),
    /// All solvables with this name.
    Name(String),
    /// All solvables providing this name/dependency string.
    Provides(String),
    /// An explicit enumerated list (the user already disambiguated).
    OneOf(Vec<PackageId>),
    /// Every solvable in this repo.
    Repo(RepoId),
    /// Every solvable in the pool.
    All,
}

/// Modifier flags layered onto a job's action/selection pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFlags {
    pub weak: bool,
    pub essential: bool,
    pub cleandeps: bool,
    pub forcebest: bool,
    pub multiversion: bool,
    pub set_evr: bool,
    pub set_arch: bool,
    pub set_vendor: bool,
    pub set_repo: bool,
    pub targeted: bool,
    pub noautoset: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub action: JobAction,
    pub selection: Selector,
    pub flags: JobFlags,
}

impl Job {
    pub fn new(action: JobAction, selection: Selector) -> Self {
        Self {
            action,
            selection,
            flags: JobFlags::default(),
        }
    }

    pub fn weak(mut self) -> Self {
        self.flags.weak = true;
        self
    }

    pub fn essential(mut self) -> Self {
        self.flags.essential = true;
        self
    }

    pub fn cleandeps(mut self) -> Self {
        self.flags.cleandeps = true;
        self
    }

    pub fn forcebest(mut self) -> Self {
        self.flags.forcebest = true;
        self
    }

    /// `SOLVER_MULTIVERSION`: the job's target name may stay installed
    /// alongside other versions instead of implicitly obsoleting them.
    pub fn multiversion(mut self) -> Self {
        self.flags.multiversion = true;
        self
    }

    /// Resolve the selector against the pool into a concrete candidate list.
    pub fn candidates(&self, pool: &Pool) -> Vec<PackageId> {
        match &self.selection {
            Selector::Solvable(id) => vec![*id],
            Selector::Name(name) => pool.providers_by_name(name),
            Selector::Provides(dep_name) => pool.providers_by_name(dep_name),
            Selector::OneOf(ids) => ids.clone(),
            Selector::Repo(repo) => pool
                .repo(*repo)
                .map(|r| (r.start..r.end).collect())
                .unwrap_or_default(),
            Selector::All => pool.solvable_ids().collect(),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.flags.weak {
            flags.push("weak");
        }
        if self.flags.essential {
            flags.push("essential");
        }
        if self.flags.cleandeps {
            flags.push("cleandeps");
        }
        if self.flags.forcebest {
            flags.push("forcebest");
        }
        if self.flags.multiversion {
            flags.push("multiversion");
        }
        let flag_str = if flags.is_empty() { String::new() } else { format!("[{}]", flags.join(",")) };
        let sel = match &self.selection {
            Selector::Solvable(id) => format!("@{id}"),
            Selector::Name(n) => n.clone(),
            Selector::Provides(p) => format!("provides:{p}"),
            Selector::OneOf(ids) => format!("oneof:{}", ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")),
            Selector::Repo(r) => format!("repo:{r}"),
            Selector::All => "*".to_string(),
        };
        write!(f, "{}{} {}", self.action.as_str(), flag_str, sel)
    }
}

/// Parse a `job2str`-formatted line back into a `Job`. The human-readable
/// job string is reversible.
pub fn str2job(line: &str) -> Option<Job> {
    let line = line.trim();
    let (head, sel) = line.split_once(' ')?;
    let (action_str, flags_str) = match head.split_once('[') {
        Some((a, rest)) => (a, rest.trim_end_matches(']')),
        None => (head, ""),
    };
    let action = JobAction::from_str(action_str)?;
    let selection = if sel == "*" {
        Selector::All
    } else if let Some(rest) = sel.strip_prefix("provides:") {
        Selector::Provides(rest.to_string())
    } else if let Some(rest) = sel.strip_prefix("repo:") {
        Selector::Repo(rest.parse().ok()?)
    } else if let Some(rest) = sel.strip_prefix("oneof:") {
        Selector::OneOf(rest.split(',').filter_map(|s| s.parse().ok()).collect())
    } else if let Some(rest) = sel.strip_prefix('@') {
        Selector::Solvable(rest.parse().ok()?)
    } else {
        Selector::Name(sel.to_string())
    };
    let mut job = Job::new(action, selection);
    for flag in flags_str.split(',') {
        match flag {
            "weak" => job.flags.weak = true,
            "essential" => job.flags.essential = true,
            "cleandeps" => job.flags.cleandeps = true,
            "forcebest" => job.flags.forcebest = true,
            "multiversion" => job.flags.multiversion = true,
            _ => {}
        }
    }
    Some(job)
}

/// A flat, ordered sequence of jobs - the whole user request for one solve.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job) -> usize {
        self.jobs.push(job);
        self.jobs.len() - 1
    }

    pub fn get(&self, idx: usize) -> Option<&Job> {
        self.jobs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.jobs.iter().enumerate()
    }

    /// Apply a solution's `DelJob` modifier: actually remove the job, so a
    /// re-solve no longer builds any rule for it. Each `DelJob` trial is run
    /// against its own clone of the queue (see `Solver::solutions_for`), so
    /// the index shift this causes never outlives the trial it was made in.
    pub fn drop_job(&mut self, idx: usize) {
        if idx < self.jobs.len() {
            self.jobs.remove(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_string_round_trips() {
        let job = Job::new(JobAction::Install, Selector::Name("vendor/pkg".into())).weak();
        let s = job.to_string();
        let back = str2job(&s).unwrap();
        assert_eq!(back.action, JobAction::Install);
        assert_eq!(back.selection, Selector::Name("vendor/pkg".into()));
        assert!(back.flags.weak);
    }

    #[test]
    fn job_string_round_trips_all_selector() {
        let job = Job::new(JobAction::Distupgrade, Selector::All);
        let back = str2job(&job.to_string()).unwrap();
        assert_eq!(back.selection, Selector::All);
        assert_eq!(back.action, JobAction::Distupgrade);
    }
}
