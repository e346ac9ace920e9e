pub mod config;
pub mod error;
pub mod pool;
pub mod solver;

pub use config::{SolverConfig, SolverFlags};
pub use error::{Result, SolvError};
pub use pool::{Dep, NameId, PackageId, Pool, RelOp, Repo, RepoId, Solvable};
pub use solver::{
    Decisions, Generator, Illegal, Job, JobAction, JobFlags, JobModifier, JobQueue, Policy,
    PolicyAllow, Problem, ProblemSet, Reason, ReasonCode, Rule, RuleClass, RuleKind, RuleSet,
    Selector, Solution, Solver, SolverResult, Transaction, TransactionStep, TransactionSummary,
};
