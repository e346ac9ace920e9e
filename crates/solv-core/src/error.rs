use thiserror::Error;

/// Errors surfaced across the solver boundary.
///
/// Malformed *input* (a reldep that doesn't parse, an unknown flag name)
/// fails fast through this enum before any solver state is built.
/// Unsatisfiable jobs are not an error - they come back as a `ProblemSet`
/// from `Solver::solve`. Structural invariant violations (watch-list
/// desync, decision/map desync) are programming errors and panic in debug
/// builds instead, carrying the offending rule id and trail position.
#[derive(Error, Debug)]
pub enum SolvError {
    #[error("invalid reldep expression: {0}")]
    InvalidReldep(String),

    #[error("unknown solver flag: {0}")]
    UnknownFlag(String),

    #[error("malformed testcase line {line}: {message}")]
    Testcase { line: usize, message: String },

    #[error("unknown job verb: {0}")]
    InvalidJob(String),

    #[error("repo not found: {0}")]
    UnknownRepo(String),

    #[error("solver exceeded the iteration bound ({0} rounds) without converging")]
    IterationBound(u32),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolvError>;
