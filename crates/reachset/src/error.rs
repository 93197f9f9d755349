//! Error kinds of the reachability engine.
//!
//! Only `InfeasibleIntersection` is expected during normal operation: it marks
//! a base set that shrank to nothing and is dropped by the caller. The other
//! kinds abort the analysis and carry enough context for a one-line diagnostic.

/// Errors raised by configuration loading, polygon operations, the collision
/// checker boundary, and internal consistency checks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or out-of-range parameter. Fatal at construction.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A polygon operation produced an empty set. Not fatal: the caller drops
    /// the element.
    #[error("polygon intersection is empty")]
    InfeasibleIntersection,

    /// The collision checker failed for the queried step. Fatal for the step.
    #[error("collision checker failed at step {step}: {reason}")]
    Checker { step: usize, reason: String },

    /// A broken internal invariant (a bug, not an input problem).
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn checker(step: usize, reason: impl Into<String>) -> Self {
        Error::Checker {
            step,
            reason: reason.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Error::Invariant(message.into())
    }

    /// Process exit code when surfaced by a command-line wrapper.
    ///
    /// 1 = configuration error, 2 = collision-checker error, 3 = internal
    /// invariant violation. An `InfeasibleIntersection` that escapes to the
    /// driver is itself a bug and maps to 3.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Config(_) => 1,
            Error::Checker { .. } => 2,
            Error::InfeasibleIntersection | Error::Invariant(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
