use thiserror::Error;

use super::Comparison;

/// An error raised while constructing a problem through the
/// [`ModelBuilder`][crate::ModelBuilder].
///
/// Build errors abort problem construction; they are never produced during
/// solving. Note that a contradiction detected at the root is *not* an error:
/// it is encoded into the problem so the solver uniformly reports
/// unsatisfiability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("the operator `{0}` is not supported in this position")]
    UnsupportedOperator(Comparison),

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("a variable named `{0}` is already defined")]
    DuplicateVariable(String),

    #[error("malformed constraint: {0}")]
    MalformedConstraint(String),
}
