use std::fmt::Display;

/// The comparison operators accepted by the model builder.
///
/// Only the order relations are supported by the solver core; `!=` and set
/// membership are rejected when a constraint is posted (see
/// [`ModelError::UnsupportedOperator`][crate::ModelError::UnsupportedOperator]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessOrEqual,
    Less,
    GreaterOrEqual,
    Greater,
    Equal,
    NotEqual,
    In,
}

impl Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Comparison::LessOrEqual => "<=",
            Comparison::Less => "<",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Greater => ">",
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::In => "in",
        };
        write!(f, "{symbol}")
    }
}
