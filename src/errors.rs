use crate::dimensionality::Dimensionality;
use thiserror::Error;

/// The error taxonomy for the whole crate.
///
/// Every fallible operation returns `Result<_, SiqError>` — there are no
/// out-parameters and no null-on-failure conventions anywhere in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiqError {
    #[error("Syntax Error")]
    SyntaxError { message: String },

    #[error("Symbol not found")]
    UnknownSymbol { symbol: String },

    #[error("Unknown quantity: {name}")]
    UnknownQuantity { name: String },

    #[error("Fractional powers are not allowed in unit expressions")]
    FractionalExponent,

    #[error("This dimensionalities are not compatible to perform this operation: {a} and {b}")]
    IncompatibleDimensionality { a: Dimensionality, b: Dimensionality },

    #[error("Division by zero")]
    DivisionByZero,

    #[error(
        "Unit reduction resulted in scaling factor — algebraic reduction should preserve unit equivalence"
    )]
    ReductionScalingMismatch,

    #[error("Allocation failed")]
    AllocationFailed,
}

impl SiqError {
    pub fn syntax(message: impl Into<String>) -> Self {
        SiqError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn unknown_symbol(symbol: impl Into<String>) -> Self {
        SiqError::UnknownSymbol {
            symbol: symbol.into(),
        }
    }
}
