use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Sorry, the operation '{0}' was not found.")]
    OperatorNotFound(String),

    #[error(
        "The operation '{operator}' admits exactly '{arity}' values (not more neither less than this)."
    )]
    WrongNumberOfValues { operator: String, arity: usize },

    #[error("The type '{type_name}' does not have support for the operation '{operator}'.")]
    UnsupportedOperation { type_name: String, operator: String },

    #[error(
        "The type of the member '{member}' ({member_type}) is different from the type of one of the constants ({value_type})"
    )]
    PropertyValueTypeMismatch {
        member: String,
        member_type: String,
        value_type: String,
    },

    #[error("The constant of type '{actual}' does not match the declared type '{declared}'.")]
    ValueTypeMismatch { declared: String, actual: String },

    #[error("Property Name '{member}' was not found on Type '{entity}'.")]
    MemberNotFound { member: String, entity: String },

    #[error("Invalid property path '{path}': {reason}")]
    InvalidPropertyPath { path: String, reason: String },

    #[error("Operator registry lock is poisoned")]
    RegistryPoisoned,

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Failures while running a compiled predicate against a record. Trees built
/// by the compiler guard every access, so these only surface for hand-built
/// expressions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("Null reference while reading '{0}'")]
    NullReference(String),

    #[error("Field not found: {0}")]
    MissingField(String),

    #[error("Expected {expected} at '{path}', found {found}")]
    UnexpectedKind {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Failed to parse environment variable '{var}' with value '{value}' as {expected_type}")]
    EnvParseError {
        var: String,
        value: String,
        expected_type: String,
    },

    #[error("Invalid setting '{name}': {message}")]
    Invalid { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
