pub mod compiler;
pub mod error;
pub mod eval;
pub mod expr;
pub mod filter;
pub mod operators;
pub mod predicate;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod statement;
pub mod translate;
pub mod types;

#[cfg(test)]
mod testing;

pub use compiler::FilterCompiler;
pub use error::{EvalError, FilterError, Result, SettingsError};
pub use eval::Evaluator;
pub use expr::{CompareOp, Expr, MemberAccess, TextMethod};
pub use filter::{Filter, StatementConnection};
pub use operators::{Operand, Operator, OperatorRef, TypeGroup};
pub use predicate::Predicate;
pub use registry::OperatorRegistry;
pub use settings::CompilerSettings;
pub use statement::{Connector, FilterStatement, path::PropertyPath};
pub use translate::{
    FilterTranslator,
    sql::{SqlFilter, SqlFilterExpr, SqlFilterTranslator},
};
pub use types::{parse_env_as_type, value_to_string};
