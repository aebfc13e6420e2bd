use crate::{error::Result, expr::Expr};

pub mod condition;
pub mod sql;

/// Lowers a compiled expression tree into another representation.
pub trait FilterTranslator {
    /// The representation this translator produces.
    type Output;

    fn translate(&self, expr: &Expr) -> Result<Self::Output>;
}
