use super::{Operand, Operator, TypeGroup};
use crate::expr::Expr;
use model::core::value::Value;

#[derive(Debug)]
pub struct IsNull;

impl Operator for IsNull {
    fn name(&self) -> &str {
        "IsNull"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT | TypeGroup::NULLABLE
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        Expr::is_null(member.access.clone())
    }
}

#[derive(Debug)]
pub struct IsNotNull;

impl Operator for IsNotNull {
    fn name(&self) -> &str {
        "IsNotNull"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT | TypeGroup::NULLABLE
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        member.not_null()
    }
}
