use super::{Operand, Operator, TypeGroup};
use crate::expr::Expr;
use model::core::value::Value;

fn contains(member: &Operand, list: &Value) -> Expr {
    Expr::in_list(member.access.clone(), Expr::constant(list.clone()))
}

/// Member equals one of the listed constants.
#[derive(Debug)]
pub struct In;

impl Operator for In {
    fn name(&self) -> &str {
        "In"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::comparable()
    }

    fn supports_lists(&self) -> bool {
        true
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        contains(member, value)
    }
}

#[derive(Debug)]
pub struct NotIn;

impl Operator for NotIn {
    fn name(&self) -> &str {
        "NotIn"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::comparable()
    }

    fn supports_lists(&self) -> bool {
        true
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        Expr::not(contains(member, value))
    }
}
