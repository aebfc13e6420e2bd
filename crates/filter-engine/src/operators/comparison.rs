use super::{Operand, Operator, TypeGroup};
use crate::expr::{CompareOp, Expr, TextMethod};
use model::core::value::Value;

fn compare(member: &Operand, op: CompareOp, value: &Value) -> Expr {
    Expr::compare(member.access.clone(), op, Expr::constant(value.clone()))
}

fn equals_ignore_case(member: &Operand, value: &Value) -> Expr {
    Expr::text(
        TextMethod::EqualsIgnoreCase,
        member.access.clone(),
        Expr::constant(value.clone()),
    )
}

#[derive(Debug)]
pub struct EqualTo;

impl Operator for EqualTo {
    fn name(&self) -> &str {
        "EqualTo"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::comparable()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        if member.is_text() && !value.is_null() {
            member.guarded(equals_ignore_case(member, value))
        } else {
            compare(member, CompareOp::Eq, value)
        }
    }
}

#[derive(Debug)]
pub struct NotEqualTo;

impl Operator for NotEqualTo {
    fn name(&self) -> &str {
        "NotEqualTo"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::comparable()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        if member.is_text() && !value.is_null() {
            member.guarded(Expr::not(equals_ignore_case(member, value)))
        } else {
            compare(member, CompareOp::Ne, value)
        }
    }
}

#[derive(Debug)]
pub struct GreaterThan;

impl Operator for GreaterThan {
    fn name(&self) -> &str {
        "GreaterThan"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::ordered()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        compare(member, CompareOp::Gt, value)
    }
}

#[derive(Debug)]
pub struct GreaterThanOrEqualTo;

impl Operator for GreaterThanOrEqualTo {
    fn name(&self) -> &str {
        "GreaterThanOrEqualTo"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::ordered()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        compare(member, CompareOp::Ge, value)
    }
}

#[derive(Debug)]
pub struct LessThan;

impl Operator for LessThan {
    fn name(&self) -> &str {
        "LessThan"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::ordered()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        compare(member, CompareOp::Lt, value)
    }
}

#[derive(Debug)]
pub struct LessThanOrEqualTo;

impl Operator for LessThanOrEqualTo {
    fn name(&self) -> &str {
        "LessThanOrEqualTo"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::ordered()
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        compare(member, CompareOp::Le, value)
    }
}

/// Inclusive on both ends.
#[derive(Debug)]
pub struct Between;

impl Operator for Between {
    fn name(&self) -> &str {
        "Between"
    }

    fn arity(&self) -> usize {
        2
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::ordered()
    }

    fn build(&self, member: &Operand, value: &Value, value2: &Value) -> Expr {
        Expr::and(
            compare(member, CompareOp::Ge, value),
            compare(member, CompareOp::Le, value2),
        )
    }
}
