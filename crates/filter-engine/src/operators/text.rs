use super::{Operand, Operator, TypeGroup};
use crate::expr::{CompareOp, Expr, TextMethod};
use model::core::value::Value;

fn text_call(member: &Operand, method: TextMethod, value: &Value) -> Expr {
    Expr::text(method, member.access.clone(), Expr::constant(value.clone()))
}

fn equals_empty(member: &Operand, op: CompareOp) -> Expr {
    Expr::compare(
        member.access.clone(),
        op,
        Expr::constant(Value::String(String::new())),
    )
}

#[derive(Debug)]
pub struct Contains;

impl Operator for Contains {
    fn name(&self) -> &str {
        "Contains"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        member.guarded(text_call(member, TextMethod::Contains, value))
    }
}

/// Negation of the guarded [`Contains`], so a null member always matches.
#[derive(Debug)]
pub struct DoesNotContain;

impl Operator for DoesNotContain {
    fn name(&self) -> &str {
        "DoesNotContain"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        Expr::not(member.guarded(text_call(member, TextMethod::Contains, value)))
    }
}

#[derive(Debug)]
pub struct StartsWith;

impl Operator for StartsWith {
    fn name(&self) -> &str {
        "StartsWith"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        member.guarded(text_call(member, TextMethod::StartsWith, value))
    }
}

#[derive(Debug)]
pub struct EndsWith;

impl Operator for EndsWith {
    fn name(&self) -> &str {
        "EndsWith"
    }

    fn arity(&self) -> usize {
        1
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
        member.guarded(text_call(member, TextMethod::EndsWith, value))
    }
}

#[derive(Debug)]
pub struct IsEmpty;

impl Operator for IsEmpty {
    fn name(&self) -> &str {
        "IsEmpty"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        member.guarded(equals_empty(member, CompareOp::Eq))
    }
}

#[derive(Debug)]
pub struct IsNotEmpty;

impl Operator for IsNotEmpty {
    fn name(&self) -> &str {
        "IsNotEmpty"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        member.guarded(equals_empty(member, CompareOp::Ne))
    }
}

/// Only rejects null and `""`; whitespace-only strings match.
#[derive(Debug)]
pub struct IsNotNullNorWhiteSpace;

impl Operator for IsNotNullNorWhiteSpace {
    fn name(&self) -> &str {
        "IsNotNullNorWhiteSpace"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        Expr::and(member.not_null(), equals_empty(member, CompareOp::Ne))
    }
}

#[derive(Debug)]
pub struct IsNullOrWhiteSpace;

impl Operator for IsNullOrWhiteSpace {
    fn name(&self) -> &str {
        "IsNullOrWhiteSpace"
    }

    fn arity(&self) -> usize {
        0
    }

    fn type_groups(&self) -> TypeGroup {
        TypeGroup::TEXT
    }

    fn expects_null_values(&self) -> bool {
        true
    }

    fn build(&self, member: &Operand, _: &Value, _: &Value) -> Expr {
        Expr::or(
            Expr::is_null(member.access.clone()),
            member.guarded(equals_empty(member, CompareOp::Eq)),
        )
    }
}
