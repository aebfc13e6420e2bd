use crate::{
    error::EvalError,
    expr::{CompareOp, Expr, MemberAccess, TextMethod},
};
use model::{
    core::value::Value,
    schema::record::{FieldRef, Record},
};
use std::cmp::Ordering;

/// Interprets an [`Expr`] against a record. Member paths are read relative
/// to the current scope; [`Expr::Exists`] evaluates its predicate with each
/// collection element as the scope.
pub struct Evaluator<'r> {
    scope: &'r dyn Record,
}

impl<'r> Evaluator<'r> {
    pub fn new(scope: &'r dyn Record) -> Self {
        Self { scope }
    }

    pub fn eval(&self, expr: &Expr) -> Result<bool, EvalError> {
        match expr {
            Expr::Constant(Value::Boolean(b)) => Ok(*b),
            Expr::Constant(other) => Err(EvalError::UnexpectedKind {
                path: other.to_string(),
                expected: "boolean",
                found: "constant",
            }),
            Expr::Member(access) => match self.eval_value(expr)? {
                Value::Boolean(b) => Ok(b),
                Value::Null => Err(EvalError::NullReference(access.dotted())),
                _ => Err(EvalError::UnexpectedKind {
                    path: access.dotted(),
                    expected: "boolean",
                    found: "value",
                }),
            },
            Expr::Not(inner) => Ok(!self.eval(inner)?),
            Expr::And(l, r) => Ok(self.eval(l)? && self.eval(r)?),
            Expr::Or(l, r) => Ok(self.eval(l)? || self.eval(r)?),
            Expr::Compare { left, op, right } => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                compare(&left, *op, &right)
            }
            Expr::Text {
                method,
                target,
                pattern,
            } => self.eval_text(*method, target, pattern),
            Expr::IsNull(inner) => self.eval_is_null(inner),
            Expr::IsNotNull(inner) | Expr::HasValue(inner) => Ok(!self.eval_is_null(inner)?),
            Expr::InList { item, list } => {
                let item = self.eval_value(item)?;
                match self.eval_value(list)? {
                    Value::List(items) => Ok(items
                        .iter()
                        .any(|v| (v.is_null() && item.is_null()) || v.equal(&item))),
                    Value::Null => Err(EvalError::NullReference(list.to_string())),
                    other => Err(EvalError::UnexpectedKind {
                        path: other.to_string(),
                        expected: "list",
                        found: "value",
                    }),
                }
            }
            Expr::Exists {
                collection,
                predicate,
            } => match self.field(collection)? {
                FieldRef::Collection(Some(items)) => {
                    for item in items {
                        if Evaluator::new(item).eval(predicate)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                FieldRef::Collection(None) => Ok(false),
                other => Err(EvalError::UnexpectedKind {
                    path: collection.dotted(),
                    expected: "collection",
                    found: other.kind(),
                }),
            },
        }
    }

    fn eval_text(
        &self,
        method: TextMethod,
        target: &Expr,
        pattern: &Expr,
    ) -> Result<bool, EvalError> {
        let target_value = self.eval_value(target)?;
        let pattern = match self.eval_value(pattern)? {
            Value::Null => return Ok(false),
            other => text_of(&other).ok_or_else(|| EvalError::Incomparable {
                left: target_value.to_string(),
                right: other.to_string(),
            })?,
        };
        let target = match &target_value {
            Value::Null => return Err(EvalError::NullReference(target.to_string())),
            other => text_of(other).ok_or_else(|| EvalError::Incomparable {
                left: other.to_string(),
                right: pattern.clone(),
            })?,
        };

        let target = target.to_lowercase();
        let pattern = pattern.to_lowercase();
        Ok(match method {
            TextMethod::EqualsIgnoreCase => target == pattern,
            TextMethod::Contains => target.contains(&pattern),
            TextMethod::StartsWith => target.starts_with(&pattern),
            TextMethod::EndsWith => target.ends_with(&pattern),
        })
    }

    fn eval_is_null(&self, expr: &Expr) -> Result<bool, EvalError> {
        match expr {
            Expr::Member(access) => Ok(self.field(access)?.is_null()),
            other => Ok(self.eval_value(other)?.is_null()),
        }
    }

    fn eval_value(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Constant(v) => Ok(v.clone()),
            Expr::Member(access) => match self.field(access)? {
                FieldRef::Value(v) => Ok(v),
                FieldRef::Object(None) | FieldRef::Collection(None) => Ok(Value::Null),
                other => Err(EvalError::UnexpectedKind {
                    path: access.dotted(),
                    expected: "value",
                    found: other.kind(),
                }),
            },
            other => self.eval(other).map(Value::Boolean),
        }
    }

    /// Walks the access path from the current scope. Every intermediate
    /// segment must be a present object.
    fn field(&self, access: &MemberAccess) -> Result<FieldRef<'r>, EvalError> {
        let mut record: &'r dyn Record = self.scope;
        let Some((last, parents)) = access.path.split_last() else {
            return Err(EvalError::MissingField(String::new()));
        };

        for (i, segment) in parents.iter().enumerate() {
            let walked = || access.path[..=i].join(".");
            record = match record.field(segment) {
                Some(FieldRef::Object(Some(next))) => next,
                Some(FieldRef::Object(None)) => return Err(EvalError::NullReference(walked())),
                Some(other) => {
                    return Err(EvalError::UnexpectedKind {
                        path: walked(),
                        expected: "object",
                        found: other.kind(),
                    });
                }
                None => return Err(EvalError::MissingField(walked())),
            };
        }

        record
            .field(last)
            .ok_or_else(|| EvalError::MissingField(access.dotted()))
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Char(c) => Some(c.to_string()),
        _ => None,
    }
}

/// Null compares equal only to null, and never orders.
fn compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool, EvalError> {
    match (left.is_null(), right.is_null()) {
        (true, true) => return Ok(op == CompareOp::Eq),
        (true, false) | (false, true) => return Ok(op == CompareOp::Ne),
        _ => {}
    }

    let ordering = left.compare(right).ok_or_else(|| EvalError::Incomparable {
        left: left.to_string(),
        right: right.to_string(),
    })?;

    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}
