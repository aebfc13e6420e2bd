use crate::{error::EvalError, eval::Evaluator, expr::Expr};
use model::schema::record::Entity;
use std::{fmt, marker::PhantomData};
use tracing::warn;

/// A compiled filter over entities of type `T`.
///
/// Holds only the expression tree, so it can be shared across threads and
/// outlives the registry it was compiled against.
pub struct Predicate<T> {
    expr: Expr,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T: Entity> Predicate<T> {
    pub(crate) fn new(expr: Expr) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    pub fn evaluate(&self, entity: &T) -> Result<bool, EvalError> {
        Evaluator::new(entity).eval(&self.expr)
    }

    /// Like [`Predicate::evaluate`], with evaluation failures counted as no match.
    pub fn matches(&self, entity: &T) -> bool {
        match self.evaluate(entity) {
            Ok(matched) => matched,
            Err(err) => {
                warn!("Failed to evaluate predicate {}: {}", self.expr, err);
                false
            }
        }
    }

    pub fn filter<'a>(&self, entities: &'a [T]) -> Vec<&'a T> {
        entities.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("expr", &self.expr).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x => {}", self.expr)
    }
}
