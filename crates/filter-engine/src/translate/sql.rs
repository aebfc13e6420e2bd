use super::{FilterTranslator, condition::Condition};
use crate::{
    error::{FilterError, Result},
    expr::{CompareOp, Expr, MemberAccess, TextMethod},
};
use model::core::value::Value;
use std::fmt;
use tracing::debug;

/// A boolean SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlFilterExpr {
    Leaf(Condition),

    /// (e.g. `a = 1 AND b = 2`)
    And(Vec<SqlFilterExpr>),

    /// (e.g. `a = 1 OR b = 2`)
    Or(Vec<SqlFilterExpr>),

    Not(Box<SqlFilterExpr>),

    /// Correlated existence test over a child table.
    Exists {
        table: String,
        expr: Box<SqlFilterExpr>,
    },

    Literal(bool),
}

impl SqlFilterExpr {
    pub fn leaf(cond: Condition) -> Self {
        SqlFilterExpr::Leaf(cond)
    }

    /// Nested ANDs are flattened into one list.
    pub fn and(exprs: Vec<SqlFilterExpr>) -> Self {
        SqlFilterExpr::And(
            exprs
                .into_iter()
                .flat_map(|e| match e {
                    SqlFilterExpr::And(children) => children,
                    other => vec![other],
                })
                .collect(),
        )
    }

    /// Nested ORs are flattened into one list.
    pub fn or(exprs: Vec<SqlFilterExpr>) -> Self {
        SqlFilterExpr::Or(
            exprs
                .into_iter()
                .flat_map(|e| match e {
                    SqlFilterExpr::Or(children) => children,
                    other => vec![other],
                })
                .collect(),
        )
    }

    pub fn negate(expr: SqlFilterExpr) -> Self {
        SqlFilterExpr::Not(Box::new(expr))
    }

    pub fn to_sql(&self) -> String {
        match self {
            SqlFilterExpr::Leaf(cond) => cond.to_sql_fragment(),
            SqlFilterExpr::And(exprs) => {
                let exprs = exprs.iter().map(SqlFilterExpr::to_sql).collect::<Vec<_>>();
                format!("({})", exprs.join(" AND "))
            }
            SqlFilterExpr::Or(exprs) => {
                let exprs = exprs.iter().map(SqlFilterExpr::to_sql).collect::<Vec<_>>();
                format!("({})", exprs.join(" OR "))
            }
            SqlFilterExpr::Not(inner) => match inner.as_ref() {
                SqlFilterExpr::And(_) | SqlFilterExpr::Or(_) => format!("NOT {}", inner.to_sql()),
                _ => format!("NOT ({})", inner.to_sql()),
            },
            SqlFilterExpr::Exists { table, expr } => {
                format!("EXISTS (SELECT 1 FROM {table} WHERE {})", expr.to_sql())
            }
            SqlFilterExpr::Literal(true) => "TRUE".to_string(),
            SqlFilterExpr::Literal(false) => "FALSE".to_string(),
        }
    }
}

impl fmt::Display for SqlFilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

/// A translated filter. An unrestricted predicate has no expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFilter {
    pub expr: Option<SqlFilterExpr>,
}

impl SqlFilter {
    pub fn with_expr(expr: SqlFilterExpr) -> Self {
        SqlFilter { expr: Some(expr) }
    }

    /// Render " WHERE ..." or an empty string if there is no expression.
    pub fn to_sql(&self) -> String {
        self.expr
            .as_ref()
            .map(|e| format!(" WHERE {}", e.to_sql()))
            .unwrap_or_default()
    }
}

/// Lowers predicate trees to SQL-like filter text.
///
/// Root members become columns, optionally qualified by a table alias.
/// Members inside a collection quantifier are qualified by the collection
/// name, which doubles as the child table name.
#[derive(Debug, Clone, Default)]
pub struct SqlFilterTranslator {
    table: Option<String>,
}

impl SqlFilterTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
        }
    }

    fn lower(&self, expr: &Expr, alias: Option<&str>) -> Result<SqlFilterExpr> {
        match expr {
            Expr::Constant(Value::Boolean(b)) => Ok(SqlFilterExpr::Literal(*b)),
            Expr::And(l, r) => Ok(SqlFilterExpr::and(vec![
                self.lower(l, alias)?,
                self.lower(r, alias)?,
            ])),
            Expr::Or(l, r) => Ok(SqlFilterExpr::or(vec![
                self.lower(l, alias)?,
                self.lower(r, alias)?,
            ])),
            Expr::Not(inner) => Ok(SqlFilterExpr::negate(self.lower(inner, alias)?)),
            Expr::Compare { left, op, right } => {
                let column = column(left, alias)?;
                let value = constant(right)?;
                Ok(compare_condition(column, *op, value))
            }
            Expr::Text {
                method,
                target,
                pattern,
            } => {
                let column = format!("LOWER({})", column(target, alias)?);
                let pattern = match constant(pattern)? {
                    Value::Null => return Ok(SqlFilterExpr::Literal(false)),
                    Value::String(s) => s.to_lowercase(),
                    Value::Char(c) => c.to_lowercase().to_string(),
                    other => return Err(unsupported(&format!("text pattern {other}"))),
                };
                Ok(SqlFilterExpr::leaf(text_condition(column, *method, &pattern)))
            }
            Expr::IsNull(inner) => Ok(SqlFilterExpr::leaf(Condition::new(
                column(inner, alias)?,
                "IS NULL",
                None,
            ))),
            Expr::IsNotNull(inner) | Expr::HasValue(inner) => Ok(SqlFilterExpr::leaf(
                Condition::new(column(inner, alias)?, "IS NOT NULL", None),
            )),
            Expr::InList { item, list } => {
                let column = column(item, alias)?;
                match constant(list)? {
                    Value::List(items) => Ok(in_list_condition(column, items)),
                    other => Err(unsupported(&format!("list operand {other}"))),
                }
            }
            Expr::Exists {
                collection,
                predicate,
            } => {
                let table = collection
                    .path
                    .last()
                    .cloned()
                    .ok_or_else(|| unsupported("empty collection path"))?;
                let expr = self.lower(predicate, Some(&table))?;
                Ok(SqlFilterExpr::Exists {
                    table,
                    expr: Box::new(expr),
                })
            }
            other => Err(unsupported(&format!("expression {other}"))),
        }
    }
}

impl FilterTranslator for SqlFilterTranslator {
    type Output = SqlFilter;

    fn translate(&self, expr: &Expr) -> Result<SqlFilter> {
        if *expr == Expr::always_true() {
            return Ok(SqlFilter::default());
        }

        let sql = self.lower(expr, self.table.as_deref())?;
        debug!("Translated filter to SQL: {}", sql);
        Ok(SqlFilter::with_expr(sql))
    }
}

fn unsupported(what: &str) -> FilterError {
    FilterError::Translation(format!("Unsupported {what} for SQL filter"))
}

fn column(expr: &Expr, alias: Option<&str>) -> Result<String> {
    match expr {
        Expr::Member(MemberAccess { path, .. }) => Ok(match alias {
            Some(alias) => format!("{alias}.{}", path.join(".")),
            None => path.join("."),
        }),
        other => Err(unsupported(&format!("filter field {other}"))),
    }
}

fn constant(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Constant(value) => Ok(value.clone()),
        other => Err(unsupported(&format!("filter value {other}"))),
    }
}

fn compare_condition(column: String, op: CompareOp, value: Value) -> SqlFilterExpr {
    if value.is_null() {
        return match op {
            CompareOp::Eq => SqlFilterExpr::leaf(Condition::new(column, "IS NULL", None)),
            CompareOp::Ne => SqlFilterExpr::leaf(Condition::new(column, "IS NOT NULL", None)),
            _ => SqlFilterExpr::Literal(false),
        };
    }

    let comparator = match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    };
    SqlFilterExpr::leaf(Condition::new(column, comparator, Some(value.to_string())))
}

fn text_condition(column: String, method: TextMethod, pattern: &str) -> Condition {
    let escaped = pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let (comparator, literal) = match method {
        TextMethod::EqualsIgnoreCase => ("=", pattern.to_string()),
        TextMethod::Contains => ("LIKE", format!("%{escaped}%")),
        TextMethod::StartsWith => ("LIKE", format!("{escaped}%")),
        TextMethod::EndsWith => ("LIKE", format!("%{escaped}")),
    };
    Condition::new(column, comparator, Some(Value::String(literal).to_string()))
}

/// SQL `IN` never matches NULL, so a null item becomes a separate test.
fn in_list_condition(column: String, items: Vec<Value>) -> SqlFilterExpr {
    let has_null = items.iter().any(Value::is_null);
    let items: Vec<Value> = items.into_iter().filter(|v| !v.is_null()).collect();

    let is_null = || SqlFilterExpr::leaf(Condition::new(column.clone(), "IS NULL", None));
    match (items.is_empty(), has_null) {
        (true, false) => SqlFilterExpr::Literal(false),
        (true, true) => is_null(),
        (false, has_null) => {
            let in_list = SqlFilterExpr::leaf(Condition::new(
                column.clone(),
                "IN",
                Some(Value::List(items).to_string()),
            ));
            if has_null {
                SqlFilterExpr::or(vec![in_list, is_null()])
            } else {
                in_list
            }
        }
    }
}
