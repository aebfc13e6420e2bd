use model::core::{data_type::DataType, value::Value};
use std::fmt;

/// Member access relative to the current scope: the root entity, or the
/// collection element inside an [`Expr::Exists`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub path: Vec<String>,
    pub data_type: DataType,
}

impl MemberAccess {
    pub fn new(path: Vec<String>, data_type: DataType) -> Self {
        Self { path, data_type }
    }

    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// String tests. All of them compare ordinally, ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMethod {
    EqualsIgnoreCase,
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMethod {
    pub fn method_name(&self) -> &'static str {
        match self {
            TextMethod::EqualsIgnoreCase => "Equals",
            TextMethod::Contains => "Contains",
            TextMethod::StartsWith => "StartsWith",
            TextMethod::EndsWith => "EndsWith",
        }
    }
}

/// Boolean predicate tree produced by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Member(MemberAccess),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    Text {
        method: TextMethod,
        target: Box<Expr>,
        pattern: Box<Expr>,
    },
    IsNull(Box<Expr>),
    IsNotNull(Box<Expr>),
    /// Presence test on an optional scalar.
    HasValue(Box<Expr>),
    InList {
        item: Box<Expr>,
        list: Box<Expr>,
    },
    /// True when at least one element of the collection satisfies the
    /// predicate. Members inside `predicate` are relative to the element.
    Exists {
        collection: MemberAccess,
        predicate: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: Value) -> Self {
        Expr::Constant(value)
    }

    pub fn always_true() -> Self {
        Expr::Constant(Value::Boolean(true))
    }

    pub fn member(access: MemberAccess) -> Self {
        Expr::Member(access)
    }

    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn text(method: TextMethod, target: Expr, pattern: Expr) -> Self {
        Expr::Text {
            method,
            target: Box::new(target),
            pattern: Box::new(pattern),
        }
    }

    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(Box::new(expr))
    }

    pub fn is_not_null(expr: Expr) -> Self {
        Expr::IsNotNull(Box::new(expr))
    }

    pub fn has_value(expr: Expr) -> Self {
        Expr::HasValue(Box::new(expr))
    }

    pub fn in_list(item: Expr, list: Expr) -> Self {
        Expr::InList {
            item: Box::new(item),
            list: Box::new(list),
        }
    }

    pub fn exists(collection: MemberAccess, predicate: Expr) -> Self {
        Expr::Exists {
            collection,
            predicate: Box::new(predicate),
        }
    }

    fn fmt_scoped(&self, f: &mut fmt::Formatter<'_>, param: &str) -> fmt::Result {
        match self {
            Expr::Constant(v) => write!(f, "{v}"),
            Expr::Member(access) => write!(f, "{param}.{}", access.dotted()),
            Expr::Not(inner) => {
                write!(f, "Not(")?;
                inner.fmt_scoped(f, param)?;
                write!(f, ")")
            }
            Expr::And(l, r) => Self::fmt_binary(f, param, l, "AndAlso", r),
            Expr::Or(l, r) => Self::fmt_binary(f, param, l, "OrElse", r),
            Expr::Compare { left, op, right } => {
                Self::fmt_binary(f, param, left, op.symbol(), right)
            }
            Expr::Text {
                method,
                target,
                pattern,
            } => {
                target.fmt_scoped(f, param)?;
                write!(f, ".{}(", method.method_name())?;
                pattern.fmt_scoped(f, param)?;
                write!(f, ", OrdinalIgnoreCase)")
            }
            Expr::IsNull(inner) => {
                write!(f, "(")?;
                inner.fmt_scoped(f, param)?;
                write!(f, " == NULL)")
            }
            Expr::IsNotNull(inner) => {
                write!(f, "(")?;
                inner.fmt_scoped(f, param)?;
                write!(f, " != NULL)")
            }
            Expr::HasValue(inner) => {
                inner.fmt_scoped(f, param)?;
                write!(f, ".HasValue")
            }
            Expr::InList { item, list } => {
                list.fmt_scoped(f, param)?;
                write!(f, ".Contains(")?;
                item.fmt_scoped(f, param)?;
                write!(f, ")")
            }
            Expr::Exists {
                collection,
                predicate,
            } => {
                let inner = if param == "x" { "i" } else { "j" };
                write!(f, "{param}.{}.Any({inner} => ", collection.dotted())?;
                predicate.fmt_scoped(f, inner)?;
                write!(f, ")")
            }
        }
    }

    fn fmt_binary(
        f: &mut fmt::Formatter<'_>,
        param: &str,
        left: &Expr,
        op: &str,
        right: &Expr,
    ) -> fmt::Result {
        write!(f, "(")?;
        left.fmt_scoped(f, param)?;
        write!(f, " {op} ")?;
        right.fmt_scoped(f, param)?;
        write!(f, ")")
    }
}

/// Renders the tree as a lambda body over `x`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_scoped(f, "x")
    }
}
