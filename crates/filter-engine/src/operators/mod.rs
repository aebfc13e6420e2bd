pub mod comparison;
pub mod list;
pub mod null;
pub mod text;

use crate::expr::Expr;
use bitflags::bitflags;
use lazy_static::lazy_static;
use model::core::{data_type::DataType, value::Value};
use std::{fmt, ops::Deref, sync::Arc};

pub use comparison::{
    Between, EqualTo, GreaterThan, GreaterThanOrEqualTo, LessThan, LessThanOrEqualTo, NotEqualTo,
};
pub use list::{In, NotIn};
pub use null::{IsNotNull, IsNull};
pub use text::{
    Contains, DoesNotContain, EndsWith, IsEmpty, IsNotEmpty, IsNotNullNorWhiteSpace,
    IsNullOrWhiteSpace, StartsWith,
};

bitflags! {
    /// Categories of member types an operator can be applied to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeGroup: u8 {
        const DEFAULT  = 0b000001;
        const TEXT     = 0b000010;
        const NUMBER   = 0b000100;
        const BOOLEAN  = 0b001000;
        const DATE     = 0b010000;
        const NULLABLE = 0b100000;
    }
}

impl TypeGroup {
    /// Every category a plain equality test makes sense for.
    pub const fn comparable() -> Self {
        Self::DEFAULT
            .union(Self::BOOLEAN)
            .union(Self::DATE)
            .union(Self::NUMBER)
            .union(Self::TEXT)
    }

    pub const fn ordered() -> Self {
        Self::NUMBER.union(Self::DATE)
    }
}

/// The member side of a comparison: the access expression and the type the
/// operator sees (already unwrapped when the member is nullable).
#[derive(Debug, Clone)]
pub struct Operand {
    pub access: Expr,
    pub data_type: DataType,
}

impl Operand {
    pub fn new(access: Expr, data_type: DataType) -> Self {
        Self { access, data_type }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self.data_type.underlying(),
            DataType::String | DataType::Char
        )
    }

    pub fn not_null(&self) -> Expr {
        Expr::is_not_null(self.access.clone())
    }

    /// Prepends a not-null guard on the member to `expr`.
    pub fn guarded(&self, expr: Expr) -> Expr {
        Expr::and(self.not_null(), expr)
    }
}

/// A named comparison that turns a member access and up to two constants
/// into a boolean expression.
///
/// Unset constants are passed as [`Value::Null`].
pub trait Operator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Number of constants the operator takes (0, 1 or 2).
    fn arity(&self) -> usize;

    fn type_groups(&self) -> TypeGroup;

    fn supports_lists(&self) -> bool {
        false
    }

    /// Operators that treat a missing parent object as a match.
    fn expects_null_values(&self) -> bool {
        false
    }

    fn build(&self, member: &Operand, value: &Value, value2: &Value) -> Expr;
}

/// Shared handle to a registered operator. Equality is by name, ignoring case.
///
/// Whether an operator is in effect is tracked by the registry's
/// `OperatorEntry::active` flag, not by the handle, so an overridden operator
/// still compares equal to its replacement.
#[derive(Clone)]
pub struct OperatorRef(Arc<dyn Operator>);

impl OperatorRef {
    pub fn new<O: Operator + 'static>(operator: O) -> Self {
        Self(Arc::new(operator))
    }

    pub fn same_name(&self, name: &str) -> bool {
        self.0.name().eq_ignore_ascii_case(name)
    }
}

impl Deref for OperatorRef {
    type Target = dyn Operator;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for OperatorRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_name(other.name())
    }
}

impl Eq for OperatorRef {}

impl fmt::Debug for OperatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for OperatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name().trim())
    }
}

lazy_static! {
    static ref EQUAL_TO: OperatorRef = OperatorRef::new(EqualTo);
    static ref NOT_EQUAL_TO: OperatorRef = OperatorRef::new(NotEqualTo);
    static ref GREATER_THAN: OperatorRef = OperatorRef::new(GreaterThan);
    static ref GREATER_THAN_OR_EQUAL_TO: OperatorRef = OperatorRef::new(GreaterThanOrEqualTo);
    static ref LESS_THAN: OperatorRef = OperatorRef::new(LessThan);
    static ref LESS_THAN_OR_EQUAL_TO: OperatorRef = OperatorRef::new(LessThanOrEqualTo);
    static ref BETWEEN: OperatorRef = OperatorRef::new(Between);
    static ref CONTAINS: OperatorRef = OperatorRef::new(Contains);
    static ref DOES_NOT_CONTAIN: OperatorRef = OperatorRef::new(DoesNotContain);
    static ref STARTS_WITH: OperatorRef = OperatorRef::new(StartsWith);
    static ref ENDS_WITH: OperatorRef = OperatorRef::new(EndsWith);
    static ref IS_EMPTY: OperatorRef = OperatorRef::new(IsEmpty);
    static ref IS_NOT_EMPTY: OperatorRef = OperatorRef::new(IsNotEmpty);
    static ref IS_NOT_NULL_NOR_WHITE_SPACE: OperatorRef = OperatorRef::new(IsNotNullNorWhiteSpace);
    static ref IS_NULL_OR_WHITE_SPACE: OperatorRef = OperatorRef::new(IsNullOrWhiteSpace);
    static ref IS_NULL: OperatorRef = OperatorRef::new(IsNull);
    static ref IS_NOT_NULL: OperatorRef = OperatorRef::new(IsNotNull);
    static ref IN: OperatorRef = OperatorRef::new(In);
    static ref NOT_IN: OperatorRef = OperatorRef::new(NotIn);
}

/// The operators every registry is seeded with.
pub fn builtin_operators() -> Vec<OperatorRef> {
    vec![
        EQUAL_TO.clone(),
        NOT_EQUAL_TO.clone(),
        GREATER_THAN.clone(),
        GREATER_THAN_OR_EQUAL_TO.clone(),
        LESS_THAN.clone(),
        LESS_THAN_OR_EQUAL_TO.clone(),
        BETWEEN.clone(),
        CONTAINS.clone(),
        DOES_NOT_CONTAIN.clone(),
        STARTS_WITH.clone(),
        ENDS_WITH.clone(),
        IS_EMPTY.clone(),
        IS_NOT_EMPTY.clone(),
        IS_NOT_NULL_NOR_WHITE_SPACE.clone(),
        IS_NULL_OR_WHITE_SPACE.clone(),
        IS_NULL.clone(),
        IS_NOT_NULL.clone(),
        IN.clone(),
        NOT_IN.clone(),
    ]
}

pub fn equal_to() -> OperatorRef {
    EQUAL_TO.clone()
}

pub fn not_equal_to() -> OperatorRef {
    NOT_EQUAL_TO.clone()
}

pub fn greater_than() -> OperatorRef {
    GREATER_THAN.clone()
}

pub fn greater_than_or_equal_to() -> OperatorRef {
    GREATER_THAN_OR_EQUAL_TO.clone()
}

pub fn less_than() -> OperatorRef {
    LESS_THAN.clone()
}

pub fn less_than_or_equal_to() -> OperatorRef {
    LESS_THAN_OR_EQUAL_TO.clone()
}

pub fn between() -> OperatorRef {
    BETWEEN.clone()
}

pub fn contains() -> OperatorRef {
    CONTAINS.clone()
}

pub fn does_not_contain() -> OperatorRef {
    DOES_NOT_CONTAIN.clone()
}

pub fn starts_with() -> OperatorRef {
    STARTS_WITH.clone()
}

pub fn ends_with() -> OperatorRef {
    ENDS_WITH.clone()
}

pub fn is_empty() -> OperatorRef {
    IS_EMPTY.clone()
}

pub fn is_not_empty() -> OperatorRef {
    IS_NOT_EMPTY.clone()
}

pub fn is_not_null_nor_white_space() -> OperatorRef {
    IS_NOT_NULL_NOR_WHITE_SPACE.clone()
}

pub fn is_null_or_white_space() -> OperatorRef {
    IS_NULL_OR_WHITE_SPACE.clone()
}

pub fn is_null() -> OperatorRef {
    IS_NULL.clone()
}

pub fn is_not_null() -> OperatorRef {
    IS_NOT_NULL.clone()
}

pub fn in_list() -> OperatorRef {
    IN.clone()
}

pub fn not_in_list() -> OperatorRef {
    NOT_IN.clone()
}
