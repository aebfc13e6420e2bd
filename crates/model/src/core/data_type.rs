use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// Declared type of an entity member or of a filter constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Short,
    Int,
    Long,
    LongUnsigned,
    Double,
    Decimal,
    Boolean,
    Char,
    String,
    Date,
    Timestamp,
    Uuid,
    /// Optional value type (`Option<T>` on the Rust side).
    Nullable(Box<DataType>),
    /// Homogeneous sequence of scalars, used for list-valued constants.
    Array(Box<DataType>),
    /// Nested object member, named after its entity schema.
    Entity(String),
    /// Collection of nested objects, named after the element schema.
    Collection(String),
    Null,
    Custom(String),
}

impl DataType {
    pub fn nullable(inner: DataType) -> Self {
        DataType::Nullable(Box::new(inner))
    }

    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    pub fn name(&self) -> Cow<'_, str> {
        match self {
            DataType::Short => Cow::Borrowed("Int16"),
            DataType::Int => Cow::Borrowed("Int32"),
            DataType::Long => Cow::Borrowed("Int64"),
            DataType::LongUnsigned => Cow::Borrowed("UInt64"),
            DataType::Double => Cow::Borrowed("Double"),
            DataType::Decimal => Cow::Borrowed("Decimal"),
            DataType::Boolean => Cow::Borrowed("Boolean"),
            DataType::Char => Cow::Borrowed("Char"),
            DataType::String => Cow::Borrowed("String"),
            DataType::Date => Cow::Borrowed("Date"),
            DataType::Timestamp => Cow::Borrowed("Timestamp"),
            DataType::Uuid => Cow::Borrowed("Uuid"),
            DataType::Nullable(inner) => Cow::Owned(format!("Nullable<{}>", inner.name())),
            DataType::Array(element) => Cow::Owned(format!("{}[]", element.name())),
            DataType::Entity(name) => Cow::Borrowed(name),
            DataType::Collection(name) => Cow::Owned(format!("Collection<{name}>")),
            DataType::Null => Cow::Borrowed("Null"),
            DataType::Custom(name) => Cow::Borrowed(name),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(_))
    }

    /// Strips one level of `Nullable`, if present.
    pub fn underlying(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Element type for arrays, the type itself otherwise.
    pub fn element(&self) -> &DataType {
        match self {
            DataType::Array(element) => element,
            other => other,
        }
    }

    /// Assignment compatibility between a member type and a constant type.
    ///
    /// Matching is strict: numeric widths do not convert into each other.
    pub fn is_compatible(&self, other: &DataType) -> bool {
        if self == other {
            return true;
        }

        match (self, other) {
            (DataType::Custom(a), DataType::Custom(b)) => a.eq_ignore_ascii_case(b),
            (DataType::Nullable(a), b) | (b, DataType::Nullable(a)) => a.as_ref() == b,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
