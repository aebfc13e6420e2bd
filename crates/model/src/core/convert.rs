use crate::core::{data_type::DataType, value::Value};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// A Rust type that can be used as a typed filter constant.
///
/// The declared [`DataType`] is known statically, so a `None` or an empty
/// list still carries the type the caller wrote.
pub trait FilterValue {
    fn data_type() -> DataType;
    fn into_value(self) -> Value;
}

macro_rules! scalar_filter_value {
    ($($ty:ty => $data_type:ident, $variant:ident);* $(;)?) => {
        $(
            impl FilterValue for $ty {
                fn data_type() -> DataType {
                    DataType::$data_type
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    };
}

scalar_filter_value! {
    i16 => Short, SmallInt;
    i32 => Int, Int32;
    i64 => Long, Int;
    u64 => LongUnsigned, Uint;
    f64 => Double, Float;
    BigDecimal => Decimal, Decimal;
    bool => Boolean, Boolean;
    char => Char, Char;
    String => String, String;
    NaiveDate => Date, Date;
    DateTime<Utc> => Timestamp, Timestamp;
    Uuid => Uuid, Uuid;
}

impl FilterValue for &str {
    fn data_type() -> DataType {
        DataType::String
    }

    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: FilterValue> FilterValue for Option<T> {
    fn data_type() -> DataType {
        DataType::nullable(T::data_type())
    }

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: FilterValue> FilterValue for Vec<T> {
    fn data_type() -> DataType {
        DataType::array(T::data_type())
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(FilterValue::into_value).collect())
    }
}

impl<T: FilterValue, const N: usize> FilterValue for [T; N] {
    fn data_type() -> DataType {
        DataType::array(T::data_type())
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(FilterValue::into_value).collect())
    }
}

impl<T: FilterValue + Clone> FilterValue for &[T] {
    fn data_type() -> DataType {
        DataType::array(T::data_type())
    }

    fn into_value(self) -> Value {
        Value::List(self.iter().cloned().map(FilterValue::into_value).collect())
    }
}
