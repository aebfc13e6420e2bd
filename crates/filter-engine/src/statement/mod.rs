pub mod path;

pub use path::{PathKind, PropertyPath};

use crate::{
    error::{FilterError, Result},
    operators::OperatorRef,
    registry::OperatorRegistry,
    types::value_to_string,
};
use model::core::{convert::FilterValue, data_type::DataType, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a statement joins the one that follows it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => write!(f, "And"),
            Connector::Or => write!(f, "Or"),
        }
    }
}

/// A single condition: a property path, an operator and its constants.
///
/// Statements are validated when built. Unset constants and explicit nulls
/// are treated the same way.
#[derive(Debug, Clone)]
pub struct FilterStatement {
    path: PropertyPath,
    operator: OperatorRef,
    value: Option<Value>,
    value2: Option<Value>,
    connector: Connector,
    value_type: DataType,
}

impl FilterStatement {
    pub fn new<V: FilterValue>(
        registry: &OperatorRegistry,
        path: &str,
        operator: OperatorRef,
        value: Option<V>,
        value2: Option<V>,
        connector: Connector,
    ) -> Result<Self> {
        Self::from_values(
            registry,
            path,
            operator,
            value.map(FilterValue::into_value),
            value2.map(FilterValue::into_value),
            V::data_type(),
            connector,
        )
    }

    /// Statement for operators that take no constants. Validated as if the
    /// constant type were text; the member type is checked at compile time.
    pub fn without_values(
        registry: &OperatorRegistry,
        path: &str,
        operator: OperatorRef,
        connector: Connector,
    ) -> Result<Self> {
        Self::from_values(
            registry,
            path,
            operator,
            None,
            None,
            DataType::String,
            connector,
        )
    }

    /// Builds a statement from already converted constants and their declared type.
    pub fn from_values(
        registry: &OperatorRegistry,
        path: &str,
        operator: OperatorRef,
        value: Option<Value>,
        value2: Option<Value>,
        value_type: DataType,
        connector: Connector,
    ) -> Result<Self> {
        let path = PropertyPath::parse(path)?;

        let normalize = |value: Option<Value>| -> Result<Option<Value>> {
            let value = value.filter(|v| !v.is_null());
            let value = match (value, &value_type) {
                (Some(Value::List(items)), DataType::Array(_)) => Some(Value::List(items)),
                (Some(single), DataType::Array(_)) => Some(Value::List(vec![single])),
                (other, _) => other,
            };
            if let Some(v) = &value {
                Self::check_declared_type(v, &value_type)?;
            }
            Ok(value)
        };

        if value_type.is_array() && !operator.supports_lists() {
            return Err(FilterError::UnsupportedOperation {
                type_name: value_type.to_string(),
                operator: operator.to_string(),
            });
        }

        let statement = Self {
            path,
            value: normalize(value)?,
            value2: normalize(value2)?,
            operator,
            connector,
            value_type,
        };

        statement.validate(registry)?;
        Ok(statement)
    }

    fn check_declared_type(value: &Value, declared: &DataType) -> Result<()> {
        let mismatch = |actual: &Value| FilterError::ValueTypeMismatch {
            declared: declared.to_string(),
            actual: actual.data_type().to_string(),
        };

        match (value, declared) {
            (Value::List(items), DataType::Array(element)) => {
                let element = element.underlying();
                match items
                    .iter()
                    .find(|item| !item.is_null() && !element.is_compatible(&item.data_type()))
                {
                    Some(item) => Err(mismatch(item)),
                    None => Ok(()),
                }
            }
            (v, declared) if declared.underlying().is_compatible(&v.data_type()) => Ok(()),
            (v, _) => Err(mismatch(v)),
        }
    }

    fn validate(&self, registry: &OperatorRegistry) -> Result<()> {
        self.validate_number_of_values()?;
        self.validate_supported_operator(registry)
    }

    fn validate_number_of_values(&self) -> Result<()> {
        let arity = self.operator.arity();
        let fails = match arity {
            0 => self.value.is_some() || self.value2.is_some(),
            1 => self.value.is_none() || self.value2.is_some(),
            _ => self.value.is_none() || self.value2.is_none(),
        };

        if fails {
            return Err(FilterError::WrongNumberOfValues {
                operator: self.operator.to_string(),
                arity,
            });
        }
        Ok(())
    }

    fn validate_supported_operator(&self, registry: &OperatorRegistry) -> Result<()> {
        if !registry.is_supported(&self.value_type, &self.operator)? {
            return Err(FilterError::UnsupportedOperation {
                type_name: self.value_type.to_string(),
                operator: self.operator.to_string(),
            });
        }
        Ok(())
    }

    pub fn path(&self) -> &PropertyPath {
        &self.path
    }

    pub fn operator(&self) -> &OperatorRef {
        &self.operator
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn value2(&self) -> Option<&Value> {
        self.value2.as_ref()
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    pub fn set_connector(&mut self, connector: Connector) {
        self.connector = connector;
    }

    /// Type of the constants as declared by the caller.
    pub fn value_type(&self) -> &DataType {
        &self.value_type
    }
}

impl fmt::Display for FilterStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |v: Option<&Value>| v.map(value_to_string).unwrap_or_default();
        match self.operator.arity() {
            0 => write!(f, "{} {}", self.path, self.operator),
            2 => write!(
                f,
                "{} {} {} And {}",
                self.path,
                self.operator,
                render(self.value()),
                render(self.value2())
            ),
            _ => write!(
                f,
                "{} {} {}",
                self.path,
                self.operator,
                render(self.value())
            ),
        }
    }
}
