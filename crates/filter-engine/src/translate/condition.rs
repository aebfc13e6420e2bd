use std::fmt;

/// A single column test, e.g. `orders.total > 100` or `name IS NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub comparator: String,
    pub value: Option<String>,
}

impl Condition {
    pub fn new(column: impl Into<String>, comparator: &str, value: Option<String>) -> Self {
        Self {
            column: column.into(),
            comparator: comparator.to_string(),
            value,
        }
    }

    pub fn to_sql_fragment(&self) -> String {
        match &self.value {
            Some(value) => format!("{} {} {}", self.column, self.comparator, value),
            None => format!("{} {}", self.column, self.comparator),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sql_fragment())
    }
}
