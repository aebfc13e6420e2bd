use model::core::value::Value;

/// Parse an environment variable string as the type of the given default value
pub fn parse_env_as_type(env_str: &str, default_value: &Value) -> Option<Value> {
    let env_str = env_str.trim();
    match default_value {
        Value::String(_) => Some(Value::String(env_str.to_string())),
        Value::Boolean(_) => match env_str.to_lowercase().as_str() {
            "1" | "yes" | "on" => Some(Value::Boolean(true)),
            "0" | "no" | "off" => Some(Value::Boolean(false)),
            other => other.parse::<bool>().ok().map(Value::Boolean),
        },
        Value::Uint(_) => env_str.parse::<u64>().ok().map(Value::Uint),
        Value::Int(_) => env_str.parse::<i64>().ok().map(Value::Int),
        Value::Int32(_) => env_str.parse::<i32>().ok().map(Value::Int32),
        Value::SmallInt(_) => env_str.parse::<i16>().ok().map(Value::SmallInt),
        Value::Float(_) => env_str.parse::<f64>().ok().map(Value::Float),
        Value::Char(_) => {
            let mut chars = env_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        // Anything else is kept verbatim
        _ => Some(Value::String(env_str.to_string())),
    }
}

/// Plain rendering of a constant, without SQL quoting
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Char(c) => c.to_string(),
        Value::SmallInt(i) => i.to_string(),
        Value::Int32(i) => i.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Uint(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Uuid(u) => u.to_string(),
        Value::Date(d) => d.to_string(),
        Value::Timestamp(t) => t.to_rfc3339(),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(value_to_string).collect::<Vec<_>>().join(", ")
        ),
        Value::Null => String::new(),
    }
}
