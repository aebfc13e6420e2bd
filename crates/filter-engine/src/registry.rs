use crate::{
    error::{FilterError, Result},
    operators::{OperatorRef, TypeGroup, builtin_operators},
};
use lazy_static::lazy_static;
use model::core::data_type::DataType;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, info};

lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<OperatorRegistry> = Arc::new(OperatorRegistry::new());
    static ref TYPE_GROUPS: HashMap<DataType, TypeGroup> = build_type_groups();
}

fn build_type_groups() -> HashMap<DataType, TypeGroup> {
    let mut map = HashMap::new();
    map.insert(DataType::String, TypeGroup::TEXT);
    map.insert(DataType::Char, TypeGroup::TEXT);
    map.insert(DataType::Short, TypeGroup::NUMBER);
    map.insert(DataType::Int, TypeGroup::NUMBER);
    map.insert(DataType::Long, TypeGroup::NUMBER);
    map.insert(DataType::LongUnsigned, TypeGroup::NUMBER);
    map.insert(DataType::Double, TypeGroup::NUMBER);
    map.insert(DataType::Decimal, TypeGroup::NUMBER);
    map.insert(DataType::Boolean, TypeGroup::BOOLEAN);
    map.insert(DataType::Date, TypeGroup::DATE);
    map.insert(DataType::Timestamp, TypeGroup::DATE);
    map
}

/// Category a type falls into for operator lookup. Unknown types are `DEFAULT`.
pub fn type_group(data_type: &DataType) -> TypeGroup {
    TYPE_GROUPS
        .get(data_type)
        .copied()
        .unwrap_or(TypeGroup::DEFAULT)
}

/// A registered operator and whether it is still in effect. Overridden
/// operators stay in the registry as inactive entries.
#[derive(Debug, Clone)]
pub struct OperatorEntry {
    pub operator: OperatorRef,
    pub active: bool,
}

/// Set of operators statements may refer to.
///
/// A process-wide instance is available through [`OperatorRegistry::global`];
/// independent registries can be built for isolated configurations.
#[derive(Debug)]
pub struct OperatorRegistry {
    entries: RwLock<Vec<OperatorEntry>>,
}

impl OperatorRegistry {
    /// Registry seeded with the built-in operators.
    pub fn new() -> Self {
        let entries = builtin_operators()
            .into_iter()
            .map(|operator| OperatorEntry {
                operator,
                active: true,
            })
            .collect();

        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn global() -> Arc<OperatorRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Adds an operator, deactivating any active operator with the same name.
    pub fn register(&self, operator: OperatorRef) -> Result<()> {
        let mut entries = self.write()?;
        Self::deactivate(&mut entries, operator.name());
        info!("Registered operator '{}'", operator);
        entries.push(OperatorEntry {
            operator,
            active: true,
        });
        Ok(())
    }

    /// Loads a batch of operators under a single write lock.
    ///
    /// With `override_existing`, same-named operators are deactivated and
    /// replaced. Without it, an operator whose name is already active is
    /// skipped. Returns how many operators were added.
    pub fn load_operators(
        &self,
        operators: Vec<OperatorRef>,
        override_existing: bool,
    ) -> Result<usize> {
        let mut entries = self.write()?;
        let mut loaded = 0;

        for operator in operators {
            if override_existing {
                if Self::deactivate(&mut entries, operator.name()) {
                    info!("Operator '{}' overridden", operator);
                }
            } else if Self::find_active(&entries, operator.name()).is_some() {
                debug!("Operator '{}' already registered, skipping", operator);
                continue;
            }

            entries.push(OperatorEntry {
                operator,
                active: true,
            });
            loaded += 1;
        }

        info!(
            "Loaded {} operator(s) (override existing: {})",
            loaded, override_existing
        );
        Ok(loaded)
    }

    /// Looks up an active operator, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<OperatorRef> {
        let entries = self.read()?;
        Self::find_active(&entries, name)
            .map(|entry| entry.operator.clone())
            .ok_or_else(|| FilterError::OperatorNotFound(name.to_string()))
    }

    pub fn supported_operators(&self, data_type: &DataType) -> Result<Vec<OperatorRef>> {
        let entries = self.read()?;
        let active = || entries.iter().filter(|e| e.active).map(|e| &e.operator);

        let mut supported: Vec<OperatorRef> = Vec::new();
        let mut add = |op: &OperatorRef| {
            if !supported.contains(op) {
                supported.push(op.clone());
            }
        };

        let target = match data_type {
            DataType::Array(element) => {
                active().filter(|op| op.supports_lists()).for_each(&mut add);
                element.underlying()
            }
            other => other.underlying(),
        };

        let group = type_group(target);
        active()
            .filter(|op| !op.supports_lists() && op.type_groups().contains(group))
            .for_each(&mut add);

        if data_type.is_nullable() || matches!(data_type, DataType::Entity(_)) {
            active()
                .filter(|op| !op.supports_lists() && op.type_groups().contains(TypeGroup::NULLABLE))
                .for_each(&mut add);
        }

        Ok(supported)
    }

    pub fn is_supported(&self, data_type: &DataType, operator: &OperatorRef) -> Result<bool> {
        Ok(self.supported_operators(data_type)?.contains(operator))
    }

    /// Snapshot of every entry, including deactivated ones.
    pub fn operators(&self) -> Result<Vec<OperatorEntry>> {
        Ok(self.read()?.clone())
    }

    fn find_active<'e>(entries: &'e [OperatorEntry], name: &str) -> Option<&'e OperatorEntry> {
        entries
            .iter()
            .find(|e| e.active && e.operator.same_name(name))
    }

    fn deactivate(entries: &mut [OperatorEntry], name: &str) -> bool {
        let mut deactivated = false;
        for entry in entries
            .iter_mut()
            .filter(|e| e.active && e.operator.same_name(name))
        {
            entry.active = false;
            deactivated = true;
        }
        deactivated
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<OperatorEntry>>> {
        self.entries.read().map_err(|_| FilterError::RegistryPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<OperatorEntry>>> {
        self.entries.write().map_err(|_| FilterError::RegistryPoisoned)
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FilterError,
        expr::{CompareOp, Expr},
        operators::{self, Operand, Operator},
        statement::{Connector, FilterStatement},
    };
    use chrono::NaiveDate;
    use model::core::value::Value;
    use tracing_test::traced_test;
    use uuid::Uuid;

    /// Case-sensitive replacement for the built-in equality.
    #[derive(Debug)]
    struct StrictEqualTo;

    impl Operator for StrictEqualTo {
        fn name(&self) -> &str {
            "equalto"
        }

        fn arity(&self) -> usize {
            1
        }

        fn type_groups(&self) -> TypeGroup {
            TypeGroup::TEXT
        }

        fn build(&self, member: &Operand, value: &Value, _: &Value) -> Expr {
            Expr::compare(
                member.access.clone(),
                CompareOp::Eq,
                Expr::constant(value.clone()),
            )
        }
    }

    fn names(ops: &[OperatorRef]) -> Vec<String> {
        let mut names: Vec<String> = ops.iter().map(|o| o.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let registry = OperatorRegistry::new();
        assert_eq!(
            registry.find_by_name("contains").unwrap(),
            operators::contains()
        );
        assert_eq!(
            registry.find_by_name("ISNULL").unwrap(),
            operators::is_null()
        );
    }

    #[test]
    fn test_find_unknown_operator() {
        let err = OperatorRegistry::new().find_by_name("Like").unwrap_err();
        assert!(matches!(err, FilterError::OperatorNotFound(ref n) if n == "Like"));
        assert_eq!(err.to_string(), "Sorry, the operation 'Like' was not found.");
    }

    #[test]
    fn test_supported_operators_for_text() {
        let ops = OperatorRegistry::new()
            .supported_operators(&DataType::String)
            .unwrap();
        assert_eq!(
            names(&ops),
            vec![
                "Contains",
                "DoesNotContain",
                "EndsWith",
                "EqualTo",
                "IsEmpty",
                "IsNotEmpty",
                "IsNotNull",
                "IsNotNullNorWhiteSpace",
                "IsNull",
                "IsNullOrWhiteSpace",
                "NotEqualTo",
                "StartsWith",
            ]
        );
    }

    #[test]
    fn test_supported_operators_for_nullable_number() {
        let registry = OperatorRegistry::new();
        let plain = registry.supported_operators(&DataType::Int).unwrap();
        let nullable = registry
            .supported_operators(&DataType::nullable(DataType::Int))
            .unwrap();

        assert!(!plain.contains(&operators::is_null()));
        assert!(nullable.contains(&operators::is_null()));
        assert!(nullable.contains(&operators::between()));
        assert!(!nullable.contains(&operators::contains()));
        assert!(!nullable.contains(&operators::in_list()));
    }

    #[test]
    fn test_supported_operators_for_arrays() {
        let registry = OperatorRegistry::new();
        let ops = registry
            .supported_operators(&DataType::array(DataType::Int))
            .unwrap();

        assert!(ops.contains(&operators::in_list()));
        assert!(ops.contains(&operators::not_in_list()));
        assert!(ops.contains(&operators::greater_than()));
        assert!(!ops.contains(&operators::contains()));

        let scalar = registry.supported_operators(&DataType::Int).unwrap();
        assert!(!scalar.contains(&operators::in_list()));
    }

    #[test]
    fn test_supported_operators_for_default_types() {
        let registry = OperatorRegistry::new();
        let ops = registry.supported_operators(&DataType::Uuid).unwrap();
        assert_eq!(names(&ops), vec!["EqualTo", "NotEqualTo"]);

        let entity = registry
            .supported_operators(&DataType::Entity("Address".to_string()))
            .unwrap();
        assert!(entity.contains(&operators::is_null()));
        assert!(entity.contains(&operators::is_not_null()));
    }

    #[test]
    #[traced_test]
    fn test_load_operators_with_override() {
        let registry = OperatorRegistry::new();
        let loaded = registry
            .load_operators(vec![OperatorRef::new(StrictEqualTo)], true)
            .unwrap();
        assert_eq!(loaded, 1);

        let found = registry.find_by_name("EqualTo").unwrap();
        assert_eq!(found.name(), "equalto");
        assert_eq!(found.type_groups(), TypeGroup::TEXT);

        let entries = registry.operators().unwrap();
        let equal_to: Vec<_> = entries
            .iter()
            .filter(|e| e.operator.same_name("EqualTo"))
            .collect();
        assert_eq!(equal_to.len(), 2);
        assert_eq!(equal_to.iter().filter(|e| e.active).count(), 1);

        // Numbers lost EqualTo with the override.
        let ops = registry.supported_operators(&DataType::Int).unwrap();
        assert!(!ops.iter().any(|o| o.same_name("EqualTo")));

        assert!(logs_contain("Operator 'equalto' overridden"));
    }

    #[test]
    #[traced_test]
    fn test_load_operators_without_override_skips_duplicates() {
        let registry = OperatorRegistry::new();
        let before = registry.operators().unwrap().len();

        let loaded = registry
            .load_operators(vec![OperatorRef::new(StrictEqualTo)], false)
            .unwrap();

        assert_eq!(loaded, 0);
        assert_eq!(registry.operators().unwrap().len(), before);
        assert_eq!(registry.find_by_name("EqualTo").unwrap().name(), "EqualTo");
        assert!(logs_contain("already registered, skipping"));
    }

    #[test]
    fn test_register_replaces_active_operator() {
        let registry = OperatorRegistry::empty();
        assert!(registry.find_by_name("EqualTo").is_err());

        registry.register(operators::equal_to()).unwrap();
        registry.register(OperatorRef::new(StrictEqualTo)).unwrap();

        let entries = registry.operators().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].active);
        assert!(entries[1].active);
        assert_eq!(registry.find_by_name("EQUALTO").unwrap().name(), "equalto");
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = OperatorRegistry::global();
        let b = OperatorRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.find_by_name("Between").is_ok());
    }

    #[test]
    fn test_every_builtin_operator_respects_its_categories() {
        let registry = OperatorRegistry::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let samples = vec![
            (DataType::String, Value::String("a".into())),
            (DataType::Int, Value::Int32(1)),
            (DataType::Boolean, Value::Boolean(true)),
            (DataType::Date, Value::Date(date)),
            (DataType::Uuid, Value::Uuid(Uuid::from_u128(1))),
            (DataType::nullable(DataType::Int), Value::Int32(1)),
        ];

        for op in operators::builtin_operators() {
            for (ty, sample) in &samples {
                let group = type_group(ty.underlying());
                let expected = !op.supports_lists()
                    && (op.type_groups().contains(group)
                        || (ty.is_nullable() && op.type_groups().contains(TypeGroup::NULLABLE)));
                assert_eq!(
                    registry.is_supported(ty, &op).unwrap(),
                    expected,
                    "{op} on {ty}"
                );
                if expected {
                    continue;
                }

                let (value, value2) = match op.arity() {
                    0 => (None, None),
                    1 => (Some(sample.clone()), None),
                    _ => (Some(sample.clone()), Some(sample.clone())),
                };
                let err = FilterStatement::from_values(
                    &registry,
                    "member",
                    op.clone(),
                    value,
                    value2,
                    ty.clone(),
                    Connector::And,
                )
                .unwrap_err();
                assert!(
                    matches!(
                        err,
                        FilterError::UnsupportedOperation { ref type_name, ref operator }
                            if *type_name == ty.to_string() && *operator == op.to_string()
                    ),
                    "{op} on {ty}: {err}"
                );
            }
        }
    }
}
