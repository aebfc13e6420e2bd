use crate::{
    error::{FilterError, Result},
    expr::Expr,
    operators::Operand,
    registry::OperatorRegistry,
    resolver::{MemberResolver, ResolvedMember},
    settings::CompilerSettings,
    statement::{Connector, FilterStatement, PathKind},
};
use model::{
    core::{data_type::DataType, value::Value},
    schema::entity::EntitySchema,
};
use tracing::{debug, trace};

/// Turns statement groups into a single predicate expression over an entity
/// schema.
pub struct FilterCompiler<'a> {
    registry: &'a OperatorRegistry,
    settings: &'a CompilerSettings,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(registry: &'a OperatorRegistry, settings: &'a CompilerSettings) -> Self {
        Self { registry, settings }
    }

    /// Groups are joined left to right by the connector of the last statement
    /// of the previous group. Nothing to compile yields a constant `true`.
    pub fn compile(
        &self,
        schema: &EntitySchema,
        groups: &[Vec<FilterStatement>],
    ) -> Result<Expr> {
        self.settings.validate()?;

        let mut result: Option<Expr> = None;
        let mut connector = Connector::And;
        let mut compiled_groups = 0;

        for group in groups.iter().filter(|g| !g.is_empty()) {
            let expr = self.compile_group(schema, group)?;
            result = Some(match result {
                Some(previous) => combine(previous, expr, connector),
                None => expr,
            });
            if let Some(last) = group.last() {
                connector = last.connector();
            }
            compiled_groups += 1;
        }

        let expr = result.unwrap_or_else(Expr::always_true);
        debug!(
            "Compiled filter over '{}' ({} group(s))",
            schema.name(),
            compiled_groups
        );
        if self.settings.log_compiled {
            debug!("Compiled predicate: x => {}", expr);
        }
        Ok(expr)
    }

    /// Statements combine left-associatively with the connector stored on
    /// the preceding statement.
    pub fn compile_group(
        &self,
        schema: &EntitySchema,
        group: &[FilterStatement],
    ) -> Result<Expr> {
        let mut result: Option<Expr> = None;
        let mut connector = Connector::And;

        for statement in group {
            let expr = self.compile_statement(schema, statement)?;
            result = Some(match result {
                Some(previous) => combine(previous, expr, connector),
                None => expr,
            });
            connector = statement.connector();
        }

        Ok(result.unwrap_or_else(Expr::always_true))
    }

    pub fn compile_statement(
        &self,
        schema: &EntitySchema,
        statement: &FilterStatement,
    ) -> Result<Expr> {
        trace!("Compiling statement '{}'", statement);
        match statement.path().kind() {
            PathKind::Member(segments) => {
                self.compile_member(schema, segments, statement, self.settings.max_path_depth)
            }
            PathKind::Element { collection, member } => {
                self.compile_element(schema, collection, member, statement)
            }
        }
    }

    /// `base[inner]`: at least one element of `base` satisfies the statement
    /// applied to `inner`. Parents of a dotted base are null-guarded.
    fn compile_element(
        &self,
        schema: &EntitySchema,
        collection: &[String],
        member: &[String],
        statement: &FilterStatement,
    ) -> Result<Expr> {
        let max_depth = self.settings.max_path_depth;
        let resolver = MemberResolver::new(schema, max_depth);
        let (resolved, element_schema) = resolver.resolve_collection(collection)?;

        let remaining = max_depth.saturating_sub(collection.len());
        let predicate = self.compile_member(element_schema, member, statement, remaining)?;
        trace!(
            "Quantifying '{}' over collection '{}'",
            statement,
            resolved.access().dotted()
        );

        let exists = Expr::exists(resolved.access(), predicate);
        Ok(resolver.build_safe_access(&resolved, exists))
    }

    fn compile_member(
        &self,
        schema: &EntitySchema,
        segments: &[String],
        statement: &FilterStatement,
        max_depth: usize,
    ) -> Result<Expr> {
        let resolver = MemberResolver::new(schema, max_depth);
        let member = resolver.resolve(segments)?;
        let operator = statement.operator();

        // Without a constant the declared type says nothing about the member.
        let unchecked = statement.value().is_none();
        if unchecked && !self.registry.is_supported(&member.data_type, operator)? {
            return Err(FilterError::UnsupportedOperation {
                type_name: member.data_type.to_string(),
                operator: operator.to_string(),
            });
        }

        let value = statement.value().cloned().unwrap_or(Value::Null);
        let value2 = statement.value2().cloned().unwrap_or(Value::Null);
        let unwrap_nullable = member.data_type.is_nullable() && !value.is_null();

        let operand_type = if unwrap_nullable {
            member.data_type.underlying().clone()
        } else {
            member.data_type.clone()
        };
        check_value_type(&member, &operand_type, statement)?;

        let operand = Operand::new(member.expr(), operand_type);
        let mut expr = operator.build(&operand, &value, &value2);
        if unwrap_nullable {
            expr = Expr::and(Expr::has_value(member.expr()), expr);
        }

        expr = resolver.build_safe_access(&member, expr);

        if operator.expects_null_values() && member.has_parents() {
            expr = Expr::or(resolver.parent_null_check(&member), expr);
        }

        trace!("Statement '{}' compiled to {}", statement, expr);
        Ok(expr)
    }
}

fn combine(left: Expr, right: Expr, connector: Connector) -> Expr {
    match connector {
        Connector::And => Expr::and(left, right),
        Connector::Or => Expr::or(left, right),
    }
}

/// The constants must have exactly the member's type, its nullable
/// underlying type, or, for lists, the element type.
fn check_value_type(
    member: &ResolvedMember,
    member_type: &DataType,
    statement: &FilterStatement,
) -> Result<()> {
    if statement.value().is_none() {
        return Ok(());
    }

    let value_type = statement.value_type().element().underlying();
    if member_type.is_compatible(value_type) {
        return Ok(());
    }

    Err(FilterError::PropertyValueTypeMismatch {
        member: member.name().to_string(),
        member_type: member_type.to_string(),
        value_type: statement.value_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::SettingsError,
        operators::{self, OperatorRef},
        testing::{Customer, Shop},
    };
    use model::{core::convert::FilterValue, schema::record::Entity};
    use tracing_test::traced_test;

    fn statement<V: FilterValue>(
        registry: &OperatorRegistry,
        path: &str,
        operator: OperatorRef,
        value: V,
    ) -> FilterStatement {
        FilterStatement::new(registry, path, operator, Some(value), None, Connector::And).unwrap()
    }

    fn compile(registry: &OperatorRegistry, groups: &[Vec<FilterStatement>]) -> Result<Expr> {
        FilterCompiler::new(registry, &CompilerSettings::default())
            .compile(Customer::schema(), groups)
    }

    #[test]
    fn test_empty_filter_is_true() {
        let registry = OperatorRegistry::new();
        assert_eq!(compile(&registry, &[]).unwrap(), Expr::always_true());
        assert_eq!(
            compile(&registry, &[vec![], vec![]]).unwrap(),
            Expr::always_true()
        );
    }

    #[test]
    fn test_group_is_left_associative() {
        let registry = OperatorRegistry::new();
        let mut a = statement(&registry, "id", operators::equal_to(), 1);
        a.set_connector(Connector::Or);
        let b = statement(&registry, "id", operators::equal_to(), 2);
        let c = statement(&registry, "id", operators::equal_to(), 3);

        let expr = compile(&registry, &[vec![a, b, c]]).unwrap();
        assert_eq!(
            expr.to_string(),
            "(((x.id == 1) OrElse (x.id == 2)) AndAlso (x.id == 3))"
        );
    }

    #[test]
    fn test_groups_use_last_connector_of_previous_group() {
        let registry = OperatorRegistry::new();
        let a = statement(&registry, "id", operators::equal_to(), 1);
        let mut b = statement(&registry, "id", operators::equal_to(), 2);
        b.set_connector(Connector::Or);
        let c = statement(&registry, "id", operators::equal_to(), 3);

        let expr = compile(&registry, &[vec![a, b], vec![], vec![c]]).unwrap();
        assert_eq!(
            expr.to_string(),
            "(((x.id == 1) AndAlso (x.id == 2)) OrElse (x.id == 3))"
        );
    }

    #[test]
    fn test_nullable_member_is_unwrapped() {
        let registry = OperatorRegistry::new();
        let gt = statement(&registry, "age", operators::greater_than(), Some(30));
        let expr = compile(&registry, &[vec![gt]]).unwrap();
        assert_eq!(expr.to_string(), "(x.age.HasValue AndAlso (x.age > 30))");
    }

    #[test]
    fn test_nested_member_is_guarded() {
        let registry = OperatorRegistry::new();
        let eq = statement(&registry, "address.country.code", operators::equal_to(), "PT");
        let expr = compile(&registry, &[vec![eq]]).unwrap();
        assert_eq!(
            expr.to_string(),
            "((x.address != NULL) AndAlso ((x.address.country != NULL) AndAlso \
             ((x.address.country.code != NULL) AndAlso x.address.country.code.Equals('PT', OrdinalIgnoreCase))))"
        );
    }

    #[test]
    fn test_expects_null_values_checks_parent() {
        let registry = OperatorRegistry::new();
        let blank = FilterStatement::without_values(
            &registry,
            "address.city",
            operators::is_null_or_white_space(),
            Connector::And,
        )
        .unwrap();
        let expr = compile(&registry, &[vec![blank]]).unwrap();
        assert_eq!(
            expr.to_string(),
            "((x.address == NULL) OrElse ((x.address != NULL) AndAlso \
             ((x.address.city == NULL) OrElse ((x.address.city != NULL) AndAlso (x.address.city == '')))))"
        );
    }

    #[test]
    fn test_collection_statement() {
        let registry = OperatorRegistry::new();
        let total = statement(&registry, "orders[total]", operators::greater_than(), 100.0);
        let expr = compile(&registry, &[vec![total]]).unwrap();
        assert_eq!(expr.to_string(), "x.orders.Any(i => (i.total > 100))");
    }

    #[test]
    fn test_dotted_collection_base_is_guarded() {
        let registry = OperatorRegistry::new();
        let total = statement(&registry, "owner.orders[total]", operators::greater_than(), 100.0);
        let expr = FilterCompiler::new(&registry, &CompilerSettings::default())
            .compile(Shop::schema(), &[vec![total]])
            .unwrap();
        assert_eq!(
            expr.to_string(),
            "((x.owner != NULL) AndAlso x.owner.orders.Any(i => (i.total > 100)))"
        );
    }

    #[test]
    fn test_collection_base_must_be_collection() {
        let registry = OperatorRegistry::new();
        let bad = statement(&registry, "address[city]", operators::equal_to(), "Porto");
        let err = compile(&registry, &[vec![bad]]).unwrap_err();
        assert!(matches!(err, FilterError::MemberNotFound { .. }));
    }

    #[test]
    fn test_unknown_member() {
        let registry = OperatorRegistry::new();
        let bad = statement(&registry, "nickname", operators::equal_to(), "Bo");
        let err = compile(&registry, &[vec![bad]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Property Name 'nickname' was not found on Type 'Customer'."
        );
    }

    #[test]
    fn test_value_type_mismatch() {
        let registry = OperatorRegistry::new();
        let bad = statement(&registry, "id", operators::equal_to(), 1i64);
        let err = compile(&registry, &[vec![bad]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The type of the member 'id' (Int32) is different from the type of one of the constants (Int64)"
        );

        let text_vs_number = statement(&registry, "name", operators::equal_to(), 5);
        assert_eq!(
            compile(&registry, &[vec![text_vs_number]])
                .unwrap_err()
                .to_string(),
            "The type of the member 'name' (String) is different from the type of one of the constants (Int32)"
        );

        let list = statement(&registry, "name", operators::in_list(), vec![1, 2]);
        assert!(matches!(
            compile(&registry, &[vec![list]]),
            Err(FilterError::PropertyValueTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_list_value_uses_element_type() {
        let registry = OperatorRegistry::new();
        let list = statement(&registry, "name", operators::in_list(), ["Ann", "Bo"]);
        let expr = compile(&registry, &[vec![list]]).unwrap();
        assert_eq!(expr.to_string(), "('Ann', 'Bo').Contains(x.name)");
    }

    #[test]
    fn test_zero_arity_checks_member_type() {
        let registry = OperatorRegistry::new();
        let is_null = FilterStatement::without_values(
            &registry,
            "balance",
            operators::is_null(),
            Connector::And,
        )
        .unwrap();
        let err = compile(&registry, &[vec![is_null]]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The type 'Double' does not have support for the operation 'IsNull'."
        );

        let on_object = FilterStatement::without_values(
            &registry,
            "address",
            operators::is_null(),
            Connector::And,
        )
        .unwrap();
        assert_eq!(
            compile(&registry, &[vec![on_object]]).unwrap().to_string(),
            "(x.address == NULL)"
        );
    }

    #[test]
    fn test_null_constant_never_reaches_codegen() {
        let registry = OperatorRegistry::new();
        let err = FilterStatement::new(
            &registry,
            "age",
            operators::contains(),
            Some(None::<String>),
            None,
            Connector::And,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::WrongNumberOfValues { arity: 1, .. }));

        let on_number = FilterStatement::without_values(
            &registry,
            "age",
            operators::is_empty(),
            Connector::And,
        )
        .unwrap();
        assert_eq!(
            compile(&registry, &[vec![on_number]]).unwrap_err().to_string(),
            "The type 'Nullable<Int32>' does not have support for the operation 'IsEmpty'."
        );
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let registry = OperatorRegistry::new();
        let settings = CompilerSettings {
            max_path_depth: 0,
            ..CompilerSettings::default()
        };
        let err = FilterCompiler::new(&registry, &settings)
            .compile(Customer::schema(), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::Settings(SettingsError::Invalid { ref name, .. }) if name == "max_path_depth"
        ));
    }

    #[test]
    fn test_max_depth_from_settings() {
        let registry = OperatorRegistry::new();
        let deep = statement(&registry, "address.country.code", operators::equal_to(), "PT");
        let settings = CompilerSettings {
            max_path_depth: 2,
            ..CompilerSettings::default()
        };
        let err = FilterCompiler::new(&registry, &settings)
            .compile(Customer::schema(), &[vec![deep]])
            .unwrap_err();
        assert!(matches!(err, FilterError::InvalidPropertyPath { .. }));
    }

    #[test]
    #[traced_test]
    fn test_logs_compiled_predicate() {
        let registry = OperatorRegistry::new();
        let eq = statement(&registry, "active", operators::equal_to(), true);
        let settings = CompilerSettings {
            log_compiled: true,
            ..CompilerSettings::default()
        };
        FilterCompiler::new(&registry, &settings)
            .compile(Customer::schema(), &[vec![eq]])
            .unwrap();

        assert!(logs_contain("Compiled filter over 'Customer' (1 group(s))"));
        assert!(logs_contain("Compiled predicate: x => (x.active == true)"));
    }
}
