use crate::{
    compiler::FilterCompiler,
    error::Result,
    operators::OperatorRef,
    predicate::Predicate,
    registry::OperatorRegistry,
    settings::CompilerSettings,
    statement::{Connector, FilterStatement},
};
use model::{core::convert::FilterValue, schema::record::Entity};
use std::{fmt, marker::PhantomData, sync::Arc};

/// Ordered groups of statements describing how to filter entities of type `T`.
///
/// There is always at least one group. Statements are appended to the last
/// group; [`Filter::start_group`] opens a new one.
pub struct Filter<T> {
    registry: Arc<OperatorRegistry>,
    groups: Vec<Vec<FilterStatement>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Filter<T> {
    /// Filter validated against the process-wide operator registry.
    pub fn new() -> Self {
        Self::with_registry(OperatorRegistry::global())
    }

    pub fn with_registry(registry: Arc<OperatorRegistry>) -> Self {
        Self {
            registry,
            groups: vec![Vec::new()],
            _entity: PhantomData,
        }
    }

    pub fn registry(&self) -> &Arc<OperatorRegistry> {
        &self.registry
    }

    /// Adds a statement whose operator takes no values.
    pub fn by(
        &mut self,
        path: &str,
        operator: OperatorRef,
    ) -> Result<StatementConnection<'_, T>> {
        let statement =
            FilterStatement::without_values(&self.registry, path, operator, Connector::And)?;
        Ok(self.by_statement(statement))
    }

    pub fn by_value<V: FilterValue>(
        &mut self,
        path: &str,
        operator: OperatorRef,
        value: V,
    ) -> Result<StatementConnection<'_, T>> {
        self.by_with(path, operator, Some(value), None, Connector::And)
    }

    pub fn by_values<V: FilterValue>(
        &mut self,
        path: &str,
        operator: OperatorRef,
        value: V,
        value2: V,
    ) -> Result<StatementConnection<'_, T>> {
        self.by_with(path, operator, Some(value), Some(value2), Connector::And)
    }

    pub fn by_with<V: FilterValue>(
        &mut self,
        path: &str,
        operator: OperatorRef,
        value: Option<V>,
        value2: Option<V>,
        connector: Connector,
    ) -> Result<StatementConnection<'_, T>> {
        let statement =
            FilterStatement::new(&self.registry, path, operator, value, value2, connector)?;
        Ok(self.by_statement(statement))
    }

    pub fn by_statement(&mut self, statement: FilterStatement) -> StatementConnection<'_, T> {
        if self.groups.is_empty() {
            self.groups.push(Vec::new());
        }
        if let Some(group) = self.groups.last_mut() {
            group.push(statement);
        }
        StatementConnection { filter: self }
    }

    /// Opens a new group unless the current one is still empty.
    pub fn start_group(&mut self) {
        if self.groups.last().is_none_or(|g| !g.is_empty()) {
            self.groups.push(Vec::new());
        }
    }

    pub fn group(&mut self) -> &mut Self {
        self.start_group();
        self
    }

    /// Removes every statement, leaving a single empty group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.groups.push(Vec::new());
    }

    pub fn statements(&self) -> &[Vec<FilterStatement>] {
        &self.groups
    }

    pub fn compile(&self) -> Result<Predicate<T>> {
        self.compile_with(&CompilerSettings::default())
    }

    pub fn compile_with(&self, settings: &CompilerSettings) -> Result<Predicate<T>> {
        let expr =
            FilterCompiler::new(&self.registry, settings).compile(T::schema(), &self.groups)?;
        Ok(Predicate::new(expr))
    }
}

impl<T: Entity> Default for Filter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            groups: self.groups.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("groups", &self.groups)
            .finish()
    }
}

/// Renders the statements joined by their connectors. Groups are wrapped in
/// parentheses when there is more than one.
impl<T> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<&Vec<FilterStatement>> =
            self.groups.iter().filter(|g| !g.is_empty()).collect();
        let parenthesize = groups.len() > 1;

        let mut previous: Option<Connector> = None;
        for group in groups {
            if let Some(connector) = previous {
                write!(f, " {connector} ")?;
            }
            if parenthesize {
                write!(f, "(")?;
            }
            for (i, statement) in group.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", group[i - 1].connector())?;
                }
                write!(f, "{statement}")?;
            }
            if parenthesize {
                write!(f, ")")?;
            }
            previous = group.last().map(FilterStatement::connector);
        }
        Ok(())
    }
}

/// Handle returned after adding a statement, used to pick the connector to
/// the next one.
pub struct StatementConnection<'a, T> {
    filter: &'a mut Filter<T>,
}

impl<'a, T> StatementConnection<'a, T> {
    pub fn and(self) -> &'a mut Filter<T> {
        self.connect(Connector::And)
    }

    pub fn or(self) -> &'a mut Filter<T> {
        self.connect(Connector::Or)
    }

    fn connect(self, connector: Connector) -> &'a mut Filter<T> {
        if let Some(statement) = self.filter.groups.last_mut().and_then(|g| g.last_mut()) {
            statement.set_connector(connector);
        }
        self.filter
    }
}
