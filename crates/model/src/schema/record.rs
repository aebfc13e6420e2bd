use crate::{
    core::{convert::FilterValue, value::Value},
    schema::entity::EntitySchema,
};

/// Runtime access to the members of an entity instance.
pub trait Record {
    /// Returns the member with the given name, or `None` when the entity has
    /// no such member.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;
}

/// A [`Record`] whose shape is described by a static [`EntitySchema`].
pub trait Entity: Record {
    fn schema() -> &'static EntitySchema;
}

/// Borrowed view of a single member value.
pub enum FieldRef<'a> {
    Value(Value),
    Object(Option<&'a dyn Record>),
    Collection(Option<Vec<&'a dyn Record>>),
}

impl<'a> FieldRef<'a> {
    pub fn value<V: FilterValue>(value: V) -> Self {
        FieldRef::Value(value.into_value())
    }

    pub fn object<R: Record + 'a>(object: Option<&'a R>) -> Self {
        FieldRef::Object(object.map(|r| r as &dyn Record))
    }

    pub fn collection<R: Record + 'a>(items: &'a [R]) -> Self {
        FieldRef::Collection(Some(items.iter().map(|r| r as &dyn Record).collect()))
    }

    pub fn is_null(&self) -> bool {
        match self {
            FieldRef::Value(v) => v.is_null(),
            FieldRef::Object(o) => o.is_none(),
            FieldRef::Collection(c) => c.is_none(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldRef::Value(_) => "value",
            FieldRef::Object(_) => "object",
            FieldRef::Collection(_) => "collection",
        }
    }
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldRef::Value(v) => write!(f, "Value({v:?})"),
            FieldRef::Object(o) => write!(f, "Object(present: {})", o.is_some()),
            FieldRef::Collection(Some(items)) => write!(f, "Collection(len: {})", items.len()),
            FieldRef::Collection(None) => write!(f, "Collection(null)"),
        }
    }
}
