use crate::core::data_type::DataType;
use std::{collections::HashSet, fmt};
use thiserror::Error;

/// Resolves a nested schema lazily, so entities may refer to each other (or
/// to themselves) without initialization cycles.
pub type SchemaFn = fn() -> &'static EntitySchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Entity name must not be empty")]
    EmptyEntityName,

    #[error("Invalid member name '{member}' on entity '{entity}'")]
    InvalidMemberName { entity: String, member: String },

    #[error("Member '{member}' is declared more than once on entity '{entity}'")]
    DuplicateMember { entity: String, member: String },
}

#[derive(Clone)]
pub enum MemberKind {
    Scalar(DataType),
    /// Single nested object. Always treated as possibly absent.
    Object(SchemaFn),
    /// Sequence of nested objects.
    Collection(SchemaFn),
}

impl fmt::Debug for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Scalar(ty) => write!(f, "Scalar({ty})"),
            MemberKind::Object(schema) => write!(f, "Object({})", schema().name()),
            MemberKind::Collection(schema) => write!(f, "Collection({})", schema().name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemberDef {
    name: String,
    kind: MemberKind,
}

impl MemberDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn data_type(&self) -> DataType {
        match &self.kind {
            MemberKind::Scalar(ty) => ty.clone(),
            MemberKind::Object(schema) => DataType::Entity(schema().name().to_string()),
            MemberKind::Collection(schema) => DataType::Collection(schema().name().to_string()),
        }
    }

    /// Schema of the nested object, for object members.
    pub fn object_schema(&self) -> Option<&'static EntitySchema> {
        match self.kind {
            MemberKind::Object(schema) => Some(schema()),
            _ => None,
        }
    }

    /// Schema of the collection elements, for collection members.
    pub fn element_schema(&self) -> Option<&'static EntitySchema> {
        match self.kind {
            MemberKind::Collection(schema) => Some(schema()),
            _ => None,
        }
    }
}

/// Static description of an entity type: its name and the members a filter
/// may refer to.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    members: Vec<MemberDef>,
}

impl EntitySchema {
    pub fn builder(name: &str) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            name: name.to_string(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[MemberDef] {
        &self.members
    }

    /// Looks up a member by its exact name.
    pub fn member(&self, name: &str) -> Option<&MemberDef> {
        self.members.iter().find(|m| m.name == name)
    }
}

pub struct EntitySchemaBuilder {
    name: String,
    members: Vec<MemberDef>,
}

impl EntitySchemaBuilder {
    pub fn scalar(mut self, name: &str, data_type: DataType) -> Self {
        self.push(name, MemberKind::Scalar(data_type));
        self
    }

    pub fn object(mut self, name: &str, schema: SchemaFn) -> Self {
        self.push(name, MemberKind::Object(schema));
        self
    }

    pub fn collection(mut self, name: &str, schema: SchemaFn) -> Self {
        self.push(name, MemberKind::Collection(schema));
        self
    }

    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyEntityName);
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if !is_identifier(&member.name) {
                return Err(SchemaError::InvalidMemberName {
                    entity: self.name.clone(),
                    member: member.name.clone(),
                });
            }
            if !seen.insert(member.name.as_str()) {
                return Err(SchemaError::DuplicateMember {
                    entity: self.name.clone(),
                    member: member.name.clone(),
                });
            }
        }

        Ok(EntitySchema {
            name: self.name,
            members: self.members,
        })
    }

    fn push(&mut self, name: &str, kind: MemberKind) {
        self.members.push(MemberDef {
            name: name.to_string(),
            kind,
        });
    }
}

/// Member names follow the identifier rules used in property paths.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn tag_schema() -> &'static EntitySchema {
        static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            EntitySchema::builder("Tag")
                .scalar("label", DataType::String)
                .build()
                .unwrap()
        })
    }

    #[test]
    fn test_build_schema() {
        let schema = EntitySchema::builder("Post")
            .scalar("title", DataType::String)
            .scalar("views", DataType::nullable(DataType::Long))
            .object("main_tag", tag_schema)
            .collection("tags", tag_schema)
            .build()
            .unwrap();

        assert_eq!(schema.name(), "Post");
        assert_eq!(schema.members().len(), 4);
        assert_eq!(
            schema.member("views").unwrap().data_type(),
            DataType::nullable(DataType::Long)
        );
        assert_eq!(
            schema.member("main_tag").unwrap().data_type(),
            DataType::Entity("Tag".to_string())
        );
        assert_eq!(
            schema.member("tags").unwrap().element_schema().unwrap().name(),
            "Tag"
        );
        assert!(schema.member("tags").unwrap().object_schema().is_none());
    }

    #[test]
    fn test_member_lookup_is_case_sensitive() {
        let schema = tag_schema();
        assert!(schema.member("label").is_some());
        assert!(schema.member("Label").is_none());
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let err = EntitySchema::builder("Post")
            .scalar("title", DataType::String)
            .scalar("title", DataType::String)
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::DuplicateMember {
                entity: "Post".to_string(),
                member: "title".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert_eq!(
            EntitySchema::builder(" ").build().unwrap_err(),
            SchemaError::EmptyEntityName
        );
        assert!(matches!(
            EntitySchema::builder("Post")
                .scalar("a.b", DataType::Int)
                .build(),
            Err(SchemaError::InvalidMemberName { .. })
        ));
    }
}
