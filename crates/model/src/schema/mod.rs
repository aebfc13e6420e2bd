pub mod entity;
pub mod record;

pub use entity::{EntitySchema, EntitySchemaBuilder, MemberDef, MemberKind, SchemaError, SchemaFn};
pub use record::{Entity, FieldRef, Record};
