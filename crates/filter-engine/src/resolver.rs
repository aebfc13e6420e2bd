use crate::{
    error::{FilterError, Result},
    expr::{Expr, MemberAccess},
};
use model::{
    core::data_type::DataType,
    schema::entity::{EntitySchema, MemberDef},
};

/// A property path resolved against an entity schema.
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    pub path: Vec<String>,
    pub data_type: DataType,
    /// Type of every segment, in path order. The last entry is `data_type`.
    segment_types: Vec<DataType>,
    def: MemberDef,
}

impl ResolvedMember {
    pub fn access(&self) -> MemberAccess {
        MemberAccess::new(self.path.clone(), self.data_type.clone())
    }

    pub fn expr(&self) -> Expr {
        Expr::member(self.access())
    }

    /// Name of the final segment.
    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn def(&self) -> &MemberDef {
        &self.def
    }

    pub fn has_parents(&self) -> bool {
        self.path.len() > 1
    }

    fn prefix(&self, len: usize) -> Expr {
        Expr::member(MemberAccess::new(
            self.path[..len].to_vec(),
            self.segment_types[len - 1].clone(),
        ))
    }
}

/// Navigates dotted paths over a schema and builds the null guards that make
/// access to nested members safe.
pub struct MemberResolver<'s> {
    schema: &'s EntitySchema,
    max_depth: usize,
}

impl<'s> MemberResolver<'s> {
    pub fn new(schema: &'s EntitySchema, max_depth: usize) -> Self {
        Self { schema, max_depth }
    }

    pub fn schema(&self) -> &EntitySchema {
        self.schema
    }

    /// Resolves each segment in turn. Every segment but the last must be an
    /// object member. Names match exactly.
    pub fn resolve(&self, segments: &[String]) -> Result<ResolvedMember> {
        if segments.len() > self.max_depth {
            return Err(FilterError::InvalidPropertyPath {
                path: segments.join("."),
                reason: format!("deeper than the maximum of {} segments", self.max_depth),
            });
        }

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| FilterError::InvalidPropertyPath {
                path: String::new(),
                reason: "path is empty".to_string(),
            })?;

        let mut schema: &EntitySchema = self.schema;
        let mut segment_types = Vec::with_capacity(segments.len());

        for (i, segment) in parents.iter().enumerate() {
            let def = Self::lookup(schema, segment)?;
            segment_types.push(def.data_type());
            schema = match def.object_schema() {
                Some(nested) => nested,
                None => {
                    return Err(FilterError::MemberNotFound {
                        member: segments[i + 1].clone(),
                        entity: def.data_type().to_string(),
                    });
                }
            };
        }

        let def = Self::lookup(schema, last)?.clone();
        let data_type = def.data_type();
        segment_types.push(data_type.clone());

        Ok(ResolvedMember {
            path: segments.to_vec(),
            data_type,
            segment_types,
            def,
        })
    }

    /// Resolves a path that must end in a collection member and returns the
    /// schema of its elements.
    pub fn resolve_collection(
        &self,
        segments: &[String],
    ) -> Result<(ResolvedMember, &'static EntitySchema)> {
        let member = self.resolve(segments)?;
        match member.def.element_schema() {
            Some(element) => Ok((member, element)),
            None => Err(FilterError::MemberNotFound {
                member: member.path.join("."),
                entity: self.schema.name().to_string(),
            }),
        }
    }

    /// Wraps `inner` in a not-null test for every intermediate segment,
    /// innermost parent first: `a != null && (a.b != null && inner)`.
    pub fn build_safe_access(&self, member: &ResolvedMember, inner: Expr) -> Expr {
        (1..member.path.len())
            .rev()
            .fold(inner, |acc, len| {
                Expr::and(Expr::is_not_null(member.prefix(len)), acc)
            })
    }

    /// Null test on the top-level parent of the path.
    pub fn parent_null_check(&self, member: &ResolvedMember) -> Expr {
        Expr::is_null(member.prefix(1))
    }

    fn lookup<'a>(schema: &'a EntitySchema, segment: &str) -> Result<&'a MemberDef> {
        schema
            .member(segment)
            .ok_or_else(|| FilterError::MemberNotFound {
                member: segment.to_string(),
                entity: schema.name().to_string(),
            })
    }
}
