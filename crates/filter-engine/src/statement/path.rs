use crate::error::{FilterError, Result};
use model::schema::entity::is_identifier;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    /// `a.b.c`
    Member(Vec<String>),
    /// `base[inner]`: `inner` is evaluated on each element of `base`.
    Element {
        collection: Vec<String>,
        member: Vec<String>,
    },
}

/// A parsed property path such as `address.city` or `orders[total]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    kind: PathKind,
}

impl PropertyPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| FilterError::InvalidPropertyPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("path is empty"));
        }

        let opens = raw.matches('[').count();
        let closes = raw.matches(']').count();
        if opens != closes {
            return Err(invalid("unbalanced brackets"));
        }
        if opens > 1 {
            return Err(invalid("only one collection segment is allowed"));
        }

        let kind = match raw.split_once('[') {
            None => PathKind::Member(
                Self::segments(raw).ok_or_else(|| invalid("empty or invalid segment"))?,
            ),
            Some((base, rest)) => {
                let inner = rest
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("the collection segment must end the path"))?;
                PathKind::Element {
                    collection: Self::segments(base)
                        .ok_or_else(|| invalid("empty or invalid collection segment"))?,
                    member: Self::segments(inner)
                        .ok_or_else(|| invalid("empty or invalid element segment"))?,
                }
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    fn segments(s: &str) -> Option<Vec<String>> {
        s.split('.')
            .map(|seg| is_identifier(seg).then(|| seg.to_string()))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &PathKind {
        &self.kind
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, PathKind::Element { .. })
    }

    /// Total number of member segments, collection segment included.
    pub fn depth(&self) -> usize {
        match &self.kind {
            PathKind::Member(segments) => segments.len(),
            PathKind::Element { collection, member } => collection.len() + member.len(),
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_member_path() {
        let path = PropertyPath::parse("address.country.code").unwrap();
        assert_eq!(
            path.kind(),
            &PathKind::Member(strings(&["address", "country", "code"]))
        );
        assert_eq!(path.depth(), 3);
        assert!(!path.is_element());
    }

    #[test]
    fn test_parse_element_path() {
        let path = PropertyPath::parse("orders[total]").unwrap();
        assert_eq!(
            path.kind(),
            &PathKind::Element {
                collection: strings(&["orders"]),
                member: strings(&["total"]),
            }
        );
        assert_eq!(path.to_string(), "orders[total]");
    }

    #[test]
    fn test_rejects_malformed_paths() {
        for raw in [
            "",
            "a..b",
            ".a",
            "a.",
            "orders[total",
            "orders]total[",
            "orders[]",
            "[total]",
            "a[b][c]",
            "a[b].c",
            "a b",
        ] {
            let err = PropertyPath::parse(raw).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidPropertyPath { .. }),
                "{raw:?} should be rejected"
            );
        }
    }
}
