//! Statically validated sort specifications
//!
//! List endpoints accept an `order_by` parameter naming the columns to sort
//! on. The accepted fields are a closed enum per entity, so a caller can
//! never inject an arbitrary expression into the query.
//!
//! Two input forms are accepted:
//! - JSON: `[{"order": "asc"}, {"id": "desc"}]`
//! - compact: `order:asc,id:desc` (direction defaults to `asc`)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(WardenError::IllegalArgument(format!(
                "invalid sort direction '{}'",
                other
            ))),
        }
    }
}

/// A sortable column of some entity
pub trait SortField: Copy + Sized {
    /// Resolve a caller-supplied field name
    fn from_name(name: &str) -> Option<Self>;

    /// Canonical field name
    fn name(&self) -> &'static str;
}

/// One `(field, direction)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> SortSpec<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

impl<F: SortField> Display for SortSpec<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.field.name(), self.direction)
    }
}

fn resolve_field<F: SortField>(name: &str) -> Result<F, WardenError> {
    F::from_name(name.trim())
        .ok_or_else(|| WardenError::IllegalArgument(format!("invalid sort field '{}'", name)))
}

/// Parse an `order_by` parameter into validated sort specifications.
///
/// Blank input yields an empty list so the caller can apply its default.
pub fn parse_order_by<F: SortField>(raw: &str) -> Result<Vec<SortSpec<F>>, WardenError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    if raw.starts_with('[') {
        let entries: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(raw).map_err(|e| {
                WardenError::IllegalArgument(format!("invalid order_by '{}': {}", raw, e))
            })?;

        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            for (name, direction) in entry {
                let direction = direction.as_str().ok_or_else(|| {
                    WardenError::IllegalArgument(format!(
                        "sort direction for '{}' must be a string",
                        name
                    ))
                })?;
                specs.push(SortSpec {
                    field: resolve_field(&name)?,
                    direction: direction.parse()?,
                });
            }
        }
        return Ok(specs);
    }

    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (name, direction) = match part.split_once(':') {
                Some((name, direction)) => (name, direction.parse()?),
                None => (part, SortDirection::Asc),
            };
            Ok(SortSpec {
                field: resolve_field(name)?,
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Column {
        Id,
        Order,
    }

    impl SortField for Column {
        fn from_name(name: &str) -> Option<Self> {
            match name {
                "id" => Some(Column::Id),
                "order" => Some(Column::Order),
                _ => None,
            }
        }

        fn name(&self) -> &'static str {
            match self {
                Column::Id => "id",
                Column::Order => "order",
            }
        }
    }

    #[test]
    fn test_parse_json_form() {
        let specs = parse_order_by::<Column>(r#"[{"order": "asc"}, {"id": "DESC"}]"#).unwrap();
        assert_eq!(
            specs,
            vec![SortSpec::asc(Column::Order), SortSpec::desc(Column::Id)]
        );
    }

    #[test]
    fn test_parse_compact_form() {
        let specs = parse_order_by::<Column>("order, id:desc").unwrap();
        assert_eq!(
            specs,
            vec![SortSpec::asc(Column::Order), SortSpec::desc(Column::Id)]
        );
    }

    #[test]
    fn test_parse_blank() {
        assert!(parse_order_by::<Column>("   ").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = parse_order_by::<Column>(r#"[{"__import__('os')": "asc"}]"#).unwrap_err();
        assert!(matches!(err, WardenError::IllegalArgument(_)));

        let err = parse_order_by::<Column>("name:asc").unwrap_err();
        assert!(matches!(err, WardenError::IllegalArgument(_)));
    }

    #[test]
    fn test_rejects_bad_direction() {
        assert!(parse_order_by::<Column>("id:sideways").is_err());
        assert!(parse_order_by::<Column>(r#"[{"id": 1}]"#).is_err());
        assert!(parse_order_by::<Column>("[not json").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SortSpec::desc(Column::Order).to_string(), "order:desc");
    }
}
