//! Shared filtering and sorting vocabulary for list endpoints.

use std::str::FromStr;

use serde::Deserialize;

/// Error returned when a sort or order parameter is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: {value}")]
pub struct SortParseError {
    /// Which parameter failed (`sort field` or `sort order`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Direction of a list sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(SortParseError {
                kind: "sort order",
                value: s.to_owned(),
            }),
        }
    }
}

/// Raw query string of a list endpoint.
///
/// Everything arrives as optional text; the services turn it into typed
/// filters so bad input becomes a validation error instead of a 422 from
/// the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

/// Drop blank filter values so `?name=` behaves like no filter at all.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parse an optional parameter, falling back to the type's default.
///
/// # Errors
///
/// Returns the parse error of `T` when a non-blank value is present but invalid.
pub fn parse_or_default<T>(value: Option<&str>) -> Result<T, T::Err>
where
    T: FromStr + Default,
{
    match non_blank(value) {
        Some(v) => v.parse(),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_is_case_insensitive() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!("Desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or_default::<SortOrder>(None).unwrap(), SortOrder::Asc);
        assert_eq!(parse_or_default::<SortOrder>(Some("  ")).unwrap(), SortOrder::Asc);
        assert_eq!(
            parse_or_default::<SortOrder>(Some("desc")).unwrap(),
            SortOrder::Desc
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" pizza ")), Some("pizza".to_owned()));
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_list_query_uses_camel_case() {
        let q: ListQuery =
            serde_json::from_str(r#"{"sortBy":"rating","order":"desc","name":"cafe"}"#).unwrap();
        assert_eq!(q.sort_by.as_deref(), Some("rating"));
        assert_eq!(q.order.as_deref(), Some("desc"));
        assert_eq!(q.name.as_deref(), Some("cafe"));
    }
}
