//! Rating value type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a value is outside the 1-5 rating scale.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("rating must be an integer between {min} and {max}", min = RatingValue::MIN, max = RatingValue::MAX)]
pub struct RatingValueError;

/// A rating on the 1-5 scale.
///
/// ```
/// use storerate_core::RatingValue;
///
/// assert!(RatingValue::new(5).is_ok());
/// assert!(RatingValue::new(0).is_err());
/// assert!(RatingValue::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct RatingValue(i32);

impl RatingValue {
    /// Lowest allowed rating.
    pub const MIN: i32 = 1;
    /// Highest allowed rating.
    pub const MAX: i32 = 5;

    /// Create a rating value, checking the range.
    ///
    /// # Errors
    ///
    /// Returns `RatingValueError` if `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingValueError> {
        i32::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingValueError)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for RatingValue {
    type Error = RatingValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RatingValue> for i32 {
    fn from(value: RatingValue) -> Self {
        value.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RatingValue {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RatingValue {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // The CHECK constraint keeps stored values in range
        Ok(Self(v))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RatingValue {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_scale() {
        for v in 1..=5 {
            assert_eq!(RatingValue::new(v).unwrap().get(), i32::try_from(v).unwrap());
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(RatingValue::new(0), Err(RatingValueError));
        assert_eq!(RatingValue::new(6), Err(RatingValueError));
        assert_eq!(RatingValue::new(-1), Err(RatingValueError));
        assert_eq!(RatingValue::new(i64::MAX), Err(RatingValueError));
    }

    #[test]
    fn test_deserialize_checks_range() {
        let ok: RatingValue = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<RatingValue>("9").is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            RatingValueError.to_string(),
            "rating must be an integer between 1 and 5"
        );
    }
}
