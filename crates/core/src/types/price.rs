//! Type-safe price representation using decimal arithmetic.
//!
//! Prices coming from the remote catalog are validated to be non-negative on
//! the way in. Values read back from the store are trusted as-is.

use core::fmt;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A price in the store's currency.
///
/// Amount is in the currency's standard unit (e.g., dollars, not cents).
///
/// ## Examples
///
/// ```
/// use product_importer_core::Price;
/// use rust_decimal::Decimal;
///
/// let a = Price::new(Decimal::new(1000, 2)).unwrap();
/// let b = Price::new(Decimal::new(550, 2)).unwrap();
/// assert_eq!((a + b).to_string(), "$15.50");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero, used as the baseline when a stored price is missing.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Wrap an amount read back from the store without validation.
    #[must_use]
    pub const fn from_stored(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Add two prices, returning `None` on decimal overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_stored(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_zero_and_positive() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
        assert!(Price::new(Decimal::new(999, 2)).is_ok());
    }

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Price::new(Decimal::new(-5, 1)),
            Err(PriceError::Negative(Decimal::new(-5, 1)))
        );
    }

    #[test]
    fn test_add_sums_amounts() {
        let ten = Price::new(Decimal::new(1000, 2)).unwrap();
        let sum = ten + ten;
        assert_eq!(sum.amount(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Price::from_stored(Decimal::MAX);
        assert!(max.checked_add(Price::from_stored(Decimal::ONE)).is_none());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(Decimal::new(10, 0)).unwrap().to_string(), "$10.00");
        assert_eq!(Price::new(Decimal::new(1550, 2)).unwrap().to_string(), "$15.50");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(999, 2));
    }
}
