//! Fixed-point salary amount: at most 7 digits, 2 of them after the point.

use crate::{Error, Result};
use rust_decimal::Decimal;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Total significant digits allowed
pub const MAX_DIGITS: u32 = 7;
/// Digits allowed after the decimal point
pub const DECIMAL_PLACES: u32 = 2;

/// A salary as stored in a `DECIMAL(7,2)` column.
///
/// Always carries exactly two fractional digits, so `35000` displays as
/// `35000.00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Salary(Decimal);

impl Salary {
    /// Validate `amount` against the column's precision and scale
    pub fn new(amount: Decimal) -> Result<Self> {
        let amount = amount.normalize();
        if amount.scale() > DECIMAL_PLACES {
            return Err(Error::InvalidValue {
                field: "salary",
                reason: format!("{} has more than {} decimal places", amount, DECIMAL_PLACES),
            });
        }
        let limit = Decimal::from(10i64.pow(MAX_DIGITS - DECIMAL_PLACES));
        if amount.abs() >= limit {
            return Err(Error::InvalidValue {
                field: "salary",
                reason: format!("{} exceeds {} digits", amount, MAX_DIGITS),
            });
        }
        let mut amount = amount;
        amount.rescale(DECIMAL_PLACES);
        Ok(Self(amount))
    }
}

impl FromStr for Salary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| Error::InvalidValue {
            field: "salary",
            reason: format!("{:?} is not a decimal: {}", s, e),
        })?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Salary {
    type Error = Error;

    fn try_from(amount: Decimal) -> Result<Self> {
        Self::new(amount)
    }
}

impl From<Salary> for Decimal {
    fn from(salary: Salary) -> Self {
        salary.0
    }
}

impl std::fmt::Display for Salary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Salary {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Salary {
    // NUMERIC affinity turns "35000.00" into INTEGER 35000 and "35000.50" into
    // REAL, so accept all three storage classes.
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let amount = match value {
            ValueRef::Integer(i) => Decimal::from(i),
            ValueRef::Real(f) => Decimal::try_from(f)
                .map_err(|e| FromSqlError::Other(Box::new(e)))?
                .round_dp(DECIMAL_PLACES),
            ValueRef::Text(t) => {
                let s = std::str::from_utf8(t).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                Decimal::from_str(s).map_err(|e| FromSqlError::Other(Box::new(e)))?
            }
            _ => return Err(FromSqlError::InvalidType),
        };
        Salary::new(amount).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
