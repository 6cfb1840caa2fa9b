use std::fmt;
use std::str::FromStr;

use cosmwasm_std::Decimal;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PercentageError;

/// Fixed-precision (18 fractional digits) share in the range (0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(Decimal);

impl Percentage {
    pub fn new(value: Decimal) -> Result<Self, PercentageError> {
        if value.is_zero() || value > Decimal::one() {
            return Err(PercentageError::OutOfRange { value });
        }
        Ok(Percentage(value))
    }

    pub fn one() -> Self {
        Percentage(Decimal::one())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, other: Percentage) -> Result<Percentage, PercentageError> {
        let total = sum_percentages([self, other])?;
        Ok(Percentage(total))
    }
}

/// Sums percentages, failing once the running total exceeds 1.
pub fn sum_percentages<I>(percentages: I) -> Result<Decimal, PercentageError>
where
    I: IntoIterator<Item = Percentage>,
{
    let mut total = Decimal::zero();
    for p in percentages {
        total = total
            .checked_add(p.0)
            .map_err(|_| PercentageError::Overflow { total: Decimal::MAX })?;
        if total > Decimal::one() {
            return Err(PercentageError::Overflow { total });
        }
    }
    Ok(total)
}

impl FromStr for Percentage {
    type Err = PercentageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s).map_err(|_| PercentageError::Parse {
            value: s.to_string(),
        })?;
        Percentage::new(value)
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = PercentageError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Decimal::deserialize(deserializer)?;
        Percentage::new(value).map_err(D::Error::custom)
    }
}

impl JsonSchema for Percentage {
    fn schema_name() -> String {
        "Percentage".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        Decimal::json_schema(gen)
    }
}
