use std::collections::BTreeMap;
use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoinsError;
use crate::percentage::Percentage;

const DENOM_MIN_LEN: usize = 3;
const DENOM_MAX_LEN: usize = 128;

#[cw_serde]
pub struct Coin {
    pub denom: String,
    pub amount: Uint256,
}

impl Coin {
    pub fn new(amount: impl Into<Uint256>, denom: impl Into<String>) -> Self {
        Coin {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

pub fn coin(amount: u128, denom: impl Into<String>) -> Coin {
    Coin::new(Uint256::from(amount), denom)
}

/// Checks a denom against `[a-z][a-z0-9]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), CoinsError> {
    let invalid = || CoinsError::InvalidDenom {
        denom: denom.to_string(),
    };
    if denom.len() < DENOM_MIN_LEN || denom.len() > DENOM_MAX_LEN {
        return Err(invalid());
    }
    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_lowercase()) {
        return Err(invalid());
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(())
}

/// A set of coins unique by denom, ordered by denom, without zero amounts.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Coins(BTreeMap<String, Uint256>);

impl Coins {
    pub fn new() -> Self {
        Coins::default()
    }

    /// Builds a set from an arbitrary list: duplicate denoms are summed and
    /// zero amounts dropped.
    pub fn from_unsorted(coins: Vec<Coin>) -> Result<Self, CoinsError> {
        let mut set = Coins::new();
        for c in coins {
            validate_denom(&c.denom)?;
            set.add_coin(c)?;
        }
        Ok(set)
    }

    /// Strict wire-format check: valid denoms, positive amounts and strictly
    /// ascending denoms.
    pub fn validate(coins: &[Coin]) -> Result<(), CoinsError> {
        let mut previous: Option<&str> = None;
        for c in coins {
            validate_denom(&c.denom)?;
            if c.amount.is_zero() {
                return Err(CoinsError::ZeroAmount {
                    denom: c.denom.clone(),
                });
            }
            if previous.is_some_and(|p| p >= c.denom.as_str()) {
                return Err(CoinsError::Unsorted {
                    denom: c.denom.clone(),
                });
            }
            previous = Some(c.denom.as_str());
        }
        Ok(())
    }

    /// Like `try_from`, but additionally rejects an empty list.
    pub fn try_from_non_empty(coins: Vec<Coin>) -> Result<Self, CoinsError> {
        let set = Coins::try_from(coins)?;
        if set.is_empty() {
            return Err(CoinsError::Empty {});
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn amount_of(&self, denom: &str) -> Uint256 {
        self.0.get(denom).copied().unwrap_or_default()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Uint256)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    pub fn to_vec(&self) -> Vec<Coin> {
        self.iter().map(|(d, a)| Coin::new(a, d)).collect()
    }

    pub fn add_coin(&mut self, c: Coin) -> Result<(), CoinsError> {
        if c.amount.is_zero() {
            return Ok(());
        }
        let entry = self.0.entry(c.denom.clone()).or_default();
        *entry = entry
            .checked_add(c.amount)
            .map_err(|_| CoinsError::Overflow { denom: c.denom })?;
        Ok(())
    }

    pub fn checked_add(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut sum = self.clone();
        for (denom, amount) in other.iter() {
            sum.add_coin(Coin::new(amount, denom))?;
        }
        Ok(sum)
    }

    /// Fails if any denom of the result would be negative.
    pub fn checked_sub(&self, other: &Coins) -> Result<Coins, CoinsError> {
        let mut diff = self.clone();
        for (denom, amount) in other.iter() {
            let left = diff
                .amount_of(denom)
                .checked_sub(amount)
                .map_err(|_| CoinsError::Negative {
                    denom: denom.to_string(),
                })?;
            diff.set(denom, left);
        }
        Ok(diff)
    }

    /// Per-denom subtraction clamped at zero.
    pub fn saturating_sub(&self, other: &Coins) -> Coins {
        let mut diff = self.clone();
        for (denom, amount) in other.iter() {
            let left = diff.amount_of(denom).saturating_sub(amount);
            diff.set(denom, left);
        }
        diff
    }

    /// Multiplies every amount by `percentage`, truncating toward zero per denom.
    pub fn mul_truncated(&self, percentage: Percentage) -> Result<Coins, CoinsError> {
        let mut product = Coins::new();
        for (denom, amount) in self.iter() {
            let share = amount
                .checked_mul_floor(percentage.value())
                .map_err(|_| CoinsError::Overflow {
                    denom: denom.to_string(),
                })?;
            product.set(denom, share);
        }
        Ok(product)
    }

    pub fn checked_mul(&self, factor: u64) -> Result<Coins, CoinsError> {
        let mut product = Coins::new();
        for (denom, amount) in self.iter() {
            let scaled = amount
                .checked_mul(Uint256::from(factor))
                .map_err(|_| CoinsError::Overflow {
                    denom: denom.to_string(),
                })?;
            product.set(denom, scaled);
        }
        Ok(product)
    }

    /// Sets `denom` to `amount`, removing the entry on zero.
    pub fn set(&mut self, denom: &str, amount: Uint256) {
        if amount.is_zero() {
            self.0.remove(denom);
        } else {
            self.0.insert(denom.to_string(), amount);
        }
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinsError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::validate(&coins)?;
        Ok(Coins(coins.into_iter().map(|c| (c.denom, c.amount)).collect()))
    }
}

impl From<Coin> for Coins {
    fn from(c: Coin) -> Self {
        let mut set = Coins::new();
        set.set(&c.denom, c.amount);
        set
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.iter().map(|(d, a)| format!("{a}{d}")).collect();
        write!(f, "{}", rendered.join(","))
    }
}

impl Serialize for Coins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coins = Vec::<Coin>::deserialize(deserializer)?;
        Coins::from_unsorted(coins).map_err(D::Error::custom)
    }
}

impl JsonSchema for Coins {
    fn schema_name() -> String {
        "Coins".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <Vec<Coin>>::json_schema(gen)
    }
}
