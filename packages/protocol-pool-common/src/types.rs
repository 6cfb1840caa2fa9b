use std::collections::BTreeSet;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};

use crate::coins::{validate_denom, Coins};
use crate::error::ContractError;
use crate::percentage::Percentage;

pub const DEFAULT_DISTRIBUTION_DENOM: &str = "stake";

/// Configuration fixed at instantiation.
#[cw_serde]
pub struct Config {
    /// The only principal allowed to mutate params, continuous funds and budgets,
    /// and to spend from the community pool.
    pub authority: Addr,
}

#[cw_serde]
pub struct Params {
    /// Only balances in these denoms take part in distribution; anything else
    /// stays in the distribution account.
    pub enabled_distribution_denoms: Vec<String>,
    /// Distribution runs on blocks whose height is a multiple of this value.
    pub distribution_frequency: u64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            enabled_distribution_denoms: vec![DEFAULT_DISTRIBUTION_DENOM.to_string()],
            distribution_frequency: 1,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.distribution_frequency < 1 {
            return Err(ContractError::invalid_params(
                "distribution_frequency must be at least 1",
            ));
        }

        let mut seen = BTreeSet::new();
        for denom in &self.enabled_distribution_denoms {
            validate_denom(denom).map_err(|e| ContractError::invalid_params(e.to_string()))?;
            if !seen.insert(denom.as_str()) {
                return Err(ContractError::invalid_params(format!(
                    "duplicate denom {denom} in enabled_distribution_denoms"
                )));
            }
        }

        Ok(())
    }

    pub fn is_distribution_block(&self, height: u64) -> bool {
        height % self.distribution_frequency == 0
    }
}

/// A standing instruction to route a share of every distribution to `recipient`.
#[cw_serde]
pub struct ContinuousFund {
    pub recipient: Addr,
    pub percentage: Percentage,
    /// None means perpetual.
    #[serde(default, with = "crate::rfc3339::option")]
    #[schemars(with = "Option<String>")]
    pub expiry: Option<Timestamp>,
    /// Upper bound on the cumulative amount ever distributed to `recipient`.
    #[serde(default)]
    pub cap: Option<Coins>,
}

impl ContinuousFund {
    /// Expiry equal to the block time is still active.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expiry.is_some_and(|expiry| expiry < now)
    }
}

/// Fixed-tranche payout from the community pool.
#[cw_serde]
pub struct Budget {
    pub recipient: Addr,
    pub budget_per_tranche: Coins,
    /// Start of the next claimable period.
    #[serde(with = "crate::rfc3339")]
    #[schemars(with = "String")]
    pub last_claimed_at: Timestamp,
    pub tranches_left: u64,
    /// Period length in seconds.
    pub period: u64,
}

/// Cumulative amount distributed to a capped continuous fund.
#[cw_serde]
pub struct RecipientDistribution {
    pub recipient: Addr,
    pub amount: Coins,
}

#[cw_serde]
pub struct GenesisState {
    pub params: Params,
    pub continuous_funds: Vec<ContinuousFund>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub distributed: Vec<RecipientDistribution>,
}

impl Default for GenesisState {
    fn default() -> Self {
        GenesisState {
            params: Params::default(),
            continuous_funds: vec![],
            budgets: vec![],
            distributed: vec![],
        }
    }
}
