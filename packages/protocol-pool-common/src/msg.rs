use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Decimal, Timestamp};

use crate::accounts::ModuleAccounts;
use crate::coins::{Coin, Coins};
use crate::types::{Budget, Config, ContinuousFund, Params};

#[cw_serde]
pub struct InstantiateMsg {
    /// Address allowed to run privileged operations.
    pub authority: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Moves `amount` from `depositor` into the community pool. Permissionless.
    FundCommunityPool { depositor: String, amount: Vec<Coin> },

    /// Pays `amount` out of the community pool to `recipient`.
    CommunityPoolSpend {
        authority: String,
        recipient: String,
        amount: Vec<Coin>,
    },

    /// Registers a continuous fund for `recipient`.
    CreateContinuousFund {
        authority: String,
        recipient: String,
        percentage: Decimal,
        #[serde(default, with = "crate::rfc3339::option")]
        #[schemars(with = "Option<String>")]
        expiry: Option<Timestamp>,
        #[serde(default)]
        cap: Option<Vec<Coin>>,
    },

    /// Removes the continuous fund of `recipient`.
    CancelContinuousFund { authority: String, recipient: String },

    /// Replaces the module params.
    UpdateParams { authority: String, params: Params },

    /// Schedules `tranches` payouts of `budget_per_tranche`, one per `period` seconds.
    SubmitBudgetProposal {
        authority: String,
        recipient: String,
        budget_per_tranche: Vec<Coin>,
        #[serde(default, with = "crate::rfc3339::option")]
        #[schemars(with = "Option<String>")]
        start_time: Option<Timestamp>,
        tranches: u64,
        period: u64,
    },

    /// Pays out every tranche of the recipient's budget that has come due.
    ClaimBudget { recipient: String },
}

/// Calls made by the host block loop.
#[cw_serde]
pub enum SudoMsg {
    /// Block end hook; distributes on distribution blocks only.
    EndBlock {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Balance of the community pool account.
    #[returns(CommunityPoolResponse)]
    CommunityPool {},

    #[returns(ContinuousFund)]
    ContinuousFund { recipient: String },

    /// All continuous funds in recipient key order.
    #[returns(ContinuousFundsResponse)]
    ContinuousFunds {},

    #[returns(Params)]
    Params {},

    #[returns(Config)]
    Config {},

    #[returns(ModuleAccounts)]
    ModuleAccounts {},

    #[returns(Budget)]
    Budget { recipient: String },

    #[returns(BudgetsResponse)]
    Budgets {},
}

#[cw_serde]
pub struct CommunityPoolResponse {
    pub pool: Coins,
}

#[cw_serde]
pub struct ContinuousFundsResponse {
    pub continuous_funds: Vec<ContinuousFund>,
}

#[cw_serde]
pub struct BudgetsResponse {
    pub budgets: Vec<Budget>,
}

/// Data of a successful `CancelContinuousFund`.
#[cw_serde]
pub struct CancelContinuousFundResponse {
    pub recipient: Addr,
    pub canceled_at_height: u64,
    #[serde(with = "crate::rfc3339")]
    #[schemars(with = "String")]
    pub canceled_at_time: Timestamp,
}

/// Data of a successful `ClaimBudget`.
#[cw_serde]
pub struct ClaimBudgetResponse {
    pub amount: Coins,
}
