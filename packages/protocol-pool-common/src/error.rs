use cosmwasm_std::{Decimal, StdError};
use thiserror::Error;

/// Failures of the coin value types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoinsError {
    #[error("invalid denom {denom:?}: must match [a-z][a-z0-9]{{2,127}}")]
    InvalidDenom { denom: String },

    #[error("zero amount for denom {denom}")]
    ZeroAmount { denom: String },

    #[error("coins are not sorted by denom or contain duplicates at {denom}")]
    Unsorted { denom: String },

    #[error("no coins provided")]
    Empty {},

    #[error("subtraction would make {denom} negative")]
    Negative { denom: String },

    #[error("amount overflow for denom {denom}")]
    Overflow { denom: String },
}

/// Failures of the fixed-precision percentage type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PercentageError {
    #[error("percentage {value} is outside of (0, 1]")]
    OutOfRange { value: Decimal },

    #[error("cannot parse percentage {value:?}")]
    Parse { value: String },

    #[error("total percentage {total} exceeds 1")]
    Overflow { total: Decimal },
}

/// Failures reported by the host bank keeper.
#[derive(Error, Debug, PartialEq)]
pub enum BankError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("insufficient funds: {address} holds {available}, needs {required}")]
    InsufficientFunds {
        address: String,
        available: String,
        required: String,
    },

    #[error("unknown module account {name}")]
    UnknownModule { name: String },
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("bank: {0}")]
    Bank(BankError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid coins: {0}")]
    InvalidCoins(#[from] CoinsError),

    #[error("invalid continuous fund: {reason}")]
    InvalidCommitment { reason: String },

    #[error("total continuous fund percentage {total} exceeds 1")]
    PercentageOverflow { total: Decimal },

    #[error("{kind} already exists for recipient {recipient}")]
    AlreadyExists { kind: String, recipient: String },

    #[error("no {kind} found for recipient {recipient}")]
    NotFound { kind: String, recipient: String },

    #[error("address {address} is not allowed to receive funds")]
    Blocked { address: String },

    #[error("invalid params: {reason}")]
    InvalidParams { reason: String },

    #[error("insufficient funds: {address} holds {available}, needs {required}")]
    InsufficientFunds {
        address: String,
        available: String,
        required: String,
    },

    #[error("invalid budget proposal: {reason}")]
    InvalidBudget { reason: String },

    #[error("budget cannot be claimed: {reason}")]
    BudgetNotClaimable { reason: String },

    #[error("negative funds for distribution from continuous funds: {denom} short by {shortfall}")]
    NegativeRemainder { denom: String, shortfall: String },
}

impl ContractError {
    /// Module-local error code. `None` for errors the host must treat as fatal.
    pub fn code(&self) -> Option<u32> {
        match self {
            ContractError::Unauthorized {} => Some(1),
            ContractError::InvalidAddress { .. } => Some(2),
            ContractError::InvalidCoins(_) => Some(3),
            ContractError::InvalidCommitment { .. } => Some(4),
            ContractError::PercentageOverflow { .. } => Some(5),
            ContractError::AlreadyExists { .. } => Some(6),
            ContractError::NotFound { .. } => Some(7),
            ContractError::Blocked { .. } => Some(8),
            ContractError::InvalidParams { .. } => Some(9),
            ContractError::InsufficientFunds { .. } => Some(10),
            ContractError::InvalidBudget { .. } => Some(11),
            ContractError::BudgetNotClaimable { .. } => Some(12),
            ContractError::Std(_)
            | ContractError::Bank(_)
            | ContractError::NegativeRemainder { .. } => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.code().is_none()
    }

    pub fn invalid_commitment(reason: impl Into<String>) -> Self {
        ContractError::InvalidCommitment {
            reason: reason.into(),
        }
    }

    pub fn invalid_params(reason: impl Into<String>) -> Self {
        ContractError::InvalidParams {
            reason: reason.into(),
        }
    }

    pub fn invalid_budget(reason: impl Into<String>) -> Self {
        ContractError::InvalidBudget {
            reason: reason.into(),
        }
    }
}

impl From<BankError> for ContractError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::InsufficientFunds {
                address,
                available,
                required,
            } => ContractError::InsufficientFunds {
                address,
                available,
                required,
            },
            other => ContractError::Bank(other),
        }
    }
}

impl From<PercentageError> for ContractError {
    fn from(err: PercentageError) -> Self {
        match err {
            PercentageError::Overflow { total } => ContractError::PercentageOverflow { total },
            other => ContractError::invalid_commitment(other.to_string()),
        }
    }
}
