use cosmwasm_std::{Addr, Api, Order, StdResult, Storage, Timestamp};
use protocol_pool_common::accounts::COMMUNITY_POOL_ACCOUNT;
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::coins::Coins;
use protocol_pool_common::error::ContractError;
use protocol_pool_common::types::Budget;

use crate::registry::ensure_not_blocked;
use crate::state::{recipient_key, BUDGETS};

pub(crate) const BUDGET: &str = "budget";

/// Checks a budget on its own, without looking at the stored ones.
pub fn validate_budget(
    api: &dyn Api,
    bank: &dyn BankKeeper,
    budget: &Budget,
) -> Result<(), ContractError> {
    if budget.budget_per_tranche.is_empty() {
        return Err(ContractError::invalid_budget("budget per tranche is empty"));
    }
    if budget.tranches_left == 0 {
        return Err(ContractError::invalid_budget("tranches must be at least 1"));
    }
    if budget.period == 0 {
        return Err(ContractError::invalid_budget("period must be at least 1 second"));
    }
    ensure_not_blocked(api, bank, &budget.recipient)
}

/// Stores a new budget. The first tranche becomes claimable one period after
/// `last_claimed_at`, which must not lie in the past.
pub fn submit(
    storage: &mut dyn Storage,
    api: &dyn Api,
    bank: &dyn BankKeeper,
    now: Timestamp,
    budget: Budget,
) -> Result<(), ContractError> {
    if budget.last_claimed_at < now {
        return Err(ContractError::invalid_budget(
            "start time cannot be before the current block time",
        ));
    }
    validate_budget(api, bank, &budget)?;

    let key = recipient_key(api, &budget.recipient)?;
    if BUDGETS.has(storage, &key) {
        return Err(ContractError::AlreadyExists {
            kind: BUDGET.to_string(),
            recipient: budget.recipient.to_string(),
        });
    }
    BUDGETS.save(storage, &key, &budget)?;
    Ok(())
}

/// Pays every tranche that has come due and returns the amount sent.
pub fn claim(
    storage: &mut dyn Storage,
    api: &dyn Api,
    bank: &dyn BankKeeper,
    now: Timestamp,
    recipient: &Addr,
) -> Result<Coins, ContractError> {
    let key = recipient_key(api, recipient)?;
    let mut budget = get(storage, api, recipient)?;

    if now < budget.last_claimed_at {
        return Err(ContractError::BudgetNotClaimable {
            reason: format!("budget starts at {}", budget.last_claimed_at),
        });
    }
    let elapsed = now.seconds() - budget.last_claimed_at.seconds();
    let due = (elapsed / budget.period).min(budget.tranches_left);
    if due == 0 {
        return Err(ContractError::BudgetNotClaimable {
            reason: format!(
                "{elapsed}s elapsed since last claim, period is {}s",
                budget.period
            ),
        });
    }

    let amount = budget.budget_per_tranche.checked_mul(due)?;
    bank.send_to_account(storage, COMMUNITY_POOL_ACCOUNT, recipient, &amount)?;

    budget.tranches_left -= due;
    if budget.tranches_left == 0 {
        BUDGETS.remove(storage, &key);
    } else {
        budget.last_claimed_at = budget.last_claimed_at.plus_seconds(due * budget.period);
        BUDGETS.save(storage, &key, &budget)?;
    }
    Ok(amount)
}

pub fn get(
    storage: &dyn Storage,
    api: &dyn Api,
    recipient: &Addr,
) -> Result<Budget, ContractError> {
    let key = recipient_key(api, recipient)?;
    BUDGETS
        .may_load(storage, &key)?
        .ok_or_else(|| ContractError::NotFound {
            kind: BUDGET.to_string(),
            recipient: recipient.to_string(),
        })
}

pub fn list(storage: &dyn Storage) -> StdResult<Vec<Budget>> {
    BUDGETS
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, budget)| budget))
        .collect()
}
