use std::iter;
use std::ops::ControlFlow;

use cosmwasm_std::{Addr, Api, Decimal, Order, StdResult, Storage, Timestamp};
use protocol_pool_common::accounts::ModuleAccounts;
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::error::ContractError;
use protocol_pool_common::percentage::sum_percentages;
use protocol_pool_common::types::ContinuousFund;

use crate::state::{recipient_key, CONTINUOUS_FUNDS, DISTRIBUTED};

pub(crate) const CONTINUOUS_FUND: &str = "continuous fund";

/// Rejects module accounts and anything the bank refuses to credit.
pub fn ensure_not_blocked(
    api: &dyn Api,
    bank: &dyn BankKeeper,
    address: &Addr,
) -> Result<(), ContractError> {
    if ModuleAccounts::derive(api)?.contains(address) || bank.is_blocked(address) {
        return Err(ContractError::Blocked {
            address: address.to_string(),
        });
    }
    Ok(())
}

/// Checks a fund on its own, without looking at the rest of the registry.
pub fn validate_fund(
    api: &dyn Api,
    bank: &dyn BankKeeper,
    fund: &ContinuousFund,
) -> Result<(), ContractError> {
    if fund.cap.as_ref().is_some_and(|cap| cap.is_empty()) {
        return Err(ContractError::invalid_commitment("cap must not be empty"));
    }
    ensure_not_blocked(api, bank, &fund.recipient)
}

pub fn create(
    storage: &mut dyn Storage,
    api: &dyn Api,
    bank: &dyn BankKeeper,
    now: Timestamp,
    fund: ContinuousFund,
) -> Result<(), ContractError> {
    if fund.expiry.is_some_and(|expiry| expiry <= now) {
        return Err(ContractError::invalid_commitment(
            "expiry must be after the current block time",
        ));
    }
    validate_fund(api, bank, &fund)?;

    let key = recipient_key(api, &fund.recipient)?;
    if CONTINUOUS_FUNDS.has(storage, &key) {
        return Err(ContractError::AlreadyExists {
            kind: CONTINUOUS_FUND.to_string(),
            recipient: fund.recipient.to_string(),
        });
    }

    let existing = list(storage)?;
    sum_percentages(
        existing
            .iter()
            .map(|(_, f)| f.percentage)
            .chain(iter::once(fund.percentage)),
    )?;

    CONTINUOUS_FUNDS.save(storage, &key, &fund)?;
    Ok(())
}

/// Removes the fund of `recipient` and returns it.
pub fn cancel(
    storage: &mut dyn Storage,
    api: &dyn Api,
    recipient: &Addr,
) -> Result<ContinuousFund, ContractError> {
    let key = recipient_key(api, recipient)?;
    let fund = CONTINUOUS_FUNDS
        .may_load(storage, &key)?
        .ok_or_else(|| ContractError::NotFound {
            kind: CONTINUOUS_FUND.to_string(),
            recipient: recipient.to_string(),
        })?;
    remove(storage, &key);
    Ok(fund)
}

/// Drops a fund together with its cap drawdown.
pub fn remove(storage: &mut dyn Storage, key: &[u8]) {
    CONTINUOUS_FUNDS.remove(storage, key);
    DISTRIBUTED.remove(storage, key);
}

pub fn get(
    storage: &dyn Storage,
    api: &dyn Api,
    recipient: &Addr,
) -> Result<ContinuousFund, ContractError> {
    let key = recipient_key(api, recipient)?;
    CONTINUOUS_FUNDS
        .may_load(storage, &key)?
        .ok_or_else(|| ContractError::NotFound {
            kind: CONTINUOUS_FUND.to_string(),
            recipient: recipient.to_string(),
        })
}

/// Visits funds in ascending key order until `f` breaks.
pub fn walk<F>(storage: &dyn Storage, mut f: F) -> StdResult<()>
where
    F: FnMut(&[u8], ContinuousFund) -> ControlFlow<()>,
{
    for item in CONTINUOUS_FUNDS.range(storage, None, None, Order::Ascending) {
        let (key, fund) = item?;
        if f(&key, fund).is_break() {
            break;
        }
    }
    Ok(())
}

/// Every fund with its storage key, in walk order.
pub fn list(storage: &dyn Storage) -> StdResult<Vec<(Vec<u8>, ContinuousFund)>> {
    let mut funds = vec![];
    walk(storage, |key, fund| {
        funds.push((key.to_vec(), fund));
        ControlFlow::Continue(())
    })?;
    Ok(funds)
}

pub fn total_percentage(storage: &dyn Storage) -> Result<Decimal, ContractError> {
    let funds = list(storage)?;
    Ok(sum_percentages(funds.iter().map(|(_, f)| f.percentage))?)
}
