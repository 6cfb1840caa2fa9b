use cosmwasm_std::{Addr, DepsMut, Env, Response};
use protocol_pool_common::accounts::{ModuleAccounts, COMMUNITY_POOL_ACCOUNT, DISTRIBUTION_ACCOUNT};
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::coins::Coins;
use protocol_pool_common::error::{CoinsError, ContractError};
use protocol_pool_common::types::{ContinuousFund, Params};

use crate::registry;
use crate::state::{DISTRIBUTED, PARAMS};
use crate::transaction::transactional;

/// Block end hook. Distributes on blocks whose height is a multiple of the
/// distribution frequency and does nothing on every other block.
pub fn end_block(
    deps: DepsMut,
    env: &Env,
    bank: &dyn BankKeeper,
) -> Result<Response, ContractError> {
    let params = PARAMS.load(deps.storage)?;
    if !params.is_distribution_block(env.block.height) {
        return Ok(Response::new()
            .add_attribute("action", "protocolpool/end_block")
            .add_attribute("height", env.block.height.to_string())
            .add_attribute("distribution", "skipped"));
    }

    transactional(deps, |deps| distribute_funds(deps, env, bank, &params))
}

/// Splits the enabled-denom balance of the distribution account between the
/// continuous funds and sends what is left to the community pool.
///
/// Funds are visited in ascending recipient key order, so truncation residue
/// always ends up in the community pool. Any error aborts the whole block.
pub fn distribute_funds(
    deps: DepsMut,
    env: &Env,
    bank: &dyn BankKeeper,
    params: &Params,
) -> Result<Response, ContractError> {
    let accounts = ModuleAccounts::derive(deps.api)?;
    let mut pool = Coins::new();
    for denom in &params.enabled_distribution_denoms {
        pool.add_coin(bank.balance(deps.storage, &accounts.distribution, denom)?)?;
    }

    let mut resp = Response::new()
        .add_attribute("action", "protocolpool/distribute")
        .add_attribute("height", env.block.height.to_string())
        .add_attribute("pool", pool.to_string());
    if pool.is_empty() {
        return Ok(resp);
    }

    let now = env.block.time;
    let mut remainder = pool.clone();
    let mut capped_out: Vec<(Vec<u8>, Addr)> = vec![];

    for (key, fund) in registry::list(deps.storage)? {
        if fund.is_expired(now) {
            registry::remove(deps.storage, &key);
            deps.api.debug(&format!(
                "protocolpool: continuous fund of {} expired",
                fund.recipient
            ));
            resp = resp.add_attribute("expired", fund.recipient.as_str());
            continue;
        }

        let mut share = pool.mul_truncated(fund.percentage)?;
        if fund.cap.is_some() {
            let distributed = DISTRIBUTED.may_load(deps.storage, &key)?.unwrap_or_default();
            if clamp_to_cap(&fund, &distributed, &mut share) {
                capped_out.push((key.clone(), fund.recipient.clone()));
            }
            let total = distributed.checked_add(&share)?;
            // a share that truncates to nothing leaves no drawdown record
            if !total.is_empty() {
                DISTRIBUTED.save(deps.storage, &key, &total)?;
            }
        }

        remainder = subtract_share(&remainder, &share)?;
        if !share.is_empty() {
            bank.send_to_account(deps.storage, DISTRIBUTION_ACCOUNT, &fund.recipient, &share)?;
            resp = resp
                .add_attribute("recipient", fund.recipient.as_str())
                .add_attribute("amount", share.to_string());
        }
    }

    for (key, recipient) in capped_out {
        registry::remove(deps.storage, &key);
        deps.api.debug(&format!(
            "protocolpool: continuous fund of {recipient} reached its cap"
        ));
        resp = resp.add_attribute("capped", recipient.as_str());
    }

    if !remainder.is_empty() {
        bank.send(
            deps.storage,
            DISTRIBUTION_ACCOUNT,
            COMMUNITY_POOL_ACCOUNT,
            &remainder,
        )?;
    }

    Ok(resp.add_attribute("community_pool", remainder.to_string()))
}

/// Limits `share` to what is left under the fund's cap. Returns true when a
/// capped denom is exhausted, in which case the fund has to be closed.
fn clamp_to_cap(fund: &ContinuousFund, distributed: &Coins, share: &mut Coins) -> bool {
    let Some(cap) = &fund.cap else {
        return false;
    };
    let headroom = cap.saturating_sub(distributed);
    let saturated = cap
        .denoms()
        .any(|denom| share.amount_of(denom) >= headroom.amount_of(denom));
    if saturated {
        for denom in cap.denoms() {
            let clamped = share.amount_of(denom).min(headroom.amount_of(denom));
            share.set(denom, clamped);
        }
    }
    saturated
}

fn subtract_share(remainder: &Coins, share: &Coins) -> Result<Coins, ContractError> {
    remainder.checked_sub(share).map_err(|err| match err {
        CoinsError::Negative { denom } => ContractError::NegativeRemainder {
            shortfall: share
                .amount_of(&denom)
                .saturating_sub(remainder.amount_of(&denom))
                .to_string(),
            denom,
        },
        other => other.into(),
    })
}
