use std::collections::BTreeSet;

use cosmwasm_std::{Deps, DepsMut, Env, Order, Response, StdResult, Storage};
use protocol_pool_common::accounts::validate_address;
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::error::ContractError;
use protocol_pool_common::types::{GenesisState, RecipientDistribution};

use crate::budget::{self, validate_budget, BUDGET};
use crate::registry::{self, validate_fund, CONTINUOUS_FUND};
use crate::state::{recipient_from_key, BUDGETS, CONTINUOUS_FUNDS, DISTRIBUTED, PARAMS};
use crate::transaction::transactional;

const DISTRIBUTED_AMOUNT: &str = "distributed amount";

/// Replaces the module state with `genesis`.
///
/// Continuous funds that expired before the current block time are dropped.
/// The rest are validated one by one, and the percentage sum is checked once
/// over the surviving set. Nothing is written unless the whole import succeeds.
pub fn init_genesis(
    deps: DepsMut,
    env: &Env,
    bank: &dyn BankKeeper,
    genesis: GenesisState,
) -> Result<Response, ContractError> {
    transactional(deps, |deps| {
        genesis.params.validate()?;
        clear(deps.storage)?;
        PARAMS.save(deps.storage, &genesis.params)?;

        let mut dropped = 0u64;
        let mut imported = 0u64;
        for mut fund in genesis.continuous_funds {
            if fund.is_expired(env.block.time) {
                deps.api.debug(&format!(
                    "protocolpool: dropping expired continuous fund of {}",
                    fund.recipient
                ));
                dropped += 1;
                continue;
            }
            let (recipient, key) = validate_address(deps.api, fund.recipient.as_str())?;
            fund.recipient = recipient;
            validate_fund(deps.api, bank, &fund)?;
            if CONTINUOUS_FUNDS.has(deps.storage, key.as_slice()) {
                return Err(ContractError::AlreadyExists {
                    kind: CONTINUOUS_FUND.to_string(),
                    recipient: fund.recipient.to_string(),
                });
            }
            CONTINUOUS_FUNDS.save(deps.storage, key.as_slice(), &fund)?;
            imported += 1;
        }
        registry::total_percentage(deps.storage)?;

        let mut seen = BTreeSet::new();
        for entry in genesis.distributed {
            let (recipient, key) = validate_address(deps.api, entry.recipient.as_str())?;
            if !seen.insert(key.as_slice().to_vec()) {
                return Err(ContractError::AlreadyExists {
                    kind: DISTRIBUTED_AMOUNT.to_string(),
                    recipient: recipient.to_string(),
                });
            }
            let capped = CONTINUOUS_FUNDS
                .may_load(deps.storage, key.as_slice())?
                .is_some_and(|fund| fund.cap.is_some());
            // drawdown of dropped or uncapped funds has nothing to limit
            if !capped || entry.amount.is_empty() {
                deps.api.debug(&format!(
                    "protocolpool: ignoring distributed amount {} of {recipient}",
                    entry.amount
                ));
                continue;
            }
            DISTRIBUTED.save(deps.storage, key.as_slice(), &entry.amount)?;
        }

        for mut budget in genesis.budgets {
            let (recipient, key) = validate_address(deps.api, budget.recipient.as_str())?;
            budget.recipient = recipient;
            validate_budget(deps.api, bank, &budget)?;
            if BUDGETS.has(deps.storage, key.as_slice()) {
                return Err(ContractError::AlreadyExists {
                    kind: BUDGET.to_string(),
                    recipient: budget.recipient.to_string(),
                });
            }
            BUDGETS.save(deps.storage, key.as_slice(), &budget)?;
        }

        Ok(Response::new()
            .add_attribute("action", "protocolpool/init_genesis")
            .add_attribute("continuous_funds", imported.to_string())
            .add_attribute("dropped_expired", dropped.to_string()))
    })
}

/// Current state in key order, ready for [`init_genesis`].
pub fn export_genesis(deps: Deps) -> StdResult<GenesisState> {
    let continuous_funds = registry::list(deps.storage)?
        .into_iter()
        .map(|(_, fund)| fund)
        .collect();
    let distributed = DISTRIBUTED
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| -> StdResult<RecipientDistribution> {
            let (key, amount) = item?;
            Ok(RecipientDistribution {
                recipient: recipient_from_key(deps.api, &key)?,
                amount,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(GenesisState {
        params: PARAMS.load(deps.storage)?,
        continuous_funds,
        budgets: budget::list(deps.storage)?,
        distributed,
    })
}

fn clear(storage: &mut dyn Storage) -> StdResult<()> {
    let funds = CONTINUOUS_FUNDS
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in funds {
        registry::remove(storage, &key);
    }
    let drawdowns = DISTRIBUTED
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in drawdowns {
        DISTRIBUTED.remove(storage, &key);
    }
    let budgets = BUDGETS
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for key in budgets {
        BUDGETS.remove(storage, &key);
    }
    Ok(())
}
