use cosmwasm_std::{
    to_json_binary, Binary, Decimal, Deps, DepsMut, Env, Response, StdResult, Storage, Timestamp,
};
use cw2::set_contract_version;
use protocol_pool_common::accounts::{validate_address, ModuleAccounts, COMMUNITY_POOL_ACCOUNT};
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::coins::{Coin, Coins};
use protocol_pool_common::error::ContractError;
use protocol_pool_common::msg::{
    BudgetsResponse, CancelContinuousFundResponse, ClaimBudgetResponse, CommunityPoolResponse,
    ContinuousFundsResponse, ExecuteMsg, InstantiateMsg, QueryMsg, SudoMsg,
};
use protocol_pool_common::percentage::Percentage;
use protocol_pool_common::types::{Budget, Config, ContinuousFund, Params};

use crate::registry::ensure_not_blocked;
use crate::state::{CONFIG, PARAMS};
use crate::transaction::transactional;
use crate::{budget, distribution, registry};

pub(crate) const CONTRACT_NAME: &str = "crates.io:protocol-pool";
pub(crate) const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

//--------------------------------------------------------------------------------------------------
// Instantiation
//--------------------------------------------------------------------------------------------------

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let (authority, _) = validate_address(deps.api, &msg.authority)?;
    let config = Config { authority };
    CONFIG.save(deps.storage, &config)?;
    PARAMS.save(deps.storage, &Params::default())?;

    Ok(Response::new()
        .add_attribute("action", "protocolpool/instantiate")
        .add_attribute("authority", config.authority))
}

//--------------------------------------------------------------------------------------------------
// Executions
//--------------------------------------------------------------------------------------------------

/// Runs one message. A failing message leaves storage, bank balances
/// included, exactly as it found it.
pub fn execute(
    deps: DepsMut,
    env: Env,
    bank: &dyn BankKeeper,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    transactional(deps, |deps| match msg {
        // permissionless
        ExecuteMsg::FundCommunityPool { depositor, amount } => {
            execute_fund_community_pool(deps, bank, depositor, amount)
        }
        ExecuteMsg::ClaimBudget { recipient } => execute_claim_budget(deps, env, bank, recipient),

        // permissioned - authority
        ExecuteMsg::CommunityPoolSpend {
            authority,
            recipient,
            amount,
        } => execute_community_pool_spend(deps, bank, authority, recipient, amount),
        ExecuteMsg::CreateContinuousFund {
            authority,
            recipient,
            percentage,
            expiry,
            cap,
        } => execute_create_continuous_fund(
            deps, env, bank, authority, recipient, percentage, expiry, cap,
        ),
        ExecuteMsg::CancelContinuousFund {
            authority,
            recipient,
        } => execute_cancel_continuous_fund(deps, env, authority, recipient),
        ExecuteMsg::UpdateParams { authority, params } => {
            execute_update_params(deps, authority, params)
        }
        ExecuteMsg::SubmitBudgetProposal {
            authority,
            recipient,
            budget_per_tranche,
            start_time,
            tranches,
            period,
        } => execute_submit_budget_proposal(
            deps,
            env,
            bank,
            authority,
            recipient,
            budget_per_tranche,
            start_time,
            tranches,
            period,
        ),
    })
}

fn ensure_authority(storage: &dyn Storage, authority: &str) -> Result<(), ContractError> {
    let config = CONFIG.load(storage)?;
    if config.authority.as_str() != authority {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

pub fn execute_fund_community_pool(
    deps: DepsMut,
    bank: &dyn BankKeeper,
    depositor: String,
    amount: Vec<Coin>,
) -> Result<Response, ContractError> {
    let (depositor, _) = validate_address(deps.api, &depositor)?;
    let amount = Coins::try_from_non_empty(amount)?;

    bank.send_from_account(deps.storage, &depositor, COMMUNITY_POOL_ACCOUNT, &amount)?;

    Ok(Response::new()
        .add_attribute("action", "protocolpool/fund_community_pool")
        .add_attribute("depositor", depositor)
        .add_attribute("amount", amount.to_string()))
}

pub fn execute_community_pool_spend(
    deps: DepsMut,
    bank: &dyn BankKeeper,
    authority: String,
    recipient: String,
    amount: Vec<Coin>,
) -> Result<Response, ContractError> {
    ensure_authority(deps.storage, &authority)?;
    let (recipient, _) = validate_address(deps.api, &recipient)?;
    let amount = Coins::try_from_non_empty(amount)?;
    ensure_not_blocked(deps.api, bank, &recipient)?;

    bank.send_to_account(deps.storage, COMMUNITY_POOL_ACCOUNT, &recipient, &amount)?;

    Ok(Response::new()
        .add_attribute("action", "protocolpool/community_pool_spend")
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_create_continuous_fund(
    deps: DepsMut,
    env: Env,
    bank: &dyn BankKeeper,
    authority: String,
    recipient: String,
    percentage: Decimal,
    expiry: Option<Timestamp>,
    cap: Option<Vec<Coin>>,
) -> Result<Response, ContractError> {
    ensure_authority(deps.storage, &authority)?;
    let (recipient, _) = validate_address(deps.api, &recipient)?;
    let percentage = Percentage::try_from(percentage)?;
    let cap = cap
        .map(Coins::try_from_non_empty)
        .transpose()
        .map_err(|e| ContractError::invalid_commitment(format!("cap: {e}")))?;

    let fund = ContinuousFund {
        recipient,
        percentage,
        expiry,
        cap,
    };
    let mut resp = Response::new()
        .add_attribute("action", "protocolpool/create_continuous_fund")
        .add_attribute("recipient", fund.recipient.as_str())
        .add_attribute("percentage", fund.percentage.to_string());
    if let Some(expiry) = fund.expiry {
        resp = resp.add_attribute("expiry", expiry.to_string());
    }
    if let Some(cap) = &fund.cap {
        resp = resp.add_attribute("cap", cap.to_string());
    }

    registry::create(deps.storage, deps.api, bank, env.block.time, fund)?;
    Ok(resp)
}

pub fn execute_cancel_continuous_fund(
    deps: DepsMut,
    env: Env,
    authority: String,
    recipient: String,
) -> Result<Response, ContractError> {
    ensure_authority(deps.storage, &authority)?;
    let (recipient, _) = validate_address(deps.api, &recipient)?;

    registry::cancel(deps.storage, deps.api, &recipient)?;

    let data = CancelContinuousFundResponse {
        recipient: recipient.clone(),
        canceled_at_height: env.block.height,
        canceled_at_time: env.block.time,
    };
    Ok(Response::new()
        .set_data(to_json_binary(&data)?)
        .add_attribute("action", "protocolpool/cancel_continuous_fund")
        .add_attribute("recipient", recipient)
        .add_attribute("canceled_at_height", env.block.height.to_string()))
}

pub fn execute_update_params(
    deps: DepsMut,
    authority: String,
    params: Params,
) -> Result<Response, ContractError> {
    ensure_authority(deps.storage, &authority)?;
    params.validate()?;

    PARAMS.save(deps.storage, &params)?;

    Ok(Response::new()
        .add_attribute("action", "protocolpool/update_params")
        .add_attribute(
            "enabled_distribution_denoms",
            params.enabled_distribution_denoms.join(","),
        )
        .add_attribute(
            "distribution_frequency",
            params.distribution_frequency.to_string(),
        ))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_submit_budget_proposal(
    deps: DepsMut,
    env: Env,
    bank: &dyn BankKeeper,
    authority: String,
    recipient: String,
    budget_per_tranche: Vec<Coin>,
    start_time: Option<Timestamp>,
    tranches: u64,
    period: u64,
) -> Result<Response, ContractError> {
    ensure_authority(deps.storage, &authority)?;
    let (recipient, _) = validate_address(deps.api, &recipient)?;
    let budget_per_tranche = Coins::try_from_non_empty(budget_per_tranche)?;

    let budget = Budget {
        recipient,
        budget_per_tranche,
        last_claimed_at: start_time.unwrap_or(env.block.time),
        tranches_left: tranches,
        period,
    };
    let resp = Response::new()
        .add_attribute("action", "protocolpool/submit_budget_proposal")
        .add_attribute("recipient", budget.recipient.as_str())
        .add_attribute("budget_per_tranche", budget.budget_per_tranche.to_string())
        .add_attribute("start_time", budget.last_claimed_at.to_string())
        .add_attribute("tranches", tranches.to_string())
        .add_attribute("period", period.to_string());

    budget::submit(deps.storage, deps.api, bank, env.block.time, budget)?;
    Ok(resp)
}

pub fn execute_claim_budget(
    deps: DepsMut,
    env: Env,
    bank: &dyn BankKeeper,
    recipient: String,
) -> Result<Response, ContractError> {
    let (recipient, _) = validate_address(deps.api, &recipient)?;

    let amount = budget::claim(deps.storage, deps.api, bank, env.block.time, &recipient)?;

    Ok(Response::new()
        .set_data(to_json_binary(&ClaimBudgetResponse {
            amount: amount.clone(),
        })?)
        .add_attribute("action", "protocolpool/claim_budget")
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount.to_string()))
}

//--------------------------------------------------------------------------------------------------
// Sudo
//--------------------------------------------------------------------------------------------------

pub fn sudo(
    deps: DepsMut,
    env: Env,
    bank: &dyn BankKeeper,
    msg: SudoMsg,
) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::EndBlock {} => distribution::end_block(deps, &env, bank),
    }
}

//--------------------------------------------------------------------------------------------------
// Queries
//--------------------------------------------------------------------------------------------------

pub fn query(
    deps: Deps,
    _env: Env,
    bank: &dyn BankKeeper,
    msg: QueryMsg,
) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::CommunityPool {} => Ok(to_json_binary(&query_community_pool(deps, bank)?)?),
        QueryMsg::ContinuousFund { recipient } => {
            Ok(to_json_binary(&query_continuous_fund(deps, recipient)?)?)
        }
        QueryMsg::ContinuousFunds {} => Ok(to_json_binary(&query_continuous_funds(deps)?)?),
        QueryMsg::Params {} => Ok(to_json_binary(&query_params(deps)?)?),
        QueryMsg::Config {} => Ok(to_json_binary(&query_config(deps)?)?),
        QueryMsg::ModuleAccounts {} => Ok(to_json_binary(&ModuleAccounts::derive(deps.api)?)?),
        QueryMsg::Budget { recipient } => Ok(to_json_binary(&query_budget(deps, recipient)?)?),
        QueryMsg::Budgets {} => Ok(to_json_binary(&BudgetsResponse {
            budgets: budget::list(deps.storage)?,
        })?),
    }
}

pub fn query_community_pool(
    deps: Deps,
    bank: &dyn BankKeeper,
) -> Result<CommunityPoolResponse, ContractError> {
    let accounts = ModuleAccounts::derive(deps.api)?;
    let pool = bank.all_balances(deps.storage, &accounts.community_pool)?;
    Ok(CommunityPoolResponse { pool })
}

pub fn query_continuous_fund(
    deps: Deps,
    recipient: String,
) -> Result<ContinuousFund, ContractError> {
    let (recipient, _) = validate_address(deps.api, &recipient)?;
    registry::get(deps.storage, deps.api, &recipient)
}

pub fn query_continuous_funds(deps: Deps) -> StdResult<ContinuousFundsResponse> {
    let continuous_funds = registry::list(deps.storage)?
        .into_iter()
        .map(|(_, fund)| fund)
        .collect();
    Ok(ContinuousFundsResponse { continuous_funds })
}

pub fn query_params(deps: Deps) -> StdResult<Params> {
    PARAMS.load(deps.storage)
}

pub fn query_config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

pub fn query_budget(deps: Deps, recipient: String) -> Result<Budget, ContractError> {
    let (recipient, _) = validate_address(deps.api, &recipient)?;
    budget::get(deps.storage, deps.api, &recipient)
}
