use std::str::FromStr;

use cosmwasm_std::testing::mock_env;
use cosmwasm_std::{Addr, Api, Env, Response};
use protocol_pool_common::accounts::{COMMUNITY_POOL_ACCOUNT, DISTRIBUTION_ACCOUNT};
use protocol_pool_common::coins::{coin, Coin, Coins};
use protocol_pool_common::error::ContractError;
use protocol_pool_common::msg::{ExecuteMsg, SudoMsg};
use protocol_pool_common::percentage::Percentage;
use protocol_pool_common::types::{ContinuousFund, Params};

use crate::contract::{execute, sudo};
use crate::genesis::export_genesis;
use crate::registry;
use crate::state::{CONTINUOUS_FUNDS, DISTRIBUTED};
use crate::testing::mock_bank::{BankCall, MockBank};
use crate::testing::tests::{create_fund, setup, TestDeps, DENOM};

fn end_block(deps: &mut TestDeps, bank: &MockBank, env: Env) -> Result<Response, ContractError> {
    sudo(deps.as_mut(), env, bank, SudoMsg::EndBlock {})
}

fn coins(list: &[Coin]) -> Coins {
    Coins::from_unsorted(list.to_vec()).unwrap()
}

fn update_params(
    deps: &mut TestDeps,
    bank: &MockBank,
    authority: &Addr,
    denoms: &[&str],
    frequency: u64,
) {
    execute(
        deps.as_mut(),
        mock_env(),
        bank,
        ExecuteMsg::UpdateParams {
            authority: authority.to_string(),
            params: Params {
                enabled_distribution_denoms: denoms.iter().map(|d| d.to_string()).collect(),
                distribution_frequency: frequency,
            },
        },
    )
    .unwrap();
}

#[test]
fn test_clean_split() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    let b = deps.api.addr_make("b");
    create_fund(deps.as_mut(), &bank, &authority, &a, "0.3", None, None).unwrap();
    create_fund(deps.as_mut(), &bank, &authority, &b, "0.2", None, None).unwrap();
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(1_000_000, DENOM)]);

    let res = end_block(&mut deps, &bank, mock_env()).unwrap();
    assert_eq!(res.attributes[0].value, "protocolpool/distribute");

    assert_eq!(bank.balance_of(&deps.storage, &a), coins(&[coin(300_000, DENOM)]));
    assert_eq!(bank.balance_of(&deps.storage, &b), coins(&[coin(200_000, DENOM)]));
    assert_eq!(
        bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT),
        coins(&[coin(500_000, DENOM)])
    );
    assert!(bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT).is_empty());
}

#[test]
fn test_truncation_residue_goes_to_community_pool() {
    let (mut deps, bank, authority) = setup();
    let recipients: Vec<Addr> = ["a", "b", "c"].iter().map(|n| deps.api.addr_make(n)).collect();
    for recipient in &recipients {
        create_fund(
            deps.as_mut(),
            &bank,
            &authority,
            recipient,
            "0.333333333333333333",
            None,
            None,
        )
        .unwrap();
    }
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(10, DENOM)]);

    end_block(&mut deps, &bank, mock_env()).unwrap();

    for recipient in &recipients {
        assert_eq!(bank.balance_of(&deps.storage, recipient), coins(&[coin(3, DENOM)]));
    }
    assert_eq!(
        bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT),
        coins(&[coin(1, DENOM)])
    );
}

#[test]
fn test_expired_fund_is_removed() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    let b = deps.api.addr_make("b");
    let env = mock_env();
    create_fund(
        deps.as_mut(),
        &bank,
        &authority,
        &a,
        "0.5",
        Some(env.block.time.plus_seconds(10)),
        None,
    )
    .unwrap();
    // expiry equal to block time is still active
    create_fund(
        deps.as_mut(),
        &bank,
        &authority,
        &b,
        "0.1",
        Some(env.block.time.plus_seconds(11)),
        None,
    )
    .unwrap();
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, DENOM)]);

    let mut later = env.clone();
    later.block.time = env.block.time.plus_seconds(11);
    let res = end_block(&mut deps, &bank, later).unwrap();
    assert!(res
        .attributes
        .iter()
        .any(|attr| attr.key == "expired" && attr.value == a.as_str()));

    assert!(bank.balance_of(&deps.storage, &a).is_empty());
    assert_eq!(bank.balance_of(&deps.storage, &b), coins(&[coin(10, DENOM)]));
    assert_eq!(
        bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT),
        coins(&[coin(90, DENOM)])
    );
    let funds = registry::list(&deps.storage).unwrap();
    assert_eq!(funds.len(), 1);
    assert_eq!(funds[0].1.recipient, b);
}

#[test]
fn test_cap_closure() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    create_fund(
        deps.as_mut(),
        &bank,
        &authority,
        &a,
        "0.5",
        None,
        Some(vec![coin(100, DENOM)]),
    )
    .unwrap();
    let key = deps.api.addr_canonicalize(a.as_str()).unwrap();

    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(160, DENOM)]);
    end_block(&mut deps, &bank, mock_env()).unwrap();
    assert_eq!(bank.balance_of(&deps.storage, &a), coins(&[coin(80, DENOM)]));
    assert_eq!(
        DISTRIBUTED.load(&deps.storage, key.as_slice()).unwrap(),
        coins(&[coin(80, DENOM)])
    );

    // raw share is 50 but only 20 is left under the cap
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, DENOM)]);
    let res = end_block(&mut deps, &bank, mock_env()).unwrap();
    assert!(res
        .attributes
        .iter()
        .any(|attr| attr.key == "capped" && attr.value == a.as_str()));

    assert_eq!(bank.balance_of(&deps.storage, &a), coins(&[coin(100, DENOM)]));
    assert_eq!(
        bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT),
        coins(&[coin(160, DENOM)])
    );
    assert!(registry::list(&deps.storage).unwrap().is_empty());
    assert!(DISTRIBUTED
        .may_load(&deps.storage, key.as_slice())
        .unwrap()
        .is_none());
}

#[test]
fn test_multiple_denoms() {
    let (mut deps, bank, authority) = setup();
    update_params(&mut deps, &bank, &authority, &[DENOM, "foo"], 1);
    let a = deps.api.addr_make("a");
    create_fund(deps.as_mut(), &bank, &authority, &a, "0.4", None, None).unwrap();
    bank.mint_module(
        &mut deps.storage,
        DISTRIBUTION_ACCOUNT,
        &[coin(100, DENOM), coin(50, "foo")],
    );

    end_block(&mut deps, &bank, mock_env()).unwrap();

    assert_eq!(
        bank.balance_of(&deps.storage, &a),
        coins(&[coin(40, DENOM), coin(20, "foo")])
    );
    assert_eq!(
        bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT),
        coins(&[coin(60, DENOM), coin(30, "foo")])
    );
}

#[test]
fn test_disabled_denom_stays_in_distribution_account() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    create_fund(deps.as_mut(), &bank, &authority, &a, "1", None, None).unwrap();
    bank.mint_module(
        &mut deps.storage,
        DISTRIBUTION_ACCOUNT,
        &[coin(100, DENOM), coin(77, "bar")],
    );
    bank.clear_calls();

    end_block(&mut deps, &bank, mock_env()).unwrap();

    assert_eq!(bank.balance_of(&deps.storage, &a), coins(&[coin(100, DENOM)]));
    assert_eq!(
        bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT),
        coins(&[coin(77, "bar")])
    );
    assert!(bank
        .module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT)
        .is_empty());
    assert!(!bank
        .calls()
        .iter()
        .any(|call| matches!(call, BankCall::Send { .. })));
}

#[test]
fn test_no_bank_calls_outside_schedule() {
    let (mut deps, bank, authority) = setup();
    update_params(&mut deps, &bank, &authority, &[DENOM], 10);
    let a = deps.api.addr_make("a");
    create_fund(deps.as_mut(), &bank, &authority, &a, "0.5", None, None).unwrap();
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, DENOM)]);
    bank.clear_calls();

    let mut env = mock_env();
    env.block.height = 1_001;
    let res = end_block(&mut deps, &bank, env.clone()).unwrap();
    assert_eq!(res.attributes[0].value, "protocolpool/end_block");
    assert!(bank.calls().is_empty());
    assert_eq!(
        bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT),
        coins(&[coin(100, DENOM)])
    );

    env.block.height = 1_010;
    end_block(&mut deps, &bank, env).unwrap();
    assert_eq!(bank.balance_of(&deps.storage, &a), coins(&[coin(50, DENOM)]));
}

#[test]
fn test_empty_pool_makes_no_transfers() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    create_fund(deps.as_mut(), &bank, &authority, &a, "0.5", None, None).unwrap();
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, "bar")]);

    end_block(&mut deps, &bank, mock_env()).unwrap();

    assert_eq!(
        bank.calls(),
        vec![BankCall::Balance {
            address: bank.accounts.distribution.clone(),
            denom: DENOM.to_string(),
        }]
    );
}

#[test]
fn test_conservation() {
    let (mut deps, bank, authority) = setup();
    update_params(&mut deps, &bank, &authority, &[DENOM, "foo"], 1);
    let recipients: Vec<Addr> = ["a", "b", "c", "d"]
        .iter()
        .map(|n| deps.api.addr_make(n))
        .collect();
    let percentages = ["0.123456789", "0.25", "0.07", "0.3333"];
    for (recipient, percentage) in recipients.iter().zip(percentages) {
        create_fund(deps.as_mut(), &bank, &authority, recipient, percentage, None, None).unwrap();
    }
    bank.mint_module(&mut deps.storage, COMMUNITY_POOL_ACCOUNT, &[coin(17, DENOM)]);

    let total = |deps: &TestDeps| {
        let mut sum = bank
            .module_balance(&deps.storage, DISTRIBUTION_ACCOUNT)
            .checked_add(&bank.module_balance(&deps.storage, COMMUNITY_POOL_ACCOUNT))
            .unwrap();
        for recipient in &recipients {
            sum = sum.checked_add(&bank.balance_of(&deps.storage, recipient)).unwrap();
        }
        sum
    };

    for (height, minted) in [(1u64, 999_999u128), (2, 1), (3, 123_456_789)] {
        bank.mint_module(
            &mut deps.storage,
            DISTRIBUTION_ACCOUNT,
            &[coin(minted, DENOM), coin(minted / 3, "foo")],
        );
        let before = total(&deps);
        let mut env = mock_env();
        env.block.height = height;
        end_block(&mut deps, &bank, env).unwrap();
        assert_eq!(total(&deps), before);
        assert!(bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT).is_empty());
    }

    // per denom, the sum of floor(pool * 0.25) over the three blocks
    assert_eq!(
        bank.balance_of(&deps.storage, &recipients[1]),
        coins(&[coin(31_114_196, DENOM), coin(10_371_398, "foo")])
    );
}

#[test]
fn test_walk_follows_key_order() {
    let build = |names: &[&str]| {
        let (mut deps, bank, authority) = setup();
        for name in names {
            let recipient = deps.api.addr_make(name);
            create_fund(deps.as_mut(), &bank, &authority, &recipient, "0.1", None, None).unwrap();
        }
        bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(12_345, DENOM)]);
        bank.clear_calls();
        end_block(&mut deps, &bank, mock_env()).unwrap();
        (deps, bank)
    };

    let (first, first_bank) = build(&["a", "b", "c", "d", "e"]);
    let (second, second_bank) = build(&["e", "c", "a", "d", "b"]);

    assert_eq!(
        export_genesis(first.as_ref()).unwrap(),
        export_genesis(second.as_ref()).unwrap()
    );
    assert_eq!(first_bank.calls(), second_bank.calls());

    let paid: Vec<Addr> = first_bank
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            BankCall::SendToAccount { to_address, .. } => Some(to_address),
            _ => None,
        })
        .collect();
    let ordered: Vec<Addr> = registry::list(&first.storage)
        .unwrap()
        .into_iter()
        .map(|(_, fund)| fund.recipient)
        .collect();
    assert_eq!(paid, ordered);
    assert_eq!(
        first_bank.module_balance(&first.storage, COMMUNITY_POOL_ACCOUNT),
        second_bank.module_balance(&second.storage, COMMUNITY_POOL_ACCOUNT)
    );
}

#[test]
fn test_negative_remainder_aborts_block() {
    let (mut deps, bank, _) = setup();
    let a = deps.api.addr_make("a");
    let b = deps.api.addr_make("b");
    // over-committed registry written behind the registry's back
    for recipient in [&a, &b] {
        let key = deps.api.addr_canonicalize(recipient.as_str()).unwrap();
        let fund = ContinuousFund {
            recipient: recipient.clone(),
            percentage: Percentage::from_str("0.6").unwrap(),
            expiry: None,
            cap: None,
        };
        CONTINUOUS_FUNDS
            .save(&mut deps.storage, key.as_slice(), &fund)
            .unwrap();
    }
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, DENOM)]);

    let err = end_block(&mut deps, &bank, mock_env()).unwrap_err();
    assert!(matches!(err, ContractError::NegativeRemainder { .. }));
    assert!(err.is_fatal());

    // the first payout was rolled back with the rest of the block
    assert!(bank.balance_of(&deps.storage, &a).is_empty());
    assert!(bank.balance_of(&deps.storage, &b).is_empty());
    assert_eq!(
        bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT),
        coins(&[coin(100, DENOM)])
    );
}

#[test]
fn test_bank_failure_discards_block() {
    let (mut deps, bank, authority) = setup();
    let a = deps.api.addr_make("a");
    let b = deps.api.addr_make("b");
    let env = mock_env();
    create_fund(deps.as_mut(), &bank, &authority, &a, "0.3", None, Some(vec![coin(1_000, DENOM)]))
        .unwrap();
    create_fund(
        deps.as_mut(),
        &bank,
        &authority,
        &b,
        "0.2",
        Some(env.block.time.plus_seconds(1)),
        None,
    )
    .unwrap();
    bank.mint_module(&mut deps.storage, DISTRIBUTION_ACCOUNT, &[coin(100, DENOM)]);
    bank.fail_sends_to(&bank.accounts.community_pool);

    let mut later = env.clone();
    later.block.time = env.block.time.plus_seconds(5);
    let err = end_block(&mut deps, &bank, later).unwrap_err();
    assert!(matches!(err, ContractError::Bank(_)));

    // payouts, drawdown and the expiry sweep are all undone
    assert!(bank.balance_of(&deps.storage, &a).is_empty());
    assert_eq!(
        bank.module_balance(&deps.storage, DISTRIBUTION_ACCOUNT),
        coins(&[coin(100, DENOM)])
    );
    assert_eq!(registry::list(&deps.storage).unwrap().len(), 2);
    let key = deps.api.addr_canonicalize(a.as_str()).unwrap();
    assert!(DISTRIBUTED
        .may_load(&deps.storage, key.as_slice())
        .unwrap()
        .is_none());
}
