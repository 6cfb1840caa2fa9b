use std::cell::RefCell;
use std::collections::BTreeSet;

use cosmwasm_std::{Addr, Api, Order, StdError, StdResult, Storage, Uint256};
use cw_storage_plus::Map;
use protocol_pool_common::accounts::{ModuleAccounts, COMMUNITY_POOL_ACCOUNT, DISTRIBUTION_ACCOUNT};
use protocol_pool_common::bank::BankKeeper;
use protocol_pool_common::coins::{Coin, Coins};
use protocol_pool_common::error::BankError;

/// Balances live in the caller's storage, so they roll back with it.
const BALANCES: Map<(&Addr, &str), Uint256> = Map::new("bank_balances");

#[derive(Clone, Debug, PartialEq)]
pub enum BankCall {
    Send {
        from_module: String,
        to_module: String,
        amount: Coins,
    },
    SendToAccount {
        from_module: String,
        to_address: Addr,
        amount: Coins,
    },
    SendFromAccount {
        from_address: Addr,
        to_module: String,
        amount: Coins,
    },
    Balance {
        address: Addr,
        denom: String,
    },
    AllBalances {
        address: Addr,
    },
}

pub struct MockBank {
    pub accounts: ModuleAccounts,
    blocked: BTreeSet<Addr>,
    calls: RefCell<Vec<BankCall>>,
    fail_sends_to: RefCell<Option<Addr>>,
}

impl MockBank {
    pub fn new(api: &dyn Api) -> Self {
        MockBank {
            accounts: ModuleAccounts::derive(api).unwrap(),
            blocked: BTreeSet::new(),
            calls: RefCell::new(vec![]),
            fail_sends_to: RefCell::new(None),
        }
    }

    pub fn with_blocked(mut self, address: &Addr) -> Self {
        self.blocked.insert(address.clone());
        self
    }

    /// Makes every transfer credited to `address` fail.
    pub fn fail_sends_to(&self, address: &Addr) {
        *self.fail_sends_to.borrow_mut() = Some(address.clone());
    }

    pub fn calls(&self) -> Vec<BankCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn mint(&self, storage: &mut dyn Storage, address: &Addr, coins: &[Coin]) {
        for c in coins {
            let current = self.amount(storage, address, &c.denom).unwrap();
            self.store(storage, address, &c.denom, current + c.amount)
                .unwrap();
        }
    }

    pub fn mint_module(&self, storage: &mut dyn Storage, name: &str, coins: &[Coin]) {
        let address = self.module(name).unwrap();
        self.mint(storage, &address, coins);
    }

    /// Balance of `address` without recording a call.
    pub fn balance_of(&self, storage: &dyn Storage, address: &Addr) -> Coins {
        self.read_all(storage, address).unwrap()
    }

    pub fn module_balance(&self, storage: &dyn Storage, name: &str) -> Coins {
        let address = self.module(name).unwrap();
        self.balance_of(storage, &address)
    }

    fn module(&self, name: &str) -> Result<Addr, BankError> {
        match name {
            COMMUNITY_POOL_ACCOUNT => Ok(self.accounts.community_pool.clone()),
            DISTRIBUTION_ACCOUNT => Ok(self.accounts.distribution.clone()),
            _ => Err(BankError::UnknownModule {
                name: name.to_string(),
            }),
        }
    }

    fn amount(&self, storage: &dyn Storage, address: &Addr, denom: &str) -> StdResult<Uint256> {
        Ok(BALANCES
            .may_load(storage, (address, denom))?
            .unwrap_or_default())
    }

    fn store(
        &self,
        storage: &mut dyn Storage,
        address: &Addr,
        denom: &str,
        amount: Uint256,
    ) -> StdResult<()> {
        if amount.is_zero() {
            BALANCES.remove(storage, (address, denom));
            Ok(())
        } else {
            BALANCES.save(storage, (address, denom), &amount)
        }
    }

    fn read_all(&self, storage: &dyn Storage, address: &Addr) -> StdResult<Coins> {
        let mut coins = Coins::new();
        for item in BALANCES
            .prefix(address)
            .range(storage, None, None, Order::Ascending)
        {
            let (denom, amount) = item?;
            coins.set(&denom, amount);
        }
        Ok(coins)
    }

    fn transfer(
        &self,
        storage: &mut dyn Storage,
        from: &Addr,
        to: &Addr,
        amount: &Coins,
    ) -> Result<(), BankError> {
        if self.fail_sends_to.borrow().as_ref() == Some(to) {
            return Err(StdError::generic_err(format!("transfer to {to} rejected")).into());
        }
        for (denom, required) in amount.iter() {
            let available = self.amount(storage, from, denom)?;
            if available < required {
                return Err(BankError::InsufficientFunds {
                    address: from.to_string(),
                    available: Coin::new(available, denom).to_string(),
                    required: Coin::new(required, denom).to_string(),
                });
            }
        }
        for (denom, value) in amount.iter() {
            let debited = self.amount(storage, from, denom)? - value;
            self.store(storage, from, denom, debited)?;
            let credited = self
                .amount(storage, to, denom)?
                .checked_add(value)
                .map_err(StdError::from)?;
            self.store(storage, to, denom, credited)?;
        }
        Ok(())
    }
}

impl BankKeeper for MockBank {
    fn send(
        &self,
        storage: &mut dyn Storage,
        from_module: &str,
        to_module: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        self.calls.borrow_mut().push(BankCall::Send {
            from_module: from_module.to_string(),
            to_module: to_module.to_string(),
            amount: amount.clone(),
        });
        let from = self.module(from_module)?;
        let to = self.module(to_module)?;
        self.transfer(storage, &from, &to, amount)
    }

    fn send_to_account(
        &self,
        storage: &mut dyn Storage,
        from_module: &str,
        to_address: &Addr,
        amount: &Coins,
    ) -> Result<(), BankError> {
        self.calls.borrow_mut().push(BankCall::SendToAccount {
            from_module: from_module.to_string(),
            to_address: to_address.clone(),
            amount: amount.clone(),
        });
        let from = self.module(from_module)?;
        self.transfer(storage, &from, to_address, amount)
    }

    fn send_from_account(
        &self,
        storage: &mut dyn Storage,
        from_address: &Addr,
        to_module: &str,
        amount: &Coins,
    ) -> Result<(), BankError> {
        self.calls.borrow_mut().push(BankCall::SendFromAccount {
            from_address: from_address.clone(),
            to_module: to_module.to_string(),
            amount: amount.clone(),
        });
        let to = self.module(to_module)?;
        self.transfer(storage, from_address, &to, amount)
    }

    fn balance(
        &self,
        storage: &dyn Storage,
        address: &Addr,
        denom: &str,
    ) -> Result<Coin, BankError> {
        self.calls.borrow_mut().push(BankCall::Balance {
            address: address.clone(),
            denom: denom.to_string(),
        });
        Ok(Coin::new(self.amount(storage, address, denom)?, denom))
    }

    fn all_balances(&self, storage: &dyn Storage, address: &Addr) -> Result<Coins, BankError> {
        self.calls.borrow_mut().push(BankCall::AllBalances {
            address: address.clone(),
        });
        Ok(self.read_all(storage, address)?)
    }

    fn is_blocked(&self, address: &Addr) -> bool {
        self.blocked.contains(address)
    }
}
