use cosmwasm_std::{Addr, Storage};

use crate::coins::{Coin, Coins};
use crate::error::BankError;

/// The host's bank, the sole custodian of balances.
///
/// Modules are addressed by name (see [`crate::accounts`]). Every transfer is
/// debit-first: when the source lacks funds the call fails with
/// [`BankError::InsufficientFunds`] and nothing is written. Transfers write
/// through the `storage` handed in by the caller, so they commit or roll back
/// together with the caller's own writes.
pub trait BankKeeper {
    fn send(
        &self,
        storage: &mut dyn Storage,
        from_module: &str,
        to_module: &str,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn send_to_account(
        &self,
        storage: &mut dyn Storage,
        from_module: &str,
        to_address: &Addr,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn send_from_account(
        &self,
        storage: &mut dyn Storage,
        from_address: &Addr,
        to_module: &str,
        amount: &Coins,
    ) -> Result<(), BankError>;

    fn balance(&self, storage: &dyn Storage, address: &Addr, denom: &str)
        -> Result<Coin, BankError>;

    fn all_balances(&self, storage: &dyn Storage, address: &Addr) -> Result<Coins, BankError>;

    fn is_blocked(&self, address: &Addr) -> bool;
}
