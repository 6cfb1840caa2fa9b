pub mod budget;
pub mod contract;
pub mod distribution;
pub mod genesis;
pub mod registry;
pub mod state;
pub mod transaction;

pub use protocol_pool_common::error::ContractError;

#[cfg(test)]
mod testing;
