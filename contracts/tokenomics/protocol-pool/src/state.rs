use cosmwasm_std::{Addr, Api, CanonicalAddr, StdResult};
use cw_storage_plus::{Item, Map};
use protocol_pool_common::coins::Coins;
use protocol_pool_common::types::{Budget, Config, ContinuousFund, Params};

pub const CONFIG: Item<Config> = Item::new("config");
pub const PARAMS: Item<Params> = Item::new("params");

/// Continuous funds keyed by the canonical bytes of the recipient, which gives
/// the registry its deterministic walk order.
pub const CONTINUOUS_FUNDS: Map<&[u8], ContinuousFund> = Map::new("continuous_funds");
/// Cumulative amount paid to each capped continuous fund.
pub const DISTRIBUTED: Map<&[u8], Coins> = Map::new("distributed");
pub const BUDGETS: Map<&[u8], Budget> = Map::new("budgets");

/// Storage key of a recipient.
pub fn recipient_key(api: &dyn Api, recipient: &Addr) -> StdResult<Vec<u8>> {
    Ok(api.addr_canonicalize(recipient.as_str())?.as_slice().to_vec())
}

/// Inverse of [`recipient_key`].
pub fn recipient_from_key(api: &dyn Api, key: &[u8]) -> StdResult<Addr> {
    api.addr_humanize(&CanonicalAddr::from(key))
}
