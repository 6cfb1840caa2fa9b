use cosmwasm_std::{Addr, Api, CanonicalAddr, StdResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ContractError;

/// Residual reserve.
pub const COMMUNITY_POOL_ACCOUNT: &str = "protocolpool_community_pool";
/// Inbound holding account for funds awaiting distribution.
pub const DISTRIBUTION_ACCOUNT: &str = "protocolpool_distribution";

const MODULE_ADDRESS_LEN: usize = 20;

/// Canonical address of a module account: the first 20 bytes of sha256(name).
pub fn module_canonical_address(name: &str) -> CanonicalAddr {
    let hash = Sha256::digest(name.as_bytes());
    CanonicalAddr::from(&hash[..MODULE_ADDRESS_LEN])
}

pub fn module_address(api: &dyn Api, name: &str) -> StdResult<Addr> {
    api.addr_humanize(&module_canonical_address(name))
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct ModuleAccounts {
    pub community_pool: Addr,
    pub distribution: Addr,
}

impl ModuleAccounts {
    pub fn derive(api: &dyn Api) -> StdResult<Self> {
        Ok(ModuleAccounts {
            community_pool: module_address(api, COMMUNITY_POOL_ACCOUNT)?,
            distribution: module_address(api, DISTRIBUTION_ACCOUNT)?,
        })
    }

    pub fn contains(&self, addr: &Addr) -> bool {
        *addr == self.community_pool || *addr == self.distribution
    }
}

/// Validates a textual address and returns it together with its canonical
/// bytes, which must be 20 or 32 bytes long.
pub fn validate_address(
    api: &dyn Api,
    address: &str,
) -> Result<(Addr, CanonicalAddr), ContractError> {
    let invalid = |reason: String| ContractError::InvalidAddress {
        address: address.to_string(),
        reason,
    };
    let addr = api.addr_validate(address).map_err(|e| invalid(e.to_string()))?;
    let canonical = api
        .addr_canonicalize(addr.as_str())
        .map_err(|e| invalid(e.to_string()))?;
    match canonical.as_slice().len() {
        20 | 32 => Ok((addr, canonical)),
        n => Err(invalid(format!("expected 20 or 32 bytes, got {n}"))),
    }
}
