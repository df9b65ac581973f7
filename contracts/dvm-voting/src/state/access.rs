use cosmwasm_std::Addr;
use cw_storage_plus::Map;

use super::TopKey;

/// Addresses allowed to submit standard price requests
pub const REQUESTERS: Map<&Addr, ()> = Map::new(TopKey::Requesters.as_str());

pub const SUPPORTED_IDENTIFIERS: Map<&str, ()> = Map::new(TopKey::Identifiers.as_str());

/// Staker -> the delegate the staker nominated
pub const DELEGATES: Map<&Addr, Addr> = Map::new(TopKey::Delegates.as_str());

/// Delegate -> the staker the delegate accepted
pub const DELEGATORS: Map<&Addr, Addr> = Map::new(TopKey::Delegators.as_str());
