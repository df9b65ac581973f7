use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Int128, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use super::TopKey;

#[cw_serde]
#[derive(Copy, Eq)]
pub enum RequestClass {
    Standard,
    /// Admin votes. Voters are only penalized for not voting, never for dissent.
    Governance,
}

/// The persisted part of a request's lifecycle. Whether a pending request is future or
/// active follows from its voting round and the current time.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum RequestState {
    Pending,
    Resolved,
    Deleted,
}

#[cw_serde]
pub struct PriceRequest {
    pub index: u64,
    pub identifier: String,
    pub time: u64,
    pub ancillary_data: Binary,
    pub class: RequestClass,
    pub state: RequestState,
    /// The round in which the request is or was last voted on
    pub last_voting_round: u64,
    pub resolved_price: Option<Int128>,
    pub roll_count: u32,
}

/// Request index -> request
pub const PRICE_REQUESTS: Map<u64, PriceRequest> = Map::new(TopKey::Requests.as_str());

/// Request identity (see [`dvm_common::request_key`]) -> request index.
/// Entries are removed when a request is deleted.
pub const REQUEST_INDEX_BY_KEY: Map<&[u8], u64> = Map::new(TopKey::RequestIndexByKey.as_str());

/// Indices of all requests that are neither resolved nor deleted
pub const PENDING_REQUESTS: Map<u64, ()> = Map::new(TopKey::PendingRequests.as_str());

const REQUEST_COUNT: Item<u64> = Item::new(TopKey::RequestCount.as_str());

pub fn request_count(storage: &dyn Storage) -> StdResult<u64> {
    Ok(REQUEST_COUNT.may_load(storage)?.unwrap_or_default())
}

/// Reserves the next request index
pub fn next_request_index(storage: &mut dyn Storage) -> StdResult<u64> {
    let index = request_count(storage)?;
    REQUEST_COUNT.save(storage, &(index + 1))?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    #[test]
    fn next_request_index_works() {
        let mut storage = MockStorage::default();
        assert_eq!(request_count(&storage).unwrap(), 0);
        assert_eq!(next_request_index(&mut storage).unwrap(), 0);
        assert_eq!(next_request_index(&mut storage).unwrap(), 1);
        assert_eq!(next_request_index(&mut storage).unwrap(), 2);
        assert_eq!(request_count(&storage).unwrap(), 3);
    }
}
