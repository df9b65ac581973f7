use cosmwasm_std::{Binary, Int128, Order, StdResult, Storage, Timestamp};
use dvm_common::{request_key, round_end_time, round_id};

use crate::error::ContractError;
use crate::msg::RequestStatus;
use crate::resolution::closed_vote;
use crate::slashing::tombstone_request;
use crate::state::{
    next_request_index, Config, PriceRequest, RequestClass, RequestState, PENDING_REQUESTS,
    PRICE_REQUESTS, REQUEST_INDEX_BY_KEY, SUPPORTED_IDENTIFIERS,
};

#[derive(Debug, PartialEq, Eq)]
pub struct Submission {
    pub index: u64,
    pub voting_round: u64,
    /// False if the request existed already
    pub created: bool,
}

pub fn submit_request(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    identifier: String,
    time: u64,
    ancillary_data: Binary,
    class: RequestClass,
) -> Result<Submission, ContractError> {
    if time > now.seconds() {
        return Err(ContractError::FutureTimeNotAllowed);
    }
    if class == RequestClass::Standard && !SUPPORTED_IDENTIFIERS.has(storage, &identifier) {
        return Err(ContractError::UnsupportedIdentifier);
    }
    if ancillary_data.len() > config.max_ancillary_data_len as usize {
        return Err(ContractError::AncillaryDataTooLarge {
            len: ancillary_data.len(),
            max: config.max_ancillary_data_len,
        });
    }

    let key = request_key(&identifier, time, &ancillary_data);
    if let Some(index) = REQUEST_INDEX_BY_KEY.may_load(storage, key.as_slice())? {
        let existing = PRICE_REQUESTS.load(storage, index)?;
        return Ok(Submission {
            index,
            voting_round: existing.last_voting_round,
            created: false,
        });
    }

    let voting_round = first_voting_round(config, now, class);
    let index = next_request_index(storage)?;
    let request = PriceRequest {
        index,
        identifier,
        time,
        ancillary_data,
        class,
        state: RequestState::Pending,
        last_voting_round: voting_round,
        resolved_price: None,
        roll_count: 0,
    };
    PRICE_REQUESTS.save(storage, index, &request)?;
    REQUEST_INDEX_BY_KEY.save(storage, key.as_slice(), &index)?;
    PENDING_REQUESTS.save(storage, index, &())?;
    Ok(Submission {
        index,
        voting_round,
        created: true,
    })
}

/// Requests are voted on in the next round, or one round later if they arrive too close
/// to the end of the current round. Governance requests always go to the next round.
pub fn first_voting_round(config: &Config, now: Timestamp, class: RequestClass) -> u64 {
    let current = round_id(now, config.phase_length);
    let until_round_end = round_end_time(current, config.phase_length).seconds() - now.seconds();
    if class == RequestClass::Standard && until_round_end < config.min_roll_to_next_round_length {
        current + 2
    } else {
        current + 1
    }
}

pub fn find_request(
    storage: &dyn Storage,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
) -> StdResult<Option<PriceRequest>> {
    let key = request_key(identifier, time, ancillary_data);
    match REQUEST_INDEX_BY_KEY.may_load(storage, key.as_slice())? {
        Some(index) => PRICE_REQUESTS.may_load(storage, index),
        None => Ok(None),
    }
}

/// A request as the next transaction will see it, i.e. with a closed voting round
/// resolved or rolled.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestView {
    pub state: RequestState,
    pub last_voting_round: u64,
    pub resolved_price: Option<Int128>,
    pub roll_count: u32,
}

pub fn project_request(
    storage: &dyn Storage,
    config: &Config,
    request: &PriceRequest,
    now: Timestamp,
) -> StdResult<RequestView> {
    let current_round = round_id(now, config.phase_length);
    if request.state == RequestState::Pending && request.last_voting_round < current_round {
        let vote = closed_vote(storage, config, request.index, request.last_voting_round)?;
        let view = match vote.price {
            Some(price) => RequestView {
                state: RequestState::Resolved,
                last_voting_round: request.last_voting_round,
                resolved_price: Some(price),
                roll_count: request.roll_count,
            },
            None => RequestView {
                state: RequestState::Pending,
                last_voting_round: current_round,
                resolved_price: None,
                roll_count: request.roll_count + 1,
            },
        };
        return Ok(view);
    }
    Ok(RequestView {
        state: request.state,
        last_voting_round: request.last_voting_round,
        resolved_price: request.resolved_price,
        roll_count: request.roll_count,
    })
}

pub fn request_status(view: &RequestView, current_round: u64) -> RequestStatus {
    match view.state {
        RequestState::Deleted => RequestStatus::Unrequested,
        RequestState::Resolved => RequestStatus::Resolved,
        RequestState::Pending if view.last_voting_round > current_round => RequestStatus::Future,
        RequestState::Pending => RequestStatus::Active,
    }
}

/// All requests voted on in the current round
pub fn active_requests(
    storage: &dyn Storage,
    config: &Config,
    now: Timestamp,
) -> StdResult<Vec<(PriceRequest, RequestView)>> {
    let current_round = round_id(now, config.phase_length);
    let mut out = Vec::new();
    for index in PENDING_REQUESTS.keys(storage, None, None, Order::Ascending) {
        let request = PRICE_REQUESTS.load(storage, index?)?;
        let view = project_request(storage, config, &request, now)?;
        if view.state == RequestState::Pending && view.last_voting_round == current_round {
            out.push((request, view));
        }
    }
    Ok(out)
}

/// True if any stored request is voted on in the given round.
/// Assumes closed rounds were processed already.
pub fn has_requests_in_round(storage: &dyn Storage, round: u64) -> StdResult<bool> {
    for index in PENDING_REQUESTS.keys(storage, None, None, Order::Ascending) {
        let request = PRICE_REQUESTS.load(storage, index?)?;
        if request.last_voting_round == round {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The resolved price of a request at `now`
pub fn resolved_price(
    storage: &dyn Storage,
    config: &Config,
    now: Timestamp,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
) -> Result<Int128, ContractError> {
    let request =
        find_request(storage, identifier, time, ancillary_data)?.ok_or(ContractError::NotResolved)?;
    let view = project_request(storage, config, &request, now)?;
    match (view.state, view.resolved_price) {
        (RequestState::Resolved, Some(price)) => Ok(price),
        _ => Err(ContractError::NotResolved),
    }
}

/// Deletes a pending request and tombstones its slash trackers.
/// Returns the tombstoned slots or None if the request was not pending.
pub fn delete_request(storage: &mut dyn Storage, index: u64) -> StdResult<Option<Vec<u64>>> {
    let Some(mut request) = PRICE_REQUESTS.may_load(storage, index)? else {
        return Ok(None);
    };
    if request.state != RequestState::Pending {
        return Ok(None);
    }
    request.state = RequestState::Deleted;
    PRICE_REQUESTS.save(storage, index, &request)?;
    PENDING_REQUESTS.remove(storage, index);
    let key = request_key(&request.identifier, request.time, &request.ancillary_data);
    REQUEST_INDEX_BY_KEY.remove(storage, key.as_slice());
    tombstone_request(storage, index).map(Some)
}
