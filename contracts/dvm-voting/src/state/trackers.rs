use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Decimal, Int128, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use super::TopKey;

#[cw_serde]
#[derive(Copy, Eq)]
pub enum TrackerOutcome {
    Resolved,
    /// The request did not resolve and moved to a later round. No slashing.
    Rolled,
    /// Tombstone of a deleted request. No slashing.
    Deleted,
}

/// One voting attempt of one request. Appended when the attempt's round is processed.
#[cw_serde]
pub struct SlashTracker {
    pub request_index: u64,
    /// The round the vote took place in
    pub round: u64,
    pub outcome: TrackerOutcome,
    pub resolved_price: Option<Int128>,
    pub wrong_vote_slash_per_token: Decimal,
    pub no_vote_slash_per_token: Decimal,
    pub total_slashed: Uint128,
    pub total_correct_stake: Uint128,
}

impl SlashTracker {
    pub fn without_effect(request_index: u64, round: u64, outcome: TrackerOutcome) -> Self {
        Self {
            request_index,
            round,
            outcome,
            resolved_price: None,
            wrong_vote_slash_per_token: Decimal::zero(),
            no_vote_slash_per_token: Decimal::zero(),
            total_slashed: Uint128::zero(),
            total_correct_stake: Uint128::zero(),
        }
    }
}

/// Slot -> tracker. Append-only except for tombstoning.
pub const SLASH_TRACKERS: Map<u64, SlashTracker> = Map::new(TopKey::SlashTrackers.as_str());

const TRACKER_COUNT: Item<u64> = Item::new(TopKey::TrackerCount.as_str());

/// (request index, slot) for every slot a request produced
pub const REQUEST_SLOTS: Map<(u64, u64), ()> = Map::new(TopKey::RequestSlots.as_str());

/// First slot of a run of tombstones -> last slot of that run
pub const DELETED_JUMPS: Map<u64, u64> = Map::new(TopKey::DeletedJumps.as_str());

pub fn tracker_count(storage: &dyn Storage) -> StdResult<u64> {
    Ok(TRACKER_COUNT.may_load(storage)?.unwrap_or_default())
}

/// Appends a tracker and returns its slot
pub fn append_tracker(storage: &mut dyn Storage, tracker: &SlashTracker) -> StdResult<u64> {
    let slot = tracker_count(storage)?;
    SLASH_TRACKERS.save(storage, slot, tracker)?;
    REQUEST_SLOTS.save(storage, (tracker.request_index, slot), &())?;
    TRACKER_COUNT.save(storage, &(slot + 1))?;
    Ok(slot)
}
