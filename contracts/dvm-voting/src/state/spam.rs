use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, StdResult, Storage};
use cw_storage_plus::{Item, Map};

use super::TopKey;

/// Inclusive range of request indices
#[cw_serde]
#[derive(Copy, Eq)]
pub struct IndexRange {
    pub first: u64,
    pub last: u64,
}

impl IndexRange {
    pub fn contains(&self, index: u64) -> bool {
        self.first <= index && index <= self.last
    }
}

#[cw_serde]
#[derive(Copy, Eq)]
pub enum ProposalStatus {
    /// Not decided yet
    Pending,
    /// Vote resolved to delete, not executed yet
    Approved,
    /// Vote resolved against deletion or failed to resolve. The bond is forfeited.
    Rejected,
    /// Requests deleted and bond returned
    Executed,
}

#[cw_serde]
pub struct SpamDeletionProposal {
    pub proposer: Addr,
    pub bond: Coin,
    /// The time of the governance request that decides this proposal
    pub request_time: u64,
    pub request_index: u64,
    pub ranges: Vec<IndexRange>,
    /// Only `Pending`, `Rejected` and `Executed` are stored.
    /// `Approved` is derived from the vote outcome.
    pub status: ProposalStatus,
}

pub const SPAM_PROPOSALS: Map<u64, SpamDeletionProposal> =
    Map::new(TopKey::SpamProposals.as_str());

const SPAM_PROPOSAL_COUNT: Item<u64> = Item::new(TopKey::SpamProposalCount.as_str());

pub fn next_proposal_id(storage: &mut dyn Storage) -> StdResult<u64> {
    let id = SPAM_PROPOSAL_COUNT.may_load(storage)?.unwrap_or_default();
    SPAM_PROPOSAL_COUNT.save(storage, &(id + 1))?;
    Ok(id)
}
