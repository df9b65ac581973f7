use cosmwasm_std::{Addr, Binary, Coin, Int128, Order, StdResult, Storage, Timestamp};

use crate::error::ContractError;
use crate::requests::{delete_request, project_request, submit_request, Submission};
use crate::slashing::insert_deletion_jumps;
use crate::state::{
    next_proposal_id, request_count, Config, IndexRange, ProposalStatus, RequestClass,
    RequestState, SpamDeletionProposal, PRICE_REQUESTS, SPAM_PROPOSALS,
};

/// The governance vote approves the deletion when it resolves to this price
pub const APPROVE_PRICE: Int128 = Int128::new(1);

/// Number of rolls after which an undecided proposal counts as rejected
const MAX_ROLLS: u32 = 2;

pub fn spam_identifier(proposal_id: u64) -> String {
    format!("SpamDeletionProposal {proposal_id}")
}

/// Stores a proposal and submits the governance request deciding it
pub fn signal_spam(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    proposer: Addr,
    ranges: Vec<IndexRange>,
    bond: Coin,
) -> Result<(u64, Submission), ContractError> {
    let count = request_count(storage)?;
    if ranges.is_empty() || ranges.iter().any(|r| r.first > r.last || r.last >= count) {
        return Err(ContractError::InvalidSpamRange);
    }

    let proposal_id = next_proposal_id(storage)?;
    let submission = submit_request(
        storage,
        config,
        now,
        spam_identifier(proposal_id),
        now.seconds(),
        Binary::default(),
        RequestClass::Governance,
    )?;
    let proposal = SpamDeletionProposal {
        proposer,
        bond,
        request_time: now.seconds(),
        request_index: submission.index,
        ranges,
        status: ProposalStatus::Pending,
    };
    SPAM_PROPOSALS.save(storage, proposal_id, &proposal)?;
    Ok((proposal_id, submission))
}

/// The status of a proposal including the outcome of its vote
pub fn derived_status(
    storage: &dyn Storage,
    config: &Config,
    now: Timestamp,
    proposal: &SpamDeletionProposal,
) -> StdResult<ProposalStatus> {
    if proposal.status != ProposalStatus::Pending {
        return Ok(proposal.status);
    }
    let request = PRICE_REQUESTS.load(storage, proposal.request_index)?;
    let view = project_request(storage, config, &request, now)?;
    let status = match view.state {
        RequestState::Resolved if view.resolved_price == Some(APPROVE_PRICE) => {
            ProposalStatus::Approved
        }
        RequestState::Resolved | RequestState::Deleted => ProposalStatus::Rejected,
        RequestState::Pending if view.roll_count >= MAX_ROLLS => ProposalStatus::Rejected,
        RequestState::Pending => ProposalStatus::Pending,
    };
    Ok(status)
}

/// True if the request is unresolved and an approved but unexecuted proposal covers it
pub fn is_marked_for_deletion(
    storage: &dyn Storage,
    config: &Config,
    now: Timestamp,
    request_index: u64,
) -> StdResult<bool> {
    let Some(request) = PRICE_REQUESTS.may_load(storage, request_index)? else {
        return Ok(false);
    };
    if project_request(storage, config, &request, now)?.state != RequestState::Pending {
        return Ok(false);
    }
    for item in SPAM_PROPOSALS.range(storage, None, None, Order::Ascending) {
        let (_, proposal) = item?;
        if proposal.status == ProposalStatus::Pending
            && proposal.ranges.iter().any(|r| r.contains(request_index))
            && derived_status(storage, config, now, &proposal)? == ProposalStatus::Approved
        {
            return Ok(true);
        }
    }
    Ok(false)
}

#[derive(Debug, PartialEq, Eq)]
pub struct SpamExecution {
    /// `Executed` or `Rejected`
    pub status: ProposalStatus,
    /// Indices of the requests deleted by this execution
    pub deleted: Vec<u64>,
    /// Receiver of the bond
    pub bond_recipient: Addr,
    pub bond: Coin,
}

/// Settles a decided proposal. Approval deletes the pending requests in its ranges
/// and returns the bond. Otherwise the bond goes to the sink.
pub fn execute_spam_deletion(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    proposal_id: u64,
) -> Result<SpamExecution, ContractError> {
    let mut proposal = SPAM_PROPOSALS
        .may_load(storage, proposal_id)?
        .ok_or(ContractError::ProposalNotFound)?;

    if proposal.status != ProposalStatus::Pending {
        return Err(ContractError::AlreadyExecuted);
    }

    let mut deleted = Vec::new();
    let mut slots = Vec::new();
    let execution = match derived_status(storage, config, now, &proposal)? {
        ProposalStatus::Pending => return Err(ContractError::ProposalNotDecided),
        ProposalStatus::Approved => {
            for range in &proposal.ranges {
                for index in range.first..=range.last {
                    if let Some(request_slots) = delete_request(storage, index)? {
                        deleted.push(index);
                        slots.extend(request_slots);
                    }
                }
            }
            SpamExecution {
                status: ProposalStatus::Executed,
                deleted,
                bond_recipient: proposal.proposer.clone(),
                bond: proposal.bond.clone(),
            }
        }
        ProposalStatus::Executed | ProposalStatus::Rejected => {
            // A proposal that keeps failing to resolve leaves the voting pool
            if let Some(request_slots) = delete_request(storage, proposal.request_index)? {
                slots.extend(request_slots);
            }
            SpamExecution {
                status: ProposalStatus::Rejected,
                deleted,
                bond_recipient: config.sink.clone(),
                bond: proposal.bond.clone(),
            }
        }
    };
    insert_deletion_jumps(storage, slots)?;

    proposal.status = execution.status;
    SPAM_PROPOSALS.save(storage, proposal_id, &proposal)?;
    Ok(execution)
}
