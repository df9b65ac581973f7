use cosmwasm_std::{Addr, Binary, HexBinary, Int128, Storage, Timestamp};
use dvm_common::{compute_vote_hash, round_id, vote_phase, VotePhase};

use crate::error::ContractError;
use crate::requests::find_request;
use crate::stakes::load_synced;
use crate::state::{
    Commitment, Config, PriceRequest, RequestState, RevealedVote, COMMITMENTS, REVEALS, TALLIES,
    VOTER_STAKES,
};

/// The request being voted on in the current round. Fails in the wrong phase.
fn votable_request(
    storage: &dyn Storage,
    config: &Config,
    now: Timestamp,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
    phase: VotePhase,
) -> Result<PriceRequest, ContractError> {
    let current_round = round_id(now, config.phase_length);
    let request = find_request(storage, identifier, time, ancillary_data)?
        .filter(|r| r.state == RequestState::Pending && r.last_voting_round == current_round)
        .ok_or(ContractError::RequestNotActive)?;
    let current = vote_phase(now, config.phase_length);
    if current != phase {
        return Err(ContractError::WrongPhase { current });
    }
    Ok(request)
}

/// Stores or replaces a commitment. Returns the request index and round.
#[allow(clippy::too_many_arguments)]
pub fn commit_vote(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    voter: &Addr,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
    hash: HexBinary,
    encrypted_vote: Option<Binary>,
) -> Result<(u64, u64), ContractError> {
    if hash.len() != 32 || hash.iter().all(|b| *b == 0) {
        return Err(ContractError::InvalidHash);
    }
    let request = votable_request(
        storage,
        config,
        now,
        identifier,
        time,
        ancillary_data,
        VotePhase::Commit,
    )?;
    let round = request.last_voting_round;
    COMMITMENTS.save(
        storage,
        (request.index, round, voter),
        &Commitment {
            hash,
            encrypted_vote,
        },
    )?;
    Ok((request.index, round))
}

/// Checks a reveal against the commitment and adds the voter's stake to the tally
#[allow(clippy::too_many_arguments)]
pub fn reveal_vote(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    voter: &Addr,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
    price: Int128,
    salt: Int128,
) -> Result<(u64, u64, RevealedVote), ContractError> {
    let request = votable_request(
        storage,
        config,
        now,
        identifier,
        time,
        ancillary_data,
        VotePhase::Reveal,
    )?;
    let round = request.last_voting_round;
    let key = (request.index, round, voter);
    if REVEALS.has(storage, key) {
        return Err(ContractError::AlreadyRevealed);
    }
    let commitment = COMMITMENTS
        .may_load(storage, key)?
        .ok_or(ContractError::NoCommitment)?;
    let expected = compute_vote_hash(
        price,
        salt,
        voter.as_str(),
        round,
        identifier,
        time,
        ancillary_data,
    );
    if commitment.hash != expected {
        return Err(ContractError::HashMismatch);
    }

    let stake = load_synced(storage, voter, round)?;
    VOTER_STAKES.save(storage, voter, &stake)?;
    let vote = RevealedVote {
        price,
        weight: stake.at_risk(round),
    };
    REVEALS.save(storage, key, &vote)?;
    let mut tally = TALLIES
        .may_load(storage, (request.index, round))?
        .unwrap_or_default();
    tally.add(vote.price, vote.weight);
    TALLIES.save(storage, (request.index, round), &tally)?;
    COMMITMENTS.remove(storage, key);
    Ok((request.index, round, vote))
}
