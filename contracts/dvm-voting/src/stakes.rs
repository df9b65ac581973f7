use cosmwasm_std::{Addr, Storage, Timestamp, Uint128};
use dvm_common::round_id;

use crate::error::ContractError;
use crate::requests::has_requests_in_round;
use crate::slashing::update_trackers;
use crate::state::{
    tracker_count, AtRiskUnstake, Config, VoterStake, AT_RISK_UNSTAKES, STAKE_TOTALS, VOTER_STAKES,
};

/// Loads a voter's stake with all slash trackers applied and pending stake activated
pub fn load_synced(
    storage: &mut dyn Storage,
    voter: &Addr,
    current_round: u64,
) -> Result<VoterStake, ContractError> {
    let mut stake = VOTER_STAKES.may_load(storage, voter)?.unwrap_or_default();
    update_trackers(storage, voter, &mut stake, None)?;
    stake.activate_pending(current_round);
    Ok(stake)
}

pub fn stake(
    storage: &mut dyn Storage,
    config: &Config,
    voter: &Addr,
    amount: Uint128,
    now: Timestamp,
) -> Result<VoterStake, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }
    let current = round_id(now, config.phase_length);
    let mut stake = VOTER_STAKES.may_load(storage, voter)?.unwrap_or_default();
    if stake.is_empty() {
        // Nothing to slash, skip the history
        stake.last_request_index_considered = tracker_count(storage)?;
    } else {
        stake = load_synced(storage, voter, current)?;
    }
    stake.pending_stake += amount;
    stake.pending_stake_round = current + 1;
    stake.cumulative_staked += amount;
    VOTER_STAKES.save(storage, voter, &stake)?;

    let mut totals = STAKE_TOTALS.may_load(storage)?.unwrap_or_default();
    totals.activate_pending(current);
    totals.pending += amount;
    totals.pending_round = current + 1;
    STAKE_TOTALS.save(storage, &totals)?;
    Ok(stake)
}

/// Moves active stake to the pending unstake. It stays at risk for the rest of the current round.
pub fn request_unstake(
    storage: &mut dyn Storage,
    config: &Config,
    voter: &Addr,
    amount: Uint128,
    now: Timestamp,
) -> Result<VoterStake, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }
    let current = round_id(now, config.phase_length);
    let mut stake = load_synced(storage, voter, current)?;
    if !stake.pending_unstake.is_zero() {
        return Err(ContractError::UnstakeAlreadyPending);
    }
    if stake.active_stake < amount {
        return Err(ContractError::InsufficientActiveStake);
    }
    stake.active_stake -= amount;
    stake.pending_unstake = amount;
    stake.unstake_request_time = now.seconds();
    stake.unstake_unlock_time = now.seconds() + config.unstake_cooldown;
    stake.unstake_round = current;
    VOTER_STAKES.save(storage, voter, &stake)?;
    if has_requests_in_round(storage, current)? {
        let at_risk = AtRiskUnstake {
            active: stake.active_stake,
            unstake: amount,
            ..AtRiskUnstake::default()
        };
        AT_RISK_UNSTAKES.save(storage, (current, voter), &at_risk)?;
    }

    let mut totals = STAKE_TOTALS.may_load(storage)?.unwrap_or_default();
    totals.activate_pending(current);
    totals.active = totals.active.checked_sub(amount)?;
    STAKE_TOTALS.save(storage, &totals)?;
    Ok(stake)
}

/// Clears the pending unstake and returns the amount to pay out
pub fn execute_unstake(
    storage: &mut dyn Storage,
    config: &Config,
    voter: &Addr,
    now: Timestamp,
) -> Result<Uint128, ContractError> {
    let current = round_id(now, config.phase_length);
    let mut stake = load_synced(storage, voter, current)?;
    if stake.pending_unstake.is_zero() {
        return Err(ContractError::NoPendingUnstake);
    }
    if now.seconds() < stake.unstake_unlock_time {
        return Err(ContractError::CooldownNotElapsed);
    }
    if stake.unstake_round == current && has_requests_in_round(storage, current)? {
        return Err(ContractError::UnstakeAtRisk);
    }
    let amount = stake.pending_unstake;
    stake.pending_unstake = Uint128::zero();
    stake.unstake_request_time = 0;
    stake.unstake_unlock_time = 0;
    VOTER_STAKES.save(storage, voter, &stake)?;
    Ok(amount)
}
