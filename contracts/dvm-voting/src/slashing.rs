use std::cmp::min;

use cosmwasm_std::{Addr, Decimal, Int128, Order, StdResult, Storage, Uint128};

use crate::error::ContractError;
use crate::slash_rate::{ParticipationStats, SlashRatePolicy};
use crate::state::{
    tracker_count, PriceRequest, RequestClass, SlashTracker, TrackerOutcome, UnappliedSlash,
    VoteTally, VoterStake, AT_RISK_UNSTAKES, DELETED_JUMPS, REQUEST_SLOTS, REVEALS,
    SLASH_TRACKERS, STAKE_TOTALS,
};

/// Builds the tracker of a request that resolved to `price` in `round`.
///
/// `total_stake` is the round's total active stake. Everything not revealed counts as not voted.
pub fn resolved_tracker(
    request: &PriceRequest,
    round: u64,
    price: Int128,
    tally: &VoteTally,
    total_stake: Uint128,
    policy: &dyn SlashRatePolicy,
) -> SlashTracker {
    let total_correct = tally.weight_of(price);
    let participation = ParticipationStats {
        total_stake,
        total_revealed: tally.total,
        total_correct,
    };
    let rates = policy.rates(request.class, &participation);
    let wrong_vote_rate = match request.class {
        RequestClass::Standard => rates.wrong_vote,
        RequestClass::Governance => Decimal::zero(),
    };

    let wrong_stake = tally.total - total_correct;
    let no_vote_stake = total_stake.saturating_sub(tally.total);
    SlashTracker {
        request_index: request.index,
        round,
        outcome: TrackerOutcome::Resolved,
        resolved_price: Some(price),
        wrong_vote_slash_per_token: wrong_vote_rate,
        no_vote_slash_per_token: rates.no_vote,
        total_slashed: wrong_stake.mul_floor(wrong_vote_rate)
            + no_vote_stake.mul_floor(rates.no_vote),
        total_correct_stake: total_correct,
    }
}

/// Applies slash trackers to a voter's stake, starting at `last_request_index_considered`.
///
/// With `to_index` set, trackers up to but excluding `to_index` are applied. Without it,
/// all trackers are applied.
pub fn update_trackers(
    storage: &mut dyn Storage,
    voter: &Addr,
    stake: &mut VoterStake,
    to_index: Option<u64>,
) -> Result<(), ContractError> {
    let tracker_count = tracker_count(storage)?;
    let last_considered = stake.last_request_index_considered;
    let to_index = match to_index {
        Some(to_index) if to_index <= last_considered => {
            return Err(ContractError::InvalidRangeTooLow {
                to_index,
                last_considered,
            })
        }
        Some(to_index) if to_index > tracker_count => {
            return Err(ContractError::InvalidRangeTooHigh {
                to_index,
                tracker_count,
            })
        }
        Some(to_index) => to_index,
        None => tracker_count,
    };

    let mut index = last_considered;
    while index < to_index {
        if let Some(last_deleted) = DELETED_JUMPS.may_load(storage, index)? {
            index = min(last_deleted + 1, to_index);
            continue;
        }
        let tracker = SLASH_TRACKERS.load(storage, index)?;
        accumulate(storage, voter, stake, &tracker)?;
        index += 1;
    }
    stake.last_request_index_considered = index;

    // Remaining trackers of the round we stopped in must see the same base stake
    let round_continues = match (&stake.unapplied_slash, SLASH_TRACKERS.may_load(storage, index)?) {
        (Some(unapplied), Some(next)) => next.round == unapplied.round,
        _ => false,
    };
    if !round_continues {
        apply_unapplied_slash(stake);
    }
    Ok(())
}

fn accumulate(
    storage: &mut dyn Storage,
    voter: &Addr,
    stake: &mut VoterStake,
    tracker: &SlashTracker,
) -> StdResult<()> {
    if matches!(&stake.unapplied_slash, Some(unapplied) if unapplied.round != tracker.round) {
        apply_unapplied_slash(stake);
    }
    stake.activate_pending(tracker.round);

    if tracker.outcome != TrackerOutcome::Resolved {
        return Ok(());
    }
    let base = stake.at_risk(tracker.round);
    if base.is_zero() {
        return Ok(());
    }

    let (gain, loss) = tracker_effect(storage, tracker, voter, base)?;
    let unapplied = stake.unapplied_slash.get_or_insert(UnappliedSlash {
        round: tracker.round,
        gain: Uint128::zero(),
        loss: Uint128::zero(),
    });
    unapplied.gain += gain;
    unapplied.loss += loss;
    Ok(())
}

/// Gain and loss of a voter with stake `base` from one resolved tracker
fn tracker_effect(
    storage: &dyn Storage,
    tracker: &SlashTracker,
    voter: &Addr,
    base: Uint128,
) -> StdResult<(Uint128, Uint128)> {
    let vote = REVEALS.may_load(storage, (tracker.request_index, tracker.round, voter))?;
    Ok(match vote {
        Some(vote) if Some(vote.price) == tracker.resolved_price => {
            (correct_vote_gain(tracker, base), Uint128::zero())
        }
        Some(_) => (Uint128::zero(), slash(base, tracker.wrong_vote_slash_per_token)),
        None => (Uint128::zero(), slash(base, tracker.no_vote_slash_per_token)),
    })
}

fn correct_vote_gain(tracker: &SlashTracker, base: Uint128) -> Uint128 {
    if tracker.total_correct_stake.is_zero() {
        return Uint128::zero();
    }
    tracker
        .total_slashed
        .multiply_ratio(base, tracker.total_correct_stake)
}

/// Rounds up, so the losses of a tracker always cover what correct voters are paid
fn slash(base: Uint128, rate: Decimal) -> Uint128 {
    min(base.mul_ceil(rate), base)
}

/// The part of a round's loss paid by the at-risk unstake once gains and active stake are used up
fn loss_from_unstake(active: Uint128, unstake: Uint128, gain: Uint128, loss: Uint128) -> Uint128 {
    min(loss.saturating_sub(active + gain), unstake)
}

fn apply_unapplied_slash(stake: &mut VoterStake) {
    let Some(UnappliedSlash { round, gain, loss }) = stake.unapplied_slash.take() else {
        return;
    };
    let unstake = if stake.unstake_round == round {
        stake.pending_unstake
    } else {
        Uint128::zero()
    };
    let from_unstake = loss_from_unstake(stake.active_stake, unstake, gain, loss);
    stake.active_stake = (stake.active_stake + gain).saturating_sub(loss - from_unstake);
    stake.pending_unstake -= from_unstake;
}

/// Adds what at-risk unstakes pay for a resolved tracker to the active total.
///
/// The slashed unstake ends up in correct voters' active stake but was not part of the
/// active total before.
pub fn credit_at_risk_unstakes(storage: &mut dyn Storage, tracker: &SlashTracker) -> StdResult<()> {
    if tracker.outcome != TrackerOutcome::Resolved {
        return Ok(());
    }
    let entries = AT_RISK_UNSTAKES
        .prefix(tracker.round)
        .range(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    if entries.is_empty() {
        return Ok(());
    }
    let mut totals = STAKE_TOTALS.may_load(storage)?.unwrap_or_default();
    for (voter, mut entry) in entries {
        let before = loss_from_unstake(entry.active, entry.unstake, entry.gain, entry.loss);
        let (gain, loss) = tracker_effect(storage, tracker, &voter, entry.active + entry.unstake)?;
        entry.gain += gain;
        entry.loss += loss;
        let after = loss_from_unstake(entry.active, entry.unstake, entry.gain, entry.loss);
        totals.active = (totals.active + after).checked_sub(before)?;
        AT_RISK_UNSTAKES.save(storage, (tracker.round, &voter), &entry)?;
    }
    STAKE_TOTALS.save(storage, &totals)
}

/// Turns all trackers of a request into tombstones and returns their slots
pub fn tombstone_request(storage: &mut dyn Storage, request_index: u64) -> StdResult<Vec<u64>> {
    let slots = REQUEST_SLOTS
        .prefix(request_index)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<u64>>>()?;
    for slot in &slots {
        let tracker = SLASH_TRACKERS.load(storage, *slot)?;
        let tombstone =
            SlashTracker::without_effect(request_index, tracker.round, TrackerOutcome::Deleted);
        SLASH_TRACKERS.save(storage, *slot, &tombstone)?;
    }
    Ok(slots)
}

/// Stores a jump for every run of consecutive tombstoned slots
pub fn insert_deletion_jumps(storage: &mut dyn Storage, mut slots: Vec<u64>) -> StdResult<()> {
    slots.sort_unstable();
    slots.dedup();
    for (first, last) in consecutive_runs(&slots) {
        DELETED_JUMPS.save(storage, first, &last)?;
    }
    Ok(())
}

/// Splits sorted, distinct values into inclusive ranges of consecutive values
fn consecutive_runs(sorted: &[u64]) -> Vec<(u64, u64)> {
    let mut runs = Vec::new();
    let mut iter = sorted.iter().copied();
    let Some(mut first) = iter.next() else {
        return runs;
    };
    let mut last = first;
    for value in iter {
        if value == last + 1 {
            last = value;
        } else {
            runs.push((first, last));
            first = value;
            last = value;
        }
    }
    runs.push((first, last));
    runs
}
