use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

use super::TopKey;

#[cw_serde]
#[derive(Default)]
pub struct VoterStake {
    /// Stake that votes and is subject to slashing
    pub active_stake: Uint128,
    /// Deposited stake waiting for the next round boundary
    pub pending_stake: Uint128,
    /// The round in which `pending_stake` becomes active
    pub pending_stake_round: u64,
    /// Stake on its way out. Still at risk in the round it was requested in.
    pub pending_unstake: Uint128,
    pub unstake_request_time: u64,
    /// Earliest time at which the pending unstake can be executed
    pub unstake_unlock_time: u64,
    /// The round in which the pending unstake was requested
    pub unstake_round: u64,
    /// Sum of all deposits ever made
    pub cumulative_staked: Uint128,
    /// Number of slash tracker entries applied to this stake so far.
    /// This is the index of the next entry to apply.
    pub last_request_index_considered: u64,
    pub unapplied_slash: Option<UnappliedSlash>,
}

impl VoterStake {
    /// True if nothing is staked and nothing is on its way in or out
    pub fn is_empty(&self) -> bool {
        self.active_stake.is_zero()
            && self.pending_stake.is_zero()
            && self.pending_unstake.is_zero()
            && self.unapplied_slash.is_none()
    }

    /// Stake that votes in and is slashed for the given round
    pub fn at_risk(&self, round: u64) -> Uint128 {
        if self.unstake_round == round {
            self.active_stake + self.pending_unstake
        } else {
            self.active_stake
        }
    }

    /// Moves pending stake to active stake once its round is reached
    pub fn activate_pending(&mut self, round: u64) {
        if !self.pending_stake.is_zero() && self.pending_stake_round <= round {
            self.active_stake += self.pending_stake;
            self.pending_stake = Uint128::zero();
        }
    }
}

/// Gains and losses of a partially replayed round. All entries of one round are computed
/// against the stake at the start of that round, so the sum is only applied once the round is left.
#[cw_serde]
pub struct UnappliedSlash {
    pub round: u64,
    pub gain: Uint128,
    pub loss: Uint128,
}

pub const VOTER_STAKES: Map<&Addr, VoterStake> = Map::new(TopKey::VoterStakes.as_str());

/// Stake of a voter who requested an unstake in a round with requests, together with the
/// gains and losses of that round's trackers created so far
#[cw_serde]
#[derive(Default)]
pub struct AtRiskUnstake {
    pub active: Uint128,
    pub unstake: Uint128,
    pub gain: Uint128,
    pub loss: Uint128,
}

/// Keyed by (round, voter). Entries of closed rounds are removed once their trackers exist.
pub const AT_RISK_UNSTAKES: Map<(u64, &Addr), AtRiskUnstake> =
    Map::new(TopKey::AtRiskUnstakes.as_str());

/// Aggregate over all voters, assuming every voter's slash trackers are fully applied
#[cw_serde]
#[derive(Default)]
pub struct StakeTotals {
    pub active: Uint128,
    pub pending: Uint128,
    pub pending_round: u64,
}

impl StakeTotals {
    pub fn activate_pending(&mut self, round: u64) {
        if !self.pending.is_zero() && self.pending_round <= round {
            self.active += self.pending;
            self.pending = Uint128::zero();
        }
    }
}

pub const STAKE_TOTALS: Item<StakeTotals> = Item::new(TopKey::StakeTotals.as_str());
