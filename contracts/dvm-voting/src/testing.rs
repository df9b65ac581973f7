//! Helpers shared by the unit tests of this crate

use cosmwasm_std::{Addr, Decimal, Timestamp, Uint128};

use crate::state::Config;

pub const PHASE_LENGTH: u64 = 172_800;
pub const COMMIT_LENGTH: u64 = PHASE_LENGTH / 2;

/// Start of the commit phase of the given round
pub fn round_start(round: u64) -> Timestamp {
    Timestamp::from_seconds(round * PHASE_LENGTH)
}

/// Start of the reveal phase of the given round
pub fn reveal_start(round: u64) -> Timestamp {
    round_start(round).plus_seconds(COMMIT_LENGTH)
}

/// 0.16%
pub fn default_slash_rate() -> Decimal {
    Decimal::from_ratio(16u128, 10_000u128)
}

pub fn test_config() -> Config {
    Config {
        owner: Addr::unchecked("owner"),
        staking_denom: "ustake".to_string(),
        phase_length: PHASE_LENGTH,
        unstake_cooldown: 0,
        min_roll_to_next_round_length: 7200,
        gat_percentage: Decimal::percent(5),
        spam_deletion_bond: Uint128::new(10_000),
        max_ancillary_data_len: 8192,
        wrong_vote_slash_per_token: default_slash_rate(),
        no_vote_slash_per_token: default_slash_rate(),
        sink: Addr::unchecked("sink"),
    }
}
