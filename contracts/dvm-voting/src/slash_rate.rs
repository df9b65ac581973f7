use cosmwasm_std::{Decimal, Uint128};

use crate::state::{Config, RequestClass};

/// Turnout of one request in one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationStats {
    /// Total active stake of the round
    pub total_stake: Uint128,
    pub total_revealed: Uint128,
    /// Revealed weight of the winning price
    pub total_correct: Uint128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashRates {
    pub wrong_vote: Decimal,
    pub no_vote: Decimal,
}

/// Decides how much of a voter's stake is slashed per token for a resolved request.
///
/// The wrong vote rate returned for governance requests is ignored.
pub trait SlashRatePolicy {
    fn rates(&self, class: RequestClass, participation: &ParticipationStats) -> SlashRates;
}

/// Slashes the same share regardless of turnout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSlashRates(pub SlashRates);

impl FixedSlashRates {
    pub fn from_config(config: &Config) -> Self {
        Self(SlashRates {
            wrong_vote: config.wrong_vote_slash_per_token,
            no_vote: config.no_vote_slash_per_token,
        })
    }
}

impl SlashRatePolicy for FixedSlashRates {
    fn rates(&self, _class: RequestClass, _participation: &ParticipationStats) -> SlashRates {
        self.0
    }
}
