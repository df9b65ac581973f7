use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Decimal, Uint128};
use cw_storage_plus::Item;

use super::TopKey;

#[cw_serde]
pub struct Config {
    /// Owner role that may change this config and manage the allow-lists
    pub owner: Addr,
    /// The native denom stakes and spam deletion bonds are paid in
    pub staking_denom: String,
    /// Length of a full voting round in seconds.
    /// The first half of the round is the commit phase, the second half the reveal phase.
    pub phase_length: u64,
    /// Seconds between an unstake request and the point where funds can be withdrawn
    pub unstake_cooldown: u64,
    /// Requests arriving less than this many seconds before the end of the current round
    /// are voted on one round later.
    pub min_roll_to_next_round_length: u64,
    /// Share of the round's total active stake that must reveal for a request to resolve
    pub gat_percentage: Decimal,
    /// Amount of `staking_denom` locked when signalling requests as spam
    pub spam_deletion_bond: Uint128,
    pub max_ancillary_data_len: u32,
    pub wrong_vote_slash_per_token: Decimal,
    pub no_vote_slash_per_token: Decimal,
    /// Receiver of forfeited spam deletion bonds
    pub sink: Addr,
}

pub const CONFIG: Item<Config> = Item::new(TopKey::Config.as_str());

/// The successor contract. Once set, this contract stops accepting state changes.
pub const MIGRATED_TO: Item<Addr> = Item::new(TopKey::MigratedTo.as_str());
