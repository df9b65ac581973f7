use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Decimal, Uint128};
use cw_storage_plus::Map;

use super::TopKey;

#[cw_serde]
pub struct RoundSnapshot {
    /// Total active stake at the beginning of the round
    pub cumulative_active_stake: Uint128,
    /// The GAT percentage in effect when the reveal phase of the round started.
    /// Unset as long as no transaction happened in the reveal phase.
    pub gat_percentage: Option<Decimal>,
}

/// Round ID -> snapshot
pub const ROUNDS: Map<u64, RoundSnapshot> = Map::new(TopKey::Rounds.as_str());
