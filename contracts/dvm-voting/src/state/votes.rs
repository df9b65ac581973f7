use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, HexBinary, Int128, Uint128};
use cw_storage_plus::Map;

use super::TopKey;

#[cw_serde]
pub struct Commitment {
    pub hash: HexBinary,
    /// Opaque payload for the voter to recover their vote. Never interpreted.
    pub encrypted_vote: Option<Binary>,
}

#[cw_serde]
pub struct RevealedVote {
    pub price: Int128,
    pub weight: Uint128,
}

#[cw_serde]
#[derive(Eq)]
pub struct PriceWeight {
    pub price: Int128,
    pub weight: Uint128,
}

/// Revealed weight of one request in one round
#[cw_serde]
#[derive(Default, Eq)]
pub struct VoteTally {
    pub total: Uint128,
    pub prices: Vec<PriceWeight>,
}

impl VoteTally {
    pub fn add(&mut self, price: Int128, weight: Uint128) {
        self.total += weight;
        match self.prices.iter_mut().find(|pw| pw.price == price) {
            Some(existing) => existing.weight += weight,
            None => self.prices.push(PriceWeight { price, weight }),
        }
    }

    pub fn weight_of(&self, price: Int128) -> Uint128 {
        self.prices
            .iter()
            .find(|pw| pw.price == price)
            .map(|pw| pw.weight)
            .unwrap_or_default()
    }

    /// The price with the highest weight if no other price has the same weight
    pub fn mode(&self) -> Option<Int128> {
        let mut best: Option<&PriceWeight> = None;
        let mut tied = false;
        for candidate in &self.prices {
            match best {
                Some(b) if candidate.weight < b.weight => {}
                Some(b) if candidate.weight == b.weight => tied = true,
                _ => {
                    best = Some(candidate);
                    tied = false;
                }
            }
        }
        if tied {
            None
        } else {
            best.map(|b| b.price)
        }
    }
}

/// (request index, round, voter) -> commitment
pub const COMMITMENTS: Map<(u64, u64, &Addr), Commitment> =
    Map::new(TopKey::Commitments.as_str());

/// (request index, round, voter) -> revealed vote
pub const REVEALS: Map<(u64, u64, &Addr), RevealedVote> = Map::new(TopKey::Reveals.as_str());

/// (request index, round) -> tally
pub const TALLIES: Map<(u64, u64), VoteTally> = Map::new(TopKey::Tallies.as_str());

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(i128, u128)]) -> VoteTally {
        let mut tally = VoteTally::default();
        for (price, weight) in entries {
            tally.add(Int128::new(*price), Uint128::new(*weight));
        }
        tally
    }

    #[test]
    fn add_works() {
        let t = tally(&[(1, 10), (2, 5), (1, 7)]);
        assert_eq!(t.total, Uint128::new(22));
        assert_eq!(t.weight_of(Int128::new(1)), Uint128::new(17));
        assert_eq!(t.weight_of(Int128::new(2)), Uint128::new(5));
        assert_eq!(t.weight_of(Int128::new(3)), Uint128::zero());
        assert_eq!(t.prices.len(), 2);
    }

    #[test]
    fn mode_works() {
        assert_eq!(tally(&[]).mode(), None);
        assert_eq!(tally(&[(5, 1)]).mode(), Some(Int128::new(5)));
        assert_eq!(tally(&[(5, 1), (6, 2)]).mode(), Some(Int128::new(6)));
        assert_eq!(tally(&[(5, 3), (6, 2)]).mode(), Some(Int128::new(5)));
        assert_eq!(tally(&[(-5, 3), (6, 2)]).mode(), Some(Int128::new(-5)));

        // Ties
        assert_eq!(tally(&[(5, 2), (6, 2)]).mode(), None);
        assert_eq!(tally(&[(5, 2), (6, 2), (7, 1)]).mode(), None);

        // A tie below the leader does not matter
        assert_eq!(tally(&[(5, 1), (6, 1), (7, 3)]).mode(), Some(Int128::new(7)));
        assert_eq!(tally(&[(7, 3), (5, 1), (6, 1)]).mode(), Some(Int128::new(7)));
    }
}
