use cosmwasm_std::{Decimal, Event, Int128, Order, StdResult, Storage, Timestamp, Uint128};
use cw_storage_plus::PrefixBound;
use dvm_common::{round_id, vote_phase, VotePhase};

use crate::attributes::{
    ATTR_PRICE, ATTR_REQUEST_INDEX, ATTR_ROUND, EVENT_PRICE_REQUEST_ROLLED, EVENT_PRICE_RESOLVED,
};
use crate::error::ContractError;
use crate::slash_rate::SlashRatePolicy;
use crate::slashing::{credit_at_risk_unstakes, resolved_tracker};
use crate::state::{
    append_tracker, Config, PriceRequest, RequestState, RoundSnapshot, SlashTracker,
    TrackerOutcome, VoteTally, AT_RISK_UNSTAKES, PENDING_REQUESTS, PRICE_REQUESTS, ROUNDS,
    STAKE_TOTALS, TALLIES,
};

/// Takes the snapshot of the current round on its first transaction and freezes the GAT
/// on the first transaction of the reveal phase.
pub fn freeze_round(storage: &mut dyn Storage, config: &Config, now: Timestamp) -> StdResult<()> {
    let current = round_id(now, config.phase_length);
    let mut snapshot = match ROUNDS.may_load(storage, current)? {
        Some(snapshot) => snapshot,
        None => {
            let mut totals = STAKE_TOTALS.may_load(storage)?.unwrap_or_default();
            totals.activate_pending(current);
            STAKE_TOTALS.save(storage, &totals)?;
            RoundSnapshot {
                cumulative_active_stake: totals.active,
                gat_percentage: None,
            }
        }
    };
    if snapshot.gat_percentage.is_none()
        && vote_phase(now, config.phase_length) == VotePhase::Reveal
    {
        snapshot.gat_percentage = Some(config.gat_percentage);
    }
    ROUNDS.save(storage, current, &snapshot)
}

/// Outcome of one request in a round that is over
#[derive(Debug, PartialEq, Eq)]
pub struct ClosedVote {
    pub price: Option<Int128>,
    pub tally: VoteTally,
    pub total_stake: Uint128,
}

pub fn closed_vote(
    storage: &dyn Storage,
    config: &Config,
    request_index: u64,
    round: u64,
) -> StdResult<ClosedVote> {
    let snapshot = ROUNDS.may_load(storage, round)?;
    let total_stake = snapshot
        .as_ref()
        .map(|s| s.cumulative_active_stake)
        .unwrap_or_default();
    let gat = snapshot
        .and_then(|s| s.gat_percentage)
        .unwrap_or(config.gat_percentage);
    let tally = TALLIES
        .may_load(storage, (request_index, round))?
        .unwrap_or_default();
    let price = decide(&tally, total_stake, gat);
    Ok(ClosedVote {
        price,
        tally,
        total_stake,
    })
}

/// A vote resolves if enough stake revealed and a single price got the most weight
pub fn decide(tally: &VoteTally, total_stake: Uint128, gat_percentage: Decimal) -> Option<Int128> {
    if tally.total.is_zero() || tally.total < total_stake.mul_floor(gat_percentage) {
        return None;
    }
    tally.mode()
}

/// Resolves or rolls every pending request whose voting round is over.
/// Each of them appends one slash tracker, in order of (round, request index).
///
/// The current round is frozen afterwards, so its snapshot includes what the closed rounds
/// moved into the active total.
pub fn process_resolvable_requests(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    policy: &dyn SlashRatePolicy,
) -> Result<Vec<Event>, ContractError> {
    let current = round_id(now, config.phase_length);

    let mut closed = PENDING_REQUESTS
        .keys(storage, None, None, Order::Ascending)
        .map(|index| PRICE_REQUESTS.load(storage, index?))
        .filter(|request| {
            request
                .as_ref()
                .map_or(true, |r| r.last_voting_round < current)
        })
        .collect::<StdResult<Vec<PriceRequest>>>()?;
    closed.sort_by_key(|r| (r.last_voting_round, r.index));

    let mut events = Vec::with_capacity(closed.len());
    for mut request in closed {
        let round = request.last_voting_round;
        let vote = closed_vote(storage, config, request.index, round)?;
        match vote.price {
            Some(price) => {
                let tracker =
                    resolved_tracker(&request, round, price, &vote.tally, vote.total_stake, policy);
                append_tracker(storage, &tracker)?;
                credit_at_risk_unstakes(storage, &tracker)?;
                request.state = RequestState::Resolved;
                request.resolved_price = Some(price);
                PENDING_REQUESTS.remove(storage, request.index);
                events.push(
                    Event::new(EVENT_PRICE_RESOLVED)
                        .add_attribute(ATTR_REQUEST_INDEX, request.index.to_string())
                        .add_attribute(ATTR_ROUND, round.to_string())
                        .add_attribute(ATTR_PRICE, price.to_string()),
                );
            }
            None => {
                let tracker =
                    SlashTracker::without_effect(request.index, round, TrackerOutcome::Rolled);
                append_tracker(storage, &tracker)?;
                request.last_voting_round = current;
                request.roll_count += 1;
                events.push(
                    Event::new(EVENT_PRICE_REQUEST_ROLLED)
                        .add_attribute(ATTR_REQUEST_INDEX, request.index.to_string())
                        .add_attribute("from_round", round.to_string())
                        .add_attribute("to_round", current.to_string()),
                );
            }
        }
        PRICE_REQUESTS.save(storage, request.index, &request)?;
    }
    clear_at_risk_unstakes(storage, current)?;
    freeze_round(storage, config, now)?;
    Ok(events)
}

/// Every round before `current` has all its trackers, so its at-risk unstakes are done
fn clear_at_risk_unstakes(storage: &mut dyn Storage, current: u64) -> StdResult<()> {
    let done = AT_RISK_UNSTAKES
        .prefix_range(
            storage,
            None,
            Some(PrefixBound::exclusive(current)),
            Order::Ascending,
        )
        .map(|item| item.map(|(key, _)| key))
        .collect::<StdResult<Vec<_>>>()?;
    for (round, voter) in done {
        AT_RISK_UNSTAKES.remove(storage, (round, &voter));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{project_request, submit_request};
    use crate::slash_rate::FixedSlashRates;
    use crate::state::{
        tracker_count, AtRiskUnstake, RequestClass, StakeTotals, SLASH_TRACKERS,
        SUPPORTED_IDENTIFIERS,
    };
    use crate::testing::{reveal_start, round_start, test_config};
    use cosmwasm_std::{testing::MockStorage, Addr, Binary};

    fn tally(entries: &[(i128, u128)]) -> VoteTally {
        let mut tally = VoteTally::default();
        for (price, weight) in entries {
            tally.add(Int128::new(*price), Uint128::new(*weight));
        }
        tally
    }

    #[test]
    fn decide_works() {
        let gat = Decimal::percent(5);
        let total = Uint128::new(100_000_000);

        // Nothing revealed
        assert_eq!(decide(&VoteTally::default(), total, gat), None);
        // Nothing revealed and nothing staked
        assert_eq!(decide(&VoteTally::default(), Uint128::zero(), gat), None);
        // Below GAT
        assert_eq!(decide(&tally(&[(1, 4_000_000)]), total, gat), None);
        assert_eq!(
            decide(&tally(&[(1, 4_000_000)]), total, Decimal::percent(3)),
            Some(Int128::new(1))
        );
        // Exactly GAT
        assert_eq!(
            decide(&tally(&[(1, 5_000_000)]), total, gat),
            Some(Int128::new(1))
        );
        // Tie
        assert_eq!(
            decide(&tally(&[(1, 30_000_000), (2, 30_000_000)]), total, gat),
            None
        );
        // Plurality is enough
        assert_eq!(
            decide(
                &tally(&[(1, 30_000_000), (2, 20_000_000), (3, 20_000_000)]),
                total,
                gat
            ),
            Some(Int128::new(1))
        );
    }

    #[test]
    fn closed_vote_works() {
        let mut storage = MockStorage::default();
        let config = test_config();
        ROUNDS
            .save(
                &mut storage,
                4,
                &RoundSnapshot {
                    cumulative_active_stake: Uint128::new(100_000_000),
                    gat_percentage: Some(Decimal::percent(50)),
                },
            )
            .unwrap();
        TALLIES
            .save(&mut storage, (0, 4), &tally(&[(8, 40_000_000)]))
            .unwrap();

        // The frozen 50% applies, not the configured 5%
        assert_eq!(
            closed_vote(&storage, &config, 0, 4).unwrap(),
            ClosedVote {
                price: None,
                tally: tally(&[(8, 40_000_000)]),
                total_stake: Uint128::new(100_000_000),
            }
        );
        // Without snapshot and votes
        assert_eq!(
            closed_vote(&storage, &config, 1, 5).unwrap(),
            ClosedVote {
                price: None,
                tally: VoteTally::default(),
                total_stake: Uint128::zero(),
            }
        );
    }

    #[test]
    fn freeze_round_works() {
        let mut storage = MockStorage::default();
        let config = test_config();
        STAKE_TOTALS
            .save(
                &mut storage,
                &StakeTotals {
                    active: Uint128::new(100),
                    pending: Uint128::new(50),
                    pending_round: 8,
                },
            )
            .unwrap();

        freeze_round(&mut storage, &config, round_start(7)).unwrap();
        let snapshot = ROUNDS.load(&storage, 7).unwrap();
        assert_eq!(snapshot.cumulative_active_stake, Uint128::new(100));
        assert_eq!(snapshot.gat_percentage, None);

        // Snapshot does not change within the round
        STAKE_TOTALS
            .update(&mut storage, |mut t| -> StdResult<_> {
                t.active += Uint128::new(1);
                Ok(t)
            })
            .unwrap();
        freeze_round(&mut storage, &config, reveal_start(7)).unwrap();
        let snapshot = ROUNDS.load(&storage, 7).unwrap();
        assert_eq!(snapshot.cumulative_active_stake, Uint128::new(100));
        assert_eq!(snapshot.gat_percentage, Some(Decimal::percent(5)));

        // Changing the GAT later does not affect the frozen value
        let changed = Config {
            gat_percentage: Decimal::percent(50),
            ..config.clone()
        };
        freeze_round(&mut storage, &changed, reveal_start(7).plus_seconds(10)).unwrap();
        let snapshot = ROUNDS.load(&storage, 7).unwrap();
        assert_eq!(snapshot.gat_percentage, Some(Decimal::percent(5)));

        // Pending stake becomes part of the next snapshot
        freeze_round(&mut storage, &config, round_start(8)).unwrap();
        let snapshot = ROUNDS.load(&storage, 8).unwrap();
        assert_eq!(snapshot.cumulative_active_stake, Uint128::new(151));
    }

    fn setup_request(storage: &mut MockStorage, config: &Config) -> u64 {
        SUPPORTED_IDENTIFIERS.save(storage, "ETH/USD", &()).unwrap();
        let submission = submit_request(
            storage,
            config,
            round_start(9),
            "ETH/USD".to_string(),
            1000,
            Binary::default(),
            RequestClass::Standard,
        )
        .unwrap();
        assert_eq!(submission.voting_round, 10);
        submission.index
    }

    #[test]
    fn process_resolvable_requests_rolls_and_resolves() {
        let mut storage = MockStorage::default();
        let config = test_config();
        let policy = FixedSlashRates::from_config(&config);
        STAKE_TOTALS
            .save(
                &mut storage,
                &StakeTotals {
                    active: Uint128::new(100_000_000),
                    ..StakeTotals::default()
                },
            )
            .unwrap();
        let index = setup_request(&mut storage, &config);

        // Nothing to do while the round is running
        let events =
            process_resolvable_requests(&mut storage, &config, reveal_start(10), &policy).unwrap();
        assert!(events.is_empty());

        // Nobody voted in round 10, so the request moves to round 12 where we are now
        let events =
            process_resolvable_requests(&mut storage, &config, round_start(12), &policy).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ty, EVENT_PRICE_REQUEST_ROLLED);
        let request = PRICE_REQUESTS.load(&storage, index).unwrap();
        assert_eq!(request.last_voting_round, 12);
        assert_eq!(request.roll_count, 1);
        assert_eq!(tracker_count(&storage).unwrap(), 1);
        assert_eq!(
            SLASH_TRACKERS.load(&storage, 0).unwrap(),
            SlashTracker::without_effect(index, 10, TrackerOutcome::Rolled)
        );

        TALLIES
            .save(&mut storage, (index, 12), &tally(&[(123, 60_000_000)]))
            .unwrap();
        let now = round_start(13);
        // Queries see the outcome before it is stored
        let projected = project_request(&storage, &config, &request, now).unwrap();
        assert_eq!(projected.state, RequestState::Resolved);
        assert_eq!(projected.resolved_price, Some(Int128::new(123)));

        let events = process_resolvable_requests(&mut storage, &config, now, &policy).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].ty, EVENT_PRICE_RESOLVED);
        let request = PRICE_REQUESTS.load(&storage, index).unwrap();
        assert_eq!(request.state, RequestState::Resolved);
        assert_eq!(request.resolved_price, Some(Int128::new(123)));
        assert!(!PENDING_REQUESTS.has(&storage, index));

        let tracker = SLASH_TRACKERS.load(&storage, 1).unwrap();
        assert_eq!(tracker.round, 12);
        assert_eq!(tracker.outcome, TrackerOutcome::Resolved);
        assert_eq!(tracker.total_correct_stake, Uint128::new(60_000_000));
        // 40M did not vote
        assert_eq!(tracker.total_slashed, Uint128::new(64_000));

        // Processed once only
        let events =
            process_resolvable_requests(&mut storage, &config, round_start(14), &policy).unwrap();
        assert!(events.is_empty());
        assert_eq!(tracker_count(&storage).unwrap(), 2);
    }

    #[test]
    fn process_resolvable_requests_uses_frozen_gat() {
        let mut storage = MockStorage::default();
        let config = test_config();
        let policy = FixedSlashRates::from_config(&config);
        STAKE_TOTALS
            .save(
                &mut storage,
                &StakeTotals {
                    active: Uint128::new(100_000_000),
                    ..StakeTotals::default()
                },
            )
            .unwrap();
        let index = setup_request(&mut storage, &config);
        TALLIES
            .save(&mut storage, (index, 10), &tally(&[(1, 4_000_000)]))
            .unwrap();

        // GAT is frozen at 5% in the reveal phase, lowering it afterwards does not help
        freeze_round(&mut storage, &config, reveal_start(10)).unwrap();
        let lowered = Config {
            gat_percentage: Decimal::percent(3),
            ..config
        };
        process_resolvable_requests(&mut storage, &lowered, round_start(11), &policy).unwrap();
        let request = PRICE_REQUESTS.load(&storage, index).unwrap();
        assert_eq!(request.state, RequestState::Pending);
        assert_eq!(request.last_voting_round, 11);

        // In round 11 the lowered GAT applies
        TALLIES
            .save(&mut storage, (index, 11), &tally(&[(1, 4_000_000)]))
            .unwrap();
        process_resolvable_requests(&mut storage, &lowered, round_start(12), &policy).unwrap();
        let request = PRICE_REQUESTS.load(&storage, index).unwrap();
        assert_eq!(request.state, RequestState::Resolved);
    }

    #[test]
    fn process_resolvable_requests_credits_at_risk_unstakes() {
        let mut storage = MockStorage::default();
        let config = test_config();
        let policy = FixedSlashRates::from_config(&config);
        STAKE_TOTALS
            .save(
                &mut storage,
                &StakeTotals {
                    active: Uint128::new(90_000_000),
                    ..StakeTotals::default()
                },
            )
            .unwrap();
        let index = setup_request(&mut storage, &config);
        // Requested all 10M for unstaking in round 10 and did not vote
        let leaver = Addr::unchecked("leaver");
        AT_RISK_UNSTAKES
            .save(
                &mut storage,
                (10, &leaver),
                &AtRiskUnstake {
                    unstake: Uint128::new(10_000_000),
                    ..AtRiskUnstake::default()
                },
            )
            .unwrap();
        ROUNDS
            .save(
                &mut storage,
                10,
                &RoundSnapshot {
                    cumulative_active_stake: Uint128::new(100_000_000),
                    gat_percentage: Some(config.gat_percentage),
                },
            )
            .unwrap();
        TALLIES
            .save(&mut storage, (index, 10), &tally(&[(123, 60_000_000)]))
            .unwrap();

        process_resolvable_requests(&mut storage, &config, round_start(11), &policy).unwrap();
        // 0.16% of 10M went from the unstake to the correct voters
        assert_eq!(
            STAKE_TOTALS.load(&storage).unwrap().active,
            Uint128::new(90_016_000)
        );
        assert_eq!(
            ROUNDS.load(&storage, 11).unwrap().cumulative_active_stake,
            Uint128::new(90_016_000)
        );
        assert!(!AT_RISK_UNSTAKES.has(&storage, (10, &leaver)));
    }
}
