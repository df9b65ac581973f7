// Deleting spam requests through a governance vote

use cosmwasm_std::{coin, Decimal, Uint128};
use cw_multi_test::{App, Executor};
use dvm_multitest::{
    addr, commit, first_attr, instantiate_dvm, mint_and_stake, mint_native, query_balance_native,
    request_price, reveal, reveal_start, round_start, set_time, update_trackers, DENOM,
};
use dvm_voting::msg::{
    DeletedRequestJumpResponse, ExecuteMsg, NumberOfSlashTrackersResponse, QueryMsg,
    SlashTrackerResponse, SpamDeletionProposalResponse,
};
use dvm_voting::state::{IndexRange, ProposalStatus, TrackerOutcome};

const ROUND: u64 = 10_000;

#[test]
fn spam_deletion_removes_requests_and_slashes_remaining() {
    let mut app = App::default();
    set_time(&mut app, round_start(ROUND - 1));
    let contract = instantiate_dvm(&mut app, Decimal::percent(5), 0);
    mint_and_stake(&mut app, &contract, "account1", 60_000_000);
    mint_and_stake(&mut app, &contract, "account2", 30_000_000);

    // Requests 0, 1 and 2. The last two are spam.
    let now = round_start(ROUND - 1).plus_seconds(10);
    set_time(&mut app, now);
    for time in [1, 2, 3] {
        request_price(&mut app, &contract, "X", time);
    }

    let proposer = addr(&app, "proposer");
    mint_native(&mut app, &proposer, DENOM, 10_000);
    let res = app
        .execute_contract(
            proposer.clone(),
            contract.clone(),
            &ExecuteMsg::SignalRequestsAsSpamForDeletion {
                ranges: vec![IndexRange { first: 1, last: 2 }],
            },
            &[coin(10_000, DENOM)],
        )
        .unwrap();
    let wasm = res.events.iter().find(|ev| ev.ty == "wasm").unwrap();
    assert_eq!(first_attr(&wasm.attributes, "proposal_id").unwrap(), "0");
    assert_eq!(first_attr(&wasm.attributes, "request_index").unwrap(), "3");
    assert_eq!(query_balance_native(&app, &proposer, DENOM).amount, Uint128::zero());

    // account2 votes on request 0 and approves the deletion. account1 stays silent.
    let spam_identifier = "SpamDeletionProposal 0";
    set_time(&mut app, round_start(ROUND));
    commit(&mut app, &contract, "account2", ROUND, "X", 1, 42069);
    commit(&mut app, &contract, "account2", ROUND, spam_identifier, now.seconds(), 1);
    set_time(&mut app, reveal_start(ROUND));
    reveal(&mut app, &contract, "account2", "X", 1, 42069);
    reveal(&mut app, &contract, "account2", spam_identifier, now.seconds(), 1);

    set_time(&mut app, round_start(ROUND + 1));
    let res: SpamDeletionProposalResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::SpamDeletionProposal { id: 0 })
        .unwrap();
    assert_eq!(res.status, ProposalStatus::Approved);

    app.execute_contract(
        addr(&app, "anyone"),
        contract.clone(),
        &ExecuteMsg::ExecuteSpamDeletion { proposal_id: 0 },
        &[],
    )
    .unwrap();
    assert_eq!(
        query_balance_native(&app, &proposer, DENOM).amount,
        Uint128::new(10_000)
    );

    // Slots: 0 resolved, 1 and 2 deleted, 3 the approved proposal
    let res: NumberOfSlashTrackersResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::NumberOfSlashTrackers {})
        .unwrap();
    assert_eq!(res.count, 4);
    let res: DeletedRequestJumpResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::DeletedRequestJump { index: 1 })
        .unwrap();
    assert_eq!(res.last, Some(2));
    let res: SlashTrackerResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::SlashTracker { index: 1 })
        .unwrap();
    let tracker = res.tracker.unwrap();
    assert_eq!(tracker.outcome, TrackerOutcome::Deleted);
    assert_eq!(tracker.total_correct_stake, Uint128::zero());

    // Two slashes of 0.16% in the same round, both against the 60M
    let account1 = update_trackers(&mut app, &contract, "account1");
    assert_eq!(account1.active_stake, Uint128::new(60_000_000 - 192_000));
    assert_eq!(account1.last_request_index_considered, 4);
    let account2 = update_trackers(&mut app, &contract, "account2");
    assert_eq!(account2.active_stake, Uint128::new(30_000_000 + 192_000));
}

#[test]
fn rejected_proposal_forfeits_bond() {
    let mut app = App::default();
    set_time(&mut app, round_start(ROUND - 1));
    let contract = instantiate_dvm(&mut app, Decimal::percent(5), 0);
    mint_and_stake(&mut app, &contract, "account1", 60_000_000);

    let now = round_start(ROUND - 1).plus_seconds(10);
    set_time(&mut app, now);
    request_price(&mut app, &contract, "X", 1);
    let proposer = addr(&app, "proposer");
    mint_native(&mut app, &proposer, DENOM, 10_000);
    app.execute_contract(
        proposer,
        contract.clone(),
        &ExecuteMsg::SignalRequestsAsSpamForDeletion {
            ranges: vec![IndexRange { first: 0, last: 0 }],
        },
        &[coin(10_000, DENOM)],
    )
    .unwrap();

    set_time(&mut app, round_start(ROUND));
    commit(&mut app, &contract, "account1", ROUND, "SpamDeletionProposal 0", now.seconds(), 0);
    set_time(&mut app, reveal_start(ROUND));
    reveal(&mut app, &contract, "account1", "SpamDeletionProposal 0", now.seconds(), 0);

    set_time(&mut app, round_start(ROUND + 1));
    app.execute_contract(
        addr(&app, "anyone"),
        contract.clone(),
        &ExecuteMsg::ExecuteSpamDeletion { proposal_id: 0 },
        &[],
    )
    .unwrap();
    assert_eq!(
        query_balance_native(&app, &addr(&app, "sink"), DENOM).amount,
        Uint128::new(10_000)
    );
    let res: SpamDeletionProposalResponse = app
        .wrap()
        .query_wasm_smart(&contract, &QueryMsg::SpamDeletionProposal { id: 0 })
        .unwrap();
    assert_eq!(res.status, ProposalStatus::Rejected);
}
