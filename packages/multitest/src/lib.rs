// Testing utils. See tests folder for actual tests.

use cosmwasm_std::{
    coin, from_json, to_json_binary, Addr, Attribute, BalanceResponse, BankQuery, Coin, Decimal,
    HexBinary, Int128, Querier, QueryRequest, Timestamp, Uint128,
};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};
use dvm_common::compute_vote_hash;
use dvm_voting::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, VoterStakeResponse};
use dvm_voting::state::VoterStake;

pub const DENOM: &str = "ustake";
pub const PHASE_LENGTH: u64 = 172_800;
pub const OWNER: &str = "owner";
pub const REQUESTER: &str = "requester";
pub const SINK: &str = "sink";
/// Salt used for all votes of the tests
pub const SALT: i128 = 1234567;

/// The valid address of a test account
pub fn addr(app: &App, name: &str) -> Addr {
    app.api().addr_make(name)
}

/// Gets the value of the first attribute with the given key
pub fn first_attr(data: impl AsRef<[Attribute]>, search_key: &str) -> Option<String> {
    data.as_ref().iter().find_map(|a| {
        if a.key == search_key {
            Some(a.value.clone())
        } else {
            None
        }
    })
}

pub fn query_balance_native(app: &App, address: &Addr, denom: &str) -> Coin {
    let req: QueryRequest<BankQuery> = QueryRequest::Bank(BankQuery::Balance {
        address: address.to_string(),
        denom: denom.to_string(),
    });
    let res = app.raw_query(&to_json_binary(&req).unwrap()).unwrap().unwrap();
    let balance: BalanceResponse = from_json(res).unwrap();

    balance.amount
}

pub fn mint_native(
    app: &mut App,
    beneficiary: impl Into<String>,
    denom: impl Into<String>,
    amount: u128,
) {
    app.sudo(cw_multi_test::SudoMsg::Bank(
        cw_multi_test::BankSudo::Mint {
            to_address: beneficiary.into(),
            amount: vec![Coin::new(amount, denom)],
        },
    ))
    .unwrap();
}

/// Start of the commit phase of the given round
pub fn round_start(round: u64) -> Timestamp {
    Timestamp::from_seconds(round * PHASE_LENGTH)
}

/// Start of the reveal phase of the given round
pub fn reveal_start(round: u64) -> Timestamp {
    round_start(round).plus_seconds(PHASE_LENGTH / 2)
}

pub fn set_time(app: &mut App, time: Timestamp) {
    app.update_block(|block| block.time = time);
}

/// Stores and instantiates the voting contract. `REQUESTER` is registered
/// and the identifier "X" is supported.
pub fn instantiate_dvm(app: &mut App, gat_percentage: Decimal, unstake_cooldown: u64) -> Addr {
    let code = ContractWrapper::new(
        dvm_voting::contract::execute,
        dvm_voting::contract::instantiate,
        dvm_voting::contract::query,
    );
    let code_id = app.store_code(Box::new(code));
    let owner = addr(app, OWNER);
    let contract = app
        .instantiate_contract(
            code_id,
            owner.clone(),
            &InstantiateMsg {
                owner: owner.to_string(),
                staking_denom: DENOM.to_string(),
                phase_length: PHASE_LENGTH,
                unstake_cooldown,
                min_roll_to_next_round_length: 7200,
                gat_percentage,
                spam_deletion_bond: Uint128::new(10_000),
                max_ancillary_data_len: None,
                wrong_vote_slash_per_token: None,
                no_vote_slash_per_token: None,
                sink: addr(app, SINK).to_string(),
            },
            &[],
            "DVM",
            None,
        )
        .unwrap();
    app.execute_contract(
        owner.clone(),
        contract.clone(),
        &ExecuteMsg::UpdateRequesters {
            add: vec![addr(app, REQUESTER).to_string()],
            remove: vec![],
        },
        &[],
    )
    .unwrap();
    app.execute_contract(
        owner,
        contract.clone(),
        &ExecuteMsg::UpdateSupportedIdentifiers {
            add: vec!["X".to_string()],
            remove: vec![],
        },
        &[],
    )
    .unwrap();
    contract
}

/// Mints `amount` for the voter and stakes all of it
pub fn mint_and_stake(app: &mut App, contract: &Addr, voter: &str, amount: u128) {
    let voter = addr(app, voter);
    mint_native(app, &voter, DENOM, amount);
    app.execute_contract(
        voter,
        contract.clone(),
        &ExecuteMsg::Stake {},
        &[coin(amount, DENOM)],
    )
    .unwrap();
}

pub fn request_price(app: &mut App, contract: &Addr, identifier: &str, time: u64) -> AppResponse {
    app.execute_contract(
        addr(app, REQUESTER),
        contract.clone(),
        &ExecuteMsg::RequestPrice {
            identifier: identifier.to_string(),
            time,
            ancillary_data: None,
        },
        &[],
    )
    .unwrap()
}

/// Commits a vote for `voter` in `round`. The block time must be in the commit phase.
pub fn commit(
    app: &mut App,
    contract: &Addr,
    voter: &str,
    round: u64,
    identifier: &str,
    time: u64,
    price: i128,
) {
    let voter = addr(app, voter);
    let hash: HexBinary = compute_vote_hash(
        Int128::new(price),
        Int128::new(SALT),
        voter.as_str(),
        round,
        identifier,
        time,
        b"",
    );
    app.execute_contract(
        voter,
        contract.clone(),
        &ExecuteMsg::CommitVote {
            identifier: identifier.to_string(),
            time,
            ancillary_data: None,
            hash,
            encrypted_vote: None,
        },
        &[],
    )
    .unwrap();
}

/// Reveals a vote committed with [`commit`]. The block time must be in the reveal phase.
pub fn reveal(
    app: &mut App,
    contract: &Addr,
    voter: &str,
    identifier: &str,
    time: u64,
    price: i128,
) -> AppResponse {
    app.execute_contract(
        addr(app, voter),
        contract.clone(),
        &ExecuteMsg::RevealVote {
            identifier: identifier.to_string(),
            time,
            ancillary_data: None,
            price: Int128::new(price),
            salt: Int128::new(SALT),
        },
        &[],
    )
    .unwrap()
}

/// Applies all slash trackers and returns the resulting stake
pub fn update_trackers(app: &mut App, contract: &Addr, voter: &str) -> VoterStake {
    app.execute_contract(
        addr(app, "anyone"),
        contract.clone(),
        &ExecuteMsg::UpdateTrackers {
            voter: addr(app, voter).to_string(),
        },
        &[],
    )
    .unwrap();
    query_stake(app, contract, voter)
}

pub fn query_stake(app: &App, contract: &Addr, voter: &str) -> VoterStake {
    let res: VoterStakeResponse = app
        .wrap()
        .query_wasm_smart(
            contract,
            &QueryMsg::VoterStake {
                address: addr(app, voter).to_string(),
            },
        )
        .unwrap();
    res.stake
}
