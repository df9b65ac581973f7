use cosmwasm_std::{
    ensure_eq, entry_point, to_json_binary, Addr, BankMsg, Binary, Coin, Decimal, Deps, DepsMut,
    Empty, Env, Event, Int128, MessageInfo, Order, QueryResponse, Response, StdResult, Uint128,
};
use cw_storage_plus::Bound;
use dvm_common::{round_end_time, round_id, vote_phase};

use crate::attributes::{
    ATTR_ACTION, ATTR_AMOUNT, ATTR_LAST_REQUEST_INDEX_CONSIDERED, ATTR_PRICE, ATTR_PROPOSAL_ID,
    ATTR_REQUEST_INDEX, ATTR_ROUND, ATTR_VOTER, ATTR_WEIGHT, EVENT_PRICE_REQUEST_ADDED,
    EVENT_VOTE_COMMITTED, EVENT_VOTE_REVEALED,
};
use crate::commit_reveal::{commit_vote, reveal_vote};
use crate::delegation::{set_delegate, set_delegator, voter_for};
use crate::error::ContractError;
use crate::funds::{must_pay, must_pay_exactly, nonpayable};
use crate::msg::{
    CommitParams, CommitmentResponse, ConfigResponse, CurrentRoundResponse,
    DeletedRequestJumpResponse, DelegationResponse, ExecuteMsg, HasPriceResponse,
    InstantiateMsg, IsIdentifierSupportedResponse, MigratedResponse,
    NumberOfPriceRequestsResponse, NumberOfSlashTrackersResponse, PendingRequest,
    PendingRequestsResponse, PriceRequestResponse, PriceRequestStatusesResponse, PriceResponse,
    QueryMsg, RequestKey, RequestStatus, RequestStatusEntry, RequestersResponse, RevealParams,
    RoundResponse, SlashTrackerResponse, SlashTrackersResponse, SpamDeletionProposalResponse,
    SupportedIdentifiersResponse, VoterStakeResponse,
};
use crate::requests::{
    active_requests, find_request, project_request, request_status, resolved_price,
    submit_request, Submission,
};
use crate::resolution::process_resolvable_requests;
use crate::slash_rate::FixedSlashRates;
use crate::slashing::update_trackers;
use crate::spam::{derived_status, execute_spam_deletion, is_marked_for_deletion, signal_spam};
use crate::stakes::{execute_unstake, load_synced, request_unstake, stake};
use crate::state::{
    request_count, tracker_count, Config, IndexRange, RequestClass, COMMITMENTS, CONFIG,
    DELEGATES, DELEGATORS, DELETED_JUMPS, MIGRATED_TO, PRICE_REQUESTS, REQUESTERS, ROUNDS,
    SLASH_TRACKERS, SPAM_PROPOSALS, SUPPORTED_IDENTIFIERS, VOTER_STAKES,
};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_MAX_ANCILLARY_DATA_LEN: u32 = 8192;

/// 0.16% per round
fn default_slash_per_token() -> Decimal {
    Decimal::from_ratio(16u128, 10_000u128)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let InstantiateMsg {
        owner,
        staking_denom,
        phase_length,
        unstake_cooldown,
        min_roll_to_next_round_length,
        gat_percentage,
        spam_deletion_bond,
        max_ancillary_data_len,
        wrong_vote_slash_per_token,
        no_vote_slash_per_token,
        sink,
    } = msg;

    let config = Config {
        owner: deps.api.addr_validate(&owner)?,
        staking_denom,
        phase_length,
        unstake_cooldown,
        min_roll_to_next_round_length,
        gat_percentage,
        spam_deletion_bond,
        max_ancillary_data_len: max_ancillary_data_len.unwrap_or(DEFAULT_MAX_ANCILLARY_DATA_LEN),
        wrong_vote_slash_per_token: wrong_vote_slash_per_token
            .unwrap_or_else(default_slash_per_token),
        no_vote_slash_per_token: no_vote_slash_per_token.unwrap_or_else(default_slash_per_token),
        sink: deps.api.addr_validate(&sink)?,
    };
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;
    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute(ATTR_ACTION, "instantiate"))
}

fn validate_config(config: &Config) -> Result<(), ContractError> {
    if config.gat_percentage > Decimal::one() {
        return Err(ContractError::InvalidGat);
    }
    if config.phase_length < 2 {
        return Err(ContractError::InvalidPhaseLength);
    }
    if config.wrong_vote_slash_per_token > Decimal::one()
        || config.no_vote_slash_per_token > Decimal::one()
    {
        return Err(ContractError::InvalidSlashRate);
    }
    Ok(())
}

// No state changes expected within the 0.1 series
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: Empty) -> StdResult<Response> {
    cw2::set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::default())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    if let Some(successor) = MIGRATED_TO.may_load(deps.storage)? {
        return Err(ContractError::Migrated { successor });
    }
    match msg {
        ExecuteMsg::Stake {} | ExecuteMsg::SignalRequestsAsSpamForDeletion { .. } => {}
        _ => nonpayable(&info.funds)?,
    }

    // Everything below sees closed rounds resolved or rolled
    let config = CONFIG.load(deps.storage)?;
    let policy = FixedSlashRates::from_config(&config);
    let events = process_resolvable_requests(deps.storage, &config, env.block.time, &policy)?;

    let response = match msg {
        ExecuteMsg::RequestPrice {
            identifier,
            time,
            ancillary_data,
        } => execute_request_price(deps, env, info, config, identifier, time, ancillary_data),
        ExecuteMsg::RequestGovernanceAction {
            identifier,
            time,
            ancillary_data,
        } => execute_request_governance_action(
            deps,
            env,
            info,
            config,
            identifier,
            time,
            ancillary_data,
        ),
        ExecuteMsg::CommitVote {
            identifier,
            time,
            ancillary_data,
            hash,
            encrypted_vote,
        } => execute_commit(
            deps,
            env,
            info,
            config,
            vec![CommitParams {
                identifier,
                time,
                ancillary_data,
                hash,
                encrypted_vote,
            }],
            "commit_vote",
        ),
        ExecuteMsg::BatchCommit { commits } => {
            execute_commit(deps, env, info, config, commits, "batch_commit")
        }
        ExecuteMsg::RevealVote {
            identifier,
            time,
            ancillary_data,
            price,
            salt,
        } => execute_reveal(
            deps,
            env,
            info,
            config,
            vec![RevealParams {
                identifier,
                time,
                ancillary_data,
                price,
                salt,
            }],
            "reveal_vote",
        ),
        ExecuteMsg::BatchReveal { reveals } => {
            execute_reveal(deps, env, info, config, reveals, "batch_reveal")
        }
        ExecuteMsg::Stake {} => execute_stake(deps, env, info, config),
        ExecuteMsg::RequestUnstake { amount } => {
            execute_request_unstake(deps, env, info, config, amount)
        }
        ExecuteMsg::ExecuteUnstake {} => execute_execute_unstake(deps, env, info, config),
        ExecuteMsg::UpdateTrackers { voter } => {
            execute_update_trackers(deps, env, config, voter, None)
        }
        ExecuteMsg::UpdateTrackersRange { voter, to_index } => {
            execute_update_trackers(deps, env, config, voter, Some(to_index))
        }
        ExecuteMsg::ProcessResolvableRequests {} => {
            Ok(Response::new().add_attribute(ATTR_ACTION, "process_resolvable_requests"))
        }
        ExecuteMsg::SignalRequestsAsSpamForDeletion { ranges } => {
            execute_signal_spam(deps, env, info, config, ranges)
        }
        ExecuteMsg::ExecuteSpamDeletion { proposal_id } => {
            execute_execute_spam_deletion(deps, env, config, proposal_id)
        }
        ExecuteMsg::SetDelegate { delegate } => execute_set_delegate(deps, info, delegate),
        ExecuteMsg::SetDelegator { delegator } => execute_set_delegator(deps, info, delegator),
        ExecuteMsg::UpdateRequesters { add, remove } => {
            execute_update_requesters(deps, info, config, add, remove)
        }
        ExecuteMsg::UpdateSupportedIdentifiers { add, remove } => {
            execute_update_supported_identifiers(deps, info, config, add, remove)
        }
        ExecuteMsg::SetConfig {
            owner,
            phase_length,
            unstake_cooldown,
            min_roll_to_next_round_length,
            gat_percentage,
            spam_deletion_bond,
            max_ancillary_data_len,
            wrong_vote_slash_per_token,
            no_vote_slash_per_token,
            sink,
        } => execute_set_config(
            deps,
            info,
            config,
            ConfigUpdate {
                owner,
                phase_length,
                unstake_cooldown,
                min_roll_to_next_round_length,
                gat_percentage,
                spam_deletion_bond,
                max_ancillary_data_len,
                wrong_vote_slash_per_token,
                no_vote_slash_per_token,
                sink,
            },
        ),
        ExecuteMsg::SetMigrated { successor } => {
            execute_set_migrated(deps, info, config, successor)
        }
    }?;
    Ok(response.add_events(events))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<QueryResponse, ContractError> {
    let response = match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?)?,
        QueryMsg::CurrentRound {} => to_json_binary(&query_current_round(deps, env)?)?,
        QueryMsg::Round { round_id } => to_json_binary(&query_round(deps, round_id)?)?,
        QueryMsg::PendingRequests {} => to_json_binary(&query_pending_requests(deps, env)?)?,
        QueryMsg::PriceRequestStatuses { requests } => {
            to_json_binary(&query_price_request_statuses(deps, env, requests)?)?
        }
        QueryMsg::PriceRequest { index } => {
            to_json_binary(&query_price_request(deps, env, index)?)?
        }
        QueryMsg::NumberOfPriceRequests {} => to_json_binary(&NumberOfPriceRequestsResponse {
            count: request_count(deps.storage)?,
        })?,
        QueryMsg::HasPrice {
            requester,
            identifier,
            time,
            ancillary_data,
        } => to_json_binary(&query_has_price(
            deps,
            env,
            requester,
            identifier,
            time,
            ancillary_data,
        )?)?,
        QueryMsg::Price {
            requester,
            identifier,
            time,
            ancillary_data,
        } => to_json_binary(&query_price(
            deps,
            env,
            requester,
            identifier,
            time,
            ancillary_data,
        )?)?,
        QueryMsg::Commitment {
            voter,
            request_index,
            round,
        } => to_json_binary(&query_commitment(deps, voter, request_index, round)?)?,
        QueryMsg::VoterStake { address } => to_json_binary(&query_voter_stake(deps, address)?)?,
        QueryMsg::SlashTracker { index } => to_json_binary(&SlashTrackerResponse {
            tracker: SLASH_TRACKERS.may_load(deps.storage, index)?,
        })?,
        QueryMsg::SlashTrackers { start_after, limit } => {
            to_json_binary(&query_slash_trackers(deps, start_after, limit)?)?
        }
        QueryMsg::NumberOfSlashTrackers {} => to_json_binary(&NumberOfSlashTrackersResponse {
            count: tracker_count(deps.storage)?,
        })?,
        QueryMsg::DeletedRequestJump { index } => to_json_binary(&DeletedRequestJumpResponse {
            last: DELETED_JUMPS.may_load(deps.storage, index)?,
        })?,
        QueryMsg::SpamDeletionProposal { id } => {
            to_json_binary(&query_spam_deletion_proposal(deps, env, id)?)?
        }
        QueryMsg::Requesters {} => to_json_binary(&query_requesters(deps)?)?,
        QueryMsg::SupportedIdentifiers {} => {
            to_json_binary(&query_supported_identifiers(deps)?)?
        }
        QueryMsg::IsIdentifierSupported { identifier } => {
            to_json_binary(&IsIdentifierSupportedResponse {
                supported: SUPPORTED_IDENTIFIERS.has(deps.storage, &identifier),
            })?
        }
        QueryMsg::Delegation { address } => to_json_binary(&query_delegation(deps, address)?)?,
        QueryMsg::Migrated {} => to_json_binary(&MigratedResponse {
            successor: MIGRATED_TO.may_load(deps.storage)?,
        })?,
    };
    Ok(response)
}

//
// Execute
//

fn submitted_response(action: &str, submission: &Submission, identifier: &str, time: u64) -> Response {
    let mut response = Response::new()
        .add_attribute(ATTR_ACTION, action)
        .add_attribute(ATTR_REQUEST_INDEX, submission.index.to_string())
        .add_attribute(ATTR_ROUND, submission.voting_round.to_string());
    if submission.created {
        response = response.add_event(
            Event::new(EVENT_PRICE_REQUEST_ADDED)
                .add_attribute(ATTR_REQUEST_INDEX, submission.index.to_string())
                .add_attribute(ATTR_ROUND, submission.voting_round.to_string())
                .add_attribute("identifier", identifier)
                .add_attribute("time", time.to_string()),
        );
    }
    response
}

fn execute_request_price(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    identifier: String,
    time: u64,
    ancillary_data: Option<Binary>,
) -> Result<Response, ContractError> {
    if !REQUESTERS.has(deps.storage, &info.sender) {
        return Err(ContractError::UnauthorizedRequester);
    }
    let submission = submit_request(
        deps.storage,
        &config,
        env.block.time,
        identifier.clone(),
        time,
        ancillary_data.unwrap_or_default(),
        RequestClass::Standard,
    )?;
    Ok(submitted_response("request_price", &submission, &identifier, time))
}

fn execute_request_governance_action(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    identifier: String,
    time: u64,
    ancillary_data: Option<Binary>,
) -> Result<Response, ContractError> {
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);
    let submission = submit_request(
        deps.storage,
        &config,
        env.block.time,
        identifier.clone(),
        time,
        ancillary_data.unwrap_or_default(),
        RequestClass::Governance,
    )?;
    Ok(submitted_response(
        "request_governance_action",
        &submission,
        &identifier,
        time,
    ))
}

fn execute_commit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    commits: Vec<CommitParams>,
    action: &str,
) -> Result<Response, ContractError> {
    let voter = voter_for(deps.storage, &info.sender)?;
    let mut response = Response::new()
        .add_attribute(ATTR_ACTION, action)
        .add_attribute(ATTR_VOTER, voter.as_str());
    for commit in commits {
        let CommitParams {
            identifier,
            time,
            ancillary_data,
            hash,
            encrypted_vote,
        } = commit;
        let (index, round) = commit_vote(
            deps.storage,
            &config,
            env.block.time,
            &voter,
            &identifier,
            time,
            &ancillary_data.unwrap_or_default(),
            hash,
            encrypted_vote.clone(),
        )?;
        let mut event = Event::new(EVENT_VOTE_COMMITTED)
            .add_attribute(ATTR_VOTER, voter.as_str())
            .add_attribute(ATTR_REQUEST_INDEX, index.to_string())
            .add_attribute(ATTR_ROUND, round.to_string());
        if let Some(encrypted_vote) = encrypted_vote {
            event = event.add_attribute("encrypted_vote", encrypted_vote.to_base64());
        }
        response = response.add_event(event);
    }
    Ok(response)
}

fn execute_reveal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    reveals: Vec<RevealParams>,
    action: &str,
) -> Result<Response, ContractError> {
    let voter = voter_for(deps.storage, &info.sender)?;
    let mut response = Response::new()
        .add_attribute(ATTR_ACTION, action)
        .add_attribute(ATTR_VOTER, voter.as_str());
    for reveal in reveals {
        let RevealParams {
            identifier,
            time,
            ancillary_data,
            price,
            salt,
        } = reveal;
        let (index, round, vote) = reveal_vote(
            deps.storage,
            &config,
            env.block.time,
            &voter,
            &identifier,
            time,
            &ancillary_data.unwrap_or_default(),
            price,
            salt,
        )?;
        response = response.add_event(
            Event::new(EVENT_VOTE_REVEALED)
                .add_attribute(ATTR_VOTER, voter.as_str())
                .add_attribute(ATTR_REQUEST_INDEX, index.to_string())
                .add_attribute(ATTR_ROUND, round.to_string())
                .add_attribute(ATTR_PRICE, vote.price.to_string())
                .add_attribute(ATTR_WEIGHT, vote.weight.to_string()),
        );
    }
    Ok(response)
}

fn execute_stake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
) -> Result<Response, ContractError> {
    let amount = must_pay(&info.funds, &config.staking_denom)?;
    let voter = voter_for(deps.storage, &info.sender)?;
    stake(deps.storage, &config, &voter, amount, env.block.time)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "stake")
        .add_attribute(ATTR_VOTER, voter)
        .add_attribute(ATTR_AMOUNT, amount.to_string()))
}

fn execute_request_unstake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let voter = voter_for(deps.storage, &info.sender)?;
    let stake = request_unstake(deps.storage, &config, &voter, amount, env.block.time)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "request_unstake")
        .add_attribute(ATTR_VOTER, voter)
        .add_attribute(ATTR_AMOUNT, amount.to_string())
        .add_attribute("unlock_time", stake.unstake_unlock_time.to_string()))
}

fn execute_execute_unstake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
) -> Result<Response, ContractError> {
    let voter = voter_for(deps.storage, &info.sender)?;
    let amount = execute_unstake(deps.storage, &config, &voter, env.block.time)?;
    // Funds always go to the staker, also when a delegate triggers this
    let msg = BankMsg::Send {
        to_address: voter.to_string(),
        amount: vec![Coin::new(amount.u128(), config.staking_denom)],
    };
    Ok(Response::new()
        .add_message(msg)
        .add_attribute(ATTR_ACTION, "execute_unstake")
        .add_attribute(ATTR_VOTER, voter)
        .add_attribute(ATTR_AMOUNT, amount.to_string()))
}

fn execute_update_trackers(
    deps: DepsMut,
    env: Env,
    config: Config,
    voter: String,
    to_index: Option<u64>,
) -> Result<Response, ContractError> {
    let voter = deps.api.addr_validate(&voter)?;
    let stake = match to_index {
        None => load_synced(
            deps.storage,
            &voter,
            round_id(env.block.time, config.phase_length),
        )?,
        Some(to_index) => {
            let mut stake = VOTER_STAKES
                .may_load(deps.storage, &voter)?
                .unwrap_or_default();
            update_trackers(deps.storage, &voter, &mut stake, Some(to_index))?;
            stake
        }
    };
    VOTER_STAKES.save(deps.storage, &voter, &stake)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "update_trackers")
        .add_attribute(ATTR_VOTER, voter)
        .add_attribute(
            ATTR_LAST_REQUEST_INDEX_CONSIDERED,
            stake.last_request_index_considered.to_string(),
        )
        .add_attribute("active_stake", stake.active_stake.to_string()))
}

fn execute_signal_spam(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    config: Config,
    ranges: Vec<IndexRange>,
) -> Result<Response, ContractError> {
    let bond = Coin::new(config.spam_deletion_bond.u128(), &config.staking_denom);
    must_pay_exactly(&info.funds, &bond)?;
    let (proposal_id, submission) =
        signal_spam(deps.storage, &config, env.block.time, info.sender, ranges, bond)?;
    let identifier = crate::spam::spam_identifier(proposal_id);
    Ok(submitted_response(
        "signal_requests_as_spam_for_deletion",
        &submission,
        &identifier,
        env.block.time.seconds(),
    )
    .add_attribute(ATTR_PROPOSAL_ID, proposal_id.to_string()))
}

fn execute_execute_spam_deletion(
    deps: DepsMut,
    env: Env,
    config: Config,
    proposal_id: u64,
) -> Result<Response, ContractError> {
    let execution = execute_spam_deletion(deps.storage, &config, env.block.time, proposal_id)?;
    let mut response = Response::new()
        .add_attribute(ATTR_ACTION, "execute_spam_deletion")
        .add_attribute(ATTR_PROPOSAL_ID, proposal_id.to_string())
        .add_attribute("status", format!("{:?}", execution.status).to_lowercase())
        .add_attribute("deleted_requests", execution.deleted.len().to_string());
    if !execution.bond.amount.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: execution.bond_recipient.into_string(),
            amount: vec![execution.bond],
        });
    }
    Ok(response)
}

fn execute_set_delegate(
    deps: DepsMut,
    info: MessageInfo,
    delegate: Option<String>,
) -> Result<Response, ContractError> {
    let delegate = delegate
        .map(|d| deps.api.addr_validate(&d))
        .transpose()?;
    let value = delegate.as_ref().map(Addr::to_string).unwrap_or_default();
    set_delegate(deps.storage, &info.sender, delegate)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "set_delegate")
        .add_attribute("delegate", value))
}

fn execute_set_delegator(
    deps: DepsMut,
    info: MessageInfo,
    delegator: Option<String>,
) -> Result<Response, ContractError> {
    let delegator = delegator
        .map(|d| deps.api.addr_validate(&d))
        .transpose()?;
    let value = delegator.as_ref().map(Addr::to_string).unwrap_or_default();
    set_delegator(deps.storage, &info.sender, delegator)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "set_delegator")
        .add_attribute("delegator", value))
}

fn execute_update_requesters(
    deps: DepsMut,
    info: MessageInfo,
    config: Config,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);

    // We add first to ensure an address that is included in both lists
    // is removed and not added.
    for requester in add {
        let addr = deps.api.addr_validate(&requester)?;
        REQUESTERS.save(deps.storage, &addr, &())?;
    }
    for requester in remove {
        let addr = deps.api.addr_validate(&requester)?;
        REQUESTERS.remove(deps.storage, &addr);
    }
    Ok(Response::new().add_attribute(ATTR_ACTION, "update_requesters"))
}

fn execute_update_supported_identifiers(
    deps: DepsMut,
    info: MessageInfo,
    config: Config,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);
    for identifier in add {
        SUPPORTED_IDENTIFIERS.save(deps.storage, &identifier, &())?;
    }
    for identifier in remove {
        SUPPORTED_IDENTIFIERS.remove(deps.storage, &identifier);
    }
    Ok(Response::new().add_attribute(ATTR_ACTION, "update_supported_identifiers"))
}

/// Optional fields of `ExecuteMsg::SetConfig`
struct ConfigUpdate {
    owner: Option<String>,
    phase_length: Option<u64>,
    unstake_cooldown: Option<u64>,
    min_roll_to_next_round_length: Option<u64>,
    gat_percentage: Option<Decimal>,
    spam_deletion_bond: Option<Uint128>,
    max_ancillary_data_len: Option<u32>,
    wrong_vote_slash_per_token: Option<Decimal>,
    no_vote_slash_per_token: Option<Decimal>,
    sink: Option<String>,
}

fn execute_set_config(
    deps: DepsMut,
    info: MessageInfo,
    config: Config,
    update: ConfigUpdate,
) -> Result<Response, ContractError> {
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);

    let owner = match update.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => config.owner,
    };
    let sink = match update.sink {
        Some(sink) => deps.api.addr_validate(&sink)?,
        None => config.sink,
    };
    let new_config = Config {
        owner,
        staking_denom: config.staking_denom,
        phase_length: update.phase_length.unwrap_or(config.phase_length),
        unstake_cooldown: update.unstake_cooldown.unwrap_or(config.unstake_cooldown),
        min_roll_to_next_round_length: update
            .min_roll_to_next_round_length
            .unwrap_or(config.min_roll_to_next_round_length),
        gat_percentage: update.gat_percentage.unwrap_or(config.gat_percentage),
        spam_deletion_bond: update
            .spam_deletion_bond
            .unwrap_or(config.spam_deletion_bond),
        max_ancillary_data_len: update
            .max_ancillary_data_len
            .unwrap_or(config.max_ancillary_data_len),
        wrong_vote_slash_per_token: update
            .wrong_vote_slash_per_token
            .unwrap_or(config.wrong_vote_slash_per_token),
        no_vote_slash_per_token: update
            .no_vote_slash_per_token
            .unwrap_or(config.no_vote_slash_per_token),
        sink,
    };
    validate_config(&new_config)?;
    CONFIG.save(deps.storage, &new_config)?;
    Ok(Response::new().add_attribute(ATTR_ACTION, "set_config"))
}

fn execute_set_migrated(
    deps: DepsMut,
    info: MessageInfo,
    config: Config,
    successor: String,
) -> Result<Response, ContractError> {
    ensure_eq!(info.sender, config.owner, ContractError::Unauthorized);
    let successor = deps.api.addr_validate(&successor)?;
    MIGRATED_TO.save(deps.storage, &successor)?;
    Ok(Response::new()
        .add_attribute(ATTR_ACTION, "set_migrated")
        .add_attribute("successor", successor))
}

//
// Query
//

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    CONFIG.load(deps.storage)
}

fn query_current_round(deps: Deps, env: Env) -> StdResult<CurrentRoundResponse> {
    let config = CONFIG.load(deps.storage)?;
    let current = round_id(env.block.time, config.phase_length);
    Ok(CurrentRoundResponse {
        round_id: current,
        phase: vote_phase(env.block.time, config.phase_length),
        round_end_time: round_end_time(current, config.phase_length),
        snapshot: ROUNDS.may_load(deps.storage, current)?,
    })
}

fn query_round(deps: Deps, round_id: u64) -> StdResult<RoundResponse> {
    Ok(RoundResponse {
        round_id,
        snapshot: ROUNDS.may_load(deps.storage, round_id)?,
    })
}

fn query_pending_requests(deps: Deps, env: Env) -> StdResult<PendingRequestsResponse> {
    let config = CONFIG.load(deps.storage)?;
    let requests = active_requests(deps.storage, &config, env.block.time)?
        .into_iter()
        .map(|(request, view)| PendingRequest {
            index: request.index,
            identifier: request.identifier,
            time: request.time,
            ancillary_data: request.ancillary_data,
            class: request.class,
            roll_count: view.roll_count,
        })
        .collect();
    Ok(PendingRequestsResponse {
        round_id: round_id(env.block.time, config.phase_length),
        requests,
    })
}

fn query_price_request_statuses(
    deps: Deps,
    env: Env,
    requests: Vec<RequestKey>,
) -> StdResult<PriceRequestStatusesResponse> {
    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time;
    let current_round = round_id(now, config.phase_length);

    let mut statuses = Vec::with_capacity(requests.len());
    for key in requests {
        let ancillary_data = key.ancillary_data.unwrap_or_default();
        let entry = match find_request(deps.storage, &key.identifier, key.time, &ancillary_data)? {
            None => RequestStatusEntry {
                status: RequestStatus::Unrequested,
                last_voting_round: 0,
            },
            Some(request) => {
                let view = project_request(deps.storage, &config, &request, now)?;
                let mut status = request_status(&view, current_round);
                if matches!(status, RequestStatus::Active | RequestStatus::Future)
                    && is_marked_for_deletion(deps.storage, &config, now, request.index)?
                {
                    status = RequestStatus::ToDelete;
                }
                RequestStatusEntry {
                    status,
                    last_voting_round: view.last_voting_round,
                }
            }
        };
        statuses.push(entry);
    }
    Ok(PriceRequestStatusesResponse { statuses })
}

fn query_price_request(deps: Deps, env: Env, index: u64) -> StdResult<PriceRequestResponse> {
    let config = CONFIG.load(deps.storage)?;
    let request = match PRICE_REQUESTS.may_load(deps.storage, index)? {
        Some(mut request) => {
            let view = project_request(deps.storage, &config, &request, env.block.time)?;
            request.state = view.state;
            request.last_voting_round = view.last_voting_round;
            request.resolved_price = view.resolved_price;
            request.roll_count = view.roll_count;
            Some(request)
        }
        None => None,
    };
    Ok(PriceRequestResponse { request })
}

/// Registered requesters may read prices. After migration only the successor may.
fn ensure_price_reader(deps: Deps, requester: &str) -> Result<(), ContractError> {
    let requester = deps.api.addr_validate(requester)?;
    let allowed = match MIGRATED_TO.may_load(deps.storage)? {
        Some(successor) => requester == successor,
        None => REQUESTERS.has(deps.storage, &requester),
    };
    if allowed {
        Ok(())
    } else {
        Err(ContractError::UnauthorizedRequester)
    }
}

fn query_price(
    deps: Deps,
    env: Env,
    requester: String,
    identifier: String,
    time: u64,
    ancillary_data: Option<Binary>,
) -> Result<PriceResponse, ContractError> {
    ensure_price_reader(deps, &requester)?;
    let config = CONFIG.load(deps.storage)?;
    let price: Int128 = resolved_price(
        deps.storage,
        &config,
        env.block.time,
        &identifier,
        time,
        &ancillary_data.unwrap_or_default(),
    )?;
    Ok(PriceResponse { price })
}

fn query_has_price(
    deps: Deps,
    env: Env,
    requester: String,
    identifier: String,
    time: u64,
    ancillary_data: Option<Binary>,
) -> Result<HasPriceResponse, ContractError> {
    let has_price = match query_price(deps, env, requester, identifier, time, ancillary_data) {
        Ok(_) => true,
        Err(ContractError::NotResolved) => false,
        Err(err) => return Err(err),
    };
    Ok(HasPriceResponse { has_price })
}

fn query_commitment(
    deps: Deps,
    voter: String,
    request_index: u64,
    round: u64,
) -> StdResult<CommitmentResponse> {
    let voter = deps.api.addr_validate(&voter)?;
    let commitment = COMMITMENTS.may_load(deps.storage, (request_index, round, &voter))?;
    Ok(CommitmentResponse { commitment })
}

fn query_voter_stake(deps: Deps, address: String) -> StdResult<VoterStakeResponse> {
    let address = deps.api.addr_validate(&address)?;
    let stake = VOTER_STAKES
        .may_load(deps.storage, &address)?
        .unwrap_or_default();
    Ok(VoterStakeResponse { stake })
}

fn query_slash_trackers(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<SlashTrackersResponse> {
    let limit: usize = limit.unwrap_or(100) as usize;
    let trackers = SLASH_TRACKERS
        .range(
            deps.storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .take(limit)
        .collect::<StdResult<_>>()?;
    Ok(SlashTrackersResponse { trackers })
}

fn query_spam_deletion_proposal(
    deps: Deps,
    env: Env,
    id: u64,
) -> Result<SpamDeletionProposalResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let proposal = SPAM_PROPOSALS
        .may_load(deps.storage, id)?
        .ok_or(ContractError::ProposalNotFound)?;
    let status = derived_status(deps.storage, &config, env.block.time, &proposal)?;
    Ok(SpamDeletionProposalResponse {
        proposer: proposal.proposer,
        bond: proposal.bond,
        request_time: proposal.request_time,
        request_index: proposal.request_index,
        ranges: proposal.ranges,
        status,
    })
}

fn query_requesters(deps: Deps) -> StdResult<RequestersResponse> {
    let requesters = REQUESTERS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    Ok(RequestersResponse { requesters })
}

fn query_supported_identifiers(deps: Deps) -> StdResult<SupportedIdentifiersResponse> {
    let identifiers = SUPPORTED_IDENTIFIERS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<_>>()?;
    Ok(SupportedIdentifiersResponse { identifiers })
}

fn query_delegation(deps: Deps, address: String) -> StdResult<DelegationResponse> {
    let address = deps.api.addr_validate(&address)?;
    Ok(DelegationResponse {
        delegate: DELEGATES.may_load(deps.storage, &address)?,
        delegator: DELEGATORS.may_load(deps.storage, &address)?,
        votes_for: voter_for(deps.storage, &address)?,
    })
}
