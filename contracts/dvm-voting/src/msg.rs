use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin, Decimal, HexBinary, Int128, Timestamp, Uint128};
use dvm_common::VotePhase;

use crate::state::{
    Commitment, Config, IndexRange, PriceRequest, ProposalStatus, RequestClass, RoundSnapshot,
    SlashTracker, VoterStake,
};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub staking_denom: String,
    pub phase_length: u64,
    pub unstake_cooldown: u64,
    pub min_roll_to_next_round_length: u64,
    pub gat_percentage: Decimal,
    pub spam_deletion_bond: Uint128,
    /// Defaults to 8192 bytes
    pub max_ancillary_data_len: Option<u32>,
    /// Defaults to 0.16%
    pub wrong_vote_slash_per_token: Option<Decimal>,
    /// Defaults to 0.16%
    pub no_vote_slash_per_token: Option<Decimal>,
    pub sink: String,
}

#[cw_serde]
pub struct CommitParams {
    pub identifier: String,
    pub time: u64,
    pub ancillary_data: Option<Binary>,
    pub hash: HexBinary,
    pub encrypted_vote: Option<Binary>,
}

#[cw_serde]
pub struct RevealParams {
    pub identifier: String,
    pub time: u64,
    pub ancillary_data: Option<Binary>,
    pub price: Int128,
    pub salt: Int128,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Requests a price. Only registered requesters can do this.
    RequestPrice {
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
    },
    /// Requests an admin vote. Owner only.
    RequestGovernanceAction {
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
    },
    CommitVote {
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
        hash: HexBinary,
        encrypted_vote: Option<Binary>,
    },
    BatchCommit {
        commits: Vec<CommitParams>,
    },
    RevealVote {
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
        price: Int128,
        salt: Int128,
    },
    BatchReveal {
        reveals: Vec<RevealParams>,
    },
    /// Deposits the attached staking denom. Active from the next round on.
    Stake {},
    RequestUnstake {
        amount: Uint128,
    },
    ExecuteUnstake {},
    /// Applies all slash trackers to the voter's stake. Anyone can call this.
    UpdateTrackers {
        voter: String,
    },
    /// Applies slash trackers up to (excluding) `to_index`. Anyone can call this.
    UpdateTrackersRange {
        voter: String,
        to_index: u64,
    },
    /// Resolves or rolls all requests whose voting round ended. Every other execute message does this as well.
    ProcessResolvableRequests {},
    /// Proposes to delete the given request ranges. The spam deletion bond must be attached.
    SignalRequestsAsSpamForDeletion {
        ranges: Vec<IndexRange>,
    },
    ExecuteSpamDeletion {
        proposal_id: u64,
    },
    /// Sent by a staker to nominate (or remove) a delegate
    SetDelegate {
        delegate: Option<String>,
    },
    /// Sent by a delegate to accept (or give up) a staker
    SetDelegator {
        delegator: Option<String>,
    },
    /// Owner only
    UpdateRequesters {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Owner only
    UpdateSupportedIdentifiers {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Owner only
    SetConfig {
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
    },
    /// Owner only. Stops all state changes and restricts price reads to the successor.
    SetMigrated {
        successor: String,
    },
}

#[cw_serde]
pub struct RequestKey {
    pub identifier: String,
    pub time: u64,
    pub ancillary_data: Option<Binary>,
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(CurrentRoundResponse)]
    CurrentRound {},
    #[returns(RoundResponse)]
    Round { round_id: u64 },
    /// Requests being voted on in the current round
    #[returns(PendingRequestsResponse)]
    PendingRequests {},
    #[returns(PriceRequestStatusesResponse)]
    PriceRequestStatuses { requests: Vec<RequestKey> },
    #[returns(PriceRequestResponse)]
    PriceRequest { index: u64 },
    #[returns(NumberOfPriceRequestsResponse)]
    NumberOfPriceRequests {},
    #[returns(HasPriceResponse)]
    HasPrice {
        requester: String,
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
    },
    /// Fails unless the price is resolved
    #[returns(PriceResponse)]
    Price {
        requester: String,
        identifier: String,
        time: u64,
        ancillary_data: Option<Binary>,
    },
    #[returns(CommitmentResponse)]
    Commitment {
        voter: String,
        request_index: u64,
        round: u64,
    },
    /// The stored stake. Call `UpdateTrackers` first to see slashing applied.
    #[returns(VoterStakeResponse)]
    VoterStake { address: String },
    #[returns(SlashTrackerResponse)]
    SlashTracker { index: u64 },
    #[returns(SlashTrackersResponse)]
    SlashTrackers {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(NumberOfSlashTrackersResponse)]
    NumberOfSlashTrackers {},
    #[returns(DeletedRequestJumpResponse)]
    DeletedRequestJump { index: u64 },
    #[returns(SpamDeletionProposalResponse)]
    SpamDeletionProposal { id: u64 },
    #[returns(RequestersResponse)]
    Requesters {},
    #[returns(SupportedIdentifiersResponse)]
    SupportedIdentifiers {},
    #[returns(IsIdentifierSupportedResponse)]
    IsIdentifierSupported { identifier: String },
    #[returns(DelegationResponse)]
    Delegation { address: String },
    #[returns(MigratedResponse)]
    Migrated {},
}

pub type ConfigResponse = Config;

#[cw_serde]
pub struct CurrentRoundResponse {
    pub round_id: u64,
    pub phase: VotePhase,
    pub round_end_time: Timestamp,
    /// Unset until the first transaction of the round
    pub snapshot: Option<RoundSnapshot>,
}

#[cw_serde]
pub struct RoundResponse {
    pub round_id: u64,
    pub snapshot: Option<RoundSnapshot>,
}

#[cw_serde]
pub struct PendingRequest {
    pub index: u64,
    pub identifier: String,
    pub time: u64,
    pub ancillary_data: Binary,
    pub class: RequestClass,
    pub roll_count: u32,
}

#[cw_serde]
pub struct PendingRequestsResponse {
    pub round_id: u64,
    pub requests: Vec<PendingRequest>,
}

#[cw_serde]
#[derive(Copy, Eq)]
pub enum RequestStatus {
    Unrequested,
    Active,
    Resolved,
    Future,
    ToDelete,
}

#[cw_serde]
pub struct RequestStatusEntry {
    pub status: RequestStatus,
    pub last_voting_round: u64,
}

#[cw_serde]
pub struct PriceRequestStatusesResponse {
    pub statuses: Vec<RequestStatusEntry>,
}

#[cw_serde]
pub struct PriceRequestResponse {
    pub request: Option<PriceRequest>,
}

#[cw_serde]
pub struct NumberOfPriceRequestsResponse {
    pub count: u64,
}

#[cw_serde]
pub struct HasPriceResponse {
    pub has_price: bool,
}

#[cw_serde]
pub struct PriceResponse {
    pub price: Int128,
}

#[cw_serde]
pub struct CommitmentResponse {
    pub commitment: Option<Commitment>,
}

#[cw_serde]
pub struct VoterStakeResponse {
    pub stake: VoterStake,
}

#[cw_serde]
pub struct SlashTrackerResponse {
    pub tracker: Option<SlashTracker>,
}

#[cw_serde]
pub struct SlashTrackersResponse {
    pub trackers: Vec<(u64, SlashTracker)>,
}

#[cw_serde]
pub struct NumberOfSlashTrackersResponse {
    pub count: u64,
}

#[cw_serde]
pub struct DeletedRequestJumpResponse {
    /// The last slot of the deleted run starting at the queried slot
    pub last: Option<u64>,
}

#[cw_serde]
pub struct SpamDeletionProposalResponse {
    pub proposer: Addr,
    pub bond: Coin,
    pub request_time: u64,
    pub request_index: u64,
    pub ranges: Vec<IndexRange>,
    pub status: ProposalStatus,
}

#[cw_serde]
pub struct RequestersResponse {
    pub requesters: Vec<Addr>,
}

#[cw_serde]
pub struct SupportedIdentifiersResponse {
    pub identifiers: Vec<String>,
}

#[cw_serde]
pub struct IsIdentifierSupportedResponse {
    pub supported: bool,
}

#[cw_serde]
pub struct DelegationResponse {
    /// The delegate this address nominated
    pub delegate: Option<Addr>,
    /// The staker this address accepted to act for
    pub delegator: Option<Addr>,
    /// The staker this address votes for when sending messages
    pub votes_for: Addr,
}

#[cw_serde]
pub struct MigratedResponse {
    pub successor: Option<Addr>,
}
