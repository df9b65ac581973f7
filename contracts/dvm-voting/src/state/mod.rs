mod access;
mod config;
mod requests;
mod rounds;
mod spam;
mod stakes;
mod trackers;
mod votes;

pub use access::{DELEGATES, DELEGATORS, REQUESTERS, SUPPORTED_IDENTIFIERS};
pub use config::{Config, CONFIG, MIGRATED_TO};
pub use requests::{
    next_request_index, request_count, PriceRequest, RequestClass, RequestState, PENDING_REQUESTS,
    PRICE_REQUESTS, REQUEST_INDEX_BY_KEY,
};
pub use rounds::{RoundSnapshot, ROUNDS};
pub use spam::{
    next_proposal_id, IndexRange, ProposalStatus, SpamDeletionProposal, SPAM_PROPOSALS,
};
pub use stakes::{
    AtRiskUnstake, StakeTotals, UnappliedSlash, VoterStake, AT_RISK_UNSTAKES, STAKE_TOTALS,
    VOTER_STAKES,
};
pub use trackers::{
    append_tracker, tracker_count, SlashTracker, TrackerOutcome, DELETED_JUMPS, REQUEST_SLOTS,
    SLASH_TRACKERS,
};
pub use votes::{Commitment, PriceWeight, RevealedVote, VoteTally, COMMITMENTS, REVEALS, TALLIES};

/// Top level storage key. Values must not conflict.
/// Each key is only one byte long to ensure we use the smallest possible storage keys.
#[repr(u8)]
pub enum TopKey {
    Config = b'c',
    MigratedTo = b'M',
    Requesters = b'r',
    Identifiers = b'i',
    Delegates = b'g',
    Delegators = b'G',
    Requests = b'p',
    RequestIndexByKey = b'k',
    RequestCount = b'P',
    PendingRequests = b'q',
    Commitments = b'm',
    Reveals = b'v',
    Tallies = b't',
    VoterStakes = b's',
    StakeTotals = b'S',
    AtRiskUnstakes = b'u',
    Rounds = b'R',
    SlashTrackers = b'T',
    TrackerCount = b'N',
    RequestSlots = b'l',
    DeletedJumps = b'j',
    SpamProposals = b'd',
    SpamProposalCount = b'D',
}

impl TopKey {
    const fn as_str(&self) -> &str {
        let array_ref = unsafe { std::mem::transmute::<_, &[u8; 1]>(self) };
        match core::str::from_utf8(array_ref) {
            Ok(a) => a,
            Err(_) => panic!("Non-utf8 enum value found. Use a-z, A-Z and 0-9"),
        }
    }
}
