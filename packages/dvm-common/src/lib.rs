mod hashing;
mod rounds;

pub use hashing::{compute_vote_hash, request_key};
pub use rounds::{round_end_time, round_id, vote_phase, VotePhase};
