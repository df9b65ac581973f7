//! Stable event attributes

pub const ATTR_ACTION: &str = "action";
pub const ATTR_REQUEST_INDEX: &str = "request_index";
pub const ATTR_ROUND: &str = "round";
pub const ATTR_VOTER: &str = "voter";
pub const ATTR_PRICE: &str = "price";
pub const ATTR_WEIGHT: &str = "weight";
pub const ATTR_AMOUNT: &str = "amount";
pub const ATTR_PROPOSAL_ID: &str = "proposal_id";
pub const ATTR_LAST_REQUEST_INDEX_CONSIDERED: &str = "last_request_index_considered";

pub const EVENT_PRICE_REQUEST_ADDED: &str = "price_request_added";
pub const EVENT_PRICE_RESOLVED: &str = "price_resolved";
pub const EVENT_PRICE_REQUEST_ROLLED: &str = "price_request_rolled";
pub const EVENT_VOTE_COMMITTED: &str = "vote_committed";
pub const EVENT_VOTE_REVEALED: &str = "vote_revealed";
