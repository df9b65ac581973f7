use cosmwasm_std::{Addr, Coin, OverflowError, StdError};
use dvm_common::VotePhase;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Contract was migrated to {successor}")]
    Migrated { successor: Addr },

    #[error("GAT percentage must not exceed 100%")]
    InvalidGat,

    #[error("Phase length must be at least 2 seconds")]
    InvalidPhaseLength,

    #[error("Slash rates must not exceed 1 per token")]
    InvalidSlashRate,

    //
    // Price requests
    //
    #[error("Sender is not a registered requester")]
    UnauthorizedRequester,

    #[error("Price requests for future times are not allowed")]
    FutureTimeNotAllowed,

    #[error("Identifier is not supported")]
    UnsupportedIdentifier,

    #[error("Ancillary data of {len} bytes exceeds the limit of {max} bytes")]
    AncillaryDataTooLarge { len: usize, max: u32 },

    #[error("Price request not found")]
    RequestNotFound,

    #[error("Price has not been resolved")]
    NotResolved,

    //
    // Commit/reveal
    //
    #[error("Price request is not being voted on in the current round")]
    RequestNotActive,

    #[error("Operation not allowed in the {current:?} phase")]
    WrongPhase { current: VotePhase },

    #[error("Commitment hash must not be zero")]
    InvalidHash,

    #[error("No commitment found for this vote")]
    NoCommitment,

    #[error("Revealed vote does not match the commitment")]
    HashMismatch,

    #[error("Vote was already revealed")]
    AlreadyRevealed,

    //
    // Staking
    //
    #[error("Amount must not be zero")]
    ZeroAmount,

    #[error("Insufficient active stake")]
    InsufficientActiveStake,

    #[error("An unstake request is already pending")]
    UnstakeAlreadyPending,

    #[error("There is no pending unstake")]
    NoPendingUnstake,

    #[error("Unstake cooldown has not elapsed yet")]
    CooldownNotElapsed,

    #[error("Pending unstake is still at risk in the current voting round")]
    UnstakeAtRisk,

    //
    // Funds
    //
    #[error("Expected a single non-zero coin of denom {denom}")]
    InvalidFunds { denom: String },

    #[error("Spam deletion bond must be exactly {bond}")]
    WrongBond { bond: Coin },

    #[error("Do not send funds with this message")]
    DontSendFunds,

    //
    // Slashing
    //
    #[error("Range end {to_index} must be greater than the last considered index {last_considered}")]
    InvalidRangeTooLow { to_index: u64, last_considered: u64 },

    #[error("Range end {to_index} exceeds the number of slash trackers {tracker_count}")]
    InvalidRangeTooHigh { to_index: u64, tracker_count: u64 },

    //
    // Spam deletion
    //
    #[error("Invalid spam deletion range")]
    InvalidSpamRange,

    #[error("Spam deletion proposal not found")]
    ProposalNotFound,

    #[error("Spam deletion proposal has not been decided yet")]
    ProposalNotDecided,

    #[error("Spam deletion proposal was already executed")]
    AlreadyExecuted,
}
