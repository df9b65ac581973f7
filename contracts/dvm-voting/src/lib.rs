mod attributes;
mod commit_reveal;
mod delegation;
mod funds;
mod requests;
mod resolution;
mod slash_rate;
mod slashing;
mod spam;
mod stakes;
#[cfg(test)]
mod testing;

pub mod contract;
pub mod error;
pub mod msg;
pub mod state;

pub use slash_rate::{FixedSlashRates, ParticipationStats, SlashRatePolicy, SlashRates};
