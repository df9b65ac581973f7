use cosmwasm_std::{Coin, Uint128};

use crate::error::ContractError;

/// Returns the amount of a single coin of `denom`. Anything else is rejected.
pub fn must_pay(funds: &[Coin], denom: &str) -> Result<Uint128, ContractError> {
    match funds {
        [coin] if coin.denom == denom && !coin.amount.is_zero() => Ok(coin.amount),
        _ => Err(ContractError::InvalidFunds {
            denom: denom.to_string(),
        }),
    }
}

/// Checks that exactly `expected` was sent. An expected zero amount means no funds.
pub fn must_pay_exactly(funds: &[Coin], expected: &Coin) -> Result<(), ContractError> {
    let matches = if expected.amount.is_zero() {
        funds.is_empty()
    } else {
        matches!(funds, [coin] if coin == expected)
    };
    if matches {
        Ok(())
    } else {
        Err(ContractError::WrongBond {
            bond: expected.clone(),
        })
    }
}

pub fn nonpayable(funds: &[Coin]) -> Result<(), ContractError> {
    if funds.is_empty() {
        Ok(())
    } else {
        Err(ContractError::DontSendFunds)
    }
}
