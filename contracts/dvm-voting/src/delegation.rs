use cosmwasm_std::{Addr, StdResult, Storage};

use crate::state::{DELEGATES, DELEGATORS};

/// The staker on whose behalf `sender` acts. This is the sender itself unless
/// sender and staker agreed on a delegation.
pub fn voter_for(storage: &dyn Storage, sender: &Addr) -> StdResult<Addr> {
    if let Some(staker) = DELEGATORS.may_load(storage, sender)? {
        if DELEGATES.may_load(storage, &staker)?.as_ref() == Some(sender) {
            return Ok(staker);
        }
    }
    Ok(sender.clone())
}

pub fn set_delegate(storage: &mut dyn Storage, staker: &Addr, delegate: Option<Addr>) -> StdResult<()> {
    match delegate {
        Some(delegate) => DELEGATES.save(storage, staker, &delegate),
        None => {
            DELEGATES.remove(storage, staker);
            Ok(())
        }
    }
}

pub fn set_delegator(
    storage: &mut dyn Storage,
    delegate: &Addr,
    delegator: Option<Addr>,
) -> StdResult<()> {
    match delegator {
        Some(staker) => DELEGATORS.save(storage, delegate, &staker),
        None => {
            DELEGATORS.remove(storage, delegate);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;

    #[test]
    fn voter_for_requires_both_sides() {
        let mut storage = MockStorage::default();
        let staker = Addr::unchecked("staker");
        let hot = Addr::unchecked("hot");

        assert_eq!(voter_for(&storage, &hot).unwrap(), hot);

        set_delegate(&mut storage, &staker, Some(hot.clone())).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), hot);

        set_delegator(&mut storage, &hot, Some(staker.clone())).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), staker);
        // The staker can still act for itself
        assert_eq!(voter_for(&storage, &staker).unwrap(), staker);
    }

    #[test]
    fn either_side_can_revoke() {
        let mut storage = MockStorage::default();
        let staker = Addr::unchecked("staker");
        let hot = Addr::unchecked("hot");
        set_delegate(&mut storage, &staker, Some(hot.clone())).unwrap();
        set_delegator(&mut storage, &hot, Some(staker.clone())).unwrap();

        set_delegate(&mut storage, &staker, None).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), hot);

        set_delegate(&mut storage, &staker, Some(hot.clone())).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), staker);
        set_delegator(&mut storage, &hot, None).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), hot);

        // Pointing at someone else breaks the pair
        set_delegator(&mut storage, &hot, Some(staker.clone())).unwrap();
        set_delegate(&mut storage, &staker, Some(Addr::unchecked("other"))).unwrap();
        assert_eq!(voter_for(&storage, &hot).unwrap(), hot);
    }
}
