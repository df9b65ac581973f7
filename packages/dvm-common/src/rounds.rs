use cosmwasm_schema::cw_serde;
use cosmwasm_std::Timestamp;

/// The two phases every voting round is split into.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum VotePhase {
    Commit,
    Reveal,
}

/// The ID of the round the given time falls into.
///
/// `phase_length` is the length of a full round in seconds, i.e. commit and reveal phase together.
#[inline]
pub fn round_id(time: Timestamp, phase_length: u64) -> u64 {
    time.seconds() / phase_length
}

/// Commit during the first half of a round, reveal during the second half.
pub fn vote_phase(time: Timestamp, phase_length: u64) -> VotePhase {
    if time.seconds() % phase_length < phase_length / 2 {
        VotePhase::Commit
    } else {
        VotePhase::Reveal
    }
}

/// The first second that does not belong to the round anymore.
pub fn round_end_time(round_id: u64, phase_length: u64) -> Timestamp {
    Timestamp::from_seconds((round_id + 1) * phase_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASE_LENGTH: u64 = 172_800;

    #[test]
    fn round_id_works() {
        assert_eq!(round_id(Timestamp::from_seconds(0), PHASE_LENGTH), 0);
        assert_eq!(round_id(Timestamp::from_seconds(172_799), PHASE_LENGTH), 0);
        assert_eq!(round_id(Timestamp::from_seconds(172_800), PHASE_LENGTH), 1);
        assert_eq!(
            round_id(Timestamp::from_seconds(1_678_020_492), PHASE_LENGTH),
            9710
        );
        // Sub-second precision is ignored
        assert_eq!(
            round_id(Timestamp::from_nanos(172_799_999_999_999), PHASE_LENGTH),
            0
        );
    }

    #[test]
    fn vote_phase_works() {
        assert_eq!(
            vote_phase(Timestamp::from_seconds(0), PHASE_LENGTH),
            VotePhase::Commit
        );
        assert_eq!(
            vote_phase(Timestamp::from_seconds(86_399), PHASE_LENGTH),
            VotePhase::Commit
        );
        assert_eq!(
            vote_phase(Timestamp::from_seconds(86_400), PHASE_LENGTH),
            VotePhase::Reveal
        );
        assert_eq!(
            vote_phase(Timestamp::from_seconds(172_799), PHASE_LENGTH),
            VotePhase::Reveal
        );
        assert_eq!(
            vote_phase(Timestamp::from_seconds(172_800), PHASE_LENGTH),
            VotePhase::Commit
        );
    }

    #[test]
    fn round_end_time_works() {
        assert_eq!(
            round_end_time(0, PHASE_LENGTH),
            Timestamp::from_seconds(172_800)
        );
        assert_eq!(
            round_end_time(9710, PHASE_LENGTH),
            Timestamp::from_seconds(1_678_060_800)
        );

        // The end of a round is the start of the next one
        let end = round_end_time(41, PHASE_LENGTH);
        assert_eq!(round_id(end, PHASE_LENGTH), 42);
        assert_eq!(vote_phase(end, PHASE_LENGTH), VotePhase::Commit);
    }
}
