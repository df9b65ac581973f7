use cosmwasm_std::{HexBinary, Int128};
use sha2::{Digest, Sha256};

/// The commitment a voter submits during the commit phase.
///
/// Variable length fields are prefixed with their length as a big endian u64
/// such that no two distinct inputs share an encoding.
pub fn compute_vote_hash(
    price: Int128,
    salt: Int128,
    voter: &str,
    round_id: u64,
    identifier: &str,
    time: u64,
    ancillary_data: &[u8],
) -> HexBinary {
    let mut hasher = Sha256::new();
    hasher.update(price.i128().to_be_bytes());
    hasher.update(salt.i128().to_be_bytes());
    update_prefixed(&mut hasher, voter.as_bytes());
    hasher.update(round_id.to_be_bytes());
    update_prefixed(&mut hasher, identifier.as_bytes());
    hasher.update(time.to_be_bytes());
    update_prefixed(&mut hasher, ancillary_data);
    let hash: [u8; 32] = hasher.finalize().into();
    hash.into()
}

/// Storage key of a price request identity (identifier, time, ancillary data).
pub fn request_key(identifier: &str, time: u64, ancillary_data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    update_prefixed(&mut hasher, identifier.as_bytes());
    hasher.update(time.to_be_bytes());
    update_prefixed(&mut hasher, ancillary_data);
    hasher.finalize().into()
}

fn update_prefixed(hasher: &mut Sha256, data: &[u8]) {
    hasher.update((data.len() as u64).to_be_bytes());
    hasher.update(data);
}
