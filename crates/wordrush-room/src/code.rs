//! Room code generation.

use std::collections::HashMap;

use rand::Rng;
use wordrush_protocol::RoomCode;

/// Characters a room code is drawn from. Leaves out `0 O 1 I` so codes
/// read back unambiguously.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters in a room code.
pub const CODE_LENGTH: usize = 6;

/// Draws a random code. May collide with an existing room.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    RoomCode::new(code)
}

/// Draws codes until one isn't a key of `existing`.
///
/// The registry calls this while holding exclusive access to `existing`,
/// so the returned code is still free when the room is inserted.
pub fn generate_unique_code<V, R: Rng + ?Sized>(
    existing: &HashMap<RoomCode, V>,
    rng: &mut R,
) -> RoomCode {
    loop {
        let code = generate_code(rng);
        if !existing.contains_key(&code) {
            return code;
        }
    }
}

/// Whether `code` has the shape of a generated code.
pub fn is_valid_code(code: &RoomCode) -> bool {
    code.as_str().len() == CODE_LENGTH && code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b))
}
