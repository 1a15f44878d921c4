//! Room code generation.
//!
//! Codes are 6 characters from an alphabet with the easily-confused glyphs
//! removed (no I, O, 0, 1), drawn from the OS RNG.

use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::OsRng;

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const CODE_LEN: usize = 6;

pub fn generate_room_code() -> String {
    let mut rng = OsRng;
    let dist = Uniform::from(0..ALPHABET.len());

    let mut s = String::with_capacity(CODE_LEN);
    for _ in 0..CODE_LEN {
        s.push(ALPHABET[dist.sample(&mut rng)] as char);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_correct_length() {
        assert_eq!(generate_room_code().len(), CODE_LEN);
    }

    #[test]
    fn code_uses_reduced_alphabet_only() {
        for _ in 0..50 {
            let code = generate_room_code();
            for b in code.bytes() {
                assert!(ALPHABET.contains(&b), "unexpected character {}", b as char);
                assert!(!b"IO01".contains(&b));
            }
        }
    }

    #[test]
    fn codes_vary() {
        let a = generate_room_code();
        let b = generate_room_code();
        let c = generate_room_code();
        assert!(a != b || b != c);
    }
}
