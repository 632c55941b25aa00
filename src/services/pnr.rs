use rand::rngs::OsRng;
use rand::Rng;

pub const PNR_LENGTH: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws a fresh booking reference from the operating system's CSPRNG.
/// Uniqueness is not checked here.
pub fn generate() -> String {
    generate_with(&mut OsRng)
}

pub fn generate_with<R: Rng>(rng: &mut R) -> String {
    (0..PNR_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

pub fn is_well_formed(pnr: &str) -> bool {
    pnr.len() == PNR_LENGTH && pnr.bytes().all(|b| ALPHABET.contains(&b))
}
