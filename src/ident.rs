/**
 * Random identifier generation for the QTI export.
 *
 * The interchange schema forbids identifiers that start with a digit, so every
 * structural identifier carries a fixed `g` prefix. Answer-option identifiers are
 * short digit strings instead; they only need to be distinct within one item.
 */
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::thread_rng;

pub const HEX_LOWER: &str = "0123456789abcdef";
const DIGITS: &str = "0123456789";
const DIGITS_NONZERO: &str = "123456789";

/// Return a random token of `length` characters drawn uniformly from `alphabet`.
/// Not cryptographically secure.
pub fn generate(length: usize, alphabet: &str) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let mut rng = thread_rng();
    (0..length).map(|_| *chars.choose(&mut rng).unwrap()).collect()
}

/// Return a fresh structural identifier, e.g. for an assessment or an item.
pub fn item_ident() -> String {
    format!("g{}", generate(30, HEX_LOWER))
}

/// Return `count` mutually-distinct answer-option identifiers (a non-zero digit
/// followed by three digits). Sampling repeats until enough distinct tokens have
/// been seen; practical counts are tiny compared to the token space.
pub fn option_idents(count: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut idents = Vec::with_capacity(count);
    while idents.len() < count {
        let token = format!("{}{}", generate(1, DIGITS_NONZERO), generate(3, DIGITS));
        if seen.insert(token.clone()) {
            idents.push(token);
        }
    }
    idents
}
