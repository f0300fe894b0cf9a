//! Utility functions

use rand::RngExt;

pub const SECRET_LENGTH: usize = 48;
pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// Generate a random alphanumeric string of the given length
pub fn random_string(len: usize) -> String {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(len);

	for _ in 0..len {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	result
}

/// Generate a server secret for signing anti-forgery tokens
pub fn random_secret() -> String {
	random_string(SECRET_LENGTH)
}


// vim: ts=4
