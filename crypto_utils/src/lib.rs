//! Hashing, HMAC and base58 primitives shared by the extended-key crates.

pub mod base58;
pub mod hash;
pub mod hmac;

pub use base58::Base58Error;
