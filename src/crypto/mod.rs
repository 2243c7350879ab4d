//! Cryptographic utilities
//!
//! The packet cipher is built on ISAAC, a fast cryptographic pseudorandom
//! number generator. Each connection direction owns an independent generator
//! seeded from the handshake key material.

pub mod isaac;

pub use isaac::Isaac;
