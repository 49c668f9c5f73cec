//! A single-process proof-of-work blockchain node: an append-only chain,
//! a pending transaction pool, brute-force mining and longest-valid-chain
//! consensus across peers.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod network;
pub mod node;
pub mod transaction;
