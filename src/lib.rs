//! # Market Tx
//!
//! Transaction pipeline for a prediction market: preflight balance checks, token approvals,
//! construction through the transaction backend and submission through a signing gateway.

pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod lock;
pub mod orchestrator;
pub mod preflight;
pub mod serde;
pub mod signers;
pub mod types;
