//! igkit-cli: command-line order entry for IG.
//!
//! Reads credentials and dealing defaults from `igctl.toml`, logs in, and
//! runs one command. Orders are validated locally against the instrument's
//! dealing rules before anything is sent, and every order decision is
//! appended to a JSONL audit trail.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
