//! EOS History Query API
//!
//! This crate provides a read-only HTTP surface over an EOS blockchain
//! history store: paged action traces, voters, accounts, transactions,
//! blocks, and derived account/contract summaries, served as JSON.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod params;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{HistoryError, Result};
pub use service::HistoryService;
