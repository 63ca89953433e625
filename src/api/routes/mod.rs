//! Route handlers for the history API

pub mod accounts;
pub mod actions;
pub mod blocks;
pub mod transactions;
