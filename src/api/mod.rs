//! HTTP API module

pub mod docs;
pub mod routes;
pub mod server;

pub use server::ApiServer;
