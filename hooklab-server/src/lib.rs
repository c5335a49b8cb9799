// Library exports for hooklab-server so the admin CLI and integration tests
// can share the store and the router

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod import;
pub mod metrics;
pub mod middleware;
pub mod selector;
pub mod session;
pub mod state;
pub mod tally;
