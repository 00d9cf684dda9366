//! Integration test modules.

mod api;
mod inbox;
mod refresh;
mod session;
