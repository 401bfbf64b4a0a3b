//! Mesopotamia Solar website: routing, views, sessions, and startup wiring.

pub mod app;
pub mod middleware;
pub mod session;
