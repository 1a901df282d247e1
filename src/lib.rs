//! fomo - real-time agent session client
//!
//! A reconnecting WebSocket client for the FOMO Core session protocol, the
//! state that folds its event stream into a chat transcript, a typed REST
//! client, and the `fomo` command-line front end.

pub mod adapters;
pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod traits;
pub mod websocket;
