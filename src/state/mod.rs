//! Client-side session state
//!
//! - `aggregator` - folds session events into the conversation
//! - `connection` - projects socket lifecycle onto a connection indicator
//!
//! Both are plain `&mut self`/`&self` state machines owned by one task.

pub mod aggregator;
pub mod connection;

pub use aggregator::SessionAggregator;
pub use connection::{ConnectionState, ConnectionStateProjector};
