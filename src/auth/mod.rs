//! Authentication module for fomo.
//!
//! Only a project API key is involved: it is stored locally by
//! [`CredentialsManager`] and presented to the server by the socket `auth`
//! command and REST Bearer headers.

pub mod credentials;

pub use credentials::{Credentials, CredentialsManager};
