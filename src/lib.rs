//! `netedit-http` is an async HTTP client for session-scoped network topology
//! editing services.
//!
//! - [`SessionApi`] creates and destroys editing sessions.
//! - [`SessionClient`] edits devices, ports and links inside one session and
//!   fetches its topology with bounded retries
//!   ([`SessionClient::fetch_topology_with_retry`]).

mod client;
mod decode;
mod error;
mod options;
mod outcome;
mod retry;
mod session;
mod transport;
mod types;
mod wire;

pub use client::SessionClient;
pub use error::NetEditError;
pub use options::ClientOptions;
pub use retry::{
    ErrorKind, RetryNotice, RetryObserver, DEFAULT_RETRY_LIMIT, UNAVAILABLE_RETRY_DELAY,
};
pub use session::SessionApi;
pub use types::{Device, Link, LinkEndpoint, Network, Port};

pub type Result<T> = std::result::Result<T, NetEditError>;
