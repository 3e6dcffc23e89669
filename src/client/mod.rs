//! Client side of the marketplace API.
//!
//! [`ApiClient`] speaks HTTP, [`reduce`] is the only way [`ClientState`]
//! changes, and [`Session`] ties the two together the way a UI would:
//! every request dispatches a pending action, then a fulfilled or rejected
//! one.

pub mod api;
pub mod session;
pub mod state;

pub use api::{ApiClient, ClientError};
pub use session::Session;
pub use state::{reduce, Action, ClientState, Slice, Status};
