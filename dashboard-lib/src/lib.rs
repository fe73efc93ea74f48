//! Admin dashboard core
//!
//! Data access and tabular presentation shared by every dashboard screen:
//! a remote resource lifecycle with a uniform session-expiry policy, the
//! paginator page window, and a column-driven table projection.

pub mod error;
pub mod pagination;
pub mod request;
pub mod resource;
pub mod session;
pub mod table;

mod client;

pub use client::*;
pub use resource::DataResource;
pub use resource::ResourceState;
pub use session::Session;
