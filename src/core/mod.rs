//! Shared configuration, context identifiers, paths and errors.
//!
//! Nothing in here knows about categories or items.

pub mod config;
pub mod context;
pub mod errors;
pub mod paths;

pub use config::ManagerConfig;
pub use context::{ContextMode, ItemType, UiContext};
pub use errors::CoreError;
pub use paths::{IconKind, Paths};
