//! Brush Manager - brush and texture library manager for 3D painting modes
//!
//! Categories and items live here; the brush/texture settings themselves stay
//! in the host document behind [`data::Host`].

pub mod app_meta;
pub mod core;
pub mod data;
pub mod import;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::core::{ContextMode, CoreError, ItemType, ManagerConfig, Paths, UiContext};
pub use data::{AddonData, AddonDataByMode, Host, MemoryHost};
pub use import::{ImportError, ImportOptions, LibraryImport};

/// Install the tracing subscriber. Later calls are no-ops.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brush_manager=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Brush manager initializing...");
    }
}
