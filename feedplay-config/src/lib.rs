//! Shared configuration library for feedplay.
//!
//! This crate centralizes the compiled defaults, the serde model of the
//! config file, the env/file loading order and the validation guard rails.
//! Both `feedplay-core` and the `feedplay-sim` binary consume these types so
//! there is a single source of truth for defaults.

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::FeedConfigSource;
pub use models::{
    CacheConfig, FeedConfig, OverlayConfig, PlaybackConfig, PrefetchConfig,
    TimerConfig, VisibilityConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
