//! Thumbnail overlay shown over a video until its first frame is painted.

pub mod scheduler;
pub mod thumbnail;

pub use scheduler::{DelayElapsed, TokioDelayScheduler};
pub use thumbnail::{
    OverlayIdentity, Rebind, ThumbnailOverlay, TicketSource,
};
