//! Resolve the quality variants of a Twitch live stream and record one of
//! them with ffmpeg.
//!
//! The flow is strictly sequential:
//!
//! 1. [`identity::resolve_channel`] turns a profile URL into a handle.
//! 2. [`token::PlaybackTokenClient`] obtains a signed playback token.
//! 3. [`catalog::CatalogBuilder`] fetches the live manifest and lists its variants.
//! 4. [`selector::select_variant`] picks one variant.
//! 5. [`supervisor::Supervisor`] runs ffmpeg until it exits or is interrupted.
//!
//! [`pipeline::Pipeline`] chains the stages.

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod selector;
pub mod supervisor;
pub mod token;

pub use catalog::{
    CatalogBuilder, HttpManifestSource, ManifestSource, Resolution, StreamVariant,
    VariantCatalog, VariantDescriptor,
};
pub use config::{ClientCredentials, Endpoints, TranscoderConfig, build_http_client};
pub use error::{Error, Result};
pub use identity::resolve_channel;
pub use pipeline::{Delivery, Outcome, Pipeline, Resolved};
pub use selector::select_variant;
pub use supervisor::{
    CtrlC, DownloadReport, DownloadRequest, DownloadStatus, InterruptSource, Supervisor,
    TranscodeMode,
};
pub use token::{PlaybackToken, PlaybackTokenClient};
