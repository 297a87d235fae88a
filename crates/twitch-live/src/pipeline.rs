//! Channel input to recorded file (or printed URL), one stage at a time.

use std::path::PathBuf;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::catalog::{CatalogBuilder, HttpManifestSource, ManifestSource, StreamVariant, VariantCatalog};
use crate::config::{ClientCredentials, Endpoints, TranscoderConfig};
use crate::error::{Error, Result};
use crate::identity::resolve_channel;
use crate::selector::select_variant;
use crate::supervisor::{DownloadReport, DownloadRequest, InterruptSource, Supervisor};
use crate::token::PlaybackTokenClient;

/// A live channel with its catalog and the variant chosen from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub channel: String,
    pub catalog: VariantCatalog,
    pub variant: StreamVariant,
}

/// What to do with a resolved variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    PrintUrl,
    Download {
        destination: PathBuf,
        frame_rate: Option<u32>,
    },
}

#[derive(Debug)]
pub enum Outcome {
    StreamerNotFound,
    Offline,
    NoStreams,
    Failed(Error),
    Url(Resolved),
    Downloaded(DownloadReport),
}

impl Outcome {
    /// Log a terminal error at the level it deserves and wrap it.
    pub fn from_error(err: Error) -> Self {
        if !err.is_expected() {
            error!(error = ?err, "Failed to resolve stream: {}", err);
            return Self::Failed(err);
        }

        match err {
            Error::StreamerNotFound { channel } => {
                error!("Cannot find streamer {}", channel);
                Self::StreamerNotFound
            }
            Error::Offline { channel } => {
                warn!("Streamer {} is offline", channel);
                Self::Offline
            }
            Error::NoStreamsFound { channel } => {
                warn!("No streams found for {}", channel);
                Self::NoStreams
            }
            err => Self::Failed(err),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Url(_) => true,
            Self::Downloaded(report) => report.is_success(),
            _ => false,
        }
    }
}

pub struct Pipeline<M = HttpManifestSource> {
    tokens: PlaybackTokenClient,
    catalogs: CatalogBuilder<M>,
    supervisor: Supervisor,
}

impl Pipeline<HttpManifestSource> {
    pub fn new(
        client: Client,
        credentials: ClientCredentials,
        endpoints: Endpoints,
        transcoder: TranscoderConfig,
    ) -> Self {
        Self {
            tokens: PlaybackTokenClient::new(client.clone(), credentials, endpoints.clone()),
            catalogs: CatalogBuilder::new(client, endpoints),
            supervisor: Supervisor::new(transcoder),
        }
    }
}

impl<M: ManifestSource> Pipeline<M> {
    pub fn from_parts(
        tokens: PlaybackTokenClient,
        catalogs: CatalogBuilder<M>,
        supervisor: Supervisor,
    ) -> Self {
        Self {
            tokens,
            catalogs,
            supervisor,
        }
    }

    /// Resolve `input` (handle or profile URL) to a variant of the live stream.
    pub async fn resolve(&self, input: &str, desired_height: Option<u32>) -> Result<Resolved> {
        let channel = resolve_channel(input).to_string();

        let token = self.tokens.fetch_playback_token(&channel).await?;
        let catalog = self.catalogs.build_catalog(&channel, &token).await?;
        if catalog.is_empty() {
            return Err(Error::NoStreamsFound { channel });
        }

        let variant = select_variant(&catalog, desired_height)?.clone();
        match desired_height {
            Some(height) if height != variant.height() => info!(
                channel = %channel,
                "Quality {}p not available, falling back to {}",
                height,
                variant
            ),
            _ => info!(channel = %channel, "Selected {}", variant),
        }

        Ok(Resolved {
            channel,
            catalog,
            variant,
        })
    }

    /// Resolve `input`, then print or download according to `decide`.
    ///
    /// Terminal conditions are logged here and returned as an [`Outcome`];
    /// the transcoder is only started once a variant is in hand.
    pub async fn run<F, I>(
        &self,
        input: &str,
        desired_height: Option<u32>,
        decide: F,
        interrupts: &mut I,
    ) -> Outcome
    where
        F: FnOnce(&Resolved) -> Delivery,
        I: InterruptSource + ?Sized,
    {
        let resolved = match self.resolve(input, desired_height).await {
            Ok(resolved) => resolved,
            Err(e) => return Outcome::from_error(e),
        };

        match decide(&resolved) {
            Delivery::PrintUrl => Outcome::Url(resolved),
            Delivery::Download {
                destination,
                frame_rate,
            } => {
                let request = DownloadRequest {
                    variant: resolved.variant,
                    channel: resolved.channel,
                    frame_rate,
                    destination,
                };
                Outcome::Downloaded(self.supervisor.download(&request, interrupts).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_error() {
        let outcome = Outcome::from_error(Error::StreamerNotFound {
            channel: "alice".to_string(),
        });
        assert!(matches!(outcome, Outcome::StreamerNotFound));

        let outcome = Outcome::from_error(Error::Offline {
            channel: "alice".to_string(),
        });
        assert!(matches!(outcome, Outcome::Offline));

        let outcome = Outcome::from_error(Error::NoStreamsFound {
            channel: "alice".to_string(),
        });
        assert!(matches!(outcome, Outcome::NoStreams));

        let outcome = Outcome::from_error(Error::manifest("truncated"));
        assert!(matches!(outcome, Outcome::Failed(Error::Manifest(_))));
        assert!(!outcome.is_success());
    }
}
