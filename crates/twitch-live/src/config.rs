//! Fixed client identity and endpoints used for every request.
//!
//! The platform only hands out playback tokens to known web clients, so the
//! values below mirror what the Twitch web player sends. They are plain values
//! injected into the clients at construction so tests can point them at a
//! mock server.

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;

pub(crate) const DEFAULT_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:130.0) Gecko/20100101 Firefox/130.0";

/// Credentials sent with the playback token request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub device_id: String,
    pub user_agent: String,
    /// sha256 of the persisted `PlaybackAccessToken` query.
    pub playback_token_hash: String,
}

impl Default for ClientCredentials {
    fn default() -> Self {
        Self {
            client_id: "kimne78kx3ncx6brgo4mv6wki5h1ko".to_string(),
            device_id: "9rgCoOahmN2k2SV5dyd4ADo5XRN9xD6A".to_string(),
            user_agent: DEFAULT_UA.to_string(),
            playback_token_hash:
                "ed230aa1e33e07eebb8928504583da78a5173989fadfb1ac94be06a04f3cdbe9".to_string(),
        }
    }
}

/// Base URLs of the two services the resolver talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// GraphQL endpoint, e.g. `https://gql.twitch.tv/gql`.
    pub gql: String,
    /// Host serving live manifests, without a trailing slash.
    pub usher: String,
}

impl Endpoints {
    /// Point both services at the same base URL. Handy for mock servers.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            gql: format!("{base}/gql"),
            usher: base.to_string(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gql: "https://gql.twitch.tv/gql".to_string(),
            usher: "https://usher.ttvnw.net".to_string(),
        }
    }
}

/// Settings of the external transcoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    /// Program name or path of the ffmpeg binary.
    pub program: String,
    /// Container extension of the produced file, without the dot.
    pub container: String,
    /// Value passed to `-loglevel`.
    pub log_level: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            container: "mp4".to_string(),
            log_level: "warning".to_string(),
        }
    }
}

/// Build the HTTP client shared by the token client and the manifest source.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}
