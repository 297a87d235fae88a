//! Playback access token handshake against the GraphQL API.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{ClientCredentials, Endpoints};
use crate::error::{Error, Result};

/// Short-lived token authorizing manifest retrieval for one channel session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackToken {
    pub value: String,
    pub signature: String,
}

#[derive(Debug, Deserialize)]
struct GqlResponse {
    data: Option<TokenData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    stream_playback_access_token: Option<PlaybackToken>,
}

pub struct PlaybackTokenClient {
    client: Client,
    credentials: ClientCredentials,
    endpoints: Endpoints,
}

impl PlaybackTokenClient {
    const OPERATION: &str = "PlaybackAccessToken";

    pub fn new(client: Client, credentials: ClientCredentials, endpoints: Endpoints) -> Self {
        Self {
            client,
            credentials,
            endpoints,
        }
    }

    fn build_persisted_query_request(&self, channel: &str) -> serde_json::Value {
        serde_json::json!({
            "operationName": Self::OPERATION,
            "variables": {
                "isLive": true,
                "login": channel,
                "isVod": false,
                "vodID": "",
                "playerType": "site",
                "platform": "web",
            },
            "extensions": {
                "persistedQuery": {
                    "version": 1,
                    "sha256Hash": self.credentials.playback_token_hash,
                }
            },
        })
    }

    /// Request a playback token for `channel`.
    ///
    /// A null or missing `streamPlaybackAccessToken` means the channel does not
    /// exist and yields [`Error::StreamerNotFound`]. A body without `data` is an
    /// [`Error::UnexpectedResponse`]; one that does not decode is [`Error::Json`].
    pub async fn fetch_playback_token(&self, channel: &str) -> Result<PlaybackToken> {
        let body = self.build_persisted_query_request(channel);
        debug!(channel, "requesting playback access token");

        let response = self
            .client
            .post(&self.endpoints.gql)
            .header(reqwest::header::USER_AGENT, &self.credentials.user_agent)
            .header("Client-Id", &self.credentials.client_id)
            .header("Device-Id", &self.credentials.device_id)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(channel, len = body.len(), "playback token response received");

        let response: GqlResponse = serde_json::from_str(&body)?;
        let data = response
            .data
            .ok_or_else(|| Error::unexpected("missing `data` in playback token response"))?;

        data.stream_playback_access_token
            .ok_or_else(|| Error::StreamerNotFound {
                channel: channel.to_string(),
            })
    }
}
