//! Live manifest retrieval and the variant catalog built from it.

use std::fmt;

use async_trait::async_trait;
use m3u8_rs::Playlist;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::Endpoints;
use crate::error::{Error, Result};
use crate::token::PlaybackToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One rendition of a live stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamVariant {
    resolution: Resolution,
    frame_rate: f64,
    url: String,
}

impl StreamVariant {
    pub fn new(resolution: Resolution, frame_rate: f64, url: impl Into<String>) -> Self {
        Self {
            resolution,
            frame_rate,
            url: url.into(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn height(&self) -> u32 {
        self.resolution.height
    }

    /// Nominal frames per second of the source encode.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn rounded_frame_rate(&self) -> u32 {
        self.frame_rate.round() as u32
    }

    /// Media playlist URL of this variant.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for StreamVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p{}", self.height(), self.rounded_frame_rate())
    }
}

/// Variants of one manifest, in manifest order.
///
/// An empty catalog is valid: the channel has nothing to offer right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantCatalog {
    variants: Vec<StreamVariant>,
}

impl VariantCatalog {
    pub fn new(variants: Vec<StreamVariant>) -> Self {
        Self { variants }
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn first(&self) -> Option<&StreamVariant> {
        self.variants.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StreamVariant> {
        self.variants.iter()
    }
}

impl<'a> IntoIterator for &'a VariantCatalog {
    type Item = &'a StreamVariant;
    type IntoIter = std::slice::Iter<'a, StreamVariant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// Raw sub-playlist entry as reported by the manifest parser.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDescriptor {
    pub uri: String,
    pub resolution: Option<Resolution>,
    pub frame_rate: Option<f64>,
}

impl TryFrom<VariantDescriptor> for StreamVariant {
    type Error = Error;

    fn try_from(descriptor: VariantDescriptor) -> Result<Self> {
        let resolution = descriptor
            .resolution
            .filter(|r| r.width > 0 && r.height > 0)
            .ok_or_else(|| {
                Error::manifest(format!("variant {} has no resolution", descriptor.uri))
            })?;
        let frame_rate = descriptor
            .frame_rate
            .filter(|fps| *fps > 0.0)
            .ok_or_else(|| {
                Error::manifest(format!("variant {} has no frame rate", descriptor.uri))
            })?;
        Ok(StreamVariant::new(resolution, frame_rate, descriptor.uri))
    }
}

/// Fetches a master playlist and lists its variants.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Returns [`Error::Offline`] when the manifest does not exist (HTTP 404).
    async fn fetch_manifest(&self, channel: &str, url: &str) -> Result<Vec<VariantDescriptor>>;
}

/// [`ManifestSource`] backed by `reqwest` and `m3u8-rs`.
pub struct HttpManifestSource {
    client: Client,
}

impl HttpManifestSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch_manifest(&self, channel: &str, url: &str) -> Result<Vec<VariantDescriptor>> {
        let base_url = Url::parse(url).map_err(|e| Error::manifest(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::Offline {
                channel: channel.to_string(),
            });
        }
        let body = response.error_for_status()?.bytes().await?;

        parse_master_playlist(&body, &base_url)
    }
}

fn parse_master_playlist(body: &[u8], base_url: &Url) -> Result<Vec<VariantDescriptor>> {
    let playlist =
        m3u8_rs::parse_playlist_res(body).map_err(|e| Error::manifest(e.to_string()))?;

    let Playlist::MasterPlaylist(playlist) = playlist else {
        return Err(Error::manifest("expected a master playlist"));
    };

    playlist
        .variants
        .into_iter()
        .filter(|variant| !variant.is_i_frame)
        .filter(|variant| {
            // audio_only carries no RESOLUTION
            let video = variant.resolution.is_some();
            if !video {
                debug!(uri = %variant.uri, "skipping entry without video");
            }
            video
        })
        .map(|variant| -> Result<VariantDescriptor> {
            let uri = base_url
                .join(&variant.uri)
                .map_err(|e| Error::manifest(format!("bad variant uri {}: {e}", variant.uri)))?;
            Ok(VariantDescriptor {
                uri: uri.to_string(),
                resolution: variant.resolution.map(|r| Resolution {
                    width: r.width as u32,
                    height: r.height as u32,
                }),
                frame_rate: variant.frame_rate,
            })
        })
        .collect()
}

/// Build the live manifest URL for `channel`.
pub fn manifest_url(usher: &str, channel: &str, token: &PlaybackToken) -> String {
    format!(
        "{usher}/api/channel/hls/{channel}.m3u8?allow_source=true&cdm=wv&fast_bread=true\
         &platform=web&playlist_include_framerate=true&reassignments_supported=true\
         &sig={sig}&supported_codecs=av1,h264&token={token}&transcode_mode=cbr_v1",
        usher = usher.trim_end_matches('/'),
        sig = urlencoding::encode(&token.signature),
        token = urlencoding::encode(&token.value),
    )
}

pub struct CatalogBuilder<M = HttpManifestSource> {
    source: M,
    endpoints: Endpoints,
}

impl CatalogBuilder<HttpManifestSource> {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self::with_source(HttpManifestSource::new(client), endpoints)
    }
}

impl<M: ManifestSource> CatalogBuilder<M> {
    pub fn with_source(source: M, endpoints: Endpoints) -> Self {
        Self { source, endpoints }
    }

    /// Fetch the manifest of `channel` and turn every sub-playlist into a
    /// [`StreamVariant`]. One malformed entry fails the whole catalog.
    pub async fn build_catalog(&self, channel: &str, token: &PlaybackToken) -> Result<VariantCatalog> {
        let url = manifest_url(&self.endpoints.usher, channel, token);
        debug!(channel, "fetching live manifest");

        let variants = self
            .source
            .fetch_manifest(channel, &url)
            .await?
            .into_iter()
            .map(StreamVariant::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(channel, count = variants.len(), "parsed manifest");
        Ok(VariantCatalog::new(variants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MASTER: &str = r#"#EXTM3U
#EXT-X-TWITCH-INFO:NODE="video-edge-c2a4b4.pdx01",MANIFEST-NODE-TYPE="weaver_cluster",SERVER-TIME="1728000000.00"
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID="chunked",NAME="1080p60 (source)",AUTOSELECT=YES,DEFAULT=YES
#EXT-X-STREAM-INF:BANDWIDTH=8534030,RESOLUTION=1920x1080,CODECS="avc1.64002A,mp4a.40.2",VIDEO="chunked",FRAME-RATE=60.000
https://video-weaver.pdx01.hls.ttvnw.net/v1/playlist/chunked.m3u8
#EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID="720p30",NAME="720p",AUTOSELECT=YES,DEFAULT=YES
#EXT-X-STREAM-INF:BANDWIDTH=2373000,RESOLUTION=1280x720,CODECS="avc1.4D401F,mp4a.40.2",VIDEO="720p30",FRAME-RATE=30.000
720p30.m3u8
"#;

    fn token() -> PlaybackToken {
        PlaybackToken {
            value: "tok-123".to_string(),
            signature: "sig-456".to_string(),
        }
    }

    #[test]
    fn test_manifest_url() {
        let token = PlaybackToken {
            value: r#"{"channel":"alice","expires":1}"#.to_string(),
            signature: "deadbeef".to_string(),
        };
        let url = manifest_url("https://usher.ttvnw.net", "alice", &token);
        assert_eq!(
            url,
            "https://usher.ttvnw.net/api/channel/hls/alice.m3u8?allow_source=true&cdm=wv\
             &fast_bread=true&platform=web&playlist_include_framerate=true\
             &reassignments_supported=true&sig=deadbeef&supported_codecs=av1,h264\
             &token=%7B%22channel%22%3A%22alice%22%2C%22expires%22%3A1%7D&transcode_mode=cbr_v1"
        );
    }

    #[test]
    fn test_parse_master_playlist() {
        let base = Url::parse("https://usher.ttvnw.net/api/channel/hls/alice.m3u8").unwrap();
        let variants = parse_master_playlist(MASTER.as_bytes(), &base).unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(
            variants[0],
            VariantDescriptor {
                uri: "https://video-weaver.pdx01.hls.ttvnw.net/v1/playlist/chunked.m3u8"
                    .to_string(),
                resolution: Some(Resolution {
                    width: 1920,
                    height: 1080
                }),
                frame_rate: Some(60.0),
            }
        );
        assert_eq!(
            variants[1].uri,
            "https://usher.ttvnw.net/api/channel/hls/720p30.m3u8"
        );
    }

    #[test]
    fn test_media_playlist_is_rejected() {
        let base = Url::parse("https://example.com/live.m3u8").unwrap();
        let media = "#EXTM3U\n#EXT-X-TARGETDURATION:2\n#EXTINF:2.000,\nseg0.ts\n";
        let err = parse_master_playlist(media.as_bytes(), &base).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_descriptor_without_resolution_is_rejected() {
        let descriptor = VariantDescriptor {
            uri: "audio_only.m3u8".to_string(),
            resolution: None,
            frame_rate: Some(30.0),
        };
        assert!(StreamVariant::try_from(descriptor).is_err());
    }

    #[tokio::test]
    async fn test_build_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/channel/hls/alice.m3u8"))
            .and(query_param("sig", "sig-456"))
            .and(query_param("token", "tok-123"))
            .and(query_param("supported_codecs", "av1,h264"))
            .and(query_param("transcode_mode", "cbr_v1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MASTER))
            .expect(1)
            .mount(&server)
            .await;

        let builder = CatalogBuilder::new(Client::new(), Endpoints::with_base(&server.uri()));
        let catalog = builder.build_catalog("alice", &token()).await.unwrap();

        assert_eq!(catalog.len(), 2);
        let heights: Vec<u32> = catalog.iter().map(StreamVariant::height).collect();
        assert_eq!(heights, vec![1080, 720]);
        assert_eq!(catalog.first().unwrap().frame_rate(), 60.0);
        assert_eq!(
            catalog.iter().nth(1).unwrap().url(),
            format!("{}/api/channel/hls/720p30.m3u8", server.uri())
        );
    }

    #[tokio::test]
    async fn test_not_found_means_offline() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/channel/hls/alice.m3u8"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Can not find channel"))
            .mount(&server)
            .await;

        let builder = CatalogBuilder::new(Client::new(), Endpoints::with_base(&server.uri()));
        let err = builder.build_catalog("alice", &token()).await.unwrap_err();
        assert!(matches!(err, Error::Offline { ref channel } if channel == "alice"));
    }

    #[tokio::test]
    async fn test_other_http_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let builder = CatalogBuilder::new(Client::new(), Endpoints::with_base(&server.uri()));
        let err = builder.build_catalog("alice", &token()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(!err.is_expected());
    }

    #[tokio::test]
    async fn test_audio_only_rendition_is_skipped() {
        let server = MockServer::start().await;
        let body = format!(
            "{MASTER}\
             #EXT-X-MEDIA:TYPE=VIDEO,GROUP-ID=\"audio_only\",NAME=\"audio_only\",AUTOSELECT=NO,DEFAULT=NO\n\
             #EXT-X-STREAM-INF:BANDWIDTH=160000,CODECS=\"mp4a.40.2\",VIDEO=\"audio_only\"\n\
             audio_only.m3u8\n"
        );
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let builder = CatalogBuilder::new(Client::new(), Endpoints::with_base(&server.uri()));
        let catalog = builder.build_catalog("alice", &token()).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.iter().all(|v| !v.url().ends_with("audio_only.m3u8")));
        let names: Vec<String> = catalog.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["1080p60", "720p30"]);
    }

    #[tokio::test]
    async fn test_video_entry_without_frame_rate_yields_no_catalog() {
        let server = MockServer::start().await;
        let body = "#EXTM3U\n\
            #EXT-X-STREAM-INF:BANDWIDTH=8534030,RESOLUTION=1920x1080,FRAME-RATE=60.000\n\
            chunked.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=2373000,RESOLUTION=1280x720\n\
            720p30.m3u8\n";
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let builder = CatalogBuilder::new(Client::new(), Endpoints::with_base(&server.uri()));
        let err = builder.build_catalog("alice", &token()).await.unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }
}
