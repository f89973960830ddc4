//! Caption loading
//!
//! The caption source is resolved once per widget by comparing the caption
//! track URL with the host document URL:
//! - Same document: captions are embedded in the page and parsed
//!   synchronously with the inline parser. This path cannot fail.
//! - Other document: the content is fetched, stripped of embedded media and
//!   parsed with the inline parser if it is an HTML document, with the
//!   timed-text parser otherwise.

use crate::captions::{Caption, CaptionTrack, InlineParser, TtmlParser};
use crate::config::WidgetConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Marker that identifies a fetched document as HTML
const HTML_MARKER: &str = "<html";

/// The page hosting the widget
#[derive(Debug, Clone)]
pub struct HostDocument {
    /// Page URL
    pub url: Url,
    /// Page markup that may embed captions
    pub markup: String,
}

impl HostDocument {
    pub fn new(url: Url, markup: impl Into<String>) -> Self {
        Self {
            url,
            markup: markup.into(),
        }
    }
}

/// Where a widget's captions live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionSource {
    /// Embedded in the host document, optionally inside the element whose
    /// id is the URL fragment
    Embedded { fragment: Option<String> },
    /// A separate resource
    External { url: Url },
}

impl CaptionSource {
    /// Resolve a caption track `src` against the host document URL
    pub fn resolve(track_src: &str, document_url: &Url) -> Result<Self> {
        let absolute = document_url.join(track_src)?;

        let mut without_fragment = absolute.clone();
        without_fragment.set_fragment(None);
        let mut document = document_url.clone();
        document.set_fragment(None);

        if without_fragment == document {
            Ok(CaptionSource::Embedded {
                fragment: absolute.fragment().filter(|f| !f.is_empty()).map(str::to_string),
            })
        } else {
            Ok(CaptionSource::External { url: absolute })
        }
    }
}

/// Which parser a fetched document needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    /// HTML document with inline caption elements
    Inline,
    /// Timed-text (TTML-like) document
    Ttml,
}

impl CaptionFormat {
    /// Detect the format from the document content
    pub fn detect(content: &str) -> Self {
        if content.contains(HTML_MARKER) {
            CaptionFormat::Inline
        } else {
            CaptionFormat::Ttml
        }
    }
}

/// Terminal result of a caption load
#[derive(Debug, Clone)]
pub enum CaptionLoadOutcome {
    /// Captions are available
    Loaded(CaptionTrack),
    /// The external document could not be retrieved
    Failed(Arc<Error>),
}

/// Retrieves the raw text of an external caption document
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// HTTP caption fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CaptionFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::CaptionFetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::CaptionStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| Error::CaptionFetch {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Loads and parses caption tracks
pub struct CaptionLoader {
    fetcher: Arc<dyn CaptionFetcher>,
    inline: InlineParser,
    strip_embedded_media: bool,
}

impl CaptionLoader {
    pub fn new(fetcher: Arc<dyn CaptionFetcher>, config: &WidgetConfig) -> Self {
        Self {
            fetcher,
            inline: InlineParser::new(config.caption_class.clone()),
            strip_embedded_media: config.strip_embedded_media,
        }
    }

    /// Load captions from a resolved source
    pub async fn load(&self, source: &CaptionSource, document: &HostDocument) -> CaptionLoadOutcome {
        match source {
            CaptionSource::Embedded { fragment } => self.load_internal(document, fragment.as_deref()),
            CaptionSource::External { url } => self.load_external(url).await,
        }
    }

    /// Parse captions embedded in the host document
    pub fn load_internal(&self, document: &HostDocument, fragment: Option<&str>) -> CaptionLoadOutcome {
        let captions = self.parse_embedded(&document.markup, fragment);
        info!(count = captions.len(), "Embedded captions loaded");
        CaptionLoadOutcome::Loaded(captions.into())
    }

    /// Fetch and parse an external caption document
    #[instrument(skip(self))]
    pub async fn load_external(&self, url: &Url) -> CaptionLoadOutcome {
        match self.fetcher.fetch(url).await {
            Ok(content) => {
                let captions = self.parse_external(&content);
                info!(url = %url, count = captions.len(), "External captions loaded");
                CaptionLoadOutcome::Loaded(captions.into())
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Caption load failed");
                CaptionLoadOutcome::Failed(Arc::new(e))
            }
        }
    }

    /// Parse fetched caption content, picking the parser from its markup
    pub fn parse_external(&self, content: &str) -> Vec<Caption> {
        let content = if self.strip_embedded_media {
            crate::captions::strip_embedded_media(content)
        } else {
            content.to_string()
        };

        let format = CaptionFormat::detect(&content);
        debug!(?format, "Detected caption format");

        match format {
            CaptionFormat::Inline => self.inline.parse(&content),
            CaptionFormat::Ttml => TtmlParser.parse(&content),
        }
    }

    fn parse_embedded(&self, markup: &str, fragment: Option<&str>) -> Vec<Caption> {
        match fragment {
            Some(id) => self.inline.parse_within(markup, id),
            None => self.inline.parse(markup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        body: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CaptionFetcher for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().ok_or(Error::CaptionStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn loader(body: Option<&str>) -> (CaptionLoader, Arc<StaticFetcher>) {
        let fetcher = Arc::new(StaticFetcher {
            body: body.map(str::to_string),
            calls: AtomicUsize::new(0),
        });
        (CaptionLoader::new(fetcher.clone(), &WidgetConfig::default()), fetcher)
    }

    fn page() -> Url {
        Url::parse("https://example.com/videos/page.html").unwrap()
    }

    #[test]
    fn test_resolve_external() {
        let source = CaptionSource::resolve("captions/en.xml", &page()).unwrap();
        assert_eq!(
            source,
            CaptionSource::External {
                url: Url::parse("https://example.com/videos/captions/en.xml").unwrap()
            }
        );
    }

    #[test]
    fn test_resolve_embedded() {
        assert_eq!(
            CaptionSource::resolve("#transcript", &page()).unwrap(),
            CaptionSource::Embedded {
                fragment: Some("transcript".into())
            }
        );
        assert_eq!(
            CaptionSource::resolve("page.html", &page()).unwrap(),
            CaptionSource::Embedded { fragment: None }
        );
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(CaptionFormat::detect("<html><body></body></html>"), CaptionFormat::Inline);
        assert_eq!(CaptionFormat::detect("<tt><body></body></tt>"), CaptionFormat::Ttml);
    }

    #[tokio::test]
    async fn test_external_html_uses_inline_parser() {
        let html = r#"<html><body><p class="wb-tmtxt" data-begin="1s" data-dur="1s">hi<img src="a.png"></p></body></html>"#;
        let (loader, fetcher) = loader(Some(html));

        let outcome = loader.load_external(&page().join("c.html").unwrap()).await;
        match outcome {
            CaptionLoadOutcome::Loaded(track) => {
                assert_eq!(track.len(), 1);
                assert_eq!(track[0].text(), "hi");
            }
            CaptionLoadOutcome::Failed(e) => panic!("unexpected failure: {}", e),
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_external_failure() {
        let (loader, _) = loader(None);
        let outcome = loader.load_external(&page().join("missing.xml").unwrap()).await;
        match outcome {
            CaptionLoadOutcome::Failed(e) => assert_eq!(e.error_code(), "CAPTION_STATUS"),
            CaptionLoadOutcome::Loaded(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_internal_with_fragment() {
        let markup = r#"<html><body>
            <div id="other"><p class="wb-tmtxt" data-begin="1s" data-dur="1s">elsewhere</p></div>
            <div id="transcript"><p class="wb-tmtxt" data-begin="2s" data-dur="1s">here</p></div>
        </body></html>"#;
        let (loader, fetcher) = loader(None);
        let document = HostDocument::new(page(), markup);

        match loader.load_internal(&document, Some("transcript")) {
            CaptionLoadOutcome::Loaded(track) => {
                assert_eq!(track.len(), 1);
                assert_eq!(track[0].text(), "here");
            }
            CaptionLoadOutcome::Failed(_) => panic!("internal loads never fail"),
        }
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_load_dispatches_on_source() {
        let (loader, fetcher) = loader(Some("<tt><p begin=\"1s\" end=\"2s\">x</p></tt>"));
        let document = HostDocument::new(page(), "");

        let external = CaptionSource::resolve("en.xml", &page()).unwrap();
        let outcome = tokio_test::block_on(loader.load(&external, &document));
        assert!(matches!(outcome, CaptionLoadOutcome::Loaded(track) if track.len() == 1));

        let embedded = CaptionSource::resolve("#none", &page()).unwrap();
        let outcome = tokio_test::block_on(loader.load(&embedded, &document));
        assert!(matches!(outcome, CaptionLoadOutcome::Loaded(track) if track.is_empty()));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_internal_empty_is_loaded() {
        let (loader, _) = loader(None);
        let document = HostDocument::new(page(), "<p>no captions</p>");
        assert!(matches!(
            loader.load_internal(&document, None),
            CaptionLoadOutcome::Loaded(track) if track.is_empty()
        ));
    }
}
