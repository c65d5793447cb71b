pub mod parser;
pub mod transport;
pub mod types;

use crate::config::Settings;
use crate::feed::transport::{FeedTransport, HttpFeedTransport};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    Relay,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFailure {
    /// Both retrieval paths failed. `relay` is `None` when no relay is configured.
    Retrieval {
        relay: Option<String>,
        direct: String,
    },
    EmptyBody,
    Malformed(String),
    NoEntries,
}

impl fmt::Display for FeedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieval {
                relay: Some(relay),
                direct,
            } => write!(f, "relay fetch failed ({relay}); direct fetch failed ({direct})"),
            Self::Retrieval { relay: None, direct } => write!(f, "direct fetch failed ({direct})"),
            Self::EmptyBody => write!(f, "feed body was empty"),
            Self::Malformed(msg) => write!(f, "feed is not well-formed XML: {msg}"),
            Self::NoEntries => write!(f, "no <item> or <entry> elements in feed"),
        }
    }
}

/// Result of one fetch. Never an error: callers decide what an unavailable feed means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Digest {
        text: String,
        path: FetchPath,
        items: usize,
    },
    Unavailable(FeedFailure),
}

impl FeedOutcome {
    /// Digest text, or `""` when the feed was unavailable.
    pub fn digest(&self) -> &str {
        match self {
            Self::Digest { text, .. } => text,
            Self::Unavailable(_) => "",
        }
    }
}

#[derive(Clone)]
pub struct NewsFetcher {
    transport: Arc<dyn FeedTransport>,
    relay_url: Option<String>,
}

impl NewsFetcher {
    pub fn new(transport: Arc<dyn FeedTransport>, relay_url: Option<String>) -> Self {
        Self {
            transport,
            relay_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(HttpFeedTransport::new()),
            settings.feed_relay_url.clone(),
        )
    }

    fn relay_request_url(&self, feed_url: &str) -> Option<anyhow::Result<String>> {
        let relay = self.relay_url.as_deref()?;
        Some(
            url::Url::parse_with_params(relay, &[("url", feed_url)])
                .map(String::from)
                .map_err(|e| anyhow::anyhow!("invalid relay URL {relay}: {e}")),
        )
    }

    /// Relay first, then one direct attempt. Each path is tried at most once.
    async fn retrieve(&self, feed_url: &str) -> Result<(String, FetchPath), FeedFailure> {
        let relay_error = match self.relay_request_url(feed_url) {
            None => None,
            Some(Ok(relay_url)) => match self.transport.get_text(&relay_url).await {
                Ok(body) => return Ok((body, FetchPath::Relay)),
                Err(err) => {
                    tracing::warn!(%feed_url, error = %format!("{err:#}"), "relay fetch failed; trying direct");
                    Some(format!("{err:#}"))
                }
            },
            Some(Err(err)) => {
                tracing::warn!(%feed_url, error = %err, "relay URL unusable; trying direct");
                Some(format!("{err:#}"))
            }
        };

        match self.transport.get_text(feed_url).await {
            Ok(body) => Ok((body, FetchPath::Direct)),
            Err(err) => Err(FeedFailure::Retrieval {
                relay: relay_error,
                direct: format!("{err:#}"),
            }),
        }
    }

    pub async fn fetch(&self, feed_url: &str, max_items: usize) -> FeedOutcome {
        let outcome = match self.retrieve(feed_url).await {
            Ok((body, path)) => digest_from_body(&body, max_items, path),
            Err(failure) => FeedOutcome::Unavailable(failure),
        };

        match &outcome {
            FeedOutcome::Digest { path, items, .. } => {
                tracing::info!(%feed_url, ?path, items, "fetched feed digest");
            }
            FeedOutcome::Unavailable(failure) => {
                tracing::warn!(%feed_url, cause = %failure, "feed unavailable");
            }
        }
        outcome
    }
}

pub fn digest_from_body(body: &str, max_items: usize, path: FetchPath) -> FeedOutcome {
    if body.trim().is_empty() {
        return FeedOutcome::Unavailable(FeedFailure::EmptyBody);
    }

    let items = match parser::parse_feed(body, max_items) {
        Ok(items) => items,
        Err(err) => return FeedOutcome::Unavailable(FeedFailure::Malformed(format!("{err:#}"))),
    };
    if items.is_empty() {
        return FeedOutcome::Unavailable(FeedFailure::NoEntries);
    }

    FeedOutcome::Digest {
        text: types::render_digest(&items),
        path,
        items: items.len(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::transport::FeedTransport;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by exact URL; unknown URLs fail like a network error.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub responses: HashMap<String, Result<String, String>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub fn with(mut self, url: &str, response: Result<&str, &str>) -> Self {
            self.responses.insert(
                url.to_string(),
                response.map(str::to_string).map_err(str::to_string),
            );
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl FeedTransport for ScriptedTransport {
        async fn get_text(&self, url: &str) -> anyhow::Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(msg)) => Err(anyhow::anyhow!("{msg}")),
                None => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;

    const FEED_URL: &str = "https://news.example.com/rss";
    const RELAY: &str = "https://relay.example.com/raw";
    const RELAYED: &str = "https://relay.example.com/raw?url=https%3A%2F%2Fnews.example.com%2Frss";

    const FEED: &str = r#"<rss><channel>
        <item><title>One</title><link>https://a</link><description>first</description></item>
        <item><title>Two</title><link>https://b</link><description>second</description></item>
    </channel></rss>"#;

    fn fetcher(transport: ScriptedTransport) -> (NewsFetcher, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        (
            NewsFetcher::new(transport.clone(), Some(RELAY.to_string())),
            transport,
        )
    }

    #[tokio::test]
    async fn relay_success_skips_direct_fetch() {
        let (fetcher, transport) = fetcher(ScriptedTransport::default().with(RELAYED, Ok(FEED)));
        let outcome = fetcher.fetch(FEED_URL, 5).await;

        assert!(matches!(
            outcome,
            FeedOutcome::Digest {
                path: FetchPath::Relay,
                items: 2,
                ..
            }
        ));
        assert_eq!(transport.requested(), vec![RELAYED.to_string()]);
    }

    #[tokio::test]
    async fn direct_fallback_yields_same_digest_as_relay() {
        let (via_relay, _) = fetcher(ScriptedTransport::default().with(RELAYED, Ok(FEED)));
        let (via_direct, transport) = fetcher(
            ScriptedTransport::default()
                .with(RELAYED, Err("feed HTTP 502 Bad Gateway"))
                .with(FEED_URL, Ok(FEED)),
        );

        let relayed = via_relay.fetch(FEED_URL, 5).await;
        let direct = via_direct.fetch(FEED_URL, 5).await;

        assert_eq!(relayed.digest(), direct.digest());
        assert!(!direct.digest().is_empty());
        assert!(matches!(
            direct,
            FeedOutcome::Digest {
                path: FetchPath::Direct,
                ..
            }
        ));
        assert_eq!(
            transport.requested(),
            vec![RELAYED.to_string(), FEED_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn both_paths_failing_keeps_both_causes() {
        let (fetcher, transport) = fetcher(
            ScriptedTransport::default()
                .with(RELAYED, Err("relay timeout"))
                .with(FEED_URL, Err("feed HTTP 403 Forbidden")),
        );
        let outcome = fetcher.fetch(FEED_URL, 5).await;

        assert_eq!(outcome.digest(), "");
        assert_eq!(
            outcome,
            FeedOutcome::Unavailable(FeedFailure::Retrieval {
                relay: Some("relay timeout".to_string()),
                direct: "feed HTTP 403 Forbidden".to_string(),
            })
        );
        assert_eq!(transport.requested().len(), 2);
    }

    #[tokio::test]
    async fn relay_success_with_bad_body_does_not_fall_back() {
        let (fetcher, transport) = fetcher(
            ScriptedTransport::default()
                .with(RELAYED, Ok("<html><body>Rate limited"))
                .with(FEED_URL, Ok(FEED)),
        );
        let outcome = fetcher.fetch(FEED_URL, 5).await;

        assert!(matches!(
            outcome,
            FeedOutcome::Unavailable(FeedFailure::Malformed(_))
        ));
        assert_eq!(transport.requested().len(), 1);
    }

    #[tokio::test]
    async fn without_relay_goes_direct() {
        let transport = Arc::new(ScriptedTransport::default().with(FEED_URL, Ok(FEED)));
        let fetcher = NewsFetcher::new(transport.clone(), None);
        let outcome = fetcher.fetch(FEED_URL, 1).await;

        assert_eq!(outcome.digest().matches("Title:").count(), 1);
        assert_eq!(transport.requested(), vec![FEED_URL.to_string()]);
    }

    #[test]
    fn empty_and_entryless_bodies_are_unavailable() {
        assert_eq!(
            digest_from_body("  ", 5, FetchPath::Direct),
            FeedOutcome::Unavailable(FeedFailure::EmptyBody)
        );
        assert_eq!(
            digest_from_body("<rss><channel/></rss>", 5, FetchPath::Direct),
            FeedOutcome::Unavailable(FeedFailure::NoEntries)
        );
        assert_eq!(
            digest_from_body("<rss><channel/></rss>", 5, FetchPath::Direct).digest(),
            ""
        );
    }
}
