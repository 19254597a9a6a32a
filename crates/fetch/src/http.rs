use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Page};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;
use tracing::instrument;

/// [`Fetcher`] over HTTP(S).
///
/// Requests are issued one at a time by the caller. Every request carries
/// the same `User-Agent` header, and every page request is followed by the
/// pacing delay, successful or not. Binary requests are not paced.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    pacing: Duration,
}
impl HttpFetcher {
    pub fn new(user_agent: &str, pacing: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client, pacing })
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))
    }

    /// Sends the request and turns every unusable response into an error.
    /// 503 and 429 are reported as rate limiting whatever else the response
    /// looks like.
    async fn get(&self, url: Url) -> Result<Response> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .or_raise(|| ErrorKind::Transport { url: url.to_string() })?;
        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS {
            exn::bail!(ErrorKind::RateLimited {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn page(&self, url: &str) -> Result<Page> {
        let parsed = Self::parse_url(url)?;
        let outcome = match self.get(parsed).await {
            Ok(response) => response.text().await.or_raise(|| ErrorKind::Transport { url: url.to_string() }),
            Err(e) => Err(e),
        };
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
        let html = outcome?;
        tracing::debug!(bytes = html.len(), "page fetched");
        Ok(Page { url: url.to_string(), html })
    }

    #[instrument(skip(self))]
    async fn binary(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Self::parse_url(url)?;
        let response = self.get(parsed).await?;
        let bytes = response.bytes().await.or_raise(|| ErrorKind::Transport { url: url.to_string() })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_AGENT: &str = "folio-test/1.0";

    fn fetcher(pacing: Duration) -> HttpFetcher {
        HttpFetcher::new(TEST_AGENT, pacing, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_page_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thebookoflife"))
            .and(header("user-agent", TEST_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Book</body></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/thebookoflife", server.uri());
        let page = fetcher(Duration::ZERO).page(&url).await.unwrap();
        assert_eq!(page.url, url);
        assert!(page.html.contains("Book"));
    }

    #[rstest]
    #[case(503, true)]
    #[case(429, true)]
    #[case(404, false)]
    #[case(500, false)]
    #[tokio::test]
    async fn test_page_status_failures(#[case] status: u16, #[case] rate_limited: bool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/chapter"))
            .respond_with(ResponseTemplate::new(status).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/chapter", server.uri());
        let err = fetcher(Duration::ZERO).page(&url).await.unwrap_err();
        assert_eq!(err.status(), Some(status));
        assert!(err.is_transient());
        assert_eq!(matches!(&*err, ErrorKind::RateLimited { .. }), rate_limited);
    }

    #[tokio::test]
    async fn test_page_connection_refused_is_transport() {
        // Nothing listens on port 1.
        let err = fetcher(Duration::ZERO).page("http://127.0.0.1:1/page").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport { .. }));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = fetcher(Duration::ZERO).page("not a url").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidUrl(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_page_is_paced_even_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = fetcher(Duration::from_millis(50));
        assert_eq!(fetcher.pacing(), Duration::from_millis(50));
        let started = Instant::now();
        fetcher.page(&format!("{}/ok", server.uri())).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        let started = Instant::now();
        assert!(fetcher.page(&format!("{}/busy", server.uri())).await.is_err());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_binary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/room.jpg"))
            .and(header("user-agent", TEST_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = fetcher(Duration::ZERO).binary(&format!("{}/images/room.jpg", server.uri())).await.unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_binary_missing() {
        let server = MockServer::start().await;
        let err = fetcher(Duration::ZERO).binary(&format!("{}/images/gone.jpg", server.uri())).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
