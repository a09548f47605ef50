//! Fetch-and-validate helper.
//!
//! [`RequestSender::send`] performs a single blocking GET and hands the body to a
//! [`ResponseValidator`]. Every environmental failure (bad URL, transport error,
//! error status, unreadable body) turns into `Ok(false)` plus a diagnostic. Only
//! caller misuse, an absent request, is returned as an error.

use std::sync::Arc;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::core::config::FetchConfig;
use crate::core::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::core::errors::{FeederError, Result};
use crate::core::lines::concat_lines;

/// Decides whether a fetched body is satisfying.
pub trait ResponseValidator {
    /// `body` is the response text with its line breaks removed.
    fn is_good(&self, body: &str) -> bool;
}

impl<F> ResponseValidator for F
where
    F: Fn(&str) -> bool,
{
    fn is_good(&self, body: &str) -> bool {
        self(body)
    }
}

/// Accepts any body containing a fixed piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsText {
    needle: String,
}

impl ContainsText {
    /// Validator looking for `needle`.
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl ResponseValidator for ContainsText {
    fn is_good(&self, body: &str) -> bool {
        body.contains(&self.needle)
    }
}

/// Accepts any body that is not empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonEmptyBody;

impl ResponseValidator for NonEmptyBody {
    fn is_good(&self, body: &str) -> bool {
        !body.is_empty()
    }
}

/// Sends GET requests and validates their responses.
pub struct RequestSender<V> {
    client: Client,
    validator: V,
    sink: Arc<dyn DiagnosticSink>,
}

impl<V: ResponseValidator> RequestSender<V> {
    /// Sender with default fetch settings: no timeout.
    pub fn new(validator: V) -> Result<Self> {
        Self::from_config(&FetchConfig::default(), validator)
    }

    /// Sender using the configured timeout and user agent.
    pub fn from_config(config: &FetchConfig, validator: V) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            validator,
            sink: Arc::new(TracingSink),
        })
    }

    /// Report diagnostics to `sink` instead.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validator applied to fetched bodies.
    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Fetch `request` and validate the body.
    ///
    /// Returns `Ok(true)` only when the fetch succeeds and the validator accepts the
    /// body. An absent request is a [`FeederError::Precondition`].
    pub fn send<'a>(&self, request: impl Into<Option<&'a str>>) -> Result<bool> {
        let Some(request) = request.into() else {
            return Err(FeederError::precondition(
                "can't send a request to an absent URL",
            ));
        };

        let url = match Url::parse(request) {
            Ok(url) => url,
            Err(e) => {
                debug!("Rejecting '{}': {}", request, e);
                self.sink.report(Diagnostic::MalformedUrl {
                    url: request.to_string(),
                });
                return Ok(false);
            }
        };

        match self.fetch(url) {
            Ok(body) => Ok(self.validator.is_good(&body)),
            Err(e) => {
                self.sink.report(Diagnostic::RequestFailed {
                    url: request.to_string(),
                    reason: e.to_string(),
                });
                Ok(false)
            }
        }
    }

    /// GET `url` and return its body with the line breaks removed.
    ///
    /// Error statuses (4xx, 5xx) are failures.
    pub fn fetch(&self, url: Url) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.text()?;
        Ok(concat_lines(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::CollectingSink;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a local port and return its URL.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/cards", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        });
        (url, handle)
    }

    fn sender_with_sink<V: ResponseValidator>(validator: V) -> (RequestSender<V>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let sender = RequestSender::new(validator).unwrap().with_sink(sink.clone());
        (sender, sink)
    }

    #[test]
    fn test_absent_request_is_precondition_error() {
        let (sender, sink) = sender_with_sink(NonEmptyBody);

        let err = sender.send(None::<&str>).unwrap_err();

        assert!(err.is_precondition());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_malformed_url_returns_false() {
        let (sender, sink) = sender_with_sink(NonEmptyBody);

        assert!(!sender.send("not a url").unwrap());
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::MalformedUrl {
                url: "not a url".to_string()
            }]
        );
    }

    #[test]
    fn test_good_response_is_validated_without_line_breaks() {
        let (url, server) = serve_once("200 OK", "<ul>\r\n<li>Island</li>\n</ul>\n");
        let (sender, sink) =
            sender_with_sink(|body: &str| body == "<ul><li>Island</li></ul>");

        assert!(sender.send(url.as_str()).unwrap());
        assert!(sink.is_empty());
        server.join().unwrap();
    }

    #[test]
    fn test_validator_rejection_returns_false() {
        let (url, server) = serve_once("200 OK", "no cards here");
        let (sender, sink) = sender_with_sink(ContainsText::new("Island"));

        assert!(!sender.send(url.as_str()).unwrap());
        assert!(sink.is_empty());
        server.join().unwrap();
    }

    #[test]
    fn test_error_status_returns_false() {
        let (url, server) = serve_once("404 Not Found", "missing");
        let (sender, sink) = sender_with_sink(NonEmptyBody);

        assert!(!sender.send(url.as_str()).unwrap());
        assert!(matches!(
            sink.diagnostics().as_slice(),
            [Diagnostic::RequestFailed { .. }]
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_connection_refused_returns_false() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let (sender, sink) = sender_with_sink(NonEmptyBody);

        assert!(!sender.send(url.as_str()).unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_validators() {
        assert!(ContainsText::new("Sol").is_good("Sol Ring"));
        assert!(!ContainsText::new("Sol").is_good("Island"));
        assert!(NonEmptyBody.is_good("x"));
        assert!(!NonEmptyBody.is_good(""));
    }
}
