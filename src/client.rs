//! Catalog client
//!
//! Each operation builds the request URL, performs one GET through the
//! configured [`Transport`] and decodes the response envelope. Failures from any
//! stage are returned unchanged, tagged with the operation and endpoint path.

use crate::endpoint::{Endpoint, EndpointError, Filters, Resource, build_url};
use crate::envelope::{DecodeError, decode_list, decode_one};
use crate::model::{Entity, Episode, Series, Translation};
use crate::transport::{
    CallOptions, DEFAULT_CANCELLABLE_TIMEOUT, HttpTransport, Transport, TransportError,
};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// API root used when no other base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://smotret-anime.ru/api/";

/// Request timeout used when no other timeout is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog operations, used to tag errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListSeries,
    GetSeriesById,
    ListTranslations,
    GetTranslationById,
    GetEpisodeById,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListSeries => "list series",
            Operation::GetSeriesById => "get series by id",
            Operation::ListTranslations => "list translations",
            Operation::GetTranslationById => "get translation by id",
            Operation::GetEpisodeById => "get episode by id",
        };
        f.write_str(name)
    }
}

/// What went wrong during a catalog operation
#[derive(Debug, Error)]
pub enum ApiErrorKind {
    #[error(transparent)]
    MalformedEndpoint(#[from] EndpointError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Error returned by every catalog operation
#[derive(Debug, Error)]
#[error("Failed to {operation} ({endpoint}): {kind}")]
pub struct ApiError {
    /// The operation that failed
    pub operation: Operation,
    /// Endpoint path relative to the API root, e.g. `series/42`
    pub endpoint: String,
    #[source]
    pub kind: ApiErrorKind,
}

impl ApiError {
    fn new(operation: Operation, endpoint: &Endpoint, kind: impl Into<ApiErrorKind>) -> Self {
        Self {
            operation,
            endpoint: endpoint.path(),
            kind: kind.into(),
        }
    }
}

/// Errors that can occur while configuring a [`Client`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configured base URL is not a valid URL
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] EndpointError),

    /// The HTTP client could not be initialized (e.g. TLS backend failure)
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Builder for a [`Client`] using the blocking HTTP transport
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientBuilder {
    /// Sets the API root, e.g. `https://smotret-anime.ru/api/`
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout for requests without their own deadline, `None` disables it
    ///
    /// Cancellable requests always have a timeout; with `None` they fall back to
    /// [`DEFAULT_CANCELLABLE_TIMEOUT`].
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<Client, ConfigError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .build()?;

        let transport = HttpTransport::new(http)
            .cancellable_timeout(self.timeout.unwrap_or(DEFAULT_CANCELLABLE_TIMEOUT));

        Client::with_transport(&self.base_url, transport)
    }
}

/// Client for the catalog API
///
/// Holds no state besides its configuration, so a single client can be shared
/// between threads. Calls are independent: nothing is cached or deduplicated.
#[derive(Debug)]
pub struct Client<T = HttpTransport> {
    base_url: Url,
    transport: T,
}

impl Client {
    /// Creates a client with the default configuration
    pub fn new() -> Result<Self, ConfigError> {
        ClientBuilder::default().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client that sends its requests through `transport`
    ///
    /// A trailing `/` is appended to the path of `base_url` when missing so
    /// that resource paths are joined below it rather than replacing its last
    /// segment.
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self, ConfigError> {
        let mut base_url =
            Url::parse(base_url).map_err(|source| EndpointError::MalformedEndpoint {
                path: base_url.to_string(),
                source,
            })?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists series matching `filters`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anime365::{Client, Filters};
    ///
    /// let client = Client::new().unwrap();
    /// let series = client
    ///     .list_series(&Filters::new().with("query", "Bakemonogatari"))
    ///     .unwrap();
    ///
    /// for s in &series {
    ///     println!("{} ({} episodes)", s.title, s.episodes.len());
    /// }
    /// ```
    pub fn list_series(&self, filters: &Filters) -> Result<Vec<Series>, ApiError> {
        self.list_series_with(filters, &CallOptions::default())
    }

    pub fn list_series_with(
        &self,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Vec<Series>, ApiError> {
        self.fetch_list(
            Operation::ListSeries,
            Endpoint::list(Resource::Series),
            filters,
            options,
        )
    }

    /// Fetches one series, `Ok(None)` if the ID is unknown
    pub fn series_by_id(&self, id: u32, filters: &Filters) -> Result<Option<Series>, ApiError> {
        self.series_by_id_with(id, filters, &CallOptions::default())
    }

    pub fn series_by_id_with(
        &self,
        id: u32,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Option<Series>, ApiError> {
        self.fetch_one(
            Operation::GetSeriesById,
            Endpoint::by_id(Resource::Series, id),
            filters,
            options,
        )
    }

    /// Lists translations matching `filters`
    pub fn list_translations(&self, filters: &Filters) -> Result<Vec<Translation>, ApiError> {
        self.list_translations_with(filters, &CallOptions::default())
    }

    pub fn list_translations_with(
        &self,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Vec<Translation>, ApiError> {
        self.fetch_list(
            Operation::ListTranslations,
            Endpoint::list(Resource::Translations),
            filters,
            options,
        )
    }

    /// Fetches one translation, `Ok(None)` if the ID is unknown
    pub fn translation_by_id(
        &self,
        id: u32,
        filters: &Filters,
    ) -> Result<Option<Translation>, ApiError> {
        self.translation_by_id_with(id, filters, &CallOptions::default())
    }

    pub fn translation_by_id_with(
        &self,
        id: u32,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Option<Translation>, ApiError> {
        self.fetch_one(
            Operation::GetTranslationById,
            Endpoint::by_id(Resource::Translations, id),
            filters,
            options,
        )
    }

    /// Fetches one episode with its translations, `Ok(None)` if the ID is unknown
    pub fn episode_by_id(&self, id: u32, filters: &Filters) -> Result<Option<Episode>, ApiError> {
        self.episode_by_id_with(id, filters, &CallOptions::default())
    }

    pub fn episode_by_id_with(
        &self,
        id: u32,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Option<Episode>, ApiError> {
        self.fetch_one(
            Operation::GetEpisodeById,
            Endpoint::by_id(Resource::Episodes, id),
            filters,
            options,
        )
    }

    fn fetch_list<E: Entity>(
        &self,
        operation: Operation,
        endpoint: Endpoint,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Vec<E>, ApiError> {
        let body = self.request(operation, &endpoint, filters, options)?;
        decode_list(&body).map_err(|e| ApiError::new(operation, &endpoint, e))
    }

    fn fetch_one<E: Entity>(
        &self,
        operation: Operation,
        endpoint: Endpoint,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Option<E>, ApiError> {
        // The ID in the path selects the entity; an `id` filter would contradict it
        let filters = if filters.get("id").is_some() {
            tracing::debug!(%operation, endpoint = %endpoint, "dropping `id` filter in favour of path id");
            let mut filters = filters.clone();
            filters.remove("id");
            Cow::Owned(filters)
        } else {
            Cow::Borrowed(filters)
        };

        let body = self.request(operation, &endpoint, &filters, options)?;
        decode_one(&body).map_err(|e| ApiError::new(operation, &endpoint, e))
    }

    fn request(
        &self,
        operation: Operation,
        endpoint: &Endpoint,
        filters: &Filters,
        options: &CallOptions,
    ) -> Result<Vec<u8>, ApiError> {
        let url = build_url(&self.base_url, endpoint, filters)
            .map_err(|e| ApiError::new(operation, endpoint, e))?;

        self.transport
            .get(&url, options)
            .map_err(|e| ApiError::new(operation, endpoint, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;
    use std::sync::Mutex;

    /// Replays one canned reply and records every requested URL
    struct FakeTransport {
        reply: Result<&'static str, TransportErrorKind>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn replying(body: &'static str) -> Self {
            Self {
                reply: Ok(body),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing(kind: TransportErrorKind) -> Self {
            Self {
                reply: Err(kind),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &Url, _options: &CallOptions) -> Result<Vec<u8>, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.reply {
                Ok(body) => Ok(body.as_bytes().to_vec()),
                Err(TransportErrorKind::Cancelled) => {
                    Err(TransportError::Cancelled { url: url.clone() })
                }
                Err(_) => Err(TransportError::TimedOut { url: url.clone() }),
            }
        }
    }

    fn client(transport: FakeTransport) -> Client<FakeTransport> {
        Client::with_transport(DEFAULT_BASE_URL, transport).unwrap()
    }

    fn requested(client: &Client<FakeTransport>) -> Vec<String> {
        client.transport.requested.lock().unwrap().clone()
    }

    #[test]
    fn test_list_series_nested_entities() {
        let client = client(FakeTransport::replying(
            r#"{"data":[{"id":1,"title":"Bakemonogatari","episodes":[{"id":10,"episodeInt":"1","translations":[{"id":100,"typeLang":"RU","authorsSummary":"Group A"}]}]}]}"#,
        ));

        let series = client
            .list_series(&Filters::new().with("query", "Bakemonogatari"))
            .unwrap();

        assert_eq!(
            requested(&client),
            vec!["https://smotret-anime.ru/api/series?query=Bakemonogatari"]
        );
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].episodes.len(), 1);

        let episode = &series[0].episodes[0];
        assert_eq!(episode.episode_int, "1");
        assert_eq!(episode.translations.len(), 1);
        assert_eq!(episode.translations[0].id, 100);
        assert_eq!(episode.translations[0].type_lang, "RU");
        assert_eq!(episode.translations[0].authors_summary, "Group A");
    }

    #[test]
    fn test_series_by_id() {
        let client = client(FakeTransport::replying(
            r#"{"data":{"id":42,"title":"Bakemonogatari"}}"#,
        ));

        let series = client.series_by_id(42, &Filters::new()).unwrap().unwrap();

        assert_eq!(requested(&client), vec!["https://smotret-anime.ru/api/series/42"]);
        assert_eq!(series.id, 42);
        assert_eq!(series.title, "Bakemonogatari");
        assert_eq!(series.number_of_episodes, 0);
    }

    #[test]
    fn test_path_id_wins_over_id_filter() {
        let client = client(FakeTransport::replying(r#"{"data":{"id":7}}"#));
        let filters = Filters::new().with("id", "99").with("fields", "id");

        client.episode_by_id(7, &filters).unwrap();

        assert_eq!(
            requested(&client),
            vec!["https://smotret-anime.ru/api/episodes/7?fields=id"]
        );
        // The caller's filters are left untouched
        assert_eq!(filters.get("id"), Some("99"));
    }

    #[test]
    fn test_not_found_is_none() {
        let client = client(FakeTransport::replying(r#"{"data":null}"#));
        assert!(client.translation_by_id(1, &Filters::new()).unwrap().is_none());
        assert!(client.episode_by_id(1, &Filters::new()).unwrap().is_none());
        assert!(client.series_by_id(1, &Filters::new()).unwrap().is_none());
    }

    #[test]
    fn test_error_body_without_data_is_empty_list() {
        let client = client(FakeTransport::replying(
            r#"{"error":{"code":404,"message":"Not found"}}"#,
        ));
        assert!(client.list_translations(&Filters::new()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_is_tagged() {
        let client = client(FakeTransport::replying(r#"{"data":{"id":100}}"#));

        let err = client.list_translations(&Filters::new()).unwrap_err();

        assert_eq!(err.operation, Operation::ListTranslations);
        assert_eq!(err.endpoint, "translations");
        assert!(matches!(err.kind, ApiErrorKind::Decode(DecodeError::Shape { .. })));
        assert!(err.to_string().starts_with("Failed to list translations (translations)"));
    }

    #[test]
    fn test_transport_error_is_propagated() {
        let client = client(FakeTransport::failing(TransportErrorKind::Cancelled));

        let err = client.translation_by_id(100, &Filters::new()).unwrap_err();

        assert_eq!(err.operation, Operation::GetTranslationById);
        assert_eq!(err.endpoint, "translations/100");
        match err.kind {
            ApiErrorKind::Transport(ref e) => assert_eq!(e.kind(), TransportErrorKind::Cancelled),
            ref other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = Client::with_transport(
            "http://localhost:8080/api",
            FakeTransport::replying(r#"{"data":[]}"#),
        )
        .unwrap();

        client.list_series(&Filters::new()).unwrap();

        assert_eq!(requested(&client), vec!["http://localhost:8080/api/series"]);
    }

    #[test]
    fn test_base_url_slash_goes_into_path() {
        let client = Client::with_transport(
            "http://localhost:8080/api?lang=ru#top",
            FakeTransport::replying(r#"{"data":[]}"#),
        )
        .unwrap();

        assert_eq!(client.base_url().path(), "/api/");
        assert_eq!(client.base_url().query(), Some("lang=ru"));

        client.list_series(&Filters::new()).unwrap();
        assert_eq!(requested(&client), vec!["http://localhost:8080/api/series"]);
    }

    #[test]
    fn test_client_is_debug() {
        let client = Client::new().unwrap();
        let printed = format!("{:?}", client);
        assert!(printed.contains("smotret-anime.ru"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Client::with_transport("not a url", FakeTransport::replying("{}"));
        assert!(matches!(result, Err(ConfigError::BaseUrl(_))));
    }

    #[test]
    fn test_concurrent_calls_are_independent() {
        let client = client(FakeTransport::replying(r#"{"data":[{"id":1},{"id":2}]}"#));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let series = client.list_series(&Filters::new()).unwrap();
                    assert_eq!(series.len(), 2);
                });
            }
        });

        assert_eq!(requested(&client).len(), 4);
    }
}
