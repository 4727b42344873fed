//! Request URL construction
//!
//! This module turns a resource path and a set of caller-supplied filters into
//! the absolute URL of a catalog request.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors that can occur while composing a request URL
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The base URL or resource path does not form a valid URL
    #[error("Malformed endpoint {path}: {source}")]
    MalformedEndpoint {
        path: String,
        source: url::ParseError,
    },
}

/// Resource collections exposed by the catalog API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Series,
    Episodes,
    Translations,
}

impl Resource {
    /// Path segment of the collection, relative to the API root
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Series => "series",
            Resource::Episodes => "episodes",
            Resource::Translations => "translations",
        }
    }
}

/// A collection route or a single-entity route of the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub resource: Resource,
    pub id: Option<u32>,
}

impl Endpoint {
    /// Route listing a whole collection, e.g. `series`
    pub fn list(resource: Resource) -> Self {
        Self { resource, id: None }
    }

    /// Route addressing one entity, e.g. `series/42`
    pub fn by_id(resource: Resource, id: u32) -> Self {
        Self {
            resource,
            id: Some(id),
        }
    }

    /// Path of this route relative to the API root
    pub fn path(&self) -> String {
        match self.id {
            Some(id) => format!("{}/{}", self.resource.as_str(), id),
            None => self.resource.as_str().to_string(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Query filters forwarded verbatim to the API
///
/// Keys are kept sorted so the encoded query string is deterministic. Setting a
/// key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    /// Creates an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Filters::insert`]
    ///
    /// # Examples
    ///
    /// ```
    /// use anime365::Filters;
    ///
    /// let filters = Filters::new().with("query", "Bakemonogatari").with("limit", "5");
    /// assert_eq!(filters.get("limit"), Some("5"));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a filter, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over filters in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

/// Builds the absolute URL for `endpoint` below `base`, with `filters` as query
///
/// Keys and values are form-urlencoded. An empty filter set produces a URL
/// without a query component.
///
/// # Errors
///
/// Returns [`EndpointError::MalformedEndpoint`] if the route cannot be joined
/// onto `base`.
pub fn build_url(base: &Url, endpoint: &Endpoint, filters: &Filters) -> Result<Url, EndpointError> {
    let path = endpoint.path();
    let mut url = base
        .join(&path)
        .map_err(|source| EndpointError::MalformedEndpoint { path, source })?;

    if !filters.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in filters.iter() {
            query.append_pair(key, value);
        }
    }

    Ok(url)
}
