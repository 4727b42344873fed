//! anime365 - Typed client for the Anime365 catalog API
//!
//! This library fetches series, episode and translation metadata from the
//! Anime365 (smotret-anime) JSON API and decodes it into plain Rust structs.
//!
//! Every operation is a single blocking round trip: the caller's filters are
//! encoded into the request URL, the response envelope's `data` field is decoded
//! into the entity type of the endpoint, and any failure is returned as an
//! [`ApiError`] naming the operation and endpoint that produced it. There is no
//! caching, retrying or pagination.
//!
//! # Examples
//!
//! ```no_run
//! use anime365::{Client, Filters};
//!
//! let client = Client::new()?;
//!
//! for series in client.list_series(&Filters::new().with("query", "Bakemonogatari"))? {
//!     println!("{}", series.title);
//!     for episode in &series.episodes {
//!         if let Some(episode) = client.episode_by_id(episode.id, &Filters::new())? {
//!             println!("  #{}: {} translation(s)", episode.episode_int, episode.translations.len());
//!         }
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod endpoint;
mod envelope;
mod model;
mod transport;

// Re-export error types
pub use client::{ApiError, ApiErrorKind, ConfigError};
pub use endpoint::EndpointError;
pub use envelope::DecodeError;
pub use transport::{TransportError, TransportErrorKind};

// Re-export client types
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, Operation};
pub use endpoint::{Endpoint, Filters, Resource, build_url};
pub use envelope::{decode_list, decode_one};
pub use transport::{
    CallOptions, CancelToken, DEFAULT_CANCELLABLE_TIMEOUT, HttpTransport, Transport,
};
pub use url::Url;

// Re-export catalog entities
pub use model::{Description, Entity, Episode, FansubsTranslation, Genre, Link, Series, Title, Translation};
