//! Catalog entities as returned by the Anime365 API.
//!
//! Entities are read-only snapshots decoded from server JSON. Unknown fields are
//! ignored, missing fields keep their zero value, and list order is preserved as
//! sent by the server.

use serde::de::DeserializeOwned;

mod episode;
mod series;
mod translation;
mod values;

pub use episode::Episode;
pub use series::Series;
pub use translation::Translation;
pub use values::{Description, FansubsTranslation, Genre, Link, Title};

/// A top-level entity served by one of the API's resource routes
pub trait Entity: DeserializeOwned {
    /// Name used in decode errors, e.g. `Series`
    const NAME: &'static str;
}

impl Entity for Series {
    const NAME: &'static str = "Series";
}

impl Entity for Episode {
    const NAME: &'static str = "Episode";
}

impl Entity for Translation {
    const NAME: &'static str = "Translation";
}
