use super::translation::Translation;
use super::values::{flag, nullable, objects};
use serde::{Deserialize, Serialize};

/// A single episode of a series, with the translations uploaded for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Episode {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    /// ID of the owning series
    #[serde(deserialize_with = "nullable")]
    pub series_id: u32,
    /// Full display label (e.g. "1 серия")
    #[serde(deserialize_with = "nullable")]
    pub episode_full: String,
    /// Episode number as text; specials may not be numeric
    #[serde(deserialize_with = "nullable")]
    pub episode_int: String,
    #[serde(deserialize_with = "nullable")]
    pub episode_title: String,
    /// Episode kind (`tv`, `ova`, `preview`, ...)
    #[serde(deserialize_with = "nullable")]
    pub episode_type: String,
    #[serde(deserialize_with = "nullable")]
    pub first_uploaded_date_time: String,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
    #[serde(deserialize_with = "nullable")]
    pub count_views: u64,
    #[serde(deserialize_with = "objects")]
    pub translations: Vec<Translation>,
}
