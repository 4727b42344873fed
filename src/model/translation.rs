use super::episode::Episode;
use super::series::Series;
use super::values::{FansubsTranslation, flag, nullable, optional_object};
use serde::{Deserialize, Serialize};

/// A translation (dub or subtitle release) of one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Translation {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    #[serde(deserialize_with = "nullable")]
    pub series_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub episode_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub fansubs_translation_id: u32,

    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    /// Author names in credit order
    #[serde(deserialize_with = "nullable")]
    pub authors_list: Vec<String>,
    /// Authors joined into one display string
    #[serde(deserialize_with = "nullable")]
    pub authors_summary: String,

    /// Combined kind and language tag (e.g. `subRu`, `voiceEn`)
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    /// Release kind (`sub`, `voice`, `raw`)
    #[serde(rename = "typeKind", deserialize_with = "nullable")]
    pub kind_name: String,
    /// Language code of the release
    #[serde(deserialize_with = "nullable")]
    pub type_lang: String,
    /// Ranking among translations of the same episode, higher is better
    #[serde(deserialize_with = "nullable")]
    pub priority: u32,
    /// Source quality tier (`tv`, `bd`, `dvd`, ...)
    #[serde(deserialize_with = "nullable")]
    pub quality_type: String,

    #[serde(deserialize_with = "nullable")]
    pub added_date_time: String,
    #[serde(deserialize_with = "nullable")]
    pub active_date_time: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_date_time: String,
    /// Length of the video in seconds, as sent by the server
    #[serde(deserialize_with = "nullable")]
    pub duration: String,
    #[serde(deserialize_with = "nullable")]
    pub width: u32,
    #[serde(deserialize_with = "nullable")]
    pub height: u32,
    #[serde(deserialize_with = "nullable")]
    pub count_views: u64,

    #[serde(deserialize_with = "nullable")]
    pub url: String,
    /// Player URL suitable for embedding
    #[serde(deserialize_with = "nullable")]
    pub embed_url: String,

    /// Owning episode, present only when the server inlines it
    #[serde(deserialize_with = "optional_object")]
    pub episode: Option<Box<Episode>>,
    /// Owning series, present only when the server inlines it
    #[serde(deserialize_with = "optional_object")]
    pub series: Option<Box<Series>>,
    #[serde(deserialize_with = "optional_object")]
    pub fansubs_translation: Option<FansubsTranslation>,
}
