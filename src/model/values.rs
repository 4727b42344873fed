//! Value types embedded in catalog entities and the field decoders they share.

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Title of a series in every script the catalog knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Title {
    /// Russian title
    #[serde(deserialize_with = "nullable")]
    pub ru: String,
    /// Romanized Japanese title
    #[serde(deserialize_with = "nullable")]
    pub romaji: String,
    /// Japanese title in native script
    #[serde(deserialize_with = "nullable")]
    pub ja: String,
    /// English title
    #[serde(deserialize_with = "nullable")]
    pub en: String,
    /// Short form used in listings
    #[serde(deserialize_with = "nullable")]
    pub short: String,
}

/// A labelled external link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

/// A genre a series is classified under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,
}

/// Free-text synopsis of a series, attributed to the site it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Description {
    /// Where the text comes from (e.g. a database or fansub site)
    #[serde(deserialize_with = "nullable")]
    pub source: String,
    /// The description itself, may contain HTML markup
    #[serde(deserialize_with = "nullable")]
    pub value: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_date_time: String,
}

/// Upload record of a translation on the Fansubs tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FansubsTranslation {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,
    #[serde(deserialize_with = "nullable")]
    pub fansubs_series_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub count: String,
    #[serde(deserialize_with = "nullable")]
    pub date: String,
    #[serde(deserialize_with = "nullable")]
    pub comment: String,
    #[serde(deserialize_with = "nullable")]
    pub file: String,
    #[serde(deserialize_with = "nullable")]
    pub file_url: String,
}

/// Decodes a field that the server may send as an explicit `null`.
///
/// `null` yields the zero value of the field type; any other value must match
/// the field type exactly.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a nested entity that must be a JSON object, `null` yields its zero value.
///
/// Derived struct impls would also fill an entity from a JSON array by position;
/// going through a [`Map`] first rejects that.
pub(crate) fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(optional_object(deserializer)?.unwrap_or_default())
}

/// Like [`object`], but keeps an absent or `null` entity as `None`.
pub(crate) fn optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Option::<Map<String, Value>>::deserialize(deserializer)?
        .map(from_fields::<T, D::Error>)
        .transpose()
}

/// Decodes a list of nested entities, each of which must be a JSON object.
pub(crate) fn objects<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Option::<Vec<Map<String, Value>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(from_fields::<T, D::Error>)
        .collect()
}

fn from_fields<T: DeserializeOwned, E: de::Error>(fields: Map<String, Value>) -> Result<T, E> {
    serde_json::from_value(Value::Object(fields)).map_err(E::custom)
}

/// Decodes a `0`/`1` integer flag into a boolean.
///
/// `1` is `true`; every other integer and `null` are `false`. A JSON boolean is
/// taken as-is. Strings, floats, arrays and objects are rejected.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(FlagVisitor)
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer flag (0 or 1)")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
        Ok(value == 1)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
        Ok(value == 1)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}
