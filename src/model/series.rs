use super::episode::Episode;
use super::values::{Description, Genre, Link, Title, flag, nullable, object, objects};
use serde::{Deserialize, Serialize};

/// A series (anime title) as listed in the catalog.
///
/// Identifier fields use `0` for "not linked"; the catalog never issues ID 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Series {
    #[serde(deserialize_with = "nullable")]
    pub id: u32,

    // Cross references to external databases
    #[serde(deserialize_with = "nullable")]
    pub ani_db_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub anime_news_network_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub fansubs_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub imdb_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub world_art_id: u32,
    #[serde(deserialize_with = "nullable")]
    pub my_anime_list_id: u32,

    /// Whether the series is published on the site
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
    /// Whether new episodes are still being released
    #[serde(deserialize_with = "flag")]
    pub is_airing: bool,
    /// Whether the series is flagged as adult content
    #[serde(rename = "isHentai", deserialize_with = "flag")]
    pub is_adult: bool,

    #[serde(deserialize_with = "objects")]
    pub links: Vec<Link>,
    /// Links sent under the singular `link` key, see [`Series::external_links`]
    #[serde(deserialize_with = "objects")]
    pub link: Vec<Link>,
    /// MyAnimeList community score, sent as a decimal string
    #[serde(deserialize_with = "nullable")]
    pub my_anime_list_score: String,
    /// World Art community score, sent as a decimal string
    #[serde(rename = "worldArtListScore", deserialize_with = "nullable")]
    pub world_art_score: String,
    #[serde(deserialize_with = "nullable")]
    pub world_art_top_place: u32,
    #[serde(deserialize_with = "nullable")]
    pub number_of_episodes: u32,
    #[serde(deserialize_with = "nullable")]
    pub count_views: u64,

    #[serde(deserialize_with = "nullable")]
    pub season: String,
    #[serde(deserialize_with = "nullable")]
    pub year: u32,
    /// Machine-readable kind (`tv`, `movie`, `ova`, ...)
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub kind: String,
    /// Human-readable kind
    #[serde(rename = "typeTitle", deserialize_with = "nullable")]
    pub kind_title: String,

    #[serde(deserialize_with = "nullable")]
    pub poster_url: String,
    #[serde(deserialize_with = "nullable")]
    pub poster_url_small: String,
    #[serde(deserialize_with = "nullable")]
    pub url: String,

    /// Primary display title
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "object")]
    pub titles: Title,
    /// Title lines in display order
    #[serde(deserialize_with = "nullable")]
    pub title_lines: Vec<String>,
    /// Every known title, in no particular order
    #[serde(deserialize_with = "nullable")]
    pub all_titles: Vec<String>,

    #[serde(deserialize_with = "objects")]
    pub descriptions: Vec<Description>,
    #[serde(deserialize_with = "objects")]
    pub genres: Vec<Genre>,
    #[serde(deserialize_with = "objects")]
    pub episodes: Vec<Episode>,
}

impl Series {
    /// External links, preferring the `links` key over `link`
    pub fn external_links(&self) -> &[Link] {
        if self.links.is_empty() {
            &self.link
        } else {
            &self.links
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_series() {
        let json = r#"{"id": 42, "title": "Bakemonogatari"}"#;
        let series: Series = serde_json::from_str(json).unwrap();

        assert_eq!(series.id, 42);
        assert_eq!(series.title, "Bakemonogatari");
        assert_eq!(series.my_anime_list_id, 0);
        assert!(!series.is_active);
        assert!(series.episodes.is_empty());
        assert_eq!(series.titles, Title::default());
    }

    #[test]
    fn test_deserialize_full_series() {
        let json = r#"{
            "id": 1170,
            "aniDbId": 6327,
            "myAnimeListId": 5081,
            "myAnimeListScore": "8.33",
            "isActive": 1,
            "isAiring": 0,
            "isHentai": 0,
            "numberOfEpisodes": 15,
            "season": "summer 2009",
            "year": 2009,
            "type": "tv",
            "typeTitle": "ТВ сериал",
            "titles": {"ru": "Истории монстров", "romaji": "Bakemonogatari", "ja": "化物語"},
            "titleLines": ["Истории монстров", "Bakemonogatari"],
            "allTitles": ["Bakemonogatari", "化物語"],
            "links": [{"title": "MyAnimeList", "url": "https://myanimelist.net/anime/5081"}],
            "descriptions": [
                {"source": "world-art.ru", "value": "<p>Первое</p>", "updatedDateTime": "2019-01-01 00:00:00"},
                {"source": "shikimori.one", "value": "Второе", "updatedDateTime": "2019-01-02 00:00:00"}
            ],
            "genres": [{"id": 3, "title": "Comedy", "url": "https://smotret-anime.ru/catalog/filter/genre@=3"}],
            "someFutureField": {"nested": true}
        }"#;
        let series: Series = serde_json::from_str(json).unwrap();

        assert_eq!(series.id, 1170);
        assert_eq!(series.ani_db_id, 6327);
        assert_eq!(series.my_anime_list_score, "8.33");
        assert!(series.is_active);
        assert!(!series.is_airing);
        assert!(!series.is_adult);
        assert_eq!(series.season, "summer 2009");
        assert_eq!(series.kind, "tv");
        assert_eq!(series.titles.ja, "化物語");
        assert_eq!(series.title_lines, vec!["Истории монстров", "Bakemonogatari"]);
        assert_eq!(series.links[0].title, "MyAnimeList");
        assert_eq!(series.descriptions.len(), 2);
        assert_eq!(series.descriptions[1].source, "shikimori.one");
        assert_eq!(series.genres[0].id, 3);
    }

    #[test]
    fn test_links_accepts_singular_key() {
        let json = r#"{"link": [{"title": "AniDB", "url": "https://anidb.net/a6327"}]}"#;
        let series: Series = serde_json::from_str(json).unwrap();
        assert!(series.links.is_empty());
        assert_eq!(series.external_links().len(), 1);
        assert_eq!(series.external_links()[0].title, "AniDB");
    }

    #[test]
    fn test_both_link_keys_prefer_plural() {
        let json = r#"{
            "id": 1,
            "link": [{"title": "AniDB", "url": "https://anidb.net/a6327"}],
            "links": [{"title": "MyAnimeList", "url": "https://myanimelist.net/anime/5081"}]
        }"#;
        let series: Series = serde_json::from_str(json).unwrap();
        assert_eq!(series.external_links().len(), 1);
        assert_eq!(series.external_links()[0].title, "MyAnimeList");
        assert_eq!(series.link[0].title, "AniDB");

        let json = r#"{"id": 1, "link": [], "links": [{"title": "a", "url": "b"}]}"#;
        let series: Series = serde_json::from_str(json).unwrap();
        assert_eq!(series.external_links()[0].url, "b");
    }

    #[test]
    fn test_world_art_score_key() {
        let json = r#"{"id": 1, "worldArtListScore": "8.1", "worldArtTopPlace": 120}"#;
        let series: Series = serde_json::from_str(json).unwrap();
        assert_eq!(series.world_art_score, "8.1");
        assert_eq!(series.world_art_top_place, 120);
    }

    #[test]
    fn test_nested_entities_must_be_objects() {
        let json = r#"{"id": 1, "titles": ["Ru", "Romaji"]}"#;
        assert!(serde_json::from_str::<Series>(json).is_err());

        let json = r#"{"id": 1, "episodes": [[10, 1]]}"#;
        assert!(serde_json::from_str::<Series>(json).is_err());

        let json = r#"{"id": 1, "episodes": [{"id": 10, "translations": [[100, 1]]}]}"#;
        assert!(serde_json::from_str::<Series>(json).is_err());
    }

    #[test]
    fn test_field_type_mismatch_is_error() {
        let json = r#"{"id": 1, "numberOfEpisodes": "fifteen"}"#;
        assert!(serde_json::from_str::<Series>(json).is_err());
    }
}
