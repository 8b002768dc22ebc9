//! Catalog tracks and the mapping from raw search records

use serde::Deserialize;

/// One playable catalog entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub preview_url: String,
    pub artwork_url: String,
    pub duration_ms: u64,
    pub genre: String,
}

/// Search endpoint response body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<CatalogItem>,
}

/// A raw search record; any field may be missing
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub kind: Option<String>,
    pub track_id: Option<i64>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    pub track_name: Option<String>,
    pub preview_url: Option<String>,
    pub artwork_url100: Option<String>,
    pub track_time_millis: Option<i64>,
    pub primary_genre_name: Option<String>,
}

impl CatalogItem {
    fn is_playable_song(&self) -> bool {
        self.kind.as_deref() == Some("song")
            && self.preview_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

impl Track {
    /// Build a track from a record, or `None` when any required field is missing.
    pub fn from_catalog_item(item: CatalogItem) -> Option<Self> {
        let duration_ms = u64::try_from(item.track_time_millis?).ok()?;
        Some(Self {
            id: item.track_id?,
            title: item.track_name?,
            artist: item.artist_name?,
            album: item.collection_name?,
            preview_url: item.preview_url.filter(|url| !url.is_empty())?,
            artwork_url: item.artwork_url100?,
            duration_ms,
            genre: item.primary_genre_name?,
        })
    }
}

/// Keep songs with a preview and every required field, in response order.
pub fn tracks_from_response(response: CatalogResponse) -> Vec<Track> {
    response
        .results
        .into_iter()
        .filter(CatalogItem::is_playable_song)
        .filter_map(Track::from_catalog_item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "resultCount": 4,
        "results": [
            {"wrapperType": "track", "kind": "song", "trackId": 1, "artistName": "Neck Deep",
             "collectionName": "Life's Not Out to Get You", "trackName": "Gold Steps",
             "previewUrl": "https://audio.example/1.m4a", "artworkUrl100": "https://art.example/1.jpg",
             "trackTimeMillis": 182000, "primaryGenreName": "Alternative", "collectionId": 99},
            {"wrapperType": "track", "kind": "music-video", "trackId": 2, "artistName": "Neck Deep",
             "collectionName": "Videos", "trackName": "Gold Steps (Video)",
             "previewUrl": "https://video.example/2.m4v", "artworkUrl100": "https://art.example/2.jpg",
             "trackTimeMillis": 190000, "primaryGenreName": "Alternative"},
            {"wrapperType": "track", "kind": "song", "trackId": 3, "artistName": "Neck Deep",
             "collectionName": "Peace and the Panic", "trackName": "Happy Judgement Day",
             "artworkUrl100": "https://art.example/3.jpg",
             "trackTimeMillis": 200000, "primaryGenreName": "Alternative"},
            {"wrapperType": "track", "kind": "song", "trackId": 4, "artistName": "Neck Deep",
             "trackName": "Motion Sickness", "previewUrl": "https://audio.example/4.m4a",
             "artworkUrl100": "https://art.example/4.jpg",
             "trackTimeMillis": 210000, "primaryGenreName": "Alternative"}
        ]
    }"#;

    #[test]
    fn only_complete_songs_with_previews_survive() {
        let response: CatalogResponse = serde_json::from_str(BODY).unwrap();
        assert_eq!(response.result_count, 4);

        let tracks = tracks_from_response(response);
        assert_eq!(tracks.len(), 1);

        let track = &tracks[0];
        assert_eq!(track.id, 1);
        assert_eq!(track.title, "Gold Steps");
        assert_eq!(track.album, "Life's Not Out to Get You");
        assert_eq!(track.preview_url, "https://audio.example/1.m4a");
        assert_eq!(track.artwork_url, "https://art.example/1.jpg");
        assert_eq!(track.duration_ms, 182_000);
        assert_eq!(track.genre, "Alternative");
    }

    #[test]
    fn empty_preview_is_not_playable() {
        let item = CatalogItem {
            kind: Some("song".to_string()),
            preview_url: Some(String::new()),
            ..Default::default()
        };
        assert!(!item.is_playable_song());
    }

    #[test]
    fn missing_results_array_is_an_empty_playlist() {
        let response: CatalogResponse = serde_json::from_str(r#"{"resultCount": 0}"#).unwrap();
        assert!(tracks_from_response(response).is_empty());
    }
}
