use crate::config::Config;
use crate::error::CustomError;
use crate::options::ExtractOptions;
use crate::sources::Extract;
use crate::Result;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tokio::{
    task::JoinSet,
    time::{sleep, Duration},
};

type Json = serde_json::Value;

/// A person credited on a media item. Entries without a name are kept as-is
/// and skipped later, matching the permissive handling of upstream data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Credit {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Movie,
    Book,
    TvSeries,
    Music,
    Podcast,
    Other(String),
}

impl MediaKind {
    /// Display label, e.g. "TVSeries" for TV series nodes.
    pub fn label(&self) -> &str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Book => "Book",
            MediaKind::TvSeries => "TVSeries",
            MediaKind::Music => "Music",
            MediaKind::Podcast => "Podcast",
            MediaKind::Other(label) => label,
        }
    }

    /// Lowercased label used as identifier prefix, link type prefix and
    /// media node category.
    pub fn slug(&self) -> String {
        self.label().to_lowercase()
    }

    /// Maps a NeoDB shelf category to a kind, for items with no schema type.
    pub fn from_category(category: &str) -> MediaKind {
        match category {
            "movie" => MediaKind::Movie,
            "book" => MediaKind::Book,
            "tv" => MediaKind::TvSeries,
            "music" => MediaKind::Music,
            "podcast" => MediaKind::Podcast,
            _ => MediaKind::Other("Unknown".to_owned()),
        }
    }
}

impl Default for MediaKind {
    fn default() -> MediaKind {
        MediaKind::Other("Unknown".to_owned())
    }
}

impl From<String> for MediaKind {
    fn from(value: String) -> MediaKind {
        match value.as_str() {
            "Movie" => MediaKind::Movie,
            "Book" | "Edition" => MediaKind::Book,
            "TVSeries" => MediaKind::TvSeries,
            "Music" | "Album" => MediaKind::Music,
            "Podcast" => MediaKind::Podcast,
            _ => MediaKind::Other(value),
        }
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> String {
        kind.label().to_owned()
    }
}

/// One shelved media item with its catalog fields, already narrowed from the
/// loose API JSON. Absent fields stay `None`/empty rather than erroring.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MediaRecord {
    #[serde(default, rename = "type")]
    pub kind: MediaKind,
    pub name: Option<String>,
    #[serde(rename = "datePublished")]
    pub date_published: Option<String>,
    pub date_logged: Option<String>,
    pub rating: Option<f64>,
    pub shelf: Option<String>,
    pub url: Option<String>,
    pub isbn: Option<String>,
    #[serde(rename = "numberOfPages")]
    pub pages: Option<u64>,
    pub duration: Option<String>,
    #[serde(default)]
    pub director: Vec<Credit>,
    #[serde(default)]
    pub author: Vec<Credit>,
    #[serde(default)]
    pub creator: Vec<Credit>,
    #[serde(default, rename = "byArtist")]
    pub by_artist: Vec<Credit>,
    #[serde(default, rename = "musicBy")]
    pub music_by: Vec<Credit>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl MediaRecord {
    /// The credit list and role label for this record's kind. Unrecognized
    /// kinds get the generic "creator" role and no credits.
    pub fn credits(&self) -> (&[Credit], &str) {
        match &self.kind {
            MediaKind::Movie => (&self.director, "director"),
            MediaKind::Book => (&self.author, "author"),
            MediaKind::TvSeries => (&self.creator, "creator"),
            MediaKind::Music => {
                if self.by_artist.is_empty() {
                    (&self.music_by, "musician")
                } else {
                    (&self.by_artist, "musician")
                }
            }
            MediaKind::Podcast => (&self.author, "host"),
            MediaKind::Other(_) => (&[], "creator"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NeoDBAPI<'a> {
    pub config: &'a Config,
}

impl NeoDBAPI<'_> {
    pub fn new(config: &Config) -> NeoDBAPI {
        NeoDBAPI { config }
    }

    fn extract_value<'a>(json: &'a Json, pointer: &str) -> &'a Json {
        json.pointer(pointer).unwrap_or(&Json::Null)
    }

    fn string_list(json: &Json, pointer: &str) -> Vec<String> {
        match Self::extract_value(json, pointer).as_array() {
            Some(values) => values
                .iter()
                .filter_map(|value| value.as_str())
                .map(ToOwned::to_owned)
                .collect(),
            None => Vec::new(),
        }
    }

    fn credit_list(json: &Json, pointer: &str) -> Vec<Credit> {
        match Self::extract_value(json, pointer).as_array() {
            Some(values) => values
                .iter()
                .map(|value| Credit {
                    name: match value {
                        Json::String(name) => Some(name.to_owned()),
                        _ => Self::extract_value(value, "/name")
                            .as_str()
                            .map(ToOwned::to_owned),
                    },
                })
                .collect(),
            None => Vec::new(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.neodb_api.auth.access_token)
    }

    fn page_url(&self, template: &str, shelf: &str, category: &str, page: u64) -> String {
        let path = template
            .replace("{shelf}", shelf)
            .replace("{category}", category)
            .replace("{page}", &page.to_string());

        format!("{}{}", self.config.neodb_api.url, path)
    }

    /// Tries each configured endpoint template in priority order until one
    /// answers with a success status, and returns that template.
    async fn resolve_endpoint(
        &self,
        client: &reqwest::Client,
        shelf: &str,
        category: &str,
    ) -> Result<String> {
        for template in &self.config.neodb_api.endpoints {
            let url = self.page_url(template, shelf, category, 1);
            let response = client
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, self.bearer())
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    return Ok(template.to_owned());
                }
                Ok(response) => {
                    eprintln!("Endpoint {} answered {}.", url, response.status());
                }
                Err(err) => {
                    eprintln!("Endpoint {} failed: {}.", url, err);
                }
            }
        }

        Err(CustomError::boxed("No shelf endpoint available."))
    }

    /// Fetches every listing page for one shelf/category combination.
    async fn fetch_pages(
        &self,
        client: &reqwest::Client,
        template: &str,
        shelf: &str,
        category: &str,
    ) -> Result<Vec<Json>> {
        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let url = self.page_url(template, shelf, category, page);
            let json = client
                .get(&url)
                .header(reqwest::header::AUTHORIZATION, self.bearer())
                .send()
                .await?
                .json::<Json>()
                .await?;

            if let Some(data) = Self::extract_value(&json, "/data").as_array() {
                entries.extend(data.iter().cloned());
            }

            let pages = Self::extract_value(&json, "/pages").as_u64().unwrap_or(1);
            if page >= pages {
                break;
            }
            page += 1;

            sleep(Duration::from_millis(self.config.neodb_api.page_delay_ms)).await;
        }

        Ok(entries)
    }

    /// Fetches catalog details for each listing entry in rate-limited
    /// batches and narrows entry + detail into `MediaRecord`s. A failed
    /// detail fetch falls back to the listing entry's own fields.
    async fn fetch_shelf(
        &self,
        client: &reqwest::Client,
        template: &str,
        shelf: &str,
        category: &str,
    ) -> Result<Vec<MediaRecord>> {
        let entries = self.fetch_pages(client, template, shelf, category).await?;
        let rate_limit = self.config.neodb_api.rate_limit.max(1);

        let mut records = Vec::new();

        for batch in entries.chunks(rate_limit) {
            let mut futures = JoinSet::new();

            for entry in batch {
                let api_url = Self::extract_value(entry, "/item/api_url")
                    .as_str()
                    .map(ToOwned::to_owned);
                let entry = entry.clone();
                let client = client.clone();
                let base = self.config.neodb_api.url.to_owned();
                let bearer = self.bearer();

                futures.spawn(async move {
                    let detail = match api_url {
                        Some(path) => {
                            let url = format!("{}{}", base, path);
                            let response = client
                                .get(&url)
                                .header(reqwest::header::AUTHORIZATION, bearer)
                                .send()
                                .await;
                            match response {
                                Ok(response) => {
                                    response.json::<Json>().await.unwrap_or(Json::Null)
                                }
                                Err(err) => {
                                    eprintln!("Could not fetch item {}: {}.", url, err);
                                    Json::Null
                                }
                            }
                        }
                        None => Json::Null,
                    };

                    (entry, detail)
                });
            }

            while let Some(joined) = futures.join_next().await {
                let (entry, detail) = joined?;
                records.push(self.transform(shelf, &entry, &detail));
            }

            // NeoDB rate limits API clients per second
            sleep(Duration::from_secs(1)).await;
        }

        Ok(records)
    }

    fn transform(&self, shelf: &str, entry: &Json, detail: &Json) -> MediaRecord {
        let category = Self::extract_value(entry, "/item/category")
            .as_str()
            .unwrap_or_default();
        let kind = match Self::extract_value(detail, "/type").as_str() {
            Some(kind) => MediaKind::from(kind.to_owned()),
            None => MediaKind::from_category(category),
        };

        let name = Self::extract_value(detail, "/name")
            .as_str()
            .or_else(|| Self::extract_value(detail, "/title").as_str())
            .or_else(|| Self::extract_value(entry, "/item/display_title").as_str())
            .map(ToOwned::to_owned);

        let rating = Self::extract_value(entry, "/rating_grade")
            .as_f64()
            .or_else(|| Self::extract_value(detail, "/rating").as_f64());

        let url = Self::extract_value(entry, "/item/url")
            .as_str()
            .or_else(|| Self::extract_value(detail, "/url").as_str())
            .map(ToOwned::to_owned);

        // User-defined shelf tags count as keywords alongside catalog ones.
        let mut keywords = Self::string_list(detail, "/keywords");
        keywords.extend(Self::string_list(entry, "/tags"));

        MediaRecord {
            kind,
            name,
            date_published: Self::extract_value(detail, "/datePublished")
                .as_str()
                .map(ToOwned::to_owned),
            date_logged: Self::extract_value(entry, "/created_time")
                .as_str()
                .map(ToOwned::to_owned),
            rating,
            shelf: Some(shelf.to_owned()),
            url,
            isbn: Self::extract_value(detail, "/isbn")
                .as_str()
                .map(ToOwned::to_owned),
            pages: Self::extract_value(detail, "/numberOfPages").as_u64(),
            duration: Self::extract_value(detail, "/duration")
                .as_str()
                .map(ToOwned::to_owned),
            director: Self::credit_list(detail, "/director"),
            author: Self::credit_list(detail, "/author"),
            creator: Self::credit_list(detail, "/creator"),
            by_artist: Self::credit_list(detail, "/byArtist"),
            music_by: Self::credit_list(detail, "/musicBy"),
            genre: Self::string_list(detail, "/genre"),
            keywords,
        }
    }
}

#[async_trait]
impl Extract<'_> for NeoDBAPI<'_> {
    type Data = Vec<MediaRecord>;

    async fn extract(&self, options: Option<ExtractOptions>) -> Result<Self::Data> {
        let (shelves, categories) = match options {
            Some(options) => (
                options
                    .shelves
                    .unwrap_or_else(|| self.config.aggregator.shelves.to_owned()),
                options
                    .categories
                    .unwrap_or_else(|| self.config.aggregator.categories.to_owned()),
            ),
            None => (
                self.config.aggregator.shelves.to_owned(),
                self.config.aggregator.categories.to_owned(),
            ),
        };

        if shelves.is_empty() || categories.is_empty() {
            return Ok(Vec::new());
        }

        let client = reqwest::Client::new();
        let template = self
            .resolve_endpoint(&client, &shelves[0], &categories[0])
            .await?;

        let mut futures = Vec::new();
        for shelf in &shelves {
            for category in &categories {
                futures.push(self.fetch_shelf(&client, &template, shelf, category));
            }
        }

        let results = try_join_all(futures).await?;
        let records: Vec<MediaRecord> = results.into_iter().flatten().collect();

        println!("Fetched {} shelved items.", records.len());

        Ok(records)
    }
}
