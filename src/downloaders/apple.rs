//! Apple trailer catalog.
//!
//! Searches the catalog's quickfind endpoint by title, keeps results whose
//! release date mentions the year and whose normalized title matches, then
//! reads each result's `page.json` for trailer clips at the configured size.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::escape::{resolve_predefined_entity, unescape_with};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{TrailerRequest, TrailerSource};
use crate::config::{AppleConfig, AppleResolution, NetworkConfig};

const QUICKFIND_PATH: &str = "/trailers/home/scripts/quickfind.php";
const USER_AGENT: &str = "QuickTime/7.6.2";

#[derive(Debug, Deserialize)]
struct QuickfindResponse {
    #[serde(default)]
    results: Vec<QuickfindResult>,
}

#[derive(Debug, Deserialize)]
struct QuickfindResult {
    title: Option<String>,
    releasedate: Option<String>,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilmData {
    #[serde(default)]
    clips: Vec<Clip>,
}

#[derive(Debug, Deserialize)]
struct Clip {
    #[serde(default)]
    title: String,
    versions: ClipVersions,
}

#[derive(Debug, Deserialize)]
struct ClipVersions {
    enus: Option<ClipVersion>,
}

#[derive(Debug, Deserialize)]
struct ClipVersion {
    #[serde(default)]
    sizes: HashMap<String, ClipFile>,
}

#[derive(Debug, Deserialize)]
struct ClipFile {
    src: String,
}

/// Trailer source backed by the Apple trailer catalog.
pub struct AppleTrailers {
    api: reqwest::Client,
    download: reqwest::Client,
    base_url: String,
    resolution: AppleResolution,
}

impl AppleTrailers {
    pub fn new(config: &AppleConfig, network: &NetworkConfig) -> Result<Self> {
        let api = reqwest::Client::builder()
            .timeout(network.timeout())
            .build()
            .context("failed to build HTTP client")?;
        let download = reqwest::Client::builder()
            .timeout(network.download_timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api,
            download,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            resolution: config.resolution,
        })
    }

    async fn search(&self, title: &str) -> Result<Vec<QuickfindResult>> {
        let url = format!("{}{QUICKFIND_PATH}", self.base_url);
        let body: QuickfindResponse = self
            .api
            .get(&url)
            .query(&[("q", search_query(title))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("failed to parse catalog search response")?;
        Ok(body.results)
    }

    /// Trailer file URLs listed on a movie's catalog page.
    async fn trailer_urls(&self, location: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/{}/data/page.json",
            self.base_url,
            location.trim_matches('/')
        );
        let film: FilmData = self
            .api
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to parse {url}"))?;

        Ok(select_trailer_urls(&film, self.resolution))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        info!(url, "Attempting to download Apple trailer");
        let mut resp = self.download.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("failed to create {}", dest.display()))?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl TrailerSource for AppleTrailers {
    fn name(&self) -> &'static str {
        "apple"
    }

    async fn fetch(&self, request: &TrailerRequest<'_>, dest: &Path) -> bool {
        let (Some(title), Some(year)) = (request.title, request.year) else {
            debug!("Apple needs both title and year, skipping");
            return false;
        };

        let results = match self.search(title).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Apple search failed");
                return false;
            }
        };

        if results.is_empty() {
            info!("No trailers found on Apple");
            return false;
        }
        info!(count = results.len(), title, "Found Apple search results");

        let wanted = match_title(title);
        let year = year.to_string();
        for result in &results {
            let (Some(result_title), Some(released), Some(location)) =
                (&result.title, &result.releasedate, &result.location)
            else {
                continue;
            };
            if !released.to_lowercase().contains(&year)
                || match_title(&unescape_html(result_title)) != wanted
            {
                continue;
            }

            let urls = match self.trailer_urls(location).await {
                Ok(urls) => urls,
                Err(e) => {
                    warn!(location = %location, error = %e, "Could not read Apple trailer page");
                    continue;
                }
            };

            for url in urls {
                match self.download(&url, dest).await {
                    Ok(()) => {
                        info!("Apple download complete");
                        return true;
                    }
                    Err(e) => warn!(url = %url, error = %e, "Apple download failed"),
                }
            }
        }

        false
    }
}

/// Trailer clips at `resolution`, keeping only the last one when several exist.
fn select_trailer_urls(film: &FilmData, resolution: AppleResolution) -> Vec<String> {
    let mut urls: Vec<String> = film
        .clips
        .iter()
        .filter(|clip| clip.title.to_lowercase().starts_with("trailer"))
        .filter_map(|clip| clip.versions.enus.as_ref()?.sizes.get(resolution.size_key()))
        .map(|file| file_url(&file.src, resolution))
        .collect();

    if urls.len() > 1 {
        urls.drain(..urls.len() - 1);
    }
    urls
}

/// Rewrite a streaming URL into the directly downloadable file.
fn file_url(src: &str, resolution: AppleResolution) -> String {
    let lines = resolution.lines();
    src.replace(&format!("_{lines}p.mov"), &format!("_h{lines}p.mov"))
}

fn strip_special_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Search text: ASCII transliteration without punctuation.
fn search_query(title: &str) -> String {
    deunicode::deunicode(&strip_special_chars(title))
}

/// Comparison key: lowercase ASCII letters and digits only.
fn match_title(title: &str) -> String {
    deunicode::deunicode(&strip_special_chars(title))
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Decode the HTML entities the catalog uses in titles.
///
/// Text that is not well-formed (a bare `&`, an unknown entity) is kept as is.
fn unescape_html(text: &str) -> Cow<'_, str> {
    let resolve = |entity: &str| {
        resolve_predefined_entity(entity).or(match entity {
            "nbsp" => Some("\u{a0}"),
            _ => None,
        })
    };
    unescape_with(text, resolve).unwrap_or(Cow::Borrowed(text))
}
