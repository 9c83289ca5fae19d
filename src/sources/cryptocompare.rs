// =============================================================================
// CryptoCompare — public news feed
// =============================================================================
//
// GET /data/v2/news/?lang=..&categories=..&excludeCategories=..
//
// The feed has no page-size parameter; callers shape the result locally with
// `shape_news` (age cut-off, newest first, truncate).
// =============================================================================

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde_json::Value;

use super::models::NewsItem;
use crate::fetcher::FetchError;

const SECS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// CryptoCompare endpoint builder.
#[derive(Debug, Clone)]
pub struct CryptoCompare {
    base: Url,
}

impl CryptoCompare {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid CryptoCompare base URL '{base_url}'"))?;
        if base.cannot_be_a_base() {
            bail!("CryptoCompare base URL '{base_url}' cannot carry a path");
        }
        Ok(Self { base })
    }

    pub fn news_url(&self, lang: &str, categories: &[String], exclude_categories: &[String]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["data", "v2", "news", ""]);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("lang", lang);
            if !categories.is_empty() {
                query.append_pair("categories", &categories.join(","));
            }
            if !exclude_categories.is_empty() {
                query.append_pair("excludeCategories", &exclude_categories.join(","));
            }
        }
        url
    }
}

/// Map the `Data` array of a news response into [`NewsItem`]s.
///
/// Items without a publication time are stamped `now_secs`.
pub fn parse_news(body: &Value, now_secs: i64) -> Result<Vec<NewsItem>, FetchError> {
    let data = body["Data"]
        .as_array()
        .ok_or_else(|| FetchError::malformed("news response missing 'Data' array"))?;

    Ok(data
        .iter()
        .enumerate()
        .map(|(i, item)| NewsItem {
            id: text(&item["id"])
                .or_else(|| text(&item["guid"]))
                .or_else(|| text(&item["url"]))
                .unwrap_or_else(|| format!("news-{i}")),
            title: text(&item["title"]).unwrap_or_else(|| "Untitled".to_string()),
            body: text(&item["body"])
                .or_else(|| text(&item["summary"]))
                .unwrap_or_default(),
            url: text(&item["url"]).unwrap_or_else(|| "#".to_string()),
            imageurl: text(&item["imageurl"])
                .or_else(|| text(&item["thumbnail"]))
                .unwrap_or_default(),
            source: text(&item["source"])
                .or_else(|| text(&item["source_info"]["name"]))
                .unwrap_or_else(|| "unknown".to_string()),
            tags: text(&item["tags"])
                .or_else(|| text(&item["categories"]))
                .unwrap_or_default(),
            published_on: item["published_on"].as_i64().unwrap_or(now_secs),
        })
        .collect())
}

/// Apply the age cut-off, sort newest first, and truncate to `page_size`.
///
/// `max_age_days` is ignored unless it is finite and positive.
pub fn shape_news(
    mut items: Vec<NewsItem>,
    max_age_days: Option<f64>,
    page_size: usize,
    now_secs: i64,
) -> Vec<NewsItem> {
    if let Some(days) = max_age_days.filter(|d| d.is_finite() && *d > 0.0) {
        let cutoff = now_secs - (days * SECS_PER_DAY).floor() as i64;
        items.retain(|n| n.published_on >= cutoff);
    }
    items.sort_by(|a, b| b.published_on.cmp(&a.published_on));
    items.truncate(page_size);
    items
}

/// A non-empty string, or a number rendered as a string.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, published_on: i64) -> NewsItem {
        NewsItem {
            id: id.to_string(),
            title: id.to_string(),
            body: String::new(),
            url: "#".to_string(),
            imageurl: String::new(),
            source: "test".to_string(),
            tags: String::new(),
            published_on,
        }
    }

    #[test]
    fn news_url_skips_empty_category_lists() {
        let cc = CryptoCompare::new("https://min-api.cryptocompare.com").unwrap();
        let url = cc.news_url("EN", &[], &[]);
        assert_eq!(url.path(), "/data/v2/news/");
        assert_eq!(url.query(), Some("lang=EN"));

        let url = cc.news_url("PT", &["BTC".into(), "ETH".into()], &["Sponsored".into()]);
        let q = url.query().unwrap();
        assert!(q.contains("categories=BTC%2CETH"));
        assert!(q.contains("excludeCategories=Sponsored"));
    }

    #[test]
    fn parse_news_applies_field_fallbacks() {
        let body = json!({
            "Data": [{
                "id": 123,
                "title": "Halving",
                "summary": "short",
                "url": "https://example.com/a",
                "thumbnail": "t.png",
                "source_info": { "name": "Wire" },
                "categories": "BTC",
                "published_on": 1_700_000_000
            }, {}]
        });
        let news = parse_news(&body, 42).unwrap();
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].id, "123");
        assert_eq!(news[0].body, "short");
        assert_eq!(news[0].imageurl, "t.png");
        assert_eq!(news[0].source, "Wire");
        assert_eq!(news[0].tags, "BTC");
        assert_eq!(news[1].id, "news-1");
        assert_eq!(news[1].title, "Untitled");
        assert_eq!(news[1].published_on, 42);
    }

    #[test]
    fn parse_news_requires_data_array() {
        assert!(parse_news(&json!({ "Message": "rate limit" }), 0).is_err());
    }

    #[test]
    fn shape_news_sorts_filters_and_truncates() {
        let now = 10 * 86_400;
        let items = vec![item("old", 0), item("mid", now - 3600), item("new", now - 60)];

        let shaped = shape_news(items.clone(), Some(1.0), 10, now);
        let ids: Vec<_> = shaped.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid"]);

        let shaped = shape_news(items.clone(), None, 1, now);
        assert_eq!(shaped.len(), 1);
        assert_eq!(shaped[0].id, "new");

        // Non-positive age limits are ignored.
        assert_eq!(shape_news(items, Some(0.0), 10, now).len(), 3);
    }
}
