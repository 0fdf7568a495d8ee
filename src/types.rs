use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single feed entry, as kept in memory and in the on-disk cache.
///
/// `hidden` and `original` are local additions; everything else is a
/// snapshot of the upstream item at first fetch. `hidden` is the only
/// field ever mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub id: u64,
    pub by: String,
    pub score: i64,
    pub descendants: u64,
    pub time: DateTime<Utc>,
    pub title: String,
    pub url: Option<String>,
    /// Permalink to the discussion page on the aggregator site.
    pub original: String,
    #[serde(default)]
    pub kids: Vec<u64>,
    pub kind: String,
    #[serde(default)]
    pub hidden: bool,
}

impl Story {
    /// The link `l` opens: the external URL when the story has one,
    /// otherwise the discussion permalink.
    pub fn link(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.original)
    }

    /// Host portion of the external URL, for display next to the title.
    pub fn host(&self) -> Option<&str> {
        let url = self.url.as_deref()?;
        let rest = url.split("://").nth(1)?;
        let host = rest.split('/').next()?;
        Some(host.strip_prefix("www.").unwrap_or(host))
    }
}

/// Item detail as served by the aggregator API. Fields the API omits for
/// some item types default rather than failing the parse.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: u64,
    #[serde(default)]
    pub by: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: u64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub title: String,
    pub url: Option<String>,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl RawItem {
    pub fn into_story(self, original: String) -> Story {
        Story {
            id: self.id,
            by: self.by,
            score: self.score,
            descendants: self.descendants,
            time: DateTime::from_timestamp(self.time, 0).unwrap_or_else(Utc::now),
            title: self.title,
            url: self.url,
            original,
            kids: self.kids,
            kind: self.kind,
            hidden: false,
        }
    }
}

/// Order a freshly resolved batch: score descending, ties keeping the
/// relative order items were fetched in (stable sort).
pub fn sort_by_score(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.score.cmp(&a.score));
}

#[cfg(test)]
pub fn test_story(id: u64, score: i64) -> Story {
    Story {
        id,
        by: format!("user{}", id),
        score,
        descendants: 0,
        time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        title: format!("Story {}", id),
        url: Some(format!("https://example.com/{}", id)),
        original: format!("https://news.ycombinator.com/item?id={}", id),
        kids: Vec::new(),
        kind: "story".to_string(),
        hidden: false,
    }
}
