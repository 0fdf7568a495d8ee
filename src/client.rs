use std::time::Duration;

use crate::error::{HnError, Result};
use crate::types::RawItem;

/// Thin client for the aggregator's read-only JSON API.
///
/// Base URLs are injectable so tests can point at a local mock server.
#[derive(Debug, Clone)]
pub struct HnClient {
    http: reqwest::Client,
    api_base: String,
    web_base: String,
}

impl HnClient {
    pub fn new(api_base: impl Into<String>, web_base: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("hnbest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            web_base: web_base.into(),
        })
    }

    /// Ranked list of best-story ids, best first.
    pub async fn best_story_ids(&self) -> Result<Vec<u64>> {
        let url = format!("{}/beststories.json", self.api_base);
        let ids = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<u64>>()
            .await?;
        Ok(ids)
    }

    pub async fn item(&self, id: u64) -> Result<RawItem> {
        let url = format!("{}/item/{}.json", self.api_base, id);
        let response = self.http.get(&url).send().await?.error_for_status()?;

        // The API serves `null` for unknown ids with a 200 status.
        match response.json::<Option<RawItem>>().await? {
            Some(item) => Ok(item),
            None => Err(HnError::Api(format!("item {} does not exist", id))),
        }
    }

    /// Discussion-page permalink for a story id.
    pub fn permalink(&self, id: u64) -> String {
        format!("{}/item?id={}", self.web_base, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> HnClient {
        HnClient::new(format!("{}/v0", server.uri()), server.uri()).unwrap()
    }

    #[test]
    fn permalink_points_at_discussion_page() {
        let client = HnClient::new("https://api.example", "https://web.example").unwrap();
        assert_eq!(client.permalink(8863), "https://web.example/item?id=8863");
    }

    #[tokio::test]
    async fn best_story_ids_parses_id_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/beststories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![3u64, 1, 2]))
            .mount(&server)
            .await;

        let ids = test_client(&server).best_story_ids().await.unwrap();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn best_story_ids_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/beststories.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(test_client(&server).best_story_ids().await.is_err());
    }

    #[tokio::test]
    async fn item_parses_story_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/8863.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "by": "pg",
                "descendants": 71,
                "id": 8863,
                "score": 111,
                "time": 1175714200,
                "title": "My YC app",
                "type": "story",
                "url": "http://www.getdropbox.com/u/2/screencast.html"
            })))
            .mount(&server)
            .await;

        let item = test_client(&server).item(8863).await.unwrap();
        assert_eq!(item.id, 8863);
        assert_eq!(item.by, "pg");
        assert_eq!(item.score, 111);
    }

    #[tokio::test]
    async fn null_item_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v0/item/404.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        assert!(test_client(&server).item(404).await.is_err());
    }
}
