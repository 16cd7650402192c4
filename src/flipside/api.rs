use anyhow::Result;
use async_trait::async_trait;
use format_url::FormatUrl;
use mockall::{automock, predicate::*};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::ENV_CONFIG;

use super::{QueryResultSet, Record};

const FLIPSIDE_API: &str = "https://api-v2.flipsidecrypto.xyz";

pub const DEFAULT_PAGE_SIZE: i64 = 10_000;

#[derive(Clone, Debug)]
pub struct FlipsideConfig {
    pub api_key: String,
    pub base_url: String,
    pub page_size: i64,
}

impl FlipsideConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: FLIPSIDE_API.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn from_env() -> Self {
        Self {
            api_key: ENV_CONFIG.flipside_api_key.clone(),
            base_url: ENV_CONFIG
                .flipside_api_url
                .clone()
                .unwrap_or_else(|| FLIPSIDE_API.to_string()),
            page_size: ENV_CONFIG.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Serialize)]
struct SubmitQueryBody<'a> {
    sql: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitQueryResponse {
    query_id: String,
    page: PageStats,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageStats {
    total_rows: i64,
}

#[derive(Deserialize)]
struct QueryPageResponse {
    #[serde(default)]
    records: Vec<Record>,
}

#[automock]
#[async_trait]
pub trait QueryApi {
    async fn submit_query(&self, sql: &str) -> Result<QueryResultSet>;
    async fn get_query_page(
        &self,
        query_id: &str,
        page_number: i64,
        page_size: i64,
    ) -> Result<Vec<Record>>;
}

pub struct QueryApiHttp {
    config: FlipsideConfig,
    client: reqwest::Client,
}

impl QueryApiHttp {
    pub fn new(config: FlipsideConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn new_from_env() -> Self {
        Self::new(FlipsideConfig::from_env())
    }

    pub fn page_size(&self) -> i64 {
        self.config.page_size
    }
}

#[async_trait]
impl QueryApi for QueryApiHttp {
    async fn submit_query(&self, sql: &str) -> Result<QueryResultSet> {
        let url = FormatUrl::new(&self.config.base_url)
            .with_path_template("/queries")
            .format_url();

        debug!("submitting query to {url}");

        let body = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .json(&SubmitQueryBody { sql })
            .send()
            .await?
            .error_for_status()?
            .json::<SubmitQueryResponse>()
            .await?;

        Ok(QueryResultSet {
            query_id: body.query_id,
            total_rows: body.page.total_rows,
        })
    }

    async fn get_query_page(
        &self,
        query_id: &str,
        page_number: i64,
        page_size: i64,
    ) -> Result<Vec<Record>> {
        let page_number = page_number.to_string();
        let page_size = page_size.to_string();
        let url = FormatUrl::new(&self.config.base_url)
            .with_path_template(&format!("/queries/{query_id}/results"))
            .with_query_params(vec![
                ("pageNumber", page_number.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .format_url();

        debug!("fetching result page from {url}");

        let body = self
            .client
            .get(url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await?
            .error_for_status()?
            .json::<QueryPageResponse>()
            .await?;

        Ok(body.records)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn test_config(base_url: &str) -> FlipsideConfig {
        FlipsideConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[tokio::test]
    async fn submit_query_test() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/queries")
            .with_status(200)
            .with_body(
                json!({
                    "queryId": "clg-44",
                    "page": { "totalRows": 25000 }
                })
                .to_string(),
            )
            .create_async().await;

        let api = QueryApiHttp::new(test_config(&server.url()));

        let result_set = api.submit_query("SELECT 1").await.unwrap();
        assert_eq!(
            result_set,
            QueryResultSet {
                query_id: "clg-44".to_string(),
                total_rows: 25000
            }
        );
    }

    #[tokio::test]
    async fn get_query_page_test() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/queries/clg-44/results?pageNumber=1&pageSize=10000")
            .with_status(200)
            .with_body(
                json!({
                    "records": [
                        { "tx_dt": "2024-01-05 00:00:00.000", "tot_txs_count": 12 }
                    ]
                })
                .to_string(),
            )
            .create_async().await;

        let api = QueryApiHttp::new(test_config(&server.url()));

        let records = api.get_query_page("clg-44", 1, 10000).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["tot_txs_count"], json!(12));
    }

    #[tokio::test]
    async fn get_query_page_without_records_test() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/queries/clg-44/results?pageNumber=3&pageSize=10000")
            .with_status(200)
            .with_body(json!({}).to_string())
            .create_async().await;

        let api = QueryApiHttp::new(test_config(&server.url()));

        let records = api.get_query_page("clg-44", 3, 10000).await.unwrap();
        assert!(records.is_empty());
    }
}
