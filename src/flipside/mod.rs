mod api;
mod paginate;

pub use api::FlipsideConfig;
pub use api::MockQueryApi;
pub use api::QueryApi;
pub use api::QueryApiHttp;
pub use api::DEFAULT_PAGE_SIZE;

pub use paginate::paginate_query_results;

/// One result row as returned by the query engine. The schema is whatever the
/// submitted query projects, so rows stay dynamic.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Handle for a submitted query, used to page through its results.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryResultSet {
    pub query_id: String,
    pub total_rows: i64,
}
