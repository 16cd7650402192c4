use std::fs;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    dashboards::QueryVariant,
    data_table::DataTable,
    flipside::{paginate_query_results, QueryApi},
    snapshots::SnapshotStore,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("snapshot {path} is missing expected columns {missing:?}")]
    SchemaMismatch { path: String, missing: Vec<String> },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

/// Returns each dashboard tab's table, fetching from the query service and
/// caching to disk at most once per calendar day.
pub struct SnapshotLoader<A: QueryApi> {
    api: A,
    store: SnapshotStore,
    page_size: i64,
}

impl<A: QueryApi> SnapshotLoader<A> {
    pub fn new(api: A, store: SnapshotStore, page_size: i64) -> Self {
        Self {
            api,
            store,
            page_size,
        }
    }

    /// Loads the variant's table for `today`, querying and caching on miss.
    ///
    /// A snapshot written earlier the same day counts as complete and is never
    /// re-fetched, even if the query text has changed since. Two loads racing
    /// on the same key before the file exists will both query the service.
    /// Acceptable for one analyst at one machine, wrong for anything
    /// multi-user or scheduled.
    pub async fn load(
        &self,
        variant: QueryVariant,
        today: NaiveDate,
    ) -> Result<DataTable, LoadError> {
        let path = self.store.path_for(variant, today);

        let table = if path.exists() {
            debug!(path = %path.display(), "reading cached snapshot");
            DataTable::read_csv(&path)?
        } else {
            info!(%variant, "no snapshot for today, querying the service");

            let result_set = self.api.submit_query(&variant.sql()).await?;
            let records =
                paginate_query_results(&self.api, &result_set, self.page_size).await?;
            let table = DataTable::from_records(&records);

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            table.write_csv(&path)?;
            info!(%variant, rows = table.len(), path = %path.display(), "snapshot written");

            table
        };

        // An empty result set has no columns at all; it is a valid zero-row
        // day, not a schema break.
        if !table.is_empty() {
            let missing: Vec<String> = variant
                .expected_columns()
                .iter()
                .filter(|expected| !table.columns().iter().any(|column| column == *expected))
                .map(|expected| expected.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(LoadError::SchemaMismatch {
                    path: path.display().to_string(),
                    missing,
                });
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::flipside::{MockQueryApi, QueryResultSet, Record};

    use super::*;

    fn users_record(day: &str, active: i64) -> Record {
        let mut record = Record::new();
        record.insert(
            "tx_dt".to_string(),
            Value::String(format!("{day} 00:00:00.000")),
        );
        record.insert("num_active_users".to_string(), json!(active));
        record.insert("avg_num_active_users".to_string(), json!(active));
        record
    }

    fn mock_users_api(times: usize) -> MockQueryApi {
        let mut api = MockQueryApi::new();
        api.expect_submit_query().times(times).returning(|_| {
            Ok(QueryResultSet {
                query_id: "clg-44".to_string(),
                total_rows: 2,
            })
        });
        api.expect_get_query_page()
            .times(times)
            .returning(|_, _, _| {
                Ok(vec![
                    users_record("2024-01-05", 10),
                    users_record("2024-01-06", 14),
                ])
            });
        api
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_writes_snapshot_on_miss_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let loader = SnapshotLoader::new(mock_users_api(1), store.clone(), 10000);

        let table = loader.load(QueryVariant::Users, today()).await.unwrap();

        assert_eq!(table.len(), 2);
        assert!(store.path_for(QueryVariant::Users, today()).exists());
    }

    #[tokio::test]
    async fn second_load_reads_cache_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        // The mock only allows one submit; a second query would fail the test.
        let loader = SnapshotLoader::new(mock_users_api(1), store, 10000);

        let first = loader.load(QueryVariant::Users, today()).await.unwrap();
        let second = loader.load(QueryVariant::Users, today()).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn next_day_queries_again_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let loader = SnapshotLoader::new(mock_users_api(2), store, 10000);

        loader.load(QueryVariant::Users, today()).await.unwrap();
        loader
            .load(QueryVariant::Users, today().succ_opt().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_named_error_test() {
        let mut api = MockQueryApi::new();
        api.expect_submit_query().returning(|_| {
            Ok(QueryResultSet {
                query_id: "clg-44".to_string(),
                total_rows: 1,
            })
        });
        api.expect_get_query_page().returning(|_, _, _| {
            let mut record = Record::new();
            record.insert("tx_dt".to_string(), json!("2024-01-05 00:00:00.000"));
            Ok(vec![record])
        });

        let dir = tempfile::tempdir().unwrap();
        let loader = SnapshotLoader::new(api, SnapshotStore::new(dir.path()), 10000);

        let result = loader.load(QueryVariant::Users, today()).await;
        match result {
            Err(LoadError::SchemaMismatch { missing, .. }) => {
                assert_eq!(missing, vec!["num_active_users", "avg_num_active_users"]);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_result_set_is_not_an_error_test() {
        let mut api = MockQueryApi::new();
        api.expect_submit_query().returning(|_| {
            Ok(QueryResultSet {
                query_id: "clg-44".to_string(),
                total_rows: 0,
            })
        });
        api.expect_get_query_page().times(0);

        let dir = tempfile::tempdir().unwrap();
        let loader = SnapshotLoader::new(api, SnapshotStore::new(dir.path()), 10000);

        let table = loader.load(QueryVariant::Users, today()).await.unwrap();
        assert!(table.is_empty());
    }
}
