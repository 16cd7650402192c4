use anyhow::Result;
use tracing::debug;

use super::{QueryApi, QueryResultSet, Record};

/// Fetches every result page for a submitted query and concatenates the
/// records in page order.
///
/// Pages are requested strictly sequentially. The query engine rate-limits per
/// query so there is nothing to gain from overlapping requests. A failed page
/// fetch propagates as-is; rerun with a smaller page size when the service
/// rejects large pages.
pub async fn paginate_query_results(
    api: &impl QueryApi,
    result_set: &QueryResultSet,
    page_size: i64,
) -> Result<Vec<Record>> {
    assert!(page_size > 0, "page_size must be positive");

    let page_count = (result_set.total_rows + page_size - 1) / page_size;

    debug!(
        query_id = %result_set.query_id,
        total_rows = result_set.total_rows,
        page_count,
        "paginating query results"
    );

    let mut all_rows: Vec<Record> = Vec::with_capacity(result_set.total_rows as usize);
    for page_number in 1..=page_count {
        let records = api
            .get_query_page(&result_set.query_id, page_number, page_size)
            .await?;
        all_rows.extend(records);
    }

    Ok(all_rows)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use serde_json::{Number, Value};

    use crate::flipside::MockQueryApi;

    use super::*;

    fn result_set(total_rows: i64) -> QueryResultSet {
        QueryResultSet {
            query_id: "clg-44".to_string(),
            total_rows,
        }
    }

    fn records(count: i64) -> Vec<Record> {
        (0..count)
            .map(|i| {
                let mut record = Record::new();
                record.insert("n".to_string(), Value::Number(Number::from(i)));
                record
            })
            .collect()
    }

    #[tokio::test]
    async fn three_pages_for_25000_rows_test() {
        let mut api = MockQueryApi::new();
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(1), eq(10000))
            .times(1)
            .returning(|_, _, _| Ok(records(10000)));
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(2), eq(10000))
            .times(1)
            .returning(|_, _, _| Ok(records(10000)));
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(3), eq(10000))
            .times(1)
            .returning(|_, _, _| Ok(records(5000)));

        let rows = paginate_query_results(&api, &result_set(25000), 10000)
            .await
            .unwrap();

        assert_eq!(rows.len(), 25000);
    }

    #[tokio::test]
    async fn preserves_page_order_test() {
        let mut api = MockQueryApi::new();
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(1), eq(2))
            .returning(|_, _, _| Ok(records(2)));
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(2), eq(2))
            .returning(|_, _, _| {
                let mut record = Record::new();
                record.insert("n".to_string(), Value::Number(Number::from(7)));
                Ok(vec![record])
            });

        let rows = paginate_query_results(&api, &result_set(3), 2).await.unwrap();

        let values: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![0, 1, 7]);
    }

    #[tokio::test]
    async fn zero_rows_issues_no_fetches_test() {
        let mut api = MockQueryApi::new();
        api.expect_get_query_page().times(0);

        let rows = paginate_query_results(&api, &result_set(0), 10000)
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn empty_page_does_not_terminate_early_test() {
        let mut api = MockQueryApi::new();
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(1), eq(10000))
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        api.expect_get_query_page()
            .with(eq("clg-44"), eq(2), eq(10000))
            .times(1)
            .returning(|_, _, _| Ok(records(5)));

        let rows = paginate_query_results(&api, &result_set(20000), 10000)
            .await
            .unwrap();

        assert_eq!(rows.len(), 5);
    }
}
