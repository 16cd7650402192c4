use chrono::Utc;
use metawin_analysis::{log, QueryApiHttp, QueryVariant, SnapshotLoader, SnapshotStore};
use tracing::info;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    log::init();

    let api = QueryApiHttp::new_from_env();
    let page_size = api.page_size();
    let loader = SnapshotLoader::new(api, SnapshotStore::new_from_env(), page_size);

    let today = Utc::now().date_naive();
    for variant in QueryVariant::iterator() {
        let table = loader.load(*variant, today).await?;
        info!(%variant, rows = table.len(), "snapshot ready");
    }

    Ok(())
}
