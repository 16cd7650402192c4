use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use crate::{dashboards::QueryVariant, env::ENV_CONFIG};

/// Logical identity of the dashboard, the first segment of every snapshot
/// file name.
pub const DASHBOARD_KEY: &str = "metawin";

/// Derives where a day's snapshot for a query variant lives on disk.
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    cache_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn new_from_env() -> Self {
        Self::new(ENV_CONFIG.cache_dir.clone())
    }

    /// `<cache_dir>/metawin_<year><month><day>_<variant>.csv`, month and day
    /// unpadded. The key the dashboards have always used, so existing caches
    /// stay valid.
    pub fn path_for(&self, variant: QueryVariant, date: NaiveDate) -> PathBuf {
        let file_name = format!(
            "{}_{}{}{}_{}.csv",
            DASHBOARD_KEY,
            date.year(),
            date.month(),
            date.day(),
            variant.file_suffix()
        );
        self.cache_dir.join(file_name)
    }
}
