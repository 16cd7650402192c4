mod dashboards;
mod data_table;
mod env;
mod fear_and_greed;
mod flipside;
mod loader;
pub mod log;
mod snapshots;
mod time_frames;

pub use dashboards::ParseQueryVariantError;
pub use dashboards::QueryVariant;
pub use dashboards::DATE_COLUMN;
pub use data_table::DataTable;
pub use data_table::TableError;
pub use fear_and_greed::get_fear_and_greed_index;
pub use fear_and_greed::FearGreedPoint;
pub use flipside::paginate_query_results;
pub use flipside::FlipsideConfig;
pub use flipside::MockQueryApi;
pub use flipside::QueryApi;
pub use flipside::QueryApiHttp;
pub use flipside::QueryResultSet;
pub use flipside::Record;
pub use flipside::DEFAULT_PAGE_SIZE;
pub use loader::LoadError;
pub use loader::SnapshotLoader;
pub use snapshots::SnapshotStore;
pub use snapshots::DASHBOARD_KEY;
pub use time_frames::filter_by_time_frame;
pub use time_frames::ParseTimeFrameError;
pub use time_frames::TimeFrame;
