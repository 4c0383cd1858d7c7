pub mod backlog;
pub mod charts;
pub mod dashboard;
pub mod filters;
pub mod metrics;
pub mod stats;
pub mod table;
pub mod temporal;

pub use backlog::{compute_backlog, BacklogLedger, BacklogRow, BacklogSummary};
pub use dashboard::{build_dashboard_report, DashboardReport};
pub use filters::{FilterOptions, FilterSelection};
pub use table::{build_table, TableRequest, TableView};
