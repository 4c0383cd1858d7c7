use crate::analyzer::dashboard::{build_dashboard_report, DashboardReport};
use crate::analyzer::filters::{FilterOptions, FilterSelection};
use crate::state::{AppState, DatasetAccess};

/// Returns the complete dashboard payload for the session's dataset, with the
/// user's filters applied.
pub fn get_dashboard_report(
    state: &AppState,
    session: &str,
    selection: &FilterSelection,
) -> Result<DashboardReport, String> {
    state.dataset(session, |out, config| {
        Ok(build_dashboard_report(out, selection, config))
    })
}

/// Values offered by the filter widgets.
pub fn get_filter_options(state: &AppState, session: &str) -> Result<FilterOptions, String> {
    state.dataset(session, |out, _| Ok(out.filter_options.clone()))
}
