use crate::analyzer::filters::FilterSelection;
use crate::analyzer::table::{available_columns, build_table, TableRequest, TableView};
use crate::state::{AppState, DatasetAccess};

/// Raw-data table of the filtered records.
pub fn get_table_view(
    state: &AppState,
    session: &str,
    selection: &FilterSelection,
    request: &TableRequest,
) -> Result<TableView, String> {
    state.dataset(session, |out, _| {
        let tickets = selection.apply(&out.tickets);
        let available = available_columns(|c| out.has_column(c));
        Ok(build_table(&tickets, &available, request))
    })
}
