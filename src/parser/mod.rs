pub mod columns;
pub mod deserializers;
pub mod pipeline;
pub mod reader;
pub mod rules;
pub mod types;

pub use pipeline::{load_bytes, load_data, load_file, normalize_tickets, LoadOutput};
pub use rules::{apply_rules, StatusFields};
pub use types::{RawTicket, Ticket};
