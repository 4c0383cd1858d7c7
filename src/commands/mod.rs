pub mod dashboard;
pub mod export;
pub mod import;
pub mod table;
