pub mod backlog_report;
pub mod bundle;
pub mod csv_export;

use rust_xlsxwriter::{Format, FormatBorder};

/// Blue header, white bold text, thin border.
pub fn create_header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("2C5F8A")
        .set_font_color("FFFFFF")
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

/// #,##0.00
pub fn create_number_format() -> Format {
    Format::new().set_num_format("#,##0.00")
}

pub fn create_integer_format() -> Format {
    Format::new().set_num_format("#,##0")
}

/// Expects a fraction (0.25 → 25.0%).
pub fn create_percent_format() -> Format {
    Format::new().set_num_format("0.0%")
}
