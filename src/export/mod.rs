//! Export formats for the dashboard's download button.

pub mod csv;

pub use self::csv::{HEADERS, export_filename, render_csv};
