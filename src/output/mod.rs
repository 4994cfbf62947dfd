//! Report structures and their console, JSON and Markdown renderings

pub mod formatter;
pub mod report;

pub use formatter::ReportGenerator;
pub use report::Report;
