pub mod log_entry;

pub use log_entry::{format_timestamp, LogEntry, LogRow, NewLogEntry};
