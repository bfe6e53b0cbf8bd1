pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_entities_from_file, load_entities_from_source, parse_roster_line};
