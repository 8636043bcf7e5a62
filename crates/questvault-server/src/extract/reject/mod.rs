//! Extractors with enhanced rejection handling.

mod enhanced_json;
mod enhanced_multipart;
mod enhanced_path;
mod enhanced_query;

pub use self::enhanced_json::Json;
pub use self::enhanced_multipart::Multipart;
pub use self::enhanced_path::Path;
pub use self::enhanced_query::Query;

/// Shortens rejection messages so they stay readable in responses.
fn truncate_detail(message: &str) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(200)
        .collect()
}
