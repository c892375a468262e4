//! Message identifiers surfaced to the UI boundary.
//!
//! Error callbacks carry an integer id rather than text; the presentation
//! layer resolves ids to localized strings. `resolve` provides the English
//! table for the CLI.

/// Identifier for a user-facing message
pub type MessageId = u32;

pub const MSG_SEARCH_FAILED_GENERAL: MessageId = 0x0101;
pub const MSG_SEARCH_FAILED_NO_ITEMS: MessageId = 0x0102;
pub const MSG_ADD_FAILED: MessageId = 0x0103;
pub const MSG_ANALYTICS_ENABLED: MessageId = 0x0201;
pub const MSG_ANALYTICS_DISABLED: MessageId = 0x0202;

/// Resolve a message id to display text
pub fn resolve(id: MessageId) -> &'static str {
    match id {
        MSG_SEARCH_FAILED_GENERAL => "The search could not be completed, try again later",
        MSG_SEARCH_FAILED_NO_ITEMS => "No items found for the search",
        MSG_ADD_FAILED => "Failed to add the series, try again later",
        MSG_ANALYTICS_ENABLED => "Analytics enabled",
        MSG_ANALYTICS_DISABLED => "Analytics disabled",
        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids_resolve() {
        assert_eq!(
            resolve(MSG_SEARCH_FAILED_NO_ITEMS),
            "No items found for the search"
        );
        assert_ne!(resolve(MSG_SEARCH_FAILED_GENERAL), "Unknown error");
    }

    #[test]
    fn test_unknown_id_falls_back() {
        assert_eq!(resolve(0xdead), "Unknown error");
    }
}
