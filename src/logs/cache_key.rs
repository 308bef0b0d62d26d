/// Namespace shared by every cached log query
pub const CACHE_KEY_PREFIX: &str = "logs:";

/// Cache key for a request, from its path and raw query string.
///
/// The query string is used exactly as received: `?a=1&b=2` and `?b=2&a=1`
/// are cached separately.
pub fn derive_cache_key(path_and_query: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, path_and_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_prefixed_verbatim() {
        assert_eq!(derive_cache_key("/api/logs"), "logs:/api/logs");
        assert_eq!(
            derive_cache_key("/api/logs?since=1h&level=error"),
            "logs:/api/logs?since=1h&level=error"
        );
    }

    #[test]
    fn test_same_input_same_key() {
        let a = derive_cache_key("/api/logs?level=error");
        let b = derive_cache_key("/api/logs?level=error");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parameter_order_matters() {
        assert_ne!(
            derive_cache_key("/api/logs?since=1h&level=error"),
            derive_cache_key("/api/logs?level=error&since=1h")
        );
    }
}
