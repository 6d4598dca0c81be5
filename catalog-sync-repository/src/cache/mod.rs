//! Cache layer implementations.
//!
//! The cache is created once at startup and handed to the query services;
//! there is no process-wide handle.

mod memory;
mod redis_cache;

pub use self::memory::InMemoryCache;
pub use self::redis_cache::RedisCache;

/// Separator between the parts of a cache key.
pub const KEY_SEPARATOR: &str = "_";

/// Build a cache key from its identifying parts, skipping empty ones.
///
/// `cache_key(&["films", "2", "50", "-imdb_rating", ""])` yields
/// `films_2_50_-imdb_rating`.
pub fn cache_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_skips_empty_parts() {
        assert_eq!(
            cache_key(&["films", "2", "50", "-imdb_rating", ""]),
            "films_2_50_-imdb_rating"
        );
        assert_eq!(cache_key(&["film", "abc"]), "film_abc");
        assert_eq!(cache_key::<&str>(&[]), "");
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let parts = vec!["persons".to_string(), "lucas".to_string(), "1".to_string()];
        assert_eq!(cache_key(&parts), cache_key(&parts));
    }
}
