//! Coverage hit-set lookup.
//!
//! Hit sets live in the project's cache partition as redis sets keyed by
//! relative file path. A dead cache degrades to an empty set; file viewing
//! keeps working without highlights.

use tracing::warn;

use super::CacheService;

/// Key prefix for per-file hit sets within a partition.
const HIT_SET_PREFIX: &str = "hits:";

#[derive(Debug, Clone)]
pub struct CoverageService {
    cache: CacheService,
}

impl CoverageService {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }

    /// Covered line numbers for a file, sorted ascending.
    ///
    /// Returns an empty set when the cache is unreachable or the key does
    /// not exist.
    pub async fn hit_set(&self, partition: i64, path: &str) -> Vec<u32> {
        let key = format!("{}{}", HIT_SET_PREFIX, path);

        let mut conn = match self.cache.connection(partition).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(partition, path = %path, error = %e, "Coverage lookup skipped, cache unavailable");
                return Vec::new();
            }
        };

        let members: Vec<String> = match redis::cmd("SMEMBERS").arg(&key).query_async(&mut conn).await {
            Ok(members) => members,
            Err(e) => {
                warn!(partition, path = %path, error = %e, "Coverage lookup failed");
                return Vec::new();
            }
        };

        parse_lines(members)
    }
}

/// Parse raw set members into sorted, deduplicated line numbers.
/// Non-numeric members are dropped.
fn parse_lines(members: Vec<String>) -> Vec<u32> {
    let mut lines: Vec<u32> = members.iter().filter_map(|m| m.trim().parse().ok()).collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_sorts_and_dedups() {
        let members = vec!["12", "3", "12", " 7 ", "1"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(parse_lines(members), vec![1, 3, 7, 12]);
    }

    #[test]
    fn test_parse_lines_drops_garbage() {
        let members = vec!["5", "banana", "-2", ""]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(parse_lines(members), vec![5]);
    }

    #[tokio::test]
    async fn test_unreachable_cache_degrades_to_empty() {
        // Port 1 is never a redis server; connection must fail fast and
        // the lookup must swallow it.
        let coverage = CoverageService::new(CacheService::new("redis://127.0.0.1:1"));
        let lines = coverage.hit_set(0, "src/app.py").await;
        assert!(lines.is_empty());
    }
}
