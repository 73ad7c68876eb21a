//! Configuration for Coverlay.
//!
//! Values come from the environment (with `.env` support) and are parsed
//! once into a process-wide `Config`.

use once_cell::sync::OnceCell;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub repo: RepoConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, or ":memory:".
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Base redis URL; per-project partitions override its database index.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Directory under which project mirrors live.
    pub root: String,
}

impl Config {
    fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(8300),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "data/coverlay.db"),
            },
            cache: CacheConfig {
                url: env_or("REDIS_URL", "redis://127.0.0.1:6379"),
            },
            repo: RepoConfig {
                root: env_or("GIT_REPO_ROOT", "data/repos"),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load configuration from the environment. Idempotent.
pub fn init() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Access the process configuration, initializing on first use.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_to_default() {
        assert_eq!(env_or("COVERLAY_UNSET_TEST_VAR", "fallback"), "fallback");
    }
}
