pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///bi_assistant.db";
pub const DEFAULT_YEAR: i64 = 2024;

const SQLITE_URL_PREFIXES: &[&str] = &["sqlite:///", "sqlite://"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub default_year: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            default_year: DEFAULT_YEAR,
        }
    }
}

impl ServerConfig {
    /// Picks the first locator that is set and non-blank: explicit override,
    /// then the environment value, then the built-in default.
    #[must_use]
    pub fn from_sources(override_url: Option<&str>, env_url: Option<&str>) -> Self {
        let database_url = [override_url, env_url]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|candidate| !candidate.is_empty())
            .unwrap_or(DEFAULT_DATABASE_URL)
            .to_string();

        Self {
            database_url,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn store_locator(&self) -> &str {
        resolve_store_locator(&self.database_url)
    }
}

/// Strips a `sqlite:///` or `sqlite://` scheme prefix. Anything else is handed
/// to SQLite untouched, so plain paths, `:memory:` and `file:` URIs all work.
#[must_use]
pub fn resolve_store_locator(database_url: &str) -> &str {
    SQLITE_URL_PREFIXES
        .iter()
        .find_map(|prefix| database_url.strip_prefix(prefix))
        .unwrap_or(database_url)
}
