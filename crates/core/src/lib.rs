pub mod catalog;
pub mod domain;
pub mod engine;
pub mod storage;

pub use catalog::{CardCatalogGateway, CatalogUnavailable};
pub use engine::{recommend, RecommendOptions};

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub catalog_base_url: Option<String>,
        pub catalog_api_key: Option<String>,
        pub catalog_file: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                catalog_base_url: non_empty_var("CATALOG_BASE_URL"),
                catalog_api_key: non_empty_var("CATALOG_API_KEY"),
                catalog_file: non_empty_var("CATALOG_FILE"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_catalog_base_url(&self) -> anyhow::Result<&str> {
            self.catalog_base_url
                .as_deref()
                .context("CATALOG_BASE_URL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn require_reports_missing_keys() {
            let settings = Settings {
                database_url: None,
                catalog_base_url: Some("https://cards.example.com".to_string()),
                catalog_api_key: None,
                catalog_file: None,
                sentry_dsn: None,
            };
            let err = settings.require_database_url().unwrap_err();
            assert_eq!(err.to_string(), "DATABASE_URL is required");
            assert_eq!(
                settings.require_catalog_base_url().unwrap(),
                "https://cards.example.com"
            );
        }
    }
}
