use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_products::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

const DEFAULT_STATIC_DIR: &str = "static";

/// Catalog web configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Collection holding product documents (`CATALOG_COLLECTION`)
    pub collection: String,
    /// Directory served under `/static` (`STATIC_DIR`)
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let app = app_info!();
        let mongodb = MongoConfig::from_env()?.with_app_name(app.name);
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app,
            mongodb,
            server,
            environment,
            collection: env_or_default("CATALOG_COLLECTION", DEFAULT_COLLECTION),
            static_dir: env_or_default("STATIC_DIR", DEFAULT_STATIC_DIR),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("CATALOG_COLLECTION", None::<&str>),
                ("STATIC_DIR", None::<&str>),
                ("PORT", None::<&str>),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.collection, "products");
                assert_eq!(config.static_dir, "static");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.mongodb.database(), "catalog");
                assert_eq!(config.mongodb.app_name.as_deref(), Some("catalog_web"));
            },
        );
    }

    #[test]
    fn test_config_overrides() {
        temp_env::with_vars(
            [
                ("MONGO_URL", Some("mongodb://db:27017")),
                ("MONGODB_URL", None::<&str>),
                ("MONGODB_DATABASE", Some("shop")),
                ("CATALOG_COLLECTION", Some("wines")),
                ("STATIC_DIR", Some("/srv/static")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.url(), "mongodb://db:27017");
                assert_eq!(config.collection, "wines");
                assert_eq!(config.static_dir, "/srv/static");
            },
        );
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None::<&str>),
                ("MONGODB_DATABASE", Some("catalog")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
