pub use crate::utils::database;
use async_trait::async_trait;
use std::env;

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");

        Self {
            database: DatabaseConfig { url: database_url },
        }
    }
}

#[derive(Clone)]
pub struct Context {
    pub db_conn: database::DatabaseConnection,
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Context;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Context {
        let db_conn = database::connect(self.database.url.as_str()).await;
        database::migrate(db_conn.clone()).await;

        Context { db_conn }
    }
}
