use sqlx::{postgres::PgPoolOptions, PgPool};

/// One connection is enough: an invocation runs a single read or delete.
pub async fn create_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(1).connect(url).await
}
