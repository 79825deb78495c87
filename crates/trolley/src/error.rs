use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("pool error: {0}")]
    Pool(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("shopping list {list_id} not found")]
    ListNotFound { list_id: i64 },

    #[error("shopping list {list_id} has no items")]
    EmptyList { list_id: i64 },
}
