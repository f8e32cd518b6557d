use sqlx::MySqlPool;

use crate::error::StoreError;

pub async fn init_db(database_url: &str) -> Result<MySqlPool, StoreError> {
    MySqlPool::connect(database_url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to database");
        StoreError::from(e)
    })
}
