use sqlx::{Pool, Postgres};

use crate::config::SchemaConfig;

use super::{
    declaration::{create_statements, ENTITIES},
    error::Error,
};

/// Creates every declared table, join table and index that does not exist
/// yet. Runs in one transaction, so a failure leaves nothing behind.
pub async fn install_schema(config: &SchemaConfig, pool: &Pool<Postgres>) -> Result<(), Error> {
    config.user_model.validate()?;

    let mut tx = pool.begin().await?;
    for statement in create_statements(config) {
        log::trace!("> {statement}");
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    log::info!(
        "Installed schema for {} entities (users: {})",
        ENTITIES.len(),
        config.user_model.table
    );

    Ok(())
}
