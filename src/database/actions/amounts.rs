use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    config::SchemaConfig,
    constants::RECIPE_INGREDIENT_CONSTRAINT,
    error::Error,
    schema::{Amount, Id, NewAmount, RecipeIngredient},
};

pub(crate) async fn insert_amount(
    amount: &NewAmount,
    conn: &mut PgConnection,
) -> Result<Id, Error> {
    let id: (Id,) =
        sqlx::query_as("INSERT INTO amounts (amount, ingredient_id) VALUES ($1, $2) RETURNING id")
            .bind(amount.amount())
            .bind(amount.ingredient_id())
            .fetch_one(&mut *conn)
            .await?;

    Ok(id.0)
}

/// Checks whether the recipe already uses the ingredient measured by
/// `amount_id` through some other amount. The pair is supposed to be
/// unique, but the schema has never enforced it; unless
/// `enforce_amount_pair_uniqueness` is set the duplicate is only logged.
///
/// When enforcing, `conn` must be inside a transaction. The per-recipe
/// advisory lock is held until it ends, so concurrent writers to the same
/// recipe check one after another.
async fn check_amount_pair(
    amount_id: Id,
    recipe_id: Id,
    config: &SchemaConfig,
    conn: &mut PgConnection,
) -> Result<(), Error> {
    if config.enforce_amount_pair_uniqueness {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;
    }

    let duplicate: Option<(Id, Id)> = sqlx::query_as(
        "
        SELECT other.id, other.ingredient_id
        FROM amount_recipe ar
        INNER JOIN amounts other ON other.id = ar.amount_id
        INNER JOIN amounts this ON this.ingredient_id = other.ingredient_id
        WHERE ar.recipe_id = $1 AND this.id = $2 AND other.id <> $2
        LIMIT 1
    ",
    )
    .bind(recipe_id)
    .bind(amount_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((other, ingredient_id)) = duplicate else {
        return Ok(());
    };

    if config.enforce_amount_pair_uniqueness {
        return Err(Error::unique(RECIPE_INGREDIENT_CONSTRAINT));
    }

    log::warn!(
        "Recipe {recipe_id} already uses ingredient {ingredient_id} through amount {other}; \
         linking amount {amount_id} anyway"
    );
    Ok(())
}

pub(crate) async fn link_amount(
    amount_id: Id,
    recipe_id: Id,
    config: &SchemaConfig,
    conn: &mut PgConnection,
) -> Result<(), Error> {
    check_amount_pair(amount_id, recipe_id, config, &mut *conn).await?;

    sqlx::query(
        "INSERT INTO amount_recipe (amount_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(amount_id)
    .bind(recipe_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Deletes the given amounts if no recipe links to them anymore.
pub(crate) async fn delete_orphan_amounts(
    amount_ids: &[Id],
    conn: &mut PgConnection,
) -> Result<u64, Error> {
    if amount_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "
        DELETE FROM amounts a
        WHERE a.id = ANY($1)
        AND NOT EXISTS (SELECT 1 FROM amount_recipe ar WHERE ar.amount_id = a.id)
    ",
    )
    .bind(amount_ids)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn create_amount(amount: &NewAmount, pool: &Pool<Postgres>) -> Result<Id, Error> {
    let mut conn = pool.acquire().await?;
    let id = insert_amount(amount, &mut conn).await?;

    log::debug!(
        "Created amount {id} ({} of ingredient {})",
        amount.amount(),
        amount.ingredient_id()
    );
    Ok(id)
}

pub async fn get_amount(id: Id, pool: &Pool<Postgres>) -> Result<Option<Amount>, Error> {
    let row: Option<Amount> = sqlx::query_as("SELECT * FROM amounts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Adds the amount to the recipe's ingredients. Linking the same amount
/// twice is a no-op.
pub async fn attach_amount(
    amount_id: Id,
    recipe_id: Id,
    config: &SchemaConfig,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    link_amount(amount_id, recipe_id, config, &mut tx).await?;
    tx.commit().await?;

    Ok(())
}

pub async fn detach_amount(
    amount_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM amount_recipe WHERE amount_id = $1 AND recipe_id = $2")
        .bind(amount_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// The recipe's "ingredients" relation, in the order they were added.
pub async fn list_recipe_ingredients(
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT a.id AS amount_id, i.id AS ingredient_id, i.name AS name,
               i.measurement_unit AS measurement_unit, a.amount AS amount
        FROM amount_recipe ar
        INNER JOIN amounts a ON a.id = ar.amount_id
        INNER JOIN ingredients i ON i.id = a.ingredient_id
        WHERE ar.recipe_id = $1
        ORDER BY ar.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn delete_amount(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM amounts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    log::debug!("Deleted amount {id}");
    Ok(result.rows_affected() > 0)
}
