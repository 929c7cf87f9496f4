use crate::{
    error::Error,
    schema::{Id, Ingredient, NewIngredient},
};

use sqlx::{Pool, Postgres};

pub async fn create_ingredient(
    ingredient: &NewIngredient,
    pool: &Pool<Postgres>,
) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO ingredients (name, measurement_unit)
        VALUES ($1, $2)
        RETURNING id
    ",
    )
    .bind(ingredient.name())
    .bind(ingredient.measurement_unit())
    .fetch_one(pool)
    .await?;

    log::debug!("Created ingredient {} ({})", id.0, ingredient.name());
    Ok(id.0)
}

pub async fn get_ingredient(id: Id, pool: &Pool<Postgres>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> = sqlx::query_as("SELECT * FROM ingredients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Case-insensitive lookup by name.
pub async fn find_ingredient(name: &str, pool: &Pool<Postgres>) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> =
        sqlx::query_as("SELECT id FROM ingredients WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|r| r.0))
}

pub async fn list_ingredients(pool: &Pool<Postgres>) -> Result<Vec<Ingredient>, Error> {
    let rows: Vec<Ingredient> = sqlx::query_as("SELECT * FROM ingredients ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Every amount measuring this ingredient goes with it.
pub async fn delete_ingredient(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    log::debug!("Deleted ingredient {id}");
    Ok(result.rows_affected() > 0)
}
