use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    config::SchemaConfig,
    error::Error,
    schema::{Id, Recipe, RecipeData, Tag},
};

use super::{
    amounts::{delete_orphan_amounts, insert_amount, link_amount},
    tags::get_tag,
};

async fn link_tags(recipe_id: Id, tags: &[Id], conn: &mut PgConnection) -> Result<(), Error> {
    sqlx::query(
        "
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, UNNEST($2::BIGINT[])
        ON CONFLICT DO NOTHING
    ",
    )
    .bind(recipe_id)
    .bind(tags)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn add_ingredients(
    recipe_id: Id,
    recipe: &RecipeData,
    config: &SchemaConfig,
    conn: &mut PgConnection,
) -> Result<(), Error> {
    for ingredient in recipe.ingredients() {
        let amount_id = insert_amount(ingredient, &mut *conn).await?;
        link_amount(amount_id, recipe_id, config, &mut *conn).await?;
    }
    Ok(())
}

/// Unlinks every amount of the recipe and deletes those no other recipe
/// uses.
async fn clear_ingredients(recipe_id: Id, conn: &mut PgConnection) -> Result<(), Error> {
    let unlinked: Vec<(Id,)> =
        sqlx::query_as("DELETE FROM amount_recipe WHERE recipe_id = $1 RETURNING amount_id")
            .bind(recipe_id)
            .fetch_all(&mut *conn)
            .await?;

    let amount_ids: Vec<Id> = unlinked.into_iter().map(|row| row.0).collect();
    delete_orphan_amounts(&amount_ids, conn).await?;

    Ok(())
}

/// Inserts the recipe with its tag links and ingredient amounts in one
/// transaction. Unknown tags or ingredients fail with
/// [`Error::MissingReference`], as does an unknown author.
pub async fn create_recipe(
    author_id: Id,
    recipe: &RecipeData,
    config: &SchemaConfig,
    pool: &Pool<Postgres>,
) -> Result<Id, Error> {
    let mut tx = pool.begin().await?;

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, image, name, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(recipe.image())
    .bind(recipe.name())
    .bind(recipe.text())
    .bind(recipe.cooking_time())
    .fetch_one(&mut *tx)
    .await?;
    let recipe_id = id.0;

    link_tags(recipe_id, recipe.tags(), &mut tx).await?;
    add_ingredients(recipe_id, recipe, config, &mut tx).await?;

    tx.commit().await?;

    log::debug!(
        "Created recipe {recipe_id} by user {author_id} ({} tags, {} ingredients)",
        recipe.tags().len(),
        recipe.ingredients().len()
    );
    Ok(recipe_id)
}

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Newest first.
pub async fn list_recipes(pool: &Pool<Postgres>) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as("SELECT * FROM recipes ORDER BY id DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn list_author_recipes(
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> =
        sqlx::query_as("SELECT * FROM recipes WHERE author_id = $1 ORDER BY id DESC")
            .bind(author_id)
            .fetch_all(pool)
            .await?;

    Ok(rows)
}

/// Replaces every field, the tag set and the ingredient list.
pub async fn update_recipe(
    id: Id,
    recipe: &RecipeData,
    config: &SchemaConfig,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE recipes SET image = $2, name = $3, text = $4, cooking_time = $5 WHERE id = $1",
    )
    .bind(id)
    .bind(recipe.image())
    .bind(recipe.name())
    .bind(recipe.text())
    .bind(recipe.cooking_time())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound { entity: "recipe", id });
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    link_tags(id, recipe.tags(), &mut tx).await?;

    clear_ingredients(id, &mut tx).await?;
    add_ingredients(id, recipe, config, &mut tx).await?;

    tx.commit().await?;

    log::debug!("Updated recipe {id}");
    Ok(())
}

/// Tag links, cart entries and favorites go with the recipe.
pub async fn delete_recipe(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let mut tx = pool.begin().await?;

    clear_ingredients(id, &mut tx).await?;
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    log::debug!("Deleted recipe {id}");
    Ok(result.rows_affected() > 0)
}

pub async fn list_recipe_tags(recipe_id: Id, pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.*
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(list)
}

pub async fn add_tag_to_recipe(
    recipe_id: Id,
    tag_id: Id,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    if get_tag(tag_id, pool).await?.is_none() {
        return Err(Error::NotFound {
            entity: "tag",
            id: tag_id,
        });
    }

    let mut conn = pool.acquire().await?;
    link_tags(recipe_id, &[tag_id], &mut conn).await?;

    Ok(())
}

pub async fn remove_tag_from_recipe(
    recipe_id: Id,
    tag_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1 AND tag_id = $2")
        .bind(recipe_id)
        .bind(tag_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
