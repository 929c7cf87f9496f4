use crate::{
    error::Error,
    schema::{Id, NewTag, Tag},
};

use sqlx::{Pool, Postgres};

/// Fails with [`Error::UniqueViolation`] when the name, color or slug is
/// already taken.
pub async fn create_tag(tag: &NewTag, pool: &Pool<Postgres>) -> Result<Id, Error> {
    let id: (Id,) =
        sqlx::query_as("INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING id")
            .bind(tag.name())
            .bind(tag.color())
            .bind(tag.slug())
            .fetch_one(pool)
            .await?;

    log::debug!("Created tag {} ({})", id.0, tag.slug());
    Ok(id.0)
}

pub async fn get_tag(id: Id, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn find_tag_by_slug(slug: &str, pool: &Pool<Postgres>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn list_tags(pool: &Pool<Postgres>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(list)
}

pub async fn update_tag(id: Id, tag: &NewTag, pool: &Pool<Postgres>) -> Result<(), Error> {
    let result = sqlx::query("UPDATE tags SET name = $2, color = $3, slug = $4 WHERE id = $1")
        .bind(id)
        .bind(tag.name())
        .bind(tag.color())
        .bind(tag.slug())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound { entity: "tag", id });
    }
    Ok(())
}

/// Recipes lose the tag; they are not deleted.
pub async fn delete_tag(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    log::debug!("Deleted tag {id}");
    Ok(result.rows_affected() > 0)
}
