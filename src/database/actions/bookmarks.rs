//! Shopping cart and favorites. Both are a (user, recipe) pair with a
//! unique constraint and differ only in the table they live in.

use sqlx::{Pool, Postgres};

use crate::{
    declaration::{EntityDecl, FAVORITE, SHOPPING_CART},
    error::Error,
    schema::{Bookmark, Id, Recipe, ShoppingListItem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookmarkKind {
    ShoppingCart,
    Favorite,
}

impl BookmarkKind {
    pub fn entity(&self) -> &'static EntityDecl {
        match self {
            BookmarkKind::ShoppingCart => &SHOPPING_CART,
            BookmarkKind::Favorite => &FAVORITE,
        }
    }

    fn table(&self) -> String {
        self.entity().table()
    }
}

/// Fails with [`Error::UniqueViolation`] when the user already has the
/// recipe bookmarked.
pub async fn add_bookmark(
    kind: BookmarkKind,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Id, Error> {
    let id: (Id,) = sqlx::query_as(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) RETURNING id",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await?;

    log::debug!("User {user_id} bookmarked recipe {recipe_id} ({kind:?})");
    Ok(id.0)
}

pub async fn remove_bookmark(
    kind: BookmarkKind,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_bookmarked(
    kind: BookmarkKind,
    user_id: Id,
    recipe_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let exists: (bool,) = sqlx::query_as(&format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await?;

    Ok(exists.0)
}

pub async fn list_bookmarks(
    kind: BookmarkKind,
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Bookmark>, Error> {
    let rows: Vec<Bookmark> = sqlx::query_as(&format!(
        "SELECT * FROM {} WHERE user_id = $1 ORDER BY id",
        kind.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Recipes in the order the user bookmarked them.
pub async fn list_bookmarked_recipes(
    kind: BookmarkKind,
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as(&format!(
        "
        SELECT r.*
        FROM {} b
        INNER JOIN recipes r ON r.id = b.recipe_id
        WHERE b.user_id = $1
        ORDER BY b.id
    ",
        kind.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sums every ingredient over all recipes in the user's cart. The same
/// ingredient is only merged when its measurement unit matches.
pub async fn shopping_list(
    user_id: Id,
    pool: &Pool<Postgres>,
) -> Result<Vec<ShoppingListItem>, Error> {
    let rows: Vec<ShoppingListItem> = sqlx::query_as(&format!(
        "
        SELECT i.name AS name, i.measurement_unit AS measurement_unit,
               SUM(a.amount)::BIGINT AS total
        FROM {} sc
        INNER JOIN amount_recipe ar ON ar.recipe_id = sc.recipe_id
        INNER JOIN amounts a ON a.id = ar.amount_id
        INNER JOIN ingredients i ON i.id = a.ingredient_id
        WHERE sc.user_id = $1
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
    ",
        BookmarkKind::ShoppingCart.table()
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
