#![allow(dead_code)]

use std::str::FromStr;

use rand::{distributions::Alphanumeric, Rng};
use recipes_sdk::{
    actions::{create_ingredient, create_recipe, create_tag},
    config::SchemaConfig,
    image::ImageRef,
    migrate::install_schema,
    schema::{Id, NewAmount, NewIngredient, NewTag, RecipeData},
};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Pool, Postgres,
};

/// Set in CI so a missing database fails the run instead of skipping.
pub const REQUIRE_DATABASE: &str = "RECIPES_REQUIRE_DATABASE";

/// Decides whether a database test runs. Without a url the test is
/// skipped, unless the database is required, in which case it panics.
pub fn database_url(url: Option<String>, required: bool) -> Option<String> {
    match url {
        Some(url) if !url.is_empty() => Some(url),
        _ if required => panic!("DATABASE_URL is not set but {REQUIRE_DATABASE} is"),
        _ => {
            eprintln!("DATABASE_URL is not set; skipping database test");
            None
        }
    }
}

/// Connects to `DATABASE_URL` and installs the schema into a fresh
/// Postgres schema, so tests never see each other's rows. Returns `None`
/// when no database is configured and [`REQUIRE_DATABASE`] is unset.
pub async fn setup(config: &SchemaConfig) -> Option<Pool<Postgres>> {
    let url = database_url(
        std::env::var("DATABASE_URL").ok(),
        std::env::var_os(REQUIRE_DATABASE).is_some(),
    )?;

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    let schema = format!("recipes_test_{suffix}");

    let options = PgConnectOptions::from_str(&url).expect("DATABASE_URL is a postgres url");

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await
        .expect("database is reachable");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();
    admin.close().await;

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_with(options.options([("search_path", schema.as_str())]))
        .await
        .unwrap();

    sqlx::query(&format!(
        "CREATE TABLE {} ({} BIGSERIAL PRIMARY KEY, username TEXT NOT NULL UNIQUE)",
        config.user_model.table, config.user_model.primary_key
    ))
    .execute(&pool)
    .await
    .unwrap();

    install_schema(config, &pool).await.unwrap();

    Some(pool)
}

pub async fn create_user(username: &str, config: &SchemaConfig, pool: &Pool<Postgres>) -> Id {
    let id: (Id,) = sqlx::query_as(&format!(
        "INSERT INTO {} (username) VALUES ($1) RETURNING {}",
        config.user_model.table, config.user_model.primary_key
    ))
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap();

    id.0
}

pub async fn delete_user(id: Id, config: &SchemaConfig, pool: &Pool<Postgres>) {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE {} = $1",
        config.user_model.table, config.user_model.primary_key
    ))
    .bind(id)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn tag(name: &str, color: &str, pool: &Pool<Postgres>) -> Id {
    let slug = name.to_lowercase();
    create_tag(&NewTag::new(name, color, &slug).unwrap(), pool)
        .await
        .unwrap()
}

pub async fn ingredient(name: &str, unit: &str, pool: &Pool<Postgres>) -> Id {
    create_ingredient(&NewIngredient::new(name, unit).unwrap(), pool)
        .await
        .unwrap()
}

pub fn recipe_data(name: &str, tags: &[Id], ingredients: &[(Id, i32)]) -> RecipeData {
    RecipeData::new(
        name,
        "Mix everything and wait.",
        15,
        ImageRef::upload(&format!("{}.jpg", name.to_lowercase())).unwrap(),
    )
    .unwrap()
    .with_tags(tags.iter().copied())
    .with_ingredients(
        ingredients
            .iter()
            .map(|(id, amount)| NewAmount::new(*id, *amount).unwrap()),
    )
}

pub async fn recipe(
    author_id: Id,
    name: &str,
    config: &SchemaConfig,
    pool: &Pool<Postgres>,
) -> Id {
    create_recipe(author_id, &recipe_data(name, &[], &[]), config, pool)
        .await
        .unwrap()
}
