//! Settings for the recipe data layer.
//!
//! Loaded from defaults, an optional TOML file and `RECIPES__*`
//! environment variables, in that order of precedence (later wins):
//!
//! ```toml
//! [database]
//! url = "postgres://recipes@localhost/recipes"
//! max_connections = 10
//!
//! [schema]
//! enforce_amount_pair_uniqueness = false
//!
//! [schema.user_model]
//! table = "users"
//! primary_key = "id"
//! ```

use std::path::Path;

use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::error::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// The user table recipes, carts and favorites point at.
    #[serde(default)]
    pub user_model: UserModel,

    /// Reject a second Amount for an ingredient a recipe already uses.
    /// Off by default: duplicates are accepted and logged.
    #[serde(default)]
    pub enforce_amount_pair_uniqueness: bool,
}

/// Reference to the externally managed user entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    #[serde(default = "default_user_table")]
    pub table: String,

    #[serde(default = "default_user_primary_key")]
    pub primary_key: String,
}

fn default_database_url() -> String {
    String::from("postgres://localhost/recipes")
}

fn default_max_connections() -> u32 {
    5
}

fn default_user_table() -> String {
    String::from("users")
}

fn default_user_primary_key() -> String {
    String::from("id")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for UserModel {
    fn default() -> Self {
        Self {
            table: default_user_table(),
            primary_key: default_user_primary_key(),
        }
    }
}

impl UserModel {
    /// Both names end up verbatim in DDL, so only plain (optionally
    /// schema-qualified) identifiers are accepted.
    pub fn validate(&self) -> Result<(), Error> {
        for (key, value) in [("table", &self.table), ("primary_key", &self.primary_key)] {
            if !is_identifier(value) {
                return Err(Error::Config(config_crate::ConfigError::Message(format!(
                    "schema.user_model.{key} is not a valid identifier: {value:?}"
                ))));
            }
        }
        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    value.split('.').all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("RECIPES").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.schema.user_model.validate()?;

        Ok(settings)
    }

    pub fn from_toml(source: &str) -> Result<Self, Error> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.schema.user_model.validate()?;

        Ok(settings)
    }
}

impl DatabaseConfig {
    pub async fn connect(&self) -> Result<Pool<Postgres>, Error> {
        log::info!(
            "Connecting to database (max {} connections)",
            self.max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await?;

        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_gives_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.database.url, "postgres://localhost/recipes");
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.schema.user_model, UserModel::default());
        assert!(!settings.schema.enforce_amount_pair_uniqueness);
    }

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [database]
            max_connections = 12

            [schema]
            enforce_amount_pair_uniqueness = true

            [schema.user_model]
            table = "auth.accounts"
            "#,
        )
        .unwrap();

        assert_eq!(settings.database.max_connections, 12);
        assert_eq!(settings.database.url, "postgres://localhost/recipes");
        assert!(settings.schema.enforce_amount_pair_uniqueness);
        assert_eq!(settings.schema.user_model.table, "auth.accounts");
        assert_eq!(settings.schema.user_model.primary_key, "id");
    }

    #[test]
    fn user_model_rejects_non_identifiers() {
        let result = Settings::from_toml(
            r#"
            [schema.user_model]
            table = "users; DROP TABLE recipes"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));

        for bad in ["", "1users", "users.", "us-ers"] {
            let model = UserModel {
                table: bad.to_string(),
                primary_key: String::from("id"),
            };
            assert!(model.validate().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let settings = Settings::load(Some(Path::new("does/not/exist.toml"))).unwrap();
        assert_eq!(settings.schema.user_model.table, "users");
    }
}
