use thiserror::Error as ThisError;

use super::schema::Id;

/// A single field failed validation. Validation stops at the first
/// violation, so there is only ever one of these per write attempt.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unique constraint violated ({constraint})")]
    UniqueViolation { constraint: String },

    #[error("referenced row does not exist ({constraint})")]
    MissingReference { constraint: String },

    #[error("check constraint violated ({constraint})")]
    CheckViolation { constraint: String },

    #[error("no {entity} exists with id {id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("invalid form data: {0}")]
    Form(String),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error(transparent)]
    Config(#[from] config_crate::ConfigError),
}

impl Error {
    pub fn unique(constraint: &str) -> Self {
        Self::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        if let sqlx::Error::Database(e) = &value {
            let constraint = e.constraint().unwrap_or("unknown").to_string();
            if e.is_unique_violation() {
                return Self::UniqueViolation { constraint };
            }
            if e.is_foreign_key_violation() {
                return Self::MissingReference { constraint };
            }
            if e.is_check_violation() {
                return Self::CheckViolation { constraint };
            }
        }

        Self::Query(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display_names_the_field() {
        let e = ValidationError::new("color", "value is not valid color");
        assert_eq!(e.to_string(), "color: value is not valid color");

        let e: Error = e.into();
        assert_eq!(e.to_string(), "color: value is not valid color");
    }

    #[test]
    fn non_database_errors_stay_query_errors() {
        let e = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(e, Error::Query(sqlx::Error::RowNotFound)));
        assert!(!e.is_unique_violation());
    }

    #[test]
    fn unique_helper_keeps_constraint_name() {
        let e = Error::unique("favorite_user_recipe_constraint");
        assert!(e.is_unique_violation());
        assert_eq!(
            e.to_string(),
            "unique constraint violated (favorite_user_recipe_constraint)"
        );
    }
}
