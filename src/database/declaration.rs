//! Static entity declarations.
//!
//! Each persisted entity is described once: its fields, what kind of
//! value each holds, whether it is unique, which validators guard it and
//! which rows it references. Validation ([`FieldDecl::clean`]) and the
//! installed tables ([`create_statements`]) are both derived from these
//! declarations.

use crate::{
    config::SchemaConfig,
    constants::{
        AMOUNT_MAX, COLOR_MAX_LENGTH, COOKING_TIME_MIN, FAVORITE_CONSTRAINT, IMAGE_MAX_LENGTH,
        IMAGE_UPLOAD_DIR, MEASUREMENT_UNIT_MAX_LENGTH, MSG_AMOUNT_MAX, MSG_COOKING_TIME_MIN,
        MSG_NEGATIVE, NAME_MAX_LENGTH, RECIPE_INGREDIENT_CONSTRAINT, RECIPE_TEXT_MAX_LENGTH,
        SHOPPING_CART_CONSTRAINT, SLUG_MAX_LENGTH,
    },
};

use super::{
    error::ValidationError,
    validators::{
        validate_hex_color, validate_max_length, validate_max_value, validate_min_value,
        validate_not_blank, validate_not_zero, validate_slug,
    },
};

/// What a foreign key or many-to-many field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The externally owned user table, resolved through [`SchemaConfig`].
    User,
    /// Another declared entity, by name.
    Entity(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Char { max_length: usize },
    Slug { max_length: usize },
    Text { max_length: usize },
    PositiveInteger,
    Image { upload_to: &'static str },
    /// Deleting the target deletes the row.
    ForeignKey { target: Target },
    /// Stored in a join table named `<entity>_<field>`; both sides cascade.
    ManyToMany {
        target: Target,
        related_name: Option<&'static str>,
    },
}

/// Declared validator attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NotZero,
    HexColor,
    MinValue(i64, &'static str),
    MaxValue(i64, &'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Int(i64),
    Text(&'a str),
}

impl Constraint {
    pub fn check(&self, field: &'static str, value: FieldValue) -> Result<(), ValidationError> {
        match (self, value) {
            (Constraint::NotZero, FieldValue::Int(v)) => validate_not_zero(field, v),
            (Constraint::HexColor, FieldValue::Text(v)) => validate_hex_color(field, v),
            (Constraint::MinValue(min, message), FieldValue::Int(v)) => {
                validate_min_value(field, v, *min, message)
            }
            (Constraint::MaxValue(max, message), FieldValue::Int(v)) => {
                validate_max_value(field, v, *max, message)
            }
            _ => Err(ValidationError::new(field, "value has the wrong type")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDecl {
    pub name: &'static str,
    pub kind: FieldKind,
    pub unique: bool,
    pub validators: &'static [Constraint],
}

impl FieldDecl {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            unique: false,
            validators: &[],
        }
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn validators(mut self, validators: &'static [Constraint]) -> Self {
        self.validators = validators;
        self
    }

    /// Runs the checks implied by the field kind, then the declared
    /// validators in order. Returns the first violation.
    pub fn clean(&self, value: FieldValue) -> Result<(), ValidationError> {
        match (self.kind, value) {
            (FieldKind::Char { max_length }, FieldValue::Text(v))
            | (FieldKind::Text { max_length }, FieldValue::Text(v)) => {
                validate_not_blank(self.name, v)?;
                validate_max_length(self.name, v, max_length)?;
            }
            (FieldKind::Slug { max_length }, FieldValue::Text(v)) => {
                validate_not_blank(self.name, v)?;
                validate_max_length(self.name, v, max_length)?;
                validate_slug(self.name, v)?;
            }
            (FieldKind::Image { .. }, FieldValue::Text(v)) => {
                validate_not_blank(self.name, v)?;
                validate_max_length(self.name, v, IMAGE_MAX_LENGTH)?;
            }
            (FieldKind::PositiveInteger, FieldValue::Int(v)) => {
                validate_min_value(self.name, v, 0, MSG_NEGATIVE)?;
            }
            _ => return Err(ValidationError::new(self.name, "value has the wrong type")),
        }

        self.validators
            .iter()
            .try_for_each(|validator| validator.check(self.name, value))
    }

    /// Name of the column holding this field, `None` for many-to-many.
    pub fn column(&self) -> Option<String> {
        match self.kind {
            FieldKind::ForeignKey { .. } => Some(format!("{}_id", self.name)),
            FieldKind::ManyToMany { .. } => None,
            _ => Some(self.name.to_string()),
        }
    }
}

/// Uniqueness over several fields. Constraints with `enforced == false`
/// are declared for the record but never installed.
#[derive(Debug, Clone, Copy)]
pub struct UniqueTogether {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub enforced: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EntityDecl {
    pub name: &'static str,
    pub fields: &'static [FieldDecl],
    pub unique_together: &'static [UniqueTogether],
}

impl EntityDecl {
    pub fn table(&self) -> String {
        format!("{}s", self.name)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn join_table(&self, field: &FieldDecl) -> String {
        format!("{}_{}", self.name, field.name)
    }

    fn columns(&self, config: &SchemaConfig) -> Vec<String> {
        let mut columns = vec![String::from("id BIGSERIAL PRIMARY KEY")];

        for field in self.fields {
            let name = field.name;
            let unique = if field.unique { " UNIQUE" } else { "" };

            let definition = match field.kind {
                // Stored in its own join table.
                FieldKind::ManyToMany { .. } => continue,
                FieldKind::Char { max_length } | FieldKind::Slug { max_length } => {
                    format!("{name} VARCHAR({max_length}) NOT NULL{unique}")
                }
                FieldKind::Text { .. } => format!("{name} TEXT NOT NULL{unique}"),
                FieldKind::Image { .. } => {
                    format!("{name} VARCHAR({IMAGE_MAX_LENGTH}) NOT NULL{unique}")
                }
                FieldKind::PositiveInteger => {
                    format!("{name} INTEGER NOT NULL{unique} CHECK ({name} >= 0)")
                }
                FieldKind::ForeignKey { target } => format!(
                    "{name}_id BIGINT NOT NULL{unique} REFERENCES {} ON DELETE CASCADE",
                    reference(target, config)
                ),
            };
            columns.push(definition);
        }

        for constraint in self.unique_together.iter().filter(|c| c.enforced) {
            let fields = constraint
                .fields
                .iter()
                .filter_map(|name| self.field(name).and_then(FieldDecl::column))
                .collect::<Vec<String>>()
                .join(", ");
            columns.push(format!("CONSTRAINT {} UNIQUE ({fields})", constraint.name));
        }

        columns
    }

    /// `CREATE TABLE` for the entity itself, indexes on its foreign keys,
    /// then one join table per many-to-many field.
    pub fn create_statements(&self, config: &SchemaConfig) -> Vec<String> {
        let table = self.table();
        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    {}\n)",
            self.columns(config).join(",\n    ")
        )];

        for field in self.fields {
            match field.kind {
                FieldKind::ForeignKey { .. } => {
                    let column = format!("{}_id", field.name);
                    statements.push(format!(
                        "CREATE INDEX IF NOT EXISTS {table}_{column}_idx ON {table} ({column})"
                    ));
                }
                FieldKind::ManyToMany { target, .. } => {
                    let join = self.join_table(field);
                    let owner = format!("{}_id", self.name);
                    let other = format!("{}_id", target_name(target));
                    statements.push(format!(
                        "CREATE TABLE IF NOT EXISTS {join} (\n    \
                         id BIGSERIAL PRIMARY KEY,\n    \
                         {owner} BIGINT NOT NULL REFERENCES {table} (id) ON DELETE CASCADE,\n    \
                         {other} BIGINT NOT NULL REFERENCES {} ON DELETE CASCADE,\n    \
                         UNIQUE ({owner}, {other})\n)",
                        reference(target, config)
                    ));
                    statements.push(format!(
                        "CREATE INDEX IF NOT EXISTS {join}_{other}_idx ON {join} ({other})"
                    ));
                }
                _ => {}
            }
        }

        statements
    }
}

fn target_name(target: Target) -> &'static str {
    match target {
        Target::User => "user",
        Target::Entity(name) => name,
    }
}

fn reference(target: Target, config: &SchemaConfig) -> String {
    match target {
        Target::User => format!(
            "{} ({})",
            config.user_model.table, config.user_model.primary_key
        ),
        Target::Entity(name) => format!("{name}s (id)"),
    }
}

pub const TAG_NAME: FieldDecl = FieldDecl::new(
    "name",
    FieldKind::Char {
        max_length: NAME_MAX_LENGTH,
    },
)
.unique();
pub const TAG_COLOR: FieldDecl = FieldDecl::new(
    "color",
    FieldKind::Char {
        max_length: COLOR_MAX_LENGTH,
    },
)
.unique()
.validators(&[Constraint::HexColor]);
pub const TAG_SLUG: FieldDecl = FieldDecl::new(
    "slug",
    FieldKind::Slug {
        max_length: SLUG_MAX_LENGTH,
    },
)
.unique();

pub const TAG: EntityDecl = EntityDecl {
    name: "tag",
    fields: &[TAG_NAME, TAG_COLOR, TAG_SLUG],
    unique_together: &[],
};

pub const INGREDIENT_NAME: FieldDecl = FieldDecl::new(
    "name",
    FieldKind::Char {
        max_length: NAME_MAX_LENGTH,
    },
)
.unique();
pub const INGREDIENT_MEASUREMENT_UNIT: FieldDecl = FieldDecl::new(
    "measurement_unit",
    FieldKind::Char {
        max_length: MEASUREMENT_UNIT_MAX_LENGTH,
    },
);

pub const INGREDIENT: EntityDecl = EntityDecl {
    name: "ingredient",
    fields: &[INGREDIENT_NAME, INGREDIENT_MEASUREMENT_UNIT],
    unique_together: &[],
};

pub const RECIPE_AUTHOR: FieldDecl = FieldDecl::new(
    "author",
    FieldKind::ForeignKey {
        target: Target::User,
    },
);
pub const RECIPE_TAGS: FieldDecl = FieldDecl::new(
    "tags",
    FieldKind::ManyToMany {
        target: Target::Entity("tag"),
        related_name: None,
    },
);
pub const RECIPE_IMAGE: FieldDecl = FieldDecl::new(
    "image",
    FieldKind::Image {
        upload_to: IMAGE_UPLOAD_DIR,
    },
);
pub const RECIPE_NAME: FieldDecl = FieldDecl::new(
    "name",
    FieldKind::Char {
        max_length: NAME_MAX_LENGTH,
    },
);
pub const RECIPE_TEXT: FieldDecl = FieldDecl::new(
    "text",
    FieldKind::Text {
        max_length: RECIPE_TEXT_MAX_LENGTH,
    },
);
pub const RECIPE_COOKING_TIME: FieldDecl =
    FieldDecl::new("cooking_time", FieldKind::PositiveInteger).validators(&[
        Constraint::MinValue(COOKING_TIME_MIN, MSG_COOKING_TIME_MIN),
    ]);

pub const RECIPE: EntityDecl = EntityDecl {
    name: "recipe",
    fields: &[
        RECIPE_AUTHOR,
        RECIPE_TAGS,
        RECIPE_IMAGE,
        RECIPE_NAME,
        RECIPE_TEXT,
        RECIPE_COOKING_TIME,
    ],
    unique_together: &[],
};

pub const AMOUNT_AMOUNT: FieldDecl = FieldDecl::new("amount", FieldKind::PositiveInteger)
    .validators(&[
        Constraint::NotZero,
        Constraint::MaxValue(AMOUNT_MAX, MSG_AMOUNT_MAX),
    ]);
pub const AMOUNT_RECIPE: FieldDecl = FieldDecl::new(
    "recipe",
    FieldKind::ManyToMany {
        target: Target::Entity("recipe"),
        related_name: Some("ingredients"),
    },
);
pub const AMOUNT_INGREDIENT: FieldDecl = FieldDecl::new(
    "ingredient",
    FieldKind::ForeignKey {
        target: Target::Entity("ingredient"),
    },
);

/// The (recipe, ingredient) pair is meant to be unique but is not
/// enforced by the schema. A database constraint cannot span the
/// `amount_recipe` join table, so the guard lives in
/// [`attach_amount`](super::actions::attach_amount) behind
/// `SchemaConfig::enforce_amount_pair_uniqueness`.
pub const AMOUNT: EntityDecl = EntityDecl {
    name: "amount",
    fields: &[AMOUNT_AMOUNT, AMOUNT_RECIPE, AMOUNT_INGREDIENT],
    unique_together: &[UniqueTogether {
        name: RECIPE_INGREDIENT_CONSTRAINT,
        fields: &["recipe", "ingredient"],
        enforced: false,
    }],
};

const BOOKMARK_USER: FieldDecl = FieldDecl::new(
    "user",
    FieldKind::ForeignKey {
        target: Target::User,
    },
);
const BOOKMARK_RECIPE: FieldDecl = FieldDecl::new(
    "recipe",
    FieldKind::ForeignKey {
        target: Target::Entity("recipe"),
    },
);

pub const SHOPPING_CART: EntityDecl = EntityDecl {
    name: "shopping_cart",
    fields: &[BOOKMARK_USER, BOOKMARK_RECIPE],
    unique_together: &[UniqueTogether {
        name: SHOPPING_CART_CONSTRAINT,
        fields: &["user", "recipe"],
        enforced: true,
    }],
};

pub const FAVORITE: EntityDecl = EntityDecl {
    name: "favorite",
    fields: &[BOOKMARK_USER, BOOKMARK_RECIPE],
    unique_together: &[UniqueTogether {
        name: FAVORITE_CONSTRAINT,
        fields: &["user", "recipe"],
        enforced: true,
    }],
};

/// In creation order: every entity comes after the entities it references.
pub const ENTITIES: &[EntityDecl] = &[TAG, INGREDIENT, RECIPE, AMOUNT, SHOPPING_CART, FAVORITE];

/// Resolves a reverse relation, e.g. `("recipe", "ingredients")` to the
/// Amount entity and its `recipe` field.
pub fn related(
    target: &str,
    related_name: &str,
) -> Option<(&'static EntityDecl, &'static FieldDecl)> {
    ENTITIES.iter().find_map(|entity| {
        entity
            .fields
            .iter()
            .find(|field| match field.kind {
                FieldKind::ManyToMany {
                    target: Target::Entity(name),
                    related_name: Some(related),
                } => name == target && related == related_name,
                _ => false,
            })
            .map(|field| (entity, field))
    })
}

pub fn create_statements(config: &SchemaConfig) -> Vec<String> {
    ENTITIES
        .iter()
        .flat_map(|entity| entity.create_statements(config))
        .collect()
}
