use serde::{Deserialize, Serialize};

use super::{
    declaration::{
        FieldValue, AMOUNT_AMOUNT, INGREDIENT_MEASUREMENT_UNIT, INGREDIENT_NAME,
        RECIPE_COOKING_TIME, RECIPE_NAME, RECIPE_TEXT, TAG_COLOR, TAG_NAME, TAG_SLUG,
    },
    error::ValidationError,
    image::ImageRef,
};

pub type Id = i64;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub image: ImageRef,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub id: Id,
    pub amount: i32,
    pub ingredient_id: Id,
}

/// One row of a recipe's "ingredients" relation: the amount joined with
/// the ingredient it measures.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub amount_id: Id,
    pub ingredient_id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Id,
    pub user_id: Id,
    pub recipe_id: Id,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

// Validated input. Holding one of these means every field passed its
// declared validators.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTag {
    name: String,
    color: String,
    slug: String,
}

impl NewTag {
    pub fn new(name: &str, color: &str, slug: &str) -> Result<Self, ValidationError> {
        TAG_NAME.clean(FieldValue::Text(name))?;
        TAG_COLOR.clean(FieldValue::Text(color))?;
        TAG_SLUG.clean(FieldValue::Text(slug))?;

        Ok(Self {
            name: name.to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIngredient {
    name: String,
    measurement_unit: String,
}

impl NewIngredient {
    pub fn new(name: &str, measurement_unit: &str) -> Result<Self, ValidationError> {
        INGREDIENT_NAME.clean(FieldValue::Text(name))?;
        INGREDIENT_MEASUREMENT_UNIT.clean(FieldValue::Text(measurement_unit))?;

        Ok(Self {
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewAmount {
    ingredient_id: Id,
    amount: i32,
}

impl NewAmount {
    pub fn new(ingredient_id: Id, amount: i32) -> Result<Self, ValidationError> {
        AMOUNT_AMOUNT.clean(FieldValue::Int(amount.into()))?;

        Ok(Self {
            ingredient_id,
            amount,
        })
    }

    pub fn ingredient_id(&self) -> Id {
        self.ingredient_id
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }
}

/// Everything a recipe write needs besides its author. Used for both
/// creation and full updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeData {
    name: String,
    text: String,
    cooking_time: i32,
    image: ImageRef,
    tags: Vec<Id>,
    ingredients: Vec<NewAmount>,
}

impl RecipeData {
    pub fn new(
        name: &str,
        text: &str,
        cooking_time: i32,
        image: ImageRef,
    ) -> Result<Self, ValidationError> {
        RECIPE_NAME.clean(FieldValue::Text(name))?;
        RECIPE_TEXT.clean(FieldValue::Text(text))?;
        RECIPE_COOKING_TIME.clean(FieldValue::Int(cooking_time.into()))?;

        Ok(Self {
            name: name.to_string(),
            text: text.to_string(),
            cooking_time,
            image,
            tags: vec![],
            ingredients: vec![],
        })
    }

    /// Duplicate tag ids collapse into one link.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Id>) -> Self {
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    pub fn with_ingredients(mut self, ingredients: impl IntoIterator<Item = NewAmount>) -> Self {
        self.ingredients.extend(ingredients);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cooking_time(&self) -> i32 {
        self.cooking_time
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    pub fn tags(&self) -> &[Id] {
        &self.tags
    }

    pub fn ingredients(&self) -> &[NewAmount] {
        &self.ingredients
    }
}
