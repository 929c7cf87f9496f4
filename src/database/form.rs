use std::collections::HashMap;

use serde_json::Value;

use super::{
    error::Error,
    image::ImageRef,
    schema::{Id, NewAmount, NewIngredient, NewTag, RecipeData},
};

pub type FormData = HashMap<String, Value>;

/// Loosely typed request payload, as handed over by the web layer.
pub struct Form {
    inner: FormData,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    fn get(&self, key: &str) -> Result<&Value, Error> {
        self.inner
            .get(key)
            .ok_or_else(|| Error::Form(format!("missing key `{key}`")))
    }

    pub fn get_str(&self, key: &str) -> Result<&str, Error> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| Error::Form(format!("`{key}` is not a string")))
    }

    /// Accepts both JSON numbers and numeric strings.
    pub fn get_number(&self, key: &str) -> Result<i64, Error> {
        to_number(key, self.get(key)?)
    }

    pub fn get_i32(&self, key: &str) -> Result<i32, Error> {
        let value = self.get_number(key)?;
        i32::try_from(value).map_err(|_e| Error::Form(format!("`{key}` is out of range")))
    }

    pub fn get_id_list(&self, key: &str) -> Result<Vec<Id>, Error> {
        self.get_list(key)?
            .iter()
            .map(|value| to_number(key, value))
            .collect()
    }

    fn get_list(&self, key: &str) -> Result<&Vec<Value>, Error> {
        self.get(key)?
            .as_array()
            .ok_or_else(|| Error::Form(format!("`{key}` is not a list")))
    }
}

fn to_number(key: &str, value: &Value) -> Result<i64, Error> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::Form(format!("`{key}` is not an integer")))
}

impl TryFrom<&Form> for NewTag {
    type Error = Error;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        Ok(NewTag::new(
            form.get_str("name")?,
            form.get_str("color")?,
            form.get_str("slug")?,
        )?)
    }
}

impl TryFrom<&Form> for NewIngredient {
    type Error = Error;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        Ok(NewIngredient::new(
            form.get_str("name")?,
            form.get_str("measurement_unit")?,
        )?)
    }
}

/// Expects `name`, `text`, `cooking_time`, `image` (file name), `tags`
/// (list of ids) and `ingredients` (list of `{"id", "amount"}` objects).
impl TryFrom<&Form> for RecipeData {
    type Error = Error;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let image = ImageRef::upload(form.get_str("image")?)?;
        let recipe = RecipeData::new(
            form.get_str("name")?,
            form.get_str("text")?,
            form.get_i32("cooking_time")?,
            image,
        )?;

        let ingredients = form
            .get_list("ingredients")?
            .iter()
            .map(|value| -> Result<NewAmount, Error> {
                let Value::Object(map) = value else {
                    return Err(Error::Form(String::from(
                        "`ingredients` entries must be objects",
                    )));
                };
                let part = Form::from_data(map.clone().into_iter().collect());
                Ok(NewAmount::new(part.get_number("id")?, part.get_i32("amount")?)?)
            })
            .collect::<Result<Vec<NewAmount>, Error>>()?;

        Ok(recipe
            .with_tags(form.get_id_list("tags")?)
            .with_ingredients(ingredients))
    }
}
