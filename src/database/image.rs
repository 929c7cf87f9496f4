use std::fmt::{self, Display};

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::constants::IMAGE_UPLOAD_DIR;

use super::{
    declaration::{FieldKind, FieldValue, RECIPE_IMAGE},
    error::ValidationError,
};

/// Relative path of a recipe image inside the file storage, always under
/// the recipe upload directory. The bytes themselves are written by
/// whatever storage the application uses; only the path is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ImageRef(String);

fn upload_dir() -> &'static str {
    match RECIPE_IMAGE.kind {
        FieldKind::Image { upload_to } => upload_to,
        _ => IMAGE_UPLOAD_DIR,
    }
}

/// Drops directory components, turns spaces into underscores and removes
/// everything except word characters, `-` and `.`.
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    base.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

impl ImageRef {
    pub fn upload(file_name: &str) -> Result<Self, ValidationError> {
        let name = sanitize_file_name(file_name);
        if matches!(name.as_str(), "" | "." | "..") {
            return Err(ValidationError::new(
                RECIPE_IMAGE.name,
                format!("Could not derive file name from {file_name:?}"),
            ));
        }

        let path = format!("{}{name}", upload_dir());
        RECIPE_IMAGE.clean(FieldValue::Text(&path))?;

        Ok(Self(path))
    }

    /// Same directory and extension with `_` and seven random
    /// alphanumerics appended to the stem, for when the storage already
    /// holds a file at this path.
    pub fn alternative(&self) -> Result<Self, ValidationError> {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(7)
            .map(char::from)
            .collect();

        let name = self.file_name();
        let (stem, extension) = match name.rfind('.') {
            Some(0) | None => (name, ""),
            Some(index) => name.split_at(index),
        };

        let path = format!("{}{stem}_{suffix}{extension}", upload_dir());
        RECIPE_IMAGE.clean(FieldValue::Text(&path))?;

        Ok(Self(path))
    }

    pub fn file_name(&self) -> &str {
        self.0.strip_prefix(upload_dir()).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
