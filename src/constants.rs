pub const NAME_MAX_LENGTH: usize = 200;
pub const COLOR_MAX_LENGTH: usize = 7;
pub const SLUG_MAX_LENGTH: usize = 200;
pub const MEASUREMENT_UNIT_MAX_LENGTH: usize = 200;
pub const RECIPE_TEXT_MAX_LENGTH: usize = 5000;
pub const IMAGE_MAX_LENGTH: usize = 100;

pub const IMAGE_UPLOAD_DIR: &str = "recipe/";

pub const AMOUNT_MAX: i64 = 10000;
pub const COOKING_TIME_MIN: i64 = 1;

pub const MSG_NOT_ZERO: &str = "value can not be zero";
pub const MSG_INVALID_COLOR: &str = "value is not valid color";
pub const MSG_AMOUNT_MAX: &str = "Not more than 10000";
pub const MSG_COOKING_TIME_MIN: &str = "cooking time should be not less than one minute";
pub const MSG_BLANK: &str = "This field cannot be blank.";
pub const MSG_INVALID_SLUG: &str =
    "Enter a valid “slug” consisting of letters, numbers, underscores or hyphens.";
pub const MSG_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

pub const SHOPPING_CART_CONSTRAINT: &str = "shopping_cart_user_recipe_constraint";
pub const FAVORITE_CONSTRAINT: &str = "favorite_user_recipe_constraint";
pub const RECIPE_INGREDIENT_CONSTRAINT: &str = "recipe_ingredient_constraint";
