mod database {
    pub mod actions;
    pub mod declaration;
    pub mod error;
    pub mod form;
    pub mod image;
    pub mod migrate;
    pub mod schema;
    pub mod validators;
}
pub mod config;
mod constants;

pub use constants::*;
pub use database::*;
pub use database::error::{Error, ValidationError};
