mod amounts;
mod bookmarks;
mod ingredients;
mod recipes;
mod tags;

pub use amounts::*;
pub use bookmarks::*;
pub use ingredients::*;
pub use recipes::*;
pub use tags::*;
