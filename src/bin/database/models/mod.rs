pub mod auth_token;
pub mod collection;
pub mod follow_relationship;
pub mod ingredient;
pub mod ingredient_quantity;
pub mod recipe;
pub mod recipe_tag;
pub mod shopping_list;
pub mod tag;
pub mod user;
