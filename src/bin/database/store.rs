use std::collections::HashSet;

use super::{
    error::StoreResult,
    models::{
        auth_token::{AuthToken, NewAuthToken},
        collection::Collection,
        ingredient::{Ingredient, NewIngredient},
        ingredient_quantity::RecipeIngredient,
        recipe::{Recipe, RecipeDraft},
        shopping_list::ShoppingList,
        tag::{NewTag, Tag},
        user::{NewUser, User},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

impl PageRequest {
    /// None when the page ends past what an `i64` offset can address.
    pub fn for_page(page: i64, page_size: i64) -> Option<Self> {
        let end = page.checked_mul(page_size)?;
        Some(Self {
            offset: end.checked_sub(page_size)?,
            limit: page_size,
        })
    }

    /// Number of rows up to and including this page.
    pub fn end(&self) -> i64 {
        self.offset + self.limit
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    /// Same total, new items; used once the rows have been turned into views.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub author_id: Option<i64>,
    // Any of these slugs
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<i64>,
    pub in_cart_of: Option<i64>,
}

/// Persistence operations used by the HTTP layer.
///
/// Implementations are blocking; callers run them off the async runtime.
/// Multi-table writes (`create_recipe`, `update_recipe`) are all-or-nothing.
pub trait Store: Send + Sync {
    fn create_user(&self, user: NewUser) -> StoreResult<User>;
    fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    fn list_users(&self, page: PageRequest) -> StoreResult<Page<User>>;
    fn update_password(&self, user_id: i64, password: &str) -> StoreResult<()>;

    fn find_token_for_user(&self, user_id: i64) -> StoreResult<Option<AuthToken>>;
    fn create_token(&self, token: NewAuthToken) -> StoreResult<AuthToken>;
    fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>>;
    fn delete_token(&self, key: &str) -> StoreResult<bool>;

    /// Returns false when the relationship already existed.
    fn follow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool>;
    /// Returns false when there was nothing to remove.
    fn unfollow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool>;
    fn is_following(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool>;
    fn list_following(&self, user_id: i64, page: PageRequest) -> StoreResult<Page<User>>;

    fn list_tags(&self) -> StoreResult<Vec<Tag>>;
    fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>>;
    fn existing_tag_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>>;
    fn insert_tags(&self, tags: Vec<NewTag>) -> StoreResult<usize>;

    fn list_ingredients(&self, name_prefix: Option<&str>) -> StoreResult<Vec<Ingredient>>;
    fn find_ingredient(&self, id: i64) -> StoreResult<Option<Ingredient>>;
    fn existing_ingredient_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>>;
    fn insert_ingredients(&self, ingredients: Vec<NewIngredient>) -> StoreResult<usize>;

    /// Creates the recipe with its tags and ingredient rows and adds it to the
    /// author's favorites.
    fn create_recipe(&self, author_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe>;
    /// Replaces every column, the tag set and the ingredient rows.
    fn update_recipe(&self, recipe_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe>;
    fn delete_recipe(&self, recipe_id: i64) -> StoreResult<bool>;
    fn find_recipe(&self, id: i64) -> StoreResult<Option<Recipe>>;
    fn list_recipes(&self, query: &RecipeQuery, page: PageRequest) -> StoreResult<Page<Recipe>>;
    fn recipe_tags(&self, recipe_id: i64) -> StoreResult<Vec<Tag>>;
    fn recipe_ingredients(&self, recipe_id: i64) -> StoreResult<Vec<RecipeIngredient>>;
    fn author_recipes(&self, author_id: i64, limit: Option<i64>) -> StoreResult<Vec<Recipe>>;
    fn count_author_recipes(&self, author_id: i64) -> StoreResult<i64>;

    /// Returns false when the pair was already present.
    fn add_to_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool>;
    /// Returns false when the pair was absent.
    fn remove_from_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool>;
    fn in_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool>;
    fn count_collection(&self, collection: Collection, user_id: i64) -> StoreResult<i64>;

    /// Sums ingredient amounts over every recipe in the user's cart.
    fn shopping_list(&self, user_id: i64) -> StoreResult<ShoppingList>;
}
