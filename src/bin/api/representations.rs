use serde::Serialize;

use super::{error::AppError, state::AppState};
use crate::{
    database::{
        models::{
            collection::Collection, ingredient_quantity::RecipeIngredient, recipe::Recipe, tag::Tag,
            user::User,
        },
        store::Store,
    },
    media::MediaStore,
};

#[derive(Serialize, Debug)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,
}

impl UserView {
    /// Registration response, which carries no subscription flag.
    pub fn created(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed: None,
        }
    }

    pub fn build(store: &dyn Store, viewer: Option<&User>, user: &User) -> Result<Self, AppError> {
        let is_subscribed = match viewer {
            Some(viewer) => store.is_following(viewer.id, user.id)?,
            None => false,
        };

        Ok(Self {
            is_subscribed: Some(is_subscribed),
            ..Self::created(user)
        })
    }
}

#[derive(Serialize, Debug)]
pub struct ShortRecipeView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

impl ShortRecipeView {
    pub fn new(recipe: &Recipe, media: &MediaStore) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media.url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct RecipeView {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
}

impl RecipeView {
    pub fn build(state: &AppState, viewer: Option<&User>, recipe: Recipe) -> Result<Self, AppError> {
        let store = state.store.as_ref();

        let author = store
            .find_user(recipe.author_id)?
            .ok_or_else(|| AppError::Internal(format!("Recipe {} has no author", recipe.id)))?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer) => (
                store.in_collection(Collection::Favorites, viewer.id, recipe.id)?,
                store.in_collection(Collection::ShoppingCart, viewer.id, recipe.id)?,
            ),
            None => (false, false),
        };

        Ok(Self {
            id: recipe.id,
            tags: store.recipe_tags(recipe.id)?,
            author: UserView::build(store, viewer, &author)?,
            ingredients: store.recipe_ingredients(recipe.id)?,
            is_favorited,
            is_in_shopping_cart,
            image: state.media.url(&recipe.image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }
}

/// A followed author with a preview of their recipes.
#[derive(Serialize, Debug)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<ShortRecipeView>,
    pub recipes_count: i64,
}

impl SubscriptionView {
    pub fn build(
        state: &AppState,
        viewer: &User,
        author: &User,
        recipes_limit: Option<i64>,
    ) -> Result<Self, AppError> {
        let store = state.store.as_ref();

        let recipes = store
            .author_recipes(author.id, recipes_limit)?
            .iter()
            .map(|recipe| ShortRecipeView::new(recipe, &state.media))
            .collect();

        Ok(Self {
            user: UserView::build(store, Some(viewer), author)?,
            recipes,
            recipes_count: store.count_author_recipes(author.id)?,
        })
    }
}
