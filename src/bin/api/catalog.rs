use axum::{extract::State, Json};

use super::{
    error::AppError,
    extract::{ObjectId, QueryParams},
    state::AppState,
};
use crate::database::models::{ingredient::Ingredient, tag::Tag};

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = state.run(|state| Ok(state.store.list_tags()?)).await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
) -> Result<Json<Tag>, AppError> {
    let tag = state
        .run(move |state| state.store.find_tag(id)?.ok_or_else(AppError::not_found))
        .await?;

    Ok(Json(tag))
}

/// `?name=` narrows the list to names starting with the given text, ignoring
/// case.
pub async fn list_ingredients(
    State(state): State<AppState>,
    params: QueryParams,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let name = params
        .get("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    let ingredients = state
        .run(move |state| Ok(state.store.list_ingredients(name.as_deref())?))
        .await?;

    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = state
        .run(move |state| {
            state
                .store
                .find_ingredient(id)?
                .ok_or_else(AppError::not_found)
        })
        .await?;

    Ok(Json(ingredient))
}
