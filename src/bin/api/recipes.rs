use axum::{
    extract::{OriginalUri, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::IntoResponse,
    Json,
};
use tracing::{info, trace_span};

use super::{
    auth::{CurrentUser, MaybeUser},
    error::AppError,
    extract::{ObjectId, Payload, QueryParams},
    filters::{check_choices, recipe_query},
    pagination::{Paginated, Pagination},
    payloads::{RecipePayload, ValidRecipe},
    representations::{RecipeView, ShortRecipeView},
    state::AppState,
};
use crate::database::{
    models::{
        collection::Collection,
        recipe::{Recipe, RecipeDraft},
        shopping_list::ShoppingList,
        user::User,
    },
    store::Page,
};

const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

pub async fn list_recipes(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    params: QueryParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Paginated<RecipeView>>, AppError> {
    let body = state
        .run(move |state| {
            let query = recipe_query(&params, viewer.as_ref())?;
            check_choices(state.store.as_ref(), &query)?;
            let pagination = Pagination::from_params(&params, state.page_size)?;
            let Page { items, total } = state.store.list_recipes(&query, pagination.request())?;

            let items = items
                .into_iter()
                .map(|recipe| RecipeView::build(state, viewer.as_ref(), recipe))
                .collect::<Result<Vec<_>, _>>()?;

            pagination.respond(Page { items, total }, &uri)
        })
        .await?;

    Ok(Json(body))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ObjectId(id): ObjectId,
) -> Result<Json<RecipeView>, AppError> {
    let recipe = state
        .run(move |state| {
            let recipe = state.store.find_recipe(id)?.ok_or_else(AppError::not_found)?;
            RecipeView::build(state, viewer.as_ref(), recipe)
        })
        .await?;

    Ok(Json(recipe))
}

/// Writes the validated image to the media root and turns the payload into a
/// draft pointing at it.
fn store_draft(state: &AppState, valid: ValidRecipe) -> Result<RecipeDraft, AppError> {
    let image = state.media.save(&valid.image)?;

    Ok(RecipeDraft {
        name: valid.name,
        text: valid.text,
        cooking_time: valid.cooking_time,
        image,
        tag_ids: valid.tag_ids,
        ingredients: valid.ingredients,
    })
}

pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(author): CurrentUser,
    Payload(payload): Payload<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeView>), AppError> {
    let recipe = state
        .run(move |state| {
            let span = trace_span!("create recipe", author_id = author.id);
            let _guard = span.enter();

            let valid = payload.validate(state.store.as_ref())?;
            let draft = store_draft(state, valid)?;

            let recipe = state
                .store
                .create_recipe(author.id, &draft)
                .inspect_err(|_| state.media.remove(&draft.image))?;

            info!("User {} created recipe {}", author.id, recipe.id);
            RecipeView::build(state, Some(&author), recipe)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Loads a recipe the caller is allowed to change.
fn owned_recipe(state: &AppState, user: &User, id: i64) -> Result<Recipe, AppError> {
    let recipe = state.store.find_recipe(id)?.ok_or_else(AppError::not_found)?;

    if recipe.author_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(recipe)
}

pub async fn update_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
    Payload(payload): Payload<RecipePayload>,
) -> Result<Json<RecipeView>, AppError> {
    let recipe = state
        .run(move |state| {
            let span = trace_span!("update recipe", recipe_id = id);
            let _guard = span.enter();

            let current = owned_recipe(state, &user, id)?;
            let valid = payload.validate(state.store.as_ref())?;
            let draft = store_draft(state, valid)?;

            let recipe = state
                .store
                .update_recipe(current.id, &draft)
                .inspect_err(|_| state.media.remove(&draft.image))?;
            state.media.remove(&current.image);

            info!("User {} updated recipe {}", user.id, recipe.id);
            RecipeView::build(state, Some(&user), recipe)
        })
        .await?;

    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<StatusCode, AppError> {
    state
        .run(move |state| {
            let recipe = owned_recipe(state, &user, id)?;

            if state.store.delete_recipe(recipe.id)? {
                state.media.remove(&recipe.image);
                info!("User {} deleted recipe {}", user.id, recipe.id);
            }
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn add_to(
    state: &AppState,
    collection: Collection,
    user: &User,
    recipe_id: i64,
) -> Result<ShortRecipeView, AppError> {
    let recipe = state.store.find_recipe(recipe_id)?.ok_or_else(|| {
        AppError::BadRequest(format!("Recipe with id {recipe_id} does not exist."))
    })?;

    if !state.store.add_to_collection(collection, user.id, recipe.id)? {
        return Err(AppError::BadRequest(format!(
            "Recipe {} is already in your {}.",
            recipe.id,
            collection.label()
        )));
    }

    Ok(ShortRecipeView::new(&recipe, &state.media))
}

fn remove_from(
    state: &AppState,
    collection: Collection,
    user: &User,
    recipe_id: i64,
) -> Result<(), AppError> {
    if !state
        .store
        .remove_from_collection(collection, user.id, recipe_id)?
    {
        return Err(AppError::BadRequest(format!(
            "Recipe {recipe_id} was not found in your {}.",
            collection.label()
        )));
    }
    Ok(())
}

async fn add(
    state: AppState,
    collection: Collection,
    user: User,
    recipe_id: i64,
) -> Result<(StatusCode, Json<ShortRecipeView>), AppError> {
    let recipe = state
        .run(move |state| add_to(state, collection, &user, recipe_id))
        .await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

async fn remove(
    state: AppState,
    collection: Collection,
    user: User,
    recipe_id: i64,
) -> Result<StatusCode, AppError> {
    state
        .run(move |state| remove_from(state, collection, &user, recipe_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<(StatusCode, Json<ShortRecipeView>), AppError> {
    add(state, Collection::Favorites, user, id).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<StatusCode, AppError> {
    remove(state, Collection::Favorites, user, id).await
}

pub async fn add_to_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<(StatusCode, Json<ShortRecipeView>), AppError> {
    add(state, Collection::ShoppingCart, user, id).await
}

pub async fn remove_from_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<StatusCode, AppError> {
    remove(state, Collection::ShoppingCart, user, id).await
}

pub fn render_shopping_list(list: &ShoppingList) -> String {
    let mut document = String::from("Shopping list:\n");

    for entry in list.entries() {
        document.push_str(&format!(
            "Ingredient: {}; Measurement unit: {}; Amount: {};\n",
            entry.name, entry.measurement_unit, entry.amount
        ));
    }

    document
}

pub async fn download_shopping_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let document = state
        .run(move |state| {
            if state.store.count_collection(Collection::ShoppingCart, user.id)? == 0 {
                return Err(AppError::BadRequest("Your shopping cart is empty.".to_owned()));
            }

            let list = state.store.shopping_list(user.id)?;
            Ok(render_shopping_list(&list))
        })
        .await?;

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        document,
    ))
}
