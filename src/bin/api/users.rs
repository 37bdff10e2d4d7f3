use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::{
    auth::{hash_password, CurrentUser, MaybeUser},
    error::AppError,
    extract::{ObjectId, Payload, QueryParams},
    filters::recipes_limit,
    pagination::{Paginated, Pagination},
    payloads::{SetPasswordPayload, UserPayload},
    representations::{SubscriptionView, UserView},
    state::AppState,
};
use crate::database::models::user::{NewUser, User};

pub async fn list_users(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    params: QueryParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Paginated<UserView>>, AppError> {
    let body = state
        .run(move |state| {
            let pagination = Pagination::from_params(&params, state.page_size)?;
            let page = state.store.list_users(pagination.request())?;

            let users = page
                .items
                .iter()
                .map(|user| UserView::build(state.store.as_ref(), viewer.as_ref(), user))
                .collect::<Result<Vec<_>, _>>()?;

            pagination.respond(page.with_items(users), &uri)
        })
        .await?;

    Ok(Json(body))
}

pub async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload<UserPayload>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    let user = state
        .run(move |state| {
            let valid = payload.validate(state.store.as_ref())?;
            let password = hash_password(&valid.password)?;

            let user = state.store.create_user(NewUser::new(
                valid.email,
                valid.username,
                valid.first_name,
                valid.last_name,
                password,
            ))?;

            info!("Registered user {} ({})", user.username, user.id);
            Ok(UserView::created(&user))
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    ObjectId(id): ObjectId,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .run(move |state| {
            let user = state.store.find_user(id)?.ok_or_else(AppError::not_found)?;
            UserView::build(state.store.as_ref(), viewer.as_ref(), &user)
        })
        .await?;

    Ok(Json(user))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .run(move |state| UserView::build(state.store.as_ref(), Some(&user), &user))
        .await?;

    Ok(Json(user))
}

pub async fn set_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Payload(payload): Payload<SetPasswordPayload>,
) -> Result<StatusCode, AppError> {
    state
        .run(move |state| {
            let new_password = payload.validate(&user)?;
            state
                .store
                .update_password(user.id, &hash_password(&new_password)?)?;

            info!("User {} changed their password", user.id);
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscriptions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: QueryParams,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Paginated<SubscriptionView>>, AppError> {
    let body = state
        .run(move |state| {
            let recipes_limit = recipes_limit(&params)?;
            let pagination = Pagination::from_params(&params, state.page_size)?;
            let page = state.store.list_following(user.id, pagination.request())?;

            let authors = page
                .items
                .iter()
                .map(|author| SubscriptionView::build(state, &user, author, recipes_limit))
                .collect::<Result<Vec<_>, _>>()?;

            pagination.respond(page.with_items(authors), &uri)
        })
        .await?;

    Ok(Json(body))
}

fn find_author(state: &AppState, id: i64) -> Result<User, AppError> {
    state.store.find_user(id)?.ok_or_else(AppError::not_found)
}

pub async fn subscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
    params: QueryParams,
) -> Result<(StatusCode, Json<SubscriptionView>), AppError> {
    let subscription = state
        .run(move |state| {
            let recipes_limit = recipes_limit(&params)?;
            let author = find_author(state, id)?;

            if author.id == user.id {
                return Err(AppError::BadRequest(
                    "You cannot subscribe to yourself.".to_owned(),
                ));
            }
            if !state.store.follow(user.id, author.id)? {
                return Err(AppError::BadRequest(format!(
                    "You are already subscribed to {}.",
                    author.username
                )));
            }

            SubscriptionView::build(state, &user, &author, recipes_limit)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ObjectId(id): ObjectId,
) -> Result<StatusCode, AppError> {
    state
        .run(move |state| {
            let author = find_author(state, id)?;

            if !state.store.unfollow(user.id, author.id)? {
                return Err(AppError::BadRequest(format!(
                    "You are not subscribed to {}.",
                    author.username
                )));
            }
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
