use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use super::{
    auth::{token_for, token_from_headers, CurrentUser},
    error::AppError,
    extract::Payload,
    payloads::LoginPayload,
    state::AppState,
};

#[derive(Serialize, Debug)]
pub struct TokenView {
    pub auth_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginPayload>,
) -> Result<Json<TokenView>, AppError> {
    let auth_token = state
        .run(move |state| {
            let user = payload.validate(state.store.as_ref())?;
            let key = token_for(state.store.as_ref(), &user)?;

            info!("User {} logged in", user.id);
            Ok(key)
        })
        .await?;

    Ok(Json(TokenView { auth_token }))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let key = token_from_headers(&headers)?.ok_or(AppError::Unauthenticated)?;

    state
        .run(move |state| {
            state.store.delete_token(&key)?;
            info!("User {} logged out", user.id);
            Ok(())
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
