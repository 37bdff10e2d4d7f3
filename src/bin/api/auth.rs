use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use rand::{rngs::OsRng, RngCore};

use super::{error::AppError, state::AppState};
use crate::database::{
    error::StoreResult,
    models::{auth_token::NewAuthToken, user::User},
    store::Store,
};

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 150;
const TOKEN_BYTES: usize = 20;

/// The authenticated caller. Rejects anonymous requests with 401.
pub struct CurrentUser(pub User);

/// The caller when a token was sent, `None` otherwise.
pub struct MaybeUser(pub Option<User>);

/// Reads `Authorization: Token <key>`.
///
/// Other schemes are treated as anonymous, a bare `Token` is an invalid header.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::InvalidToken)?;

    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("token") => {}
        _ => return Ok(None),
    }

    match (parts.next(), parts.next()) {
        (Some(key), None) => Ok(Some(key.to_owned())),
        _ => Err(AppError::InvalidToken),
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(key) = token_from_headers(&parts.headers)? else {
            return Ok(MaybeUser(None));
        };

        let state = AppState::from_ref(state);
        let user = state
            .run(move |state| Ok(state.store.find_user_by_token(&key)?))
            .await?;

        user.map(|user| MaybeUser(Some(user)))
            .ok_or(AppError::InvalidToken)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser).ok_or(AppError::Unauthenticated)
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn password_problems(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    let length = password.chars().count();

    if length < PASSWORD_MIN_LEN {
        problems.push(format!(
            "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."
        ));
    }
    if length > PASSWORD_MAX_LEN {
        problems.push(format!(
            "Ensure this field has no more than {PASSWORD_MAX_LEN} characters."
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_owned());
    }

    problems
}

fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Returns the user's token, issuing one on first login.
pub fn token_for(store: &dyn Store, user: &User) -> StoreResult<String> {
    if let Some(token) = store.find_token_for_user(user.id)? {
        return Ok(token.key);
    }

    let token = store.create_token(NewAuthToken::new(generate_token_key(), user.id))?;
    Ok(token.key)
}
