use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod filters;
pub mod pagination;
pub mod payloads;
pub mod recipes;
pub mod representations;
pub mod state;
pub mod tokens;
pub mod users;


use state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(users::list_users).post(users::create_user))
        .route("/users/me/", get(users::me))
        .route("/users/set_password/", post(users::set_password))
        .route("/users/subscriptions/", get(users::subscriptions))
        .route("/users/{id}/", get(users::get_user))
        .route(
            "/users/{id}/subscribe/",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route("/auth/token/login/", post(tokens::login))
        .route("/auth/token/logout/", post(tokens::logout))
        .route("/tags/", get(catalog::list_tags))
        .route("/tags/{id}/", get(catalog::get_tag))
        .route("/ingredients/", get(catalog::list_ingredients))
        .route("/ingredients/{id}/", get(catalog::get_ingredient))
        .route(
            "/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite/",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(recipes::add_to_shopping_cart).delete(recipes::remove_from_shopping_cart),
        )
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let mut app = Router::new().nest("/api", api_routes());

    // Only a path prefix can be served locally, a full URL points elsewhere
    let media_path = state.media.url_prefix().trim_end_matches('/').to_owned();
    if media_path.starts_with('/') && media_path.len() > 1 {
        app = app.nest_service(&media_path, ServeDir::new(state.media.root()));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
