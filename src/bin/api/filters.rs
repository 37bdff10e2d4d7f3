use std::collections::HashSet;

use super::{
    error::{AppError, FieldErrors},
    extract::QueryParams,
};
use crate::database::{
    models::user::User,
    store::{RecipeQuery, Store},
};

fn parse_flag(params: &QueryParams, key: &str, errors: &mut FieldErrors) -> bool {
    match params.get(key) {
        None | Some("") => false,
        Some("1" | "true" | "True") => true,
        Some("0" | "false" | "False") => false,
        Some(_) => {
            errors.add(key, "Select a valid choice.");
            false
        }
    }
}

/// Builds the recipe list filter.
///
/// `is_favorited` and `is_in_shopping_cart` only narrow the list for an
/// authenticated viewer.
pub fn recipe_query(params: &QueryParams, viewer: Option<&User>) -> Result<RecipeQuery, AppError> {
    let mut errors = FieldErrors::new();

    let author_id = match params.get("author") {
        None | Some("") => None,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| errors.add("author", "Select a valid choice."))
            .ok(),
    };

    let tag_slugs = params
        .get_all("tags")
        .into_iter()
        .filter(|slug| !slug.is_empty())
        .map(str::to_owned)
        .collect();

    let is_favorited = parse_flag(params, "is_favorited", &mut errors);
    let is_in_shopping_cart = parse_flag(params, "is_in_shopping_cart", &mut errors);
    errors.into_result()?;

    let viewer_id = viewer.map(|user| user.id);
    Ok(RecipeQuery {
        author_id,
        tag_slugs,
        favorited_by: viewer_id.filter(|_| is_favorited),
        in_cart_of: viewer_id.filter(|_| is_in_shopping_cart),
    })
}

/// Rejects an `author` or `tags` value that names no existing user or tag.
pub fn check_choices(store: &dyn Store, query: &RecipeQuery) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    if let Some(author_id) = query.author_id {
        if store.find_user(author_id)?.is_none() {
            errors.add(
                "author",
                "Select a valid choice. That choice is not one of the available choices.",
            );
        }
    }

    if !query.tag_slugs.is_empty() {
        let known: HashSet<String> = store.list_tags()?.into_iter().map(|tag| tag.slug).collect();
        if let Some(unknown) = query.tag_slugs.iter().find(|slug| !known.contains(*slug)) {
            errors.add(
                "tags",
                format!("Select a valid choice. {unknown} is not one of the available choices."),
            );
        }
    }

    errors.into_result()
}

/// `recipes_limit` caps the nested recipes of a subscription.
pub fn recipes_limit(params: &QueryParams) -> Result<Option<i64>, AppError> {
    match params.get("recipes_limit") {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if limit >= 0 => Ok(Some(limit)),
            _ => Err(AppError::Validation(FieldErrors::single(
                "recipes_limit",
                "A valid non-negative integer is required.",
            ))),
        },
    }
}
