use std::collections::HashSet;

use serde::{de::Error as _, Deserialize, Deserializer};

use super::{
    auth::{password_problems, verify_password},
    error::{AppError, FieldErrors, REQUIRED},
};
use crate::{
    database::{models::user::User, store::Store},
    media::{DecodedImage, MediaStore},
};

pub const NAME_MAX_LEN: usize = 200;
pub const COOKING_TIME_MIN: i64 = 1;
pub const COOKING_TIME_MAX: i64 = 32_000;
pub const AMOUNT_MIN: i64 = 1;
pub const AMOUNT_MAX: i64 = 32_000;
pub const EMAIL_MAX_LEN: usize = 254;
pub const USER_FIELD_MAX_LEN: usize = 150;

const BLANK: &str = "This field may not be blank.";

#[derive(Deserialize)]
#[serde(untagged)]
enum IntegerOrString {
    Integer(i64),
    String(String),
}

fn integer_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match IntegerOrString::deserialize(deserializer)? {
        IntegerOrString::Integer(value) => Ok(value),
        IntegerOrString::String(raw) => raw
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("A valid integer is required, got {raw:?}."))),
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct IngredientAmount {
    pub id: i64,
    #[serde(deserialize_with = "integer_or_numeric_string")]
    pub amount: i64,
}

#[derive(Deserialize, Debug, Default)]
pub struct RecipePayload {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i64>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// A recipe payload that passed validation. The image is decoded but not yet
/// written to the media root.
#[derive(Debug)]
pub struct ValidRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i16,
    pub image: DecodedImage,
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<(i64, i16)>,
}

fn record<T>(errors: &mut FieldErrors, field: &str, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.add(field, message)).ok()
}

fn to_small(value: i64) -> Result<i16, String> {
    i16::try_from(value).map_err(|_| format!("Value {value} is out of range."))
}

fn validate_ingredients(
    items: Option<Vec<IngredientAmount>>,
    known: &HashSet<i64>,
) -> Result<Vec<(i64, i16)>, String> {
    let items = items.ok_or(REQUIRED)?;
    if items.is_empty() {
        return Err("No ingredients selected.".to_owned());
    }

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| {
            if !known.contains(&item.id) {
                return Err(format!("Ingredient with id {} does not exist.", item.id));
            }
            if item.amount < AMOUNT_MIN {
                return Err(format!(
                    "Amount of ingredient {} must be at least {AMOUNT_MIN}.",
                    item.id
                ));
            }
            if item.amount > AMOUNT_MAX {
                return Err(format!(
                    "Amount of ingredient {} must be at most {AMOUNT_MAX}.",
                    item.id
                ));
            }
            if !seen.insert(item.id) {
                return Err(format!("Ingredient {} is listed more than once.", item.id));
            }
            Ok((item.id, to_small(item.amount)?))
        })
        .collect()
}

fn validate_tags(tags: Option<Vec<i64>>, known: &HashSet<i64>) -> Result<Vec<i64>, String> {
    let tags = tags.ok_or(REQUIRED)?;
    if tags.is_empty() {
        return Err("No tags selected.".to_owned());
    }

    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|id| {
            if !known.contains(&id) {
                return Err(format!("Tag with id {id} does not exist."));
            }
            if !seen.insert(id) {
                return Err(format!("Tag {id} is listed more than once."));
            }
            Ok(id)
        })
        .collect()
}

fn validate_text(value: Option<String>, max_len: Option<usize>) -> Result<String, String> {
    let value = value.ok_or(REQUIRED)?;
    let value = value.trim();

    if value.is_empty() {
        return Err(BLANK.to_owned());
    }
    if let Some(max_len) = max_len.filter(|max_len| value.chars().count() > *max_len) {
        return Err(format!("Ensure this field has no more than {max_len} characters."));
    }

    Ok(value.to_owned())
}

fn validate_cooking_time(value: Option<i64>) -> Result<i16, String> {
    match value.ok_or(REQUIRED)? {
        time if time < COOKING_TIME_MIN => Err(format!(
            "Cooking time must be at least {COOKING_TIME_MIN} minute."
        )),
        time if time > COOKING_TIME_MAX => Err(format!(
            "Cooking time must be at most {COOKING_TIME_MAX} minutes."
        )),
        time => to_small(time),
    }
}

fn validate_image(value: Option<String>) -> Result<DecodedImage, String> {
    let value = value.filter(|value| !value.trim().is_empty()).ok_or(REQUIRED)?;
    MediaStore::decode_image(&value).map_err(|e| e.to_string())
}

impl RecipePayload {
    /// Checks every field and reports the first problem of each.
    pub fn validate(self, store: &dyn Store) -> Result<ValidRecipe, AppError> {
        let ingredient_ids: Vec<i64> = self.ingredients.iter().flatten().map(|item| item.id).collect();
        let tag_ids: Vec<i64> = self.tags.iter().flatten().copied().collect();
        let known_ingredients = store.existing_ingredient_ids(&ingredient_ids)?;
        let known_tags = store.existing_tag_ids(&tag_ids)?;

        let mut errors = FieldErrors::new();
        let ingredients = record(
            &mut errors,
            "ingredients",
            validate_ingredients(self.ingredients, &known_ingredients),
        );
        let tags = record(&mut errors, "tags", validate_tags(self.tags, &known_tags));
        let image = record(&mut errors, "image", validate_image(self.image));
        let name = record(&mut errors, "name", validate_text(self.name, Some(NAME_MAX_LEN)));
        let text = record(&mut errors, "text", validate_text(self.text, None));
        let cooking_time = record(
            &mut errors,
            "cooking_time",
            validate_cooking_time(self.cooking_time),
        );

        match (ingredients, tags, image, name, text, cooking_time) {
            (Some(ingredients), Some(tag_ids), Some(image), Some(name), Some(text), Some(cooking_time)) => {
                Ok(ValidRecipe {
                    name,
                    text,
                    cooking_time,
                    image,
                    tag_ids,
                    ingredients,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct UserPayload {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Registration fields that passed validation; the password is still plain.
#[derive(Debug)]
pub struct ValidUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
        && !email.chars().any(char::is_whitespace)
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn validate_password(password: Option<String>) -> Result<String, Vec<String>> {
    let password = password
        .filter(|password| !password.is_empty())
        .ok_or_else(|| vec![REQUIRED.to_owned()])?;

    let problems = password_problems(&password);
    if problems.is_empty() {
        Ok(password)
    } else {
        Err(problems)
    }
}

impl UserPayload {
    pub fn validate(self, store: &dyn Store) -> Result<ValidUser, AppError> {
        let mut errors = FieldErrors::new();

        let email = match validate_text(self.email, Some(EMAIL_MAX_LEN)) {
            Ok(email) if !is_valid_email(&email) => {
                errors.add("email", "Enter a valid email address.");
                None
            }
            Ok(email) if store.find_user_by_email(&email)?.is_some() => {
                errors.add("email", "A user with that email already exists.");
                None
            }
            Ok(email) => Some(email),
            Err(message) => {
                errors.add("email", message);
                None
            }
        };

        let username = match validate_text(self.username, Some(USER_FIELD_MAX_LEN)) {
            Ok(username) if !is_valid_username(&username) => {
                errors.add(
                    "username",
                    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
                );
                None
            }
            Ok(username) if store.find_user_by_username(&username)?.is_some() => {
                errors.add("username", "A user with that username already exists.");
                None
            }
            Ok(username) => Some(username),
            Err(message) => {
                errors.add("username", message);
                None
            }
        };

        let first_name = record(
            &mut errors,
            "first_name",
            validate_text(self.first_name, Some(USER_FIELD_MAX_LEN)),
        );
        let last_name = record(
            &mut errors,
            "last_name",
            validate_text(self.last_name, Some(USER_FIELD_MAX_LEN)),
        );

        let password = validate_password(self.password)
            .map_err(|problems| {
                for problem in problems {
                    errors.add("password", problem);
                }
            })
            .ok();

        match (email, username, first_name, last_name, password) {
            (Some(email), Some(username), Some(first_name), Some(last_name), Some(password)) => {
                Ok(ValidUser {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SetPasswordPayload {
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

impl SetPasswordPayload {
    /// Returns the new plain password once the current one checks out.
    pub fn validate(self, user: &User) -> Result<String, AppError> {
        let mut errors = FieldErrors::new();

        match self.current_password.filter(|password| !password.is_empty()) {
            None => errors.add("current_password", REQUIRED),
            Some(current) if !verify_password(&current, &user.password) => {
                errors.add("current_password", "Invalid password.")
            }
            Some(_) => {}
        }

        let new_password = validate_password(self.new_password)
            .map_err(|problems| {
                for problem in problems {
                    errors.add("new_password", problem);
                }
            })
            .ok();

        errors.into_result()?;
        new_password.ok_or_else(|| AppError::required("new_password"))
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginPayload {
    pub fn validate(self, store: &dyn Store) -> Result<User, AppError> {
        let mut errors = FieldErrors::new();
        let email = self.email.filter(|email| !email.trim().is_empty());
        let password = self.password.filter(|password| !password.is_empty());

        if email.is_none() {
            errors.add("email", REQUIRED);
        }
        if password.is_none() {
            errors.add("password", REQUIRED);
        }

        let (Some(email), Some(password)) = (email, password) else {
            return Err(AppError::Validation(errors));
        };

        match store.find_user_by_email(email.trim())? {
            Some(user) if verify_password(&password, &user.password) => Ok(user),
            _ => Err(AppError::Validation(FieldErrors::single(
                "non_field_errors",
                "Unable to log in with provided credentials.",
            ))),
        }
    }
}
