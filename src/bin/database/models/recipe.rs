use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lombok::AllArgsConstructor;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i16,
    // Relative to the media root
    pub image: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewRecipe {
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i16,
    pub image: String,
}

#[derive(AsChangeset, AllArgsConstructor, Debug)]
#[diesel(table_name = crate::database::schema::recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeChangeset {
    pub name: String,
    pub text: String,
    pub cooking_time: i16,
    pub image: String,
}

/// Everything a recipe write needs once the payload has been validated.
///
/// Tag ids and ingredient ids are distinct and known to exist.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i16,
    pub image: String,
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<(i64, i16)>,
}

impl RecipeDraft {
    pub fn new_recipe(&self, author_id: i64) -> NewRecipe {
        NewRecipe::new(
            author_id,
            self.name.clone(),
            self.text.clone(),
            self.cooking_time,
            self.image.clone(),
        )
    }

    pub fn changeset(&self) -> RecipeChangeset {
        RecipeChangeset::new(
            self.name.clone(),
            self.text.clone(),
            self.cooking_time,
            self.image.clone(),
        )
    }
}
