use diesel::prelude::*;
use lombok::AllArgsConstructor;
use serde::Serialize;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::ingredient_quantities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IngredientQuantity {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i16,
}

#[derive(Insertable, AllArgsConstructor, Debug)]
#[diesel(table_name = crate::database::schema::ingredient_quantities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewIngredientQuantity {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i16,
}

// Ingredient columns joined with the amount used by one recipe
#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i16,
}
