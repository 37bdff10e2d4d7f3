use diesel::prelude::*;
use lombok::AllArgsConstructor;

/// Per-user recipe sets layered over the recipe store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Favorites,
    ShoppingCart,
}

impl Collection {
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Favorites => "favorites",
            Collection::ShoppingCart => "shopping cart",
        }
    }
}

#[derive(Queryable, Selectable, Insertable, AllArgsConstructor, Debug, PartialEq, Eq, Hash, Clone)]
#[diesel(table_name = crate::database::schema::favorite_recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FavoriteRecipe {
    pub user_id: i64,
    pub recipe_id: i64,
}

#[derive(Queryable, Selectable, Insertable, AllArgsConstructor, Debug, PartialEq, Eq, Hash, Clone)]
#[diesel(table_name = crate::database::schema::shopping_carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShoppingCartEntry {
    pub user_id: i64,
    pub recipe_id: i64,
}
