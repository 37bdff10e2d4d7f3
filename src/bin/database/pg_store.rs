use std::collections::HashSet;

use diesel::{
    delete,
    dsl::{exists, sum},
    insert_into,
    pg::Pg,
    prelude::*,
    query_builder::QueryFragment,
    query_dsl::LoadQuery,
    r2d2::{ConnectionManager, PooledConnection},
    select, update,
};
use lombok::AllArgsConstructor;
use tracing::{debug, trace_span};

use super::{
    connection::PgPool,
    error::StoreResult,
    models::{
        auth_token::{AuthToken, NewAuthToken},
        collection::{Collection, FavoriteRecipe, ShoppingCartEntry},
        follow_relationship::NewFollowRelationship,
        ingredient::{Ingredient, NewIngredient},
        ingredient_quantity::{NewIngredientQuantity, RecipeIngredient},
        recipe::{Recipe, RecipeDraft},
        recipe_tag::RecipeTag,
        shopping_list::{ShoppingList, ShoppingListEntry},
        tag::{NewTag, Tag},
        user::{NewUser, User},
    },
    schema::{
        auth_tokens, favorite_recipes, follow_relationships, ingredient_quantities, ingredients,
        recipes, recipes_tags, shopping_carts, tags, users,
    },
    store::{Page, PageRequest, RecipeQuery, Store},
};

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(AllArgsConstructor)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    fn connection(&self) -> StoreResult<PgPooledConnection> {
        Ok(self.pool.get()?)
    }
}

fn escape_like(value: &str) -> String {
    value
        .chars()
        .fold(String::with_capacity(value.len()), |mut escaped, c| {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
            escaped
        })
}

fn ingredient_search(name_prefix: Option<&str>) -> ingredients::BoxedQuery<'static, Pg> {
    let mut query = ingredients::table
        .order((ingredients::name.asc(), ingredients::id.asc()))
        .into_boxed();

    if let Some(prefix) = name_prefix {
        query = query.filter(ingredients::name.ilike(format!("{}%", escape_like(prefix))));
    }

    query
}

/// One row per (name, unit) over the recipes in the user's cart.
fn shopping_list_rows(
    user_id: i64,
) -> impl LoadQuery<'static, PgConnection, (String, String, Option<i64>)> + QueryFragment<Pg> {
    ingredient_quantities::table
        .inner_join(ingredients::table)
        .inner_join(
            shopping_carts::table.on(shopping_carts::recipe_id.eq(ingredient_quantities::recipe_id)),
        )
        .filter(shopping_carts::user_id.eq(user_id))
        .group_by((ingredients::name, ingredients::measurement_unit))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            sum(ingredient_quantities::amount),
        ))
}

fn filtered_recipes(query: &RecipeQuery) -> recipes::BoxedQuery<'static, Pg> {
    let mut boxed = recipes::table.into_boxed();

    if let Some(author_id) = query.author_id {
        boxed = boxed.filter(recipes::author_id.eq(author_id));
    }

    if !query.tag_slugs.is_empty() {
        let tagged = recipes_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(query.tag_slugs.clone()))
            .select(recipes_tags::recipe_id);
        boxed = boxed.filter(recipes::id.eq_any(tagged));
    }

    if let Some(user_id) = query.favorited_by {
        let favorited = favorite_recipes::table
            .filter(favorite_recipes::user_id.eq(user_id))
            .select(favorite_recipes::recipe_id);
        boxed = boxed.filter(recipes::id.eq_any(favorited));
    }

    if let Some(user_id) = query.in_cart_of {
        let in_cart = shopping_carts::table
            .filter(shopping_carts::user_id.eq(user_id))
            .select(shopping_carts::recipe_id);
        boxed = boxed.filter(recipes::id.eq_any(in_cart));
    }

    boxed
}

fn attach_tags_and_ingredients(
    connection: &mut PgConnection,
    recipe_id: i64,
    draft: &RecipeDraft,
) -> QueryResult<()> {
    let recipe_tags: Vec<_> = draft
        .tag_ids
        .iter()
        .map(|&tag_id| RecipeTag::new(recipe_id, tag_id))
        .collect();

    insert_into(recipes_tags::table)
        .values(&recipe_tags)
        .execute(connection)?;

    let quantities: Vec<_> = draft
        .ingredients
        .iter()
        .map(|&(ingredient_id, amount)| NewIngredientQuantity::new(recipe_id, ingredient_id, amount))
        .collect();

    insert_into(ingredient_quantities::table)
        .values(&quantities)
        .execute(connection)?;

    Ok(())
}

impl Store for PgStore {
    fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut connection = self.connection()?;

        let user = insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut connection)?;

        Ok(user)
    }

    fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let mut connection = self.connection()?;

        let user = users::table
            .find(id)
            .select(User::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut connection = self.connection()?;

        let user = users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(user)
    }

    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let mut connection = self.connection()?;

        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(user)
    }

    fn list_users(&self, page: PageRequest) -> StoreResult<Page<User>> {
        let mut connection = self.connection()?;

        let total = users::table.count().get_result(&mut connection)?;
        let items = users::table
            .order((users::username.asc(), users::id.asc()))
            .limit(page.limit)
            .offset(page.offset)
            .select(User::as_select())
            .load(&mut connection)?;

        Ok(Page { items, total })
    }

    fn update_password(&self, user_id: i64, password: &str) -> StoreResult<()> {
        let mut connection = self.connection()?;

        update(users::table.find(user_id))
            .set(users::password.eq(password))
            .execute(&mut connection)?;

        Ok(())
    }

    fn find_token_for_user(&self, user_id: i64) -> StoreResult<Option<AuthToken>> {
        let mut connection = self.connection()?;

        let token = auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id))
            .select(AuthToken::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(token)
    }

    fn create_token(&self, token: NewAuthToken) -> StoreResult<AuthToken> {
        let mut connection = self.connection()?;

        let token = insert_into(auth_tokens::table)
            .values(&token)
            .returning(AuthToken::as_returning())
            .get_result(&mut connection)?;

        Ok(token)
    }

    fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>> {
        let mut connection = self.connection()?;

        let user = auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::key.eq(key))
            .select(User::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(user)
    }

    fn delete_token(&self, key: &str) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let deleted = delete(auth_tokens::table.find(key)).execute(&mut connection)?;

        Ok(deleted > 0)
    }

    fn follow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let inserted = insert_into(follow_relationships::table)
            .values(&NewFollowRelationship::new(from_user_id, to_user_id))
            .on_conflict((
                follow_relationships::from_user_id,
                follow_relationships::to_user_id,
            ))
            .do_nothing()
            .execute(&mut connection)?;

        Ok(inserted > 0)
    }

    fn unfollow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let deleted = delete(
            follow_relationships::table
                .filter(follow_relationships::from_user_id.eq(from_user_id))
                .filter(follow_relationships::to_user_id.eq(to_user_id)),
        )
        .execute(&mut connection)?;

        Ok(deleted > 0)
    }

    fn is_following(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let following = select(exists(
            follow_relationships::table
                .filter(follow_relationships::from_user_id.eq(from_user_id))
                .filter(follow_relationships::to_user_id.eq(to_user_id)),
        ))
        .get_result(&mut connection)?;

        Ok(following)
    }

    fn list_following(&self, user_id: i64, page: PageRequest) -> StoreResult<Page<User>> {
        let mut connection = self.connection()?;

        let total = follow_relationships::table
            .filter(follow_relationships::from_user_id.eq(user_id))
            .count()
            .get_result(&mut connection)?;

        let items = follow_relationships::table
            .inner_join(users::table.on(users::id.eq(follow_relationships::to_user_id)))
            .filter(follow_relationships::from_user_id.eq(user_id))
            .order((
                follow_relationships::created_at.desc(),
                follow_relationships::id.desc(),
            ))
            .limit(page.limit)
            .offset(page.offset)
            .select(User::as_select())
            .load(&mut connection)?;

        Ok(Page { items, total })
    }

    fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut connection = self.connection()?;

        let tags = tags::table
            .order((tags::name.asc(), tags::id.asc()))
            .select(Tag::as_select())
            .load(&mut connection)?;

        Ok(tags)
    }

    fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        let mut connection = self.connection()?;

        let tag = tags::table
            .find(id)
            .select(Tag::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(tag)
    }

    fn existing_tag_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>> {
        let mut connection = self.connection()?;

        let existing: Vec<i64> = tags::table
            .filter(tags::id.eq_any(ids.to_vec()))
            .select(tags::id)
            .load(&mut connection)?;

        Ok(existing.into_iter().collect())
    }

    fn insert_tags(&self, new_tags: Vec<NewTag>) -> StoreResult<usize> {
        let mut connection = self.connection()?;

        let inserted = insert_into(tags::table)
            .values(&new_tags)
            .on_conflict_do_nothing()
            .execute(&mut connection)?;

        Ok(inserted)
    }

    fn list_ingredients(&self, name_prefix: Option<&str>) -> StoreResult<Vec<Ingredient>> {
        let mut connection = self.connection()?;

        let ingredients = ingredient_search(name_prefix).load::<Ingredient>(&mut connection)?;

        Ok(ingredients)
    }

    fn find_ingredient(&self, id: i64) -> StoreResult<Option<Ingredient>> {
        let mut connection = self.connection()?;

        let ingredient = ingredients::table
            .find(id)
            .select(Ingredient::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(ingredient)
    }

    fn existing_ingredient_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>> {
        let mut connection = self.connection()?;

        let existing: Vec<i64> = ingredients::table
            .filter(ingredients::id.eq_any(ids.to_vec()))
            .select(ingredients::id)
            .load(&mut connection)?;

        Ok(existing.into_iter().collect())
    }

    fn insert_ingredients(&self, new_ingredients: Vec<NewIngredient>) -> StoreResult<usize> {
        let mut connection = self.connection()?;

        let inserted = insert_into(ingredients::table)
            .values(&new_ingredients)
            .on_conflict_do_nothing()
            .execute(&mut connection)?;

        Ok(inserted)
    }

    fn create_recipe(&self, author_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe> {
        let span = trace_span!("creating recipe", author_id);
        let _guard = span.enter();

        let mut connection = self.connection()?;

        let recipe = connection.transaction::<_, diesel::result::Error, _>(|connection| {
            let recipe = insert_into(recipes::table)
                .values(&draft.new_recipe(author_id))
                .returning(Recipe::as_returning())
                .get_result(connection)?;

            attach_tags_and_ingredients(connection, recipe.id, draft)?;

            insert_into(favorite_recipes::table)
                .values(&FavoriteRecipe::new(author_id, recipe.id))
                .on_conflict_do_nothing()
                .execute(connection)?;

            Ok(recipe)
        })?;

        debug!(recipe_id = recipe.id, "Recipe created");
        Ok(recipe)
    }

    fn update_recipe(&self, recipe_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe> {
        let span = trace_span!("updating recipe", recipe_id);
        let _guard = span.enter();

        let mut connection = self.connection()?;

        let recipe = connection.transaction::<_, diesel::result::Error, _>(|connection| {
            let recipe = update(recipes::table.find(recipe_id))
                .set(&draft.changeset())
                .returning(Recipe::as_returning())
                .get_result(connection)?;

            delete(recipes_tags::table.filter(recipes_tags::recipe_id.eq(recipe_id)))
                .execute(connection)?;
            delete(
                ingredient_quantities::table
                    .filter(ingredient_quantities::recipe_id.eq(recipe_id)),
            )
            .execute(connection)?;

            attach_tags_and_ingredients(connection, recipe_id, draft)?;

            Ok(recipe)
        })?;

        Ok(recipe)
    }

    fn delete_recipe(&self, recipe_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let deleted = delete(recipes::table.find(recipe_id)).execute(&mut connection)?;

        Ok(deleted > 0)
    }

    fn find_recipe(&self, id: i64) -> StoreResult<Option<Recipe>> {
        let mut connection = self.connection()?;

        let recipe = recipes::table
            .find(id)
            .select(Recipe::as_select())
            .first(&mut connection)
            .optional()?;

        Ok(recipe)
    }

    fn list_recipes(&self, query: &RecipeQuery, page: PageRequest) -> StoreResult<Page<Recipe>> {
        let mut connection = self.connection()?;

        let total = filtered_recipes(query)
            .count()
            .get_result(&mut connection)?;

        let items = filtered_recipes(query)
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(page.limit)
            .offset(page.offset)
            .load::<Recipe>(&mut connection)?;

        Ok(Page { items, total })
    }

    fn recipe_tags(&self, recipe_id: i64) -> StoreResult<Vec<Tag>> {
        let mut connection = self.connection()?;

        let tags = recipes_tags::table
            .inner_join(tags::table)
            .filter(recipes_tags::recipe_id.eq(recipe_id))
            .order((tags::name.asc(), tags::id.asc()))
            .select(Tag::as_select())
            .load(&mut connection)?;

        Ok(tags)
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> StoreResult<Vec<RecipeIngredient>> {
        let mut connection = self.connection()?;

        let ingredients = ingredient_quantities::table
            .inner_join(ingredients::table)
            .filter(ingredient_quantities::recipe_id.eq(recipe_id))
            .order(ingredient_quantities::id.asc())
            .select((
                ingredients::id,
                ingredients::name,
                ingredients::measurement_unit,
                ingredient_quantities::amount,
            ))
            .load::<RecipeIngredient>(&mut connection)?;

        Ok(ingredients)
    }

    fn author_recipes(&self, author_id: i64, limit: Option<i64>) -> StoreResult<Vec<Recipe>> {
        let mut connection = self.connection()?;

        let mut query = recipes::table
            .filter(recipes::author_id.eq(author_id))
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .into_boxed();

        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let recipes = query.load::<Recipe>(&mut connection)?;

        Ok(recipes)
    }

    fn count_author_recipes(&self, author_id: i64) -> StoreResult<i64> {
        let mut connection = self.connection()?;

        let count = recipes::table
            .filter(recipes::author_id.eq(author_id))
            .count()
            .get_result(&mut connection)?;

        Ok(count)
    }

    fn add_to_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let inserted = match collection {
            Collection::Favorites => insert_into(favorite_recipes::table)
                .values(&FavoriteRecipe::new(user_id, recipe_id))
                .on_conflict_do_nothing()
                .execute(&mut connection)?,
            Collection::ShoppingCart => insert_into(shopping_carts::table)
                .values(&ShoppingCartEntry::new(user_id, recipe_id))
                .on_conflict_do_nothing()
                .execute(&mut connection)?,
        };

        Ok(inserted > 0)
    }

    fn remove_from_collection(
        &self,
        collection: Collection,
        user_id: i64,
        recipe_id: i64,
    ) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let deleted = match collection {
            Collection::Favorites => delete(
                favorite_recipes::table
                    .filter(favorite_recipes::user_id.eq(user_id))
                    .filter(favorite_recipes::recipe_id.eq(recipe_id)),
            )
            .execute(&mut connection)?,
            Collection::ShoppingCart => delete(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .filter(shopping_carts::recipe_id.eq(recipe_id)),
            )
            .execute(&mut connection)?,
        };

        Ok(deleted > 0)
    }

    fn in_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool> {
        let mut connection = self.connection()?;

        let present = match collection {
            Collection::Favorites => select(exists(
                favorite_recipes::table
                    .filter(favorite_recipes::user_id.eq(user_id))
                    .filter(favorite_recipes::recipe_id.eq(recipe_id)),
            ))
            .get_result(&mut connection)?,
            Collection::ShoppingCart => select(exists(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .filter(shopping_carts::recipe_id.eq(recipe_id)),
            ))
            .get_result(&mut connection)?,
        };

        Ok(present)
    }

    fn count_collection(&self, collection: Collection, user_id: i64) -> StoreResult<i64> {
        let mut connection = self.connection()?;

        let count = match collection {
            Collection::Favorites => favorite_recipes::table
                .filter(favorite_recipes::user_id.eq(user_id))
                .count()
                .get_result(&mut connection)?,
            Collection::ShoppingCart => shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .count()
                .get_result(&mut connection)?,
        };

        Ok(count)
    }

    fn shopping_list(&self, user_id: i64) -> StoreResult<ShoppingList> {
        let span = trace_span!("aggregating shopping list", user_id);
        let _guard = span.enter();

        let mut connection = self.connection()?;

        let rows: Vec<(String, String, Option<i64>)> = shopping_list_rows(user_id).load(&mut connection)?;

        Ok(rows
            .into_iter()
            .map(|(name, unit, amount)| ShoppingListEntry::new(name, unit, amount.unwrap_or_default()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use diesel::{
        debug_query,
        r2d2::{CustomizeConnection, Error as PoolConnectionError, Pool},
    };

    use super::*;
    use crate::database::error::StoreError;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("flour"), "flour");
    }

    #[test]
    fn ingredient_search_is_an_escaped_ilike_prefix() {
        let sql = debug_query::<Pg, _>(&ingredient_search(Some("50%"))).to_string();

        assert!(sql.contains(r#"WHERE ("ingredients"."name" ILIKE $1)"#), "{sql}");
        assert!(sql.ends_with(r#"-- binds: ["50\\%%"]"#), "{sql}");

        let all = debug_query::<Pg, _>(&ingredient_search(None)).to_string();
        assert!(!all.contains("ILIKE"), "{all}");
        assert!(all.contains(r#"ORDER BY "ingredients"."name" ASC"#), "{all}");
    }

    #[test]
    fn shopping_list_sums_per_name_and_unit() {
        let sql = debug_query::<Pg, _>(&shopping_list_rows(7)).to_string();

        assert!(
            sql.contains(r#"GROUP BY "ingredients"."name", "ingredients"."measurement_unit""#),
            "{sql}"
        );
        assert!(
            sql.to_lowercase().contains(r#"sum("ingredient_quantities"."amount")"#),
            "{sql}"
        );
        assert!(sql.contains(r#"("shopping_carts"."user_id" = $1)"#), "{sql}");
        assert!(sql.ends_with("-- binds: [7]"), "{sql}");
    }

    #[test]
    fn recipe_filters_become_subqueries() {
        let query = RecipeQuery {
            author_id: Some(3),
            tag_slugs: vec!["lunch".to_owned(), "dinner".to_owned()],
            favorited_by: Some(7),
            in_cart_of: Some(7),
        };
        let sql = debug_query::<Pg, _>(&filtered_recipes(&query)).to_string();

        assert!(sql.contains(r#"("recipes"."author_id" = $1)"#), "{sql}");
        assert!(
            sql.contains(r#""recipes"."id" IN (SELECT "recipes_tags"."recipe_id" FROM"#),
            "{sql}"
        );
        assert!(sql.contains(r#""tags"."slug" = ANY($2)"#), "{sql}");
        assert!(
            sql.contains(r#""recipes"."id" IN (SELECT "favorite_recipes"."recipe_id" FROM "favorite_recipes""#),
            "{sql}"
        );
        assert!(
            sql.contains(r#""recipes"."id" IN (SELECT "shopping_carts"."recipe_id" FROM "shopping_carts""#),
            "{sql}"
        );

        let unfiltered = debug_query::<Pg, _>(&filtered_recipes(&RecipeQuery::default())).to_string();
        assert!(!unfiltered.contains("WHERE"), "{unfiltered}");
    }

    /// Every pooled connection runs inside a transaction that is never
    /// committed.
    #[derive(Debug)]
    struct RollbackOnRelease;

    impl CustomizeConnection<PgConnection, PoolConnectionError> for RollbackOnRelease {
        fn on_acquire(&self, connection: &mut PgConnection) -> Result<(), PoolConnectionError> {
            connection
                .begin_test_transaction()
                .map_err(PoolConnectionError::QueryError)
        }
    }

    /// Needs `DATABASE_URL` pointing at a migrated database.
    fn database_store() -> Option<PgStore> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let pool = Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(RollbackOnRelease))
            .build(ConnectionManager::<PgConnection>::new(database_url))
            .unwrap();

        Some(PgStore::new(pool))
    }

    fn seed(store: &PgStore) -> (User, Ingredient, Tag) {
        let user = store
            .create_user(NewUser::new(
                "pg-cook@example.com".to_owned(),
                "pg-cook".to_owned(),
                "Pg".to_owned(),
                "Cook".to_owned(),
                "!".to_owned(),
            ))
            .unwrap();
        store
            .insert_ingredients(vec![NewIngredient::new("PgFlour".to_owned(), "g".to_owned())])
            .unwrap();
        store
            .insert_tags(vec![NewTag::new(
                "PgLunch".to_owned(),
                "#00FF0A".to_owned(),
                "pg-lunch".to_owned(),
            )])
            .unwrap();

        let flour = store.list_ingredients(Some("pgfl")).unwrap().remove(0);
        let tag = store
            .list_tags()
            .unwrap()
            .into_iter()
            .find(|tag| tag.slug == "pg-lunch")
            .unwrap();

        (user, flour, tag)
    }

    fn draft(name: &str, tag: &Tag, ingredients: Vec<(i64, i16)>) -> RecipeDraft {
        RecipeDraft {
            name: name.to_owned(),
            text: "Bake.".to_owned(),
            cooking_time: 20,
            image: "recipes/images/test.png".to_owned(),
            tag_ids: vec![tag.id],
            ingredients,
        }
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn cart_amounts_are_summed_by_postgres() {
        let Some(store) = database_store() else { return };
        let (user, flour, tag) = seed(&store);

        for (name, amount) in [("Bread", 200), ("Buns", 100)] {
            let recipe = store
                .create_recipe(user.id, &draft(name, &tag, vec![(flour.id, amount)]))
                .unwrap();
            assert!(store
                .add_to_collection(Collection::ShoppingCart, user.id, recipe.id)
                .unwrap());
        }

        let list = store.shopping_list(user.id).unwrap();
        assert_eq!(list[&("PgFlour".to_owned(), "g".to_owned())], 300);
        assert_eq!(store.count_collection(Collection::Favorites, user.id).unwrap(), 2);
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn failed_recipe_write_leaves_nothing_behind() {
        let Some(store) = database_store() else { return };
        let (user, flour, tag) = seed(&store);

        let repeated = draft("Twice", &tag, vec![(flour.id, 10), (flour.id, 20)]);
        assert!(matches!(
            store.create_recipe(user.id, &repeated),
            Err(StoreError::Duplicate(_))
        ));
        assert_eq!(store.count_author_recipes(user.id).unwrap(), 0);

        let recipe = store
            .create_recipe(user.id, &draft("Once", &tag, vec![(flour.id, 10)]))
            .unwrap();
        assert!(store.update_recipe(recipe.id, &repeated).is_err());

        let kept = store.find_recipe(recipe.id).unwrap().unwrap();
        assert_eq!(kept.name, "Once");
        assert_eq!(store.recipe_ingredients(recipe.id).unwrap().len(), 1);
        assert_eq!(store.recipe_tags(recipe.id).unwrap().len(), 1);
    }
}
