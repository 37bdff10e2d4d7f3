use std::{
    collections::{BTreeSet, HashSet},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};

use super::{
    error::{StoreError, StoreResult},
    models::{
        auth_token::{AuthToken, NewAuthToken},
        collection::Collection,
        follow_relationship::FollowRelationship,
        ingredient::{Ingredient, NewIngredient},
        ingredient_quantity::{IngredientQuantity, RecipeIngredient},
        recipe::{Recipe, RecipeDraft},
        recipe_tag::RecipeTag,
        shopping_list::{ShoppingList, ShoppingListEntry},
        tag::{NewTag, Tag},
        user::{NewUser, User},
    },
    store::{Page, PageRequest, RecipeQuery, Store},
};

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: Vec<User>,
    tokens: Vec<AuthToken>,
    follows: Vec<FollowRelationship>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    recipe_tags: Vec<RecipeTag>,
    quantities: Vec<IngredientQuantity>,
    favorites: BTreeSet<(i64, i64)>,
    shopping_carts: BTreeSet<(i64, i64)>,
    // Strictly increasing so ordering by creation is deterministic
    clock: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::from_timestamp(1_700_000_000 + self.clock, 0).unwrap_or_default()
    }

    fn collection(&mut self, collection: Collection) -> &mut BTreeSet<(i64, i64)> {
        match collection {
            Collection::Favorites => &mut self.favorites,
            Collection::ShoppingCart => &mut self.shopping_carts,
        }
    }

    fn insert_recipe_rows(&mut self, recipe_id: i64, draft: &RecipeDraft) -> StoreResult<()> {
        let unique_tags: HashSet<_> = draft.tag_ids.iter().collect();
        let unique_ingredients: HashSet<_> = draft.ingredients.iter().map(|(id, _)| id).collect();
        if unique_tags.len() != draft.tag_ids.len() || unique_ingredients.len() != draft.ingredients.len() {
            return Err(StoreError::Duplicate(format!("recipe {recipe_id} rows")));
        }

        for tag_id in &draft.tag_ids {
            if !self.tags.iter().any(|tag| tag.id == *tag_id) {
                return Err(StoreError::MissingReference(format!("tag {tag_id}")));
            }
        }
        for (ingredient_id, _) in &draft.ingredients {
            if !self.ingredients.iter().any(|ingredient| ingredient.id == *ingredient_id) {
                return Err(StoreError::MissingReference(format!("ingredient {ingredient_id}")));
            }
        }

        for &tag_id in &draft.tag_ids {
            self.recipe_tags.push(RecipeTag::new(recipe_id, tag_id));
        }
        for &(ingredient_id, amount) in &draft.ingredients {
            let id = self.next_id();
            self.quantities.push(IngredientQuantity {
                id,
                recipe_id,
                ingredient_id,
                amount,
            });
        }

        Ok(())
    }

    fn matches(&self, recipe: &Recipe, query: &RecipeQuery) -> bool {
        if query.author_id.is_some_and(|author_id| recipe.author_id != author_id) {
            return false;
        }

        if !query.tag_slugs.is_empty() {
            let tagged = self
                .recipe_tags
                .iter()
                .filter(|recipe_tag| recipe_tag.recipe_id == recipe.id)
                .filter_map(|recipe_tag| self.tags.iter().find(|tag| tag.id == recipe_tag.tag_id))
                .any(|tag| query.tag_slugs.contains(&tag.slug));
            if !tagged {
                return false;
            }
        }

        if let Some(user_id) = query.favorited_by {
            if !self.favorites.contains(&(user_id, recipe.id)) {
                return false;
            }
        }

        if let Some(user_id) = query.in_cart_of {
            if !self.shopping_carts.contains(&(user_id, recipe.id)) {
                return false;
            }
        }

        true
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect();

    Page { items, total }
}

fn newest_first(recipes: &mut [Recipe]) {
    recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Store kept entirely in memory, used to drive handlers in tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn recipe_count(&self) -> usize {
        self.state().recipes.len()
    }

    pub fn quantity_rows(&self, recipe_id: i64) -> Vec<IngredientQuantity> {
        self.state()
            .quantities
            .iter()
            .filter(|quantity| quantity.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    pub fn tag_rows(&self, recipe_id: i64) -> Vec<RecipeTag> {
        self.state()
            .recipe_tags
            .iter()
            .filter(|recipe_tag| recipe_tag.recipe_id == recipe_id)
            .cloned()
            .collect()
    }
}

impl Store for MemoryStore {
    fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state();

        if state
            .users
            .iter()
            .any(|existing| existing.email == user.email || existing.username == user.username)
        {
            return Err(StoreError::Duplicate("users".to_owned()));
        }

        let user = User {
            id: state.next_id(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password: user.password,
            date_joined: state.now(),
        };
        state.users.push(user.clone());

        Ok(user)
    }

    fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state().users.iter().find(|user| user.id == id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.state().users.iter().find(|user| user.email == email).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    fn list_users(&self, page: PageRequest) -> StoreResult<Page<User>> {
        let mut users = self.state().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));

        Ok(paginate(users, page))
    }

    fn update_password(&self, user_id: i64, password: &str) -> StoreResult<()> {
        if let Some(user) = self.state().users.iter_mut().find(|user| user.id == user_id) {
            user.password = password.to_owned();
        }

        Ok(())
    }

    fn find_token_for_user(&self, user_id: i64) -> StoreResult<Option<AuthToken>> {
        Ok(self
            .state()
            .tokens
            .iter()
            .find(|token| token.user_id == user_id)
            .cloned())
    }

    fn create_token(&self, token: NewAuthToken) -> StoreResult<AuthToken> {
        let mut state = self.state();

        if state
            .tokens
            .iter()
            .any(|existing| existing.key == token.key || existing.user_id == token.user_id)
        {
            return Err(StoreError::Duplicate("auth_tokens".to_owned()));
        }

        let token = AuthToken {
            key: token.key,
            user_id: token.user_id,
            created_at: state.now(),
        };
        state.tokens.push(token.clone());

        Ok(token)
    }

    fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>> {
        let state = self.state();

        Ok(state
            .tokens
            .iter()
            .find(|token| token.key == key)
            .and_then(|token| state.users.iter().find(|user| user.id == token.user_id))
            .cloned())
    }

    fn delete_token(&self, key: &str) -> StoreResult<bool> {
        let mut state = self.state();
        let before = state.tokens.len();
        state.tokens.retain(|token| token.key != key);

        Ok(state.tokens.len() < before)
    }

    fn follow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        let mut state = self.state();

        if state
            .follows
            .iter()
            .any(|follow| follow.from_user_id == from_user_id && follow.to_user_id == to_user_id)
        {
            return Ok(false);
        }

        let follow = FollowRelationship {
            id: state.next_id(),
            from_user_id,
            to_user_id,
            created_at: state.now(),
        };
        state.follows.push(follow);

        Ok(true)
    }

    fn unfollow(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        let mut state = self.state();
        let before = state.follows.len();
        state
            .follows
            .retain(|follow| !(follow.from_user_id == from_user_id && follow.to_user_id == to_user_id));

        Ok(state.follows.len() < before)
    }

    fn is_following(&self, from_user_id: i64, to_user_id: i64) -> StoreResult<bool> {
        Ok(self
            .state()
            .follows
            .iter()
            .any(|follow| follow.from_user_id == from_user_id && follow.to_user_id == to_user_id))
    }

    fn list_following(&self, user_id: i64, page: PageRequest) -> StoreResult<Page<User>> {
        let state = self.state();

        let mut follows: Vec<_> = state
            .follows
            .iter()
            .filter(|follow| follow.from_user_id == user_id)
            .collect();
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let users = follows
            .into_iter()
            .filter_map(|follow| state.users.iter().find(|user| user.id == follow.to_user_id))
            .cloned()
            .collect();

        Ok(paginate(users, page))
    }

    fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut tags = self.state().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(tags)
    }

    fn find_tag(&self, id: i64) -> StoreResult<Option<Tag>> {
        Ok(self.state().tags.iter().find(|tag| tag.id == id).cloned())
    }

    fn existing_tag_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>> {
        Ok(self
            .state()
            .tags
            .iter()
            .map(|tag| tag.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    fn insert_tags(&self, tags: Vec<NewTag>) -> StoreResult<usize> {
        let mut state = self.state();
        let mut inserted = 0;

        for tag in tags {
            if state
                .tags
                .iter()
                .any(|existing| existing.name == tag.name || existing.color == tag.color || existing.slug == tag.slug)
            {
                continue;
            }

            let id = state.next_id();
            state.tags.push(Tag {
                id,
                name: tag.name,
                color: tag.color,
                slug: tag.slug,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    fn list_ingredients(&self, name_prefix: Option<&str>) -> StoreResult<Vec<Ingredient>> {
        let prefix = name_prefix.map(str::to_lowercase);

        let mut ingredients: Vec<_> = self
            .state()
            .ingredients
            .iter()
            .filter(|ingredient| {
                prefix
                    .as_deref()
                    .map_or(true, |prefix| ingredient.name.to_lowercase().starts_with(prefix))
            })
            .cloned()
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(ingredients)
    }

    fn find_ingredient(&self, id: i64) -> StoreResult<Option<Ingredient>> {
        Ok(self
            .state()
            .ingredients
            .iter()
            .find(|ingredient| ingredient.id == id)
            .cloned())
    }

    fn existing_ingredient_ids(&self, ids: &[i64]) -> StoreResult<HashSet<i64>> {
        Ok(self
            .state()
            .ingredients
            .iter()
            .map(|ingredient| ingredient.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    fn insert_ingredients(&self, ingredients: Vec<NewIngredient>) -> StoreResult<usize> {
        let mut state = self.state();
        let mut inserted = 0;

        for ingredient in ingredients {
            if state.ingredients.iter().any(|existing| {
                existing.name == ingredient.name && existing.measurement_unit == ingredient.measurement_unit
            }) {
                continue;
            }

            let id = state.next_id();
            state.ingredients.push(Ingredient {
                id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
            });
            inserted += 1;
        }

        Ok(inserted)
    }

    fn create_recipe(&self, author_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe> {
        let mut state = self.state();

        let recipe = Recipe {
            id: state.next_id(),
            author_id,
            name: draft.name.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            image: draft.image.clone(),
            created_at: state.now(),
        };

        // Rows are validated before anything is pushed, so a failure leaves no trace
        state.insert_recipe_rows(recipe.id, draft)?;
        state.recipes.push(recipe.clone());
        state.favorites.insert((author_id, recipe.id));

        Ok(recipe)
    }

    fn update_recipe(&self, recipe_id: i64, draft: &RecipeDraft) -> StoreResult<Recipe> {
        let mut state = self.state();

        if !state.recipes.iter().any(|recipe| recipe.id == recipe_id) {
            return Err(StoreError::Query(diesel::result::Error::NotFound));
        }

        let previous_tags = state.recipe_tags.clone();
        let previous_quantities = state.quantities.clone();
        state.recipe_tags.retain(|recipe_tag| recipe_tag.recipe_id != recipe_id);
        state.quantities.retain(|quantity| quantity.recipe_id != recipe_id);

        if let Err(error) = state.insert_recipe_rows(recipe_id, draft) {
            state.recipe_tags = previous_tags;
            state.quantities = previous_quantities;
            return Err(error);
        }

        let recipe = state
            .recipes
            .iter_mut()
            .find(|recipe| recipe.id == recipe_id)
            .ok_or(StoreError::Query(diesel::result::Error::NotFound))?;
        recipe.name = draft.name.clone();
        recipe.text = draft.text.clone();
        recipe.cooking_time = draft.cooking_time;
        recipe.image = draft.image.clone();

        Ok(recipe.clone())
    }

    fn delete_recipe(&self, recipe_id: i64) -> StoreResult<bool> {
        let mut state = self.state();
        let before = state.recipes.len();

        state.recipes.retain(|recipe| recipe.id != recipe_id);
        state.recipe_tags.retain(|recipe_tag| recipe_tag.recipe_id != recipe_id);
        state.quantities.retain(|quantity| quantity.recipe_id != recipe_id);
        state.favorites.retain(|(_, id)| *id != recipe_id);
        state.shopping_carts.retain(|(_, id)| *id != recipe_id);

        Ok(state.recipes.len() < before)
    }

    fn find_recipe(&self, id: i64) -> StoreResult<Option<Recipe>> {
        Ok(self.state().recipes.iter().find(|recipe| recipe.id == id).cloned())
    }

    fn list_recipes(&self, query: &RecipeQuery, page: PageRequest) -> StoreResult<Page<Recipe>> {
        let state = self.state();

        let mut recipes: Vec<_> = state
            .recipes
            .iter()
            .filter(|recipe| state.matches(recipe, query))
            .cloned()
            .collect();
        newest_first(&mut recipes);

        Ok(paginate(recipes, page))
    }

    fn recipe_tags(&self, recipe_id: i64) -> StoreResult<Vec<Tag>> {
        let state = self.state();

        let mut tags: Vec<_> = state
            .recipe_tags
            .iter()
            .filter(|recipe_tag| recipe_tag.recipe_id == recipe_id)
            .filter_map(|recipe_tag| state.tags.iter().find(|tag| tag.id == recipe_tag.tag_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(tags)
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> StoreResult<Vec<RecipeIngredient>> {
        let state = self.state();

        Ok(state
            .quantities
            .iter()
            .filter(|quantity| quantity.recipe_id == recipe_id)
            .filter_map(|quantity| {
                state
                    .ingredients
                    .iter()
                    .find(|ingredient| ingredient.id == quantity.ingredient_id)
                    .map(|ingredient| RecipeIngredient {
                        id: ingredient.id,
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: quantity.amount,
                    })
            })
            .collect())
    }

    fn author_recipes(&self, author_id: i64, limit: Option<i64>) -> StoreResult<Vec<Recipe>> {
        let mut recipes: Vec<_> = self
            .state()
            .recipes
            .iter()
            .filter(|recipe| recipe.author_id == author_id)
            .cloned()
            .collect();
        newest_first(&mut recipes);

        if let Some(limit) = limit {
            recipes.truncate(limit.max(0) as usize);
        }

        Ok(recipes)
    }

    fn count_author_recipes(&self, author_id: i64) -> StoreResult<i64> {
        Ok(self
            .state()
            .recipes
            .iter()
            .filter(|recipe| recipe.author_id == author_id)
            .count() as i64)
    }

    fn add_to_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool> {
        Ok(self.state().collection(collection).insert((user_id, recipe_id)))
    }

    fn remove_from_collection(
        &self,
        collection: Collection,
        user_id: i64,
        recipe_id: i64,
    ) -> StoreResult<bool> {
        Ok(self.state().collection(collection).remove(&(user_id, recipe_id)))
    }

    fn in_collection(&self, collection: Collection, user_id: i64, recipe_id: i64) -> StoreResult<bool> {
        Ok(self.state().collection(collection).contains(&(user_id, recipe_id)))
    }

    fn count_collection(&self, collection: Collection, user_id: i64) -> StoreResult<i64> {
        Ok(self
            .state()
            .collection(collection)
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .count() as i64)
    }

    fn shopping_list(&self, user_id: i64) -> StoreResult<ShoppingList> {
        let state = self.state();

        let entries = state
            .shopping_carts
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .flat_map(|(_, recipe_id)| {
                state
                    .quantities
                    .iter()
                    .filter(move |quantity| quantity.recipe_id == *recipe_id)
            })
            .filter_map(|quantity| {
                state
                    .ingredients
                    .iter()
                    .find(|ingredient| ingredient.id == quantity.ingredient_id)
                    .map(|ingredient| {
                        ShoppingListEntry::new(
                            ingredient.name.clone(),
                            ingredient.measurement_unit.clone(),
                            i64::from(quantity.amount),
                        )
                    })
            })
            .collect::<Vec<_>>();

        Ok(entries.into_iter().collect())
    }
}
