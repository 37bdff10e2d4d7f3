use std::{collections::BTreeMap, ops::Deref};

use lombok::AllArgsConstructor;

#[derive(AllArgsConstructor, Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Ingredient totals keyed by (name, measurement unit), ordered by name.
#[derive(Clone, PartialEq, Eq)]
pub struct ShoppingList {
    inner: BTreeMap<(String, String), i64>,
}

impl Default for ShoppingList {
    fn default() -> Self {
        Self::new()
    }
}

impl ShoppingList {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }

    pub fn add_item(&mut self, name: &str, measurement_unit: &str, amount: i64) {
        self.inner
            .entry((name.to_owned(), measurement_unit.to_owned()))
            .and_modify(|current_amount| {
                *current_amount += amount;
            })
            .or_insert(amount);
    }

    pub fn add_entries(&mut self, entries: impl IntoIterator<Item = ShoppingListEntry>) {
        entries.into_iter().for_each(|entry| {
            self.add_item(&entry.name, &entry.measurement_unit, entry.amount);
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = ShoppingListEntry> + '_ {
        self.inner
            .iter()
            .map(|((name, unit), amount)| ShoppingListEntry::new(name.clone(), unit.clone(), *amount))
    }
}

impl FromIterator<ShoppingListEntry> for ShoppingList {
    fn from_iter<T: IntoIterator<Item = ShoppingListEntry>>(iter: T) -> Self {
        let mut list = ShoppingList::new();
        list.add_entries(iter);
        list
    }
}

impl Deref for ShoppingList {
    type Target = BTreeMap<(String, String), i64>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for ShoppingList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_and_unit_are_summed() {
        let list: ShoppingList = vec![
            ShoppingListEntry::new("flour".to_owned(), "g".to_owned(), 200),
            ShoppingListEntry::new("flour".to_owned(), "g".to_owned(), 100),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.len(), 1);
        assert_eq!(list[&("flour".to_owned(), "g".to_owned())], 300);
    }

    #[test]
    fn different_units_stay_apart() {
        let mut list = ShoppingList::new();
        list.add_item("milk", "ml", 200);
        list.add_item("milk", "cup", 1);
        list.add_item("butter", "g", 50);

        let entries: Vec<_> = list.entries().collect();
        assert_eq!(
            entries,
            vec![
                ShoppingListEntry::new("butter".to_owned(), "g".to_owned(), 50),
                ShoppingListEntry::new("milk".to_owned(), "cup".to_owned(), 1),
                ShoppingListEntry::new("milk".to_owned(), "ml".to_owned(), 200),
            ]
        );
    }
}
