//! Menu catalog for voxpos.
//!
//! The catalog is an owned store: callers create one (usually from the
//! seed menu) and pass it explicitly to whatever needs prices. Listing
//! order is insertion order.

mod seed;

pub use seed::seed_items;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

/// A sellable item. Prices are in the minor currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: SmolStr,
    /// Display name, Title Case by convention
    pub name: SmolStr,
    pub price: u64,
}

impl MenuItem {
    pub fn new(id: impl Into<SmolStr>, name: impl Into<SmolStr>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// Item to insert; the id is generated when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMenuItem {
    #[serde(default)]
    pub id: Option<SmolStr>,
    pub name: SmolStr,
    pub price: u64,
}

/// Catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate menu item id: {0}")]
    DuplicateId(SmolStr),
    #[error("menu item name must not be empty")]
    EmptyName,
}

/// Ordered collection of menu items with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<MenuItem>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the restaurant's seed menu.
    pub fn seeded() -> Self {
        Self {
            items: seed_items(),
        }
    }

    /// Build a catalog from existing items, enforcing id uniqueness.
    pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(NewMenuItem {
                id: Some(item.id),
                name: item.name,
                price: item.price,
            })?;
        }
        Ok(catalog)
    }

    /// All items in insertion order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Case-insensitive exact lookup by name.
    ///
    /// Partial names do not match: "coffee" will not find "Iced Coffee".
    pub fn lookup_by_name(&self, name: &str) -> Option<&MenuItem> {
        let wanted = name.to_lowercase();
        self.items
            .iter()
            .find(|item| item.name.to_lowercase() == wanted)
    }

    /// Add an item with a freshly generated id.
    pub fn add(&mut self, name: impl Into<SmolStr>, price: u64) -> Result<MenuItem, CatalogError> {
        self.insert(NewMenuItem {
            id: None,
            name: name.into(),
            price,
        })
    }

    /// Insert an item, generating an id if the caller did not supply one.
    pub fn insert(&mut self, new_item: NewMenuItem) -> Result<MenuItem, CatalogError> {
        let name = SmolStr::new(new_item.name.trim());
        if name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let id = match new_item.id {
            Some(id) => {
                if self.get(&id).is_some() {
                    return Err(CatalogError::DuplicateId(id));
                }
                id
            }
            None => self.fresh_id(),
        };

        let item = MenuItem {
            id,
            name,
            price: new_item.price,
        };
        debug!("Menu add: {} ({}) @ {}", item.name, item.id, item.price);
        self.items.push(item.clone());
        Ok(item)
    }

    /// Delete by id. Deleting an unknown id is not an error.
    pub fn delete(&mut self, id: &str) -> Option<MenuItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(index);
        debug!("Menu delete: {} ({})", removed.name, removed.id);
        Some(removed)
    }

    fn fresh_id(&self) -> SmolStr {
        loop {
            let id = SmolStr::new(uuid::Uuid::new_v4().to_string());
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}
