//! Content store collaborator.
//!
//! The pipeline consumes sites and items through [`ContentStore`] and
//! owns no persistence of its own. [`JsonStore`] is the file-backed
//! reference implementation: one JSON document holding every site and
//! item, loaded once and written back after each mutation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::types::{ContentItem, Site};

// ============================================================================
// Collaborator Trait
// ============================================================================

/// CRUD boundary for sites and content items.
pub trait ContentStore {
    /// Fetch a site by id.
    ///
    /// # Errors
    /// [`Error::MissingResource`] if no such site exists.
    fn get_site(&self, site_id: &str) -> Result<Site, Error>;

    /// All items belonging to a site, in stored order.
    fn get_items(&self, site_id: &str) -> Result<Vec<ContentItem>, Error>;

    /// Fetch a single item of a site.
    ///
    /// # Errors
    /// [`Error::MissingResource`] if no such item exists.
    fn get_item(&self, site_id: &str, item_id: &str) -> Result<ContentItem, Error>;

    /// Insert a new item.
    ///
    /// # Errors
    /// [`Error::Validation`] if an item with the same id already exists.
    fn create_item(&mut self, item: ContentItem) -> Result<(), Error>;

    /// Replace an existing item.
    fn update_item(&mut self, item: &ContentItem) -> Result<(), Error>;

    /// Remove an item.
    fn delete_item(&mut self, site_id: &str, item_id: &str) -> Result<(), Error>;

    /// Replace an existing site record (used by `setup` to persist the
    /// discovered hosted URL).
    fn update_site(&mut self, site: &Site) -> Result<(), Error>;
}

// ============================================================================
// JSON File Store
// ============================================================================

/// On-disk document shape: flat lists, items carry their `site_id`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Database {
    #[serde(default)]
    sites: Vec<Site>,

    #[serde(default)]
    items: Vec<ContentItem>,
}

/// JSON file-backed [`ContentStore`].
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    db: Database,
}

impl JsonStore {
    /// Load a store from `path`.
    ///
    /// # Errors
    /// [`Error::MissingResource`] if the file does not exist,
    /// [`Error::Json`] if it cannot be parsed.
    pub fn open(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::MissingResource(format!(
                "content database `{}` not found",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        let db = serde_json::from_str(&raw)?;
        Ok(Self {
            path: path.to_path_buf(),
            db,
        })
    }

    /// Create an empty store file at `path` (used by `init`).
    pub fn create(path: &Path) -> Result<Self, Error> {
        let store = Self {
            path: path.to_path_buf(),
            db: Database::default(),
        };
        store.save()?;
        Ok(store)
    }

    /// Insert a site record (used by `init` scaffolding).
    pub fn create_site(&mut self, site: Site) -> Result<(), Error> {
        if self.db.sites.iter().any(|s| s.id == site.id) {
            return Err(Error::Validation(format!(
                "site `{}` already exists",
                site.id
            )));
        }
        self.db.sites.push(site);
        self.save()
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.db)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn item_position(&self, site_id: &str, item_id: &str) -> Option<usize> {
        self.db
            .items
            .iter()
            .position(|i| i.site_id == site_id && i.id == item_id)
    }
}

impl ContentStore for JsonStore {
    fn get_site(&self, site_id: &str) -> Result<Site, Error> {
        self.db
            .sites
            .iter()
            .find(|s| s.id == site_id)
            .cloned()
            .ok_or_else(|| Error::MissingResource(format!("site `{site_id}`")))
    }

    fn get_items(&self, site_id: &str) -> Result<Vec<ContentItem>, Error> {
        Ok(self
            .db
            .items
            .iter()
            .filter(|i| i.site_id == site_id)
            .cloned()
            .collect())
    }

    fn get_item(&self, site_id: &str, item_id: &str) -> Result<ContentItem, Error> {
        self.item_position(site_id, item_id)
            .map(|pos| self.db.items[pos].clone())
            .ok_or_else(|| Error::MissingResource(format!("item `{item_id}` of site `{site_id}`")))
    }

    fn create_item(&mut self, item: ContentItem) -> Result<(), Error> {
        if self.item_position(&item.site_id, &item.id).is_some() {
            return Err(Error::Validation(format!(
                "item `{}` already exists in site `{}`",
                item.id, item.site_id
            )));
        }
        self.db.items.push(item);
        self.save()
    }

    fn update_item(&mut self, item: &ContentItem) -> Result<(), Error> {
        let pos = self.item_position(&item.site_id, &item.id).ok_or_else(|| {
            Error::MissingResource(format!("item `{}` of site `{}`", item.id, item.site_id))
        })?;
        self.db.items[pos] = item.clone();
        self.save()
    }

    fn delete_item(&mut self, site_id: &str, item_id: &str) -> Result<(), Error> {
        let pos = self
            .item_position(site_id, item_id)
            .ok_or_else(|| Error::MissingResource(format!("item `{item_id}`")))?;
        self.db.items.remove(pos);

        // Prune the item's structure nodes from the owning site so the
        // tree never points at a deleted record.
        if let Some(site) = self.db.sites.iter_mut().find(|s| s.id == site_id) {
            site.structure =
                crate::structure::remove_nodes(&site.structure, &[item_id.to_string()]);
        }
        self.save()
    }

    fn update_site(&mut self, site: &Site) -> Result<(), Error> {
        let pos = self
            .db
            .sites
            .iter()
            .position(|s| s.id == site.id)
            .ok_or_else(|| Error::MissingResource(format!("site `{}`", site.id)))?;
        self.db.sites[pos] = site.clone();
        self.save()
    }
}

// ============================================================================
// Tests
// ============================================================================
