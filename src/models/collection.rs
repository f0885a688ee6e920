//! Ordered aggregate of assets and its export operations.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::export;
use crate::models::{Asset, Meeting};

/// Assets in insertion order. Duplicates are kept; grouping resolves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetCollection {
    assets: Vec<Asset>,
}

impl AssetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Asset> {
        self.assets.iter_mut()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Asset> {
        self.assets.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Asset] {
        &self.assets
    }

    /// Keep only the assets for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&Asset) -> bool) {
        self.assets.retain(keep);
    }

    /// Write the flat CSV metadata file, stamped with the current UTC minute.
    pub fn export_csv(&self, target_dir: impl AsRef<Path>) -> Result<PathBuf> {
        export::csv::write_csv(self, target_dir.as_ref(), Utc::now())
    }

    /// Same as [`export_csv`](Self::export_csv) with an explicit timestamp.
    pub fn export_csv_at(&self, target_dir: impl AsRef<Path>, at: DateTime<Utc>) -> Result<PathBuf> {
        export::csv::write_csv(self, target_dir.as_ref(), at)
    }

    /// CSV metadata as an in-memory string.
    pub fn to_csv_string(&self) -> String {
        export::csv::render(self)
    }

    /// Re-read a CSV metadata export.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        export::csv::parse(text)
    }

    /// Group assets into meetings keyed by meeting id.
    pub fn meetings(&self) -> BTreeMap<String, Meeting> {
        export::events::group_meetings(self)
    }

    /// Write one `<meeting_id>.json` per meeting and return the grouping.
    pub fn export_events(&self, target_dir: impl AsRef<Path>) -> Result<BTreeMap<String, Meeting>> {
        export::events::write_events(self, target_dir.as_ref())
    }
}

impl From<Vec<Asset>> for AssetCollection {
    fn from(assets: Vec<Asset>) -> Self {
        Self { assets }
    }
}

impl FromIterator<Asset> for AssetCollection {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}

impl Extend<Asset> for AssetCollection {
    fn extend<I: IntoIterator<Item = Asset>>(&mut self, iter: I) {
        self.assets.extend(iter);
    }
}

impl IntoIterator for AssetCollection {
    type Item = Asset;
    type IntoIter = std::vec::IntoIter<Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.into_iter()
    }
}

impl<'a> IntoIterator for &'a AssetCollection {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order_and_duplicates() {
        let mut collection = AssetCollection::new();
        collection.append(Asset::new("http://a/2"));
        collection.append(Asset::new("http://a/1"));
        collection.append(Asset::new("http://a/2"));

        let urls: Vec<_> = collection.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a/2", "http://a/1", "http://a/2"]);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn retain_filters_in_place() {
        let mut collection: AssetCollection =
            vec![Asset::new("http://a/1"), Asset::new("http://b/2")].into();
        collection.retain(|a| a.url.contains("/b/"));
        assert_eq!(collection.len(), 1);
    }
}
