// Copyright 2026 the Glint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Category-group registry.

use std::collections::HashMap;

use glint_core::trace::Category;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct Registry {
    names: Vec<&'static str>,
    by_name: HashMap<&'static str, u32>,
}

/// Assigns indices to category-group names. Every category is enabled.
#[derive(Debug, Default)]
pub(crate) struct CategoryRegistry {
    inner: RwLock<Registry>,
}

impl CategoryRegistry {
    pub(crate) fn resolve(&self, group: &'static str) -> Category {
        if let Some(&index) = self.inner.read().by_name.get(group) {
            return Category::new(index, true);
        }
        let mut registry = self.inner.write();
        if let Some(&index) = registry.by_name.get(group) {
            return Category::new(index, true);
        }
        let index = u32::try_from(registry.names.len()).unwrap_or(u32::MAX);
        registry.names.push(group);
        registry.by_name.insert(group, index);
        Category::new(index, true)
    }

    pub(crate) fn name(&self, category: Category) -> &'static str {
        self.inner
            .read()
            .names
            .get(category.index() as usize)
            .copied()
            .unwrap_or("")
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.inner.read().names.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_resolve_by_content() {
        let registry = CategoryRegistry::default();
        let gpu = registry.resolve("skia.gpu");
        let core = registry.resolve("skia");
        assert!(gpu.is_enabled(), "categories are enabled");
        assert_ne!(gpu.index(), core.index());

        let owned = String::from("skia.gpu");
        let leaked: &'static str = Box::leak(owned.into_boxed_str());
        assert_eq!(registry.resolve(leaked), gpu, "same name, same category");

        assert_eq!(registry.name(core), "skia");
        assert_eq!(registry.name(Category::DISABLED), "");
        assert_eq!(registry.names(), ["skia.gpu", "skia"]);
    }
}
