use std::sync::Arc;

use crate::domain::entities::dataset::Dataset;
use crate::usecase::ports::store::{load_rows, OverrideStore, CATEGORIES_KEY, USERS_KEY};

pub struct MergeService {
    store: Arc<dyn OverrideStore>,
}

impl MergeService {
    pub fn new(store: Arc<dyn OverrideStore>) -> Self {
        Self { store }
    }

    /// The dataset actually rendered: a copy of `base` with `categories` and
    /// `users.attempts` replaced wholesale by any stored overrides. No other
    /// field is touched, and the store is never written.
    pub fn effective(&self, base: &Dataset) -> Dataset {
        let mut merged = base.clone();
        merged.categories = load_rows(self.store.as_ref(), CATEGORIES_KEY, &base.categories);
        merged.users.attempts = load_rows(self.store.as_ref(), USERS_KEY, &base.users.attempts);
        merged
    }
}
