use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::dataset::Dataset;

pub struct AppState {
    pub base: Signal<Dataset>,
    pub json_editor: Signal<String>,
    pub category_drafts: Signal<Vec<Vec<String>>>,
    pub user_drafts: Signal<Vec<Vec<String>>>,
    pub store_rev: Signal<u64>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    pub updated_at: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            base: use_signal(Dataset::fallback),
            json_editor: use_signal(String::new),
            category_drafts: use_signal(Vec::<Vec<String>>::new),
            user_drafts: use_signal(Vec::<Vec<String>>::new),
            store_rev: use_signal(|| 0_u64),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
            updated_at: use_signal(String::new),
        }
    }
}
