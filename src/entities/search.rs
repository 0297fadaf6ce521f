use serde::{Deserialize, Serialize};

/// An autocomplete result. `handle` is opaque to everything but the
/// address search service that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCompletion {
    pub title: String,
    pub subtitle: String,
    pub handle: String,
}

impl SearchCompletion {
    pub fn new(title: String, subtitle: String, handle: String) -> Self {
        Self {
            title,
            subtitle,
            handle,
        }
    }
}
