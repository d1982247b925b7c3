use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::url_index::DEFAULT_BUCKET_COUNT;

/// Clock used to stamp the access date of new records.
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct StoreConfig {
    /// Number of URL index buckets. Fixed for the life of the store.
    pub bucket_count: usize,
    pub today: DateSource,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }
}

impl StoreConfig {
    /// Config whose clock always returns `date`.
    pub fn with_fixed_date(date: NaiveDate) -> Self {
        Self {
            today: Arc::new(move || date),
            ..Self::default()
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("bucket_count", &self.bucket_count)
            .finish_non_exhaustive()
    }
}
