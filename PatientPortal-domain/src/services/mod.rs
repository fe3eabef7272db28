// Domain services
// The reading store, the classifier and the calculations derived from stored readings.
pub mod classifier;
pub mod errors;
pub mod store;
pub mod summary;
pub mod trends;
pub mod validation;

// Re-export the main entry points
pub use classifier::{classify_blood_pressure, classify_glucose, classify_reading, classify_weight_change};
pub use errors::StoreError;
pub use store::ReadingStore;
pub use summary::{HealthAlert, HealthSummary, LatestReading, WeightChange};
pub use trends::{SeriesPoint, TrendDirection, TrendStatistics, Trends, DEFAULT_SERIES_WINDOW};
