pub mod record;
pub mod search;

pub use record::{StoredRecord, Vector, VectorId, VectorRecord};
pub use search::SearchHit;
