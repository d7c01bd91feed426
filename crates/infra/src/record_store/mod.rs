//! Record Store boundary.
//!
//! A versioned key/value store with one namespace per collection and
//! paginated scans. The in-memory implementation backs tests and local use;
//! other backends only need to implement [`RecordStore`].

pub mod in_memory;
pub mod r#trait;
pub mod typed;

pub use in_memory::InMemoryRecordStore;
pub use r#trait::{RecordStore, ScanFilter, ScanPage, StoreError, StoredRecord};
pub use typed::{Loaded, Record, RecordStoreExt, Scan};

/// Collection names.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const STOCK_ADJUSTMENTS: &str = "stock_adjustments";
    pub const DELIVERY_AREAS: &str = "delivery_areas";
    pub const DELIVERY_TYPES: &str = "delivery_types";
    pub const CUSTOMERS: &str = "customers";
    pub const ORDERS: &str = "orders";
    /// Per-prefix counters of the `counter` id strategy.
    pub const ID_SEQUENCES: &str = "id_sequences";
}
