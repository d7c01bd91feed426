//! Infrastructure layer: record store, id allocation, config, and the
//! services that run catalog, adjustment and delivery workflows against it.

pub mod adjustments;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod error;
pub mod record_store;
pub mod sequence;


pub use adjustments::{AdjustmentOutcome, AdjustmentService, AppliedLine, ApplyFailure};
pub use catalog::CatalogService;
pub use config::{LedgerConfig, DEFAULT_CONFIG_PATH};
pub use delivery::DeliveryService;
pub use error::{ServiceError, ServiceResult};
pub use record_store::{
    InMemoryRecordStore, Loaded, Record, RecordStore, RecordStoreExt, ScanFilter, ScanPage,
    StoreError, StoredRecord,
};
pub use sequence::{IdSpace, IdStrategy, SequentialIdAllocator};
