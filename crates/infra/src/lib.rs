//! Infrastructure layer: record stores, lifecycle execution, configuration, report export.

pub mod config;
pub mod lifecycle;
pub mod report_export;
pub mod store;


pub use config::StoreConfig;
pub use lifecycle::{FieldUpdate, LifecycleError, LifecycleManager, LifecycleResult, NewItem, UpdateOutcome};
pub use report_export::export_report;
pub use store::{CsvRecordStore, InMemoryRecordStore, RecordStore, StoreError};
