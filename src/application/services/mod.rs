//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, AttributeStore)
//! but are themselves concrete structs, not traits.

mod export;

pub use export::{
    classify, load_model, ExportService, ExportSummary, ID_COMPOSITE_FILE, SYSTEM_COMPOSITE_FILE,
};
