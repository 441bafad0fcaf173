//! Service layer for datasight business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or other interfaces.

pub mod analysis;
pub mod report;

#[allow(unused_imports)]
pub use analysis::{AnalysisService, ProviderSlot};
#[allow(unused_imports)]
pub use report::ReportWriter;
