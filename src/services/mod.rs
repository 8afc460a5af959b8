pub mod bank_assembler;
pub mod quality_checker;
pub mod rollback_writer;
pub mod schema_validator;
pub mod set_normalizer;
pub mod upload_planner;
pub mod warn_writer;

pub use bank_assembler::assemble;
pub use quality_checker::{check_bank, QualityIssue, QualityReport};
pub use rollback_writer::RollbackWriter;
pub use schema_validator::{validate, ValidationResult};
pub use set_normalizer::{normalize, normalize_raw};
pub use upload_planner::{plan, UploadPlanner};
pub use warn_writer::WarnWriter;
