pub mod bank;
pub mod loaders;
pub mod manifest;
pub mod question;
pub mod range;
pub mod set;
pub mod upload;

pub use bank::{AssemblyOutcome, BankMetadata, IncompleteBank, QuestionBank};
pub use loaders::{load_manifest, load_raw_set, write_bank_file};
pub use manifest::{BankManifest, SetEntry};
pub use question::{
    Curriculum, Hint, PaperMetadata, Question, QuestionKind, QuestionStatus, QuestionType,
};
pub use range::SequenceRange;
pub use set::{QuestionSet, RawSet};
pub use upload::{StoredDocument, UploadDivergence, UploadPlan, UploadState, WriteOperation};
