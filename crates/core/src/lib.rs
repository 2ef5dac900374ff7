//! Extraction contract and personal-information detection.

pub mod document;
pub mod error;
pub mod rules;

pub use document::{DocumentFormat, ExtractionResult, TextExtractor, UploadedDocument};
pub use error::{ExtractError, ExtractResult, FailureKind};
pub use rules::{detect, detect_in, FindingLabel, PersonalInfoFinding, PiiCategory, Verdict};
