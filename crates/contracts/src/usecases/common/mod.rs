//! Общие контракты UseCase

pub mod usecase_metadata;

pub use usecase_metadata::UseCaseMetadata;
