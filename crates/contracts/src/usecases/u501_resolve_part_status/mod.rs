pub mod identifier;
pub mod progress;
pub mod record;
pub mod request;
pub mod response;

pub use identifier::PartIdentifier;
pub use progress::{ErrorKind, ResolveProgress, ResolveStatus};
pub use record::{ProductRecord, ResultMap, FAILURE_PREFIX};
pub use request::ResolveRequest;
pub use response::{ResolveResponse, ResolveStartStatus, UploadResponse};

use crate::usecases::common::UseCaseMetadata;

pub struct ResolvePartStatus;

impl UseCaseMetadata for ResolvePartStatus {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "resolve_part_status"
    }

    fn display_name() -> &'static str {
        "Digi-Key 产品状态查询"
    }

    fn description() -> &'static str {
        "从 Excel 读取产品编号, 查询 Digi-Key 产品状态并写回表格"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(ResolvePartStatus::full_name(), "u501_resolve_part_status");
        assert_eq!(ResolvePartStatus::api_prefix(), "/api/u501");
    }
}
