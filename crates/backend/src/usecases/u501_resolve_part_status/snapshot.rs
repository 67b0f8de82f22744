use super::error::ResolveError;
use contracts::usecases::u501_resolve_part_status::ResultMap;
use std::path::{Path, PathBuf};

/// Файл снимка для конкретной книги: `<каталог base>/<имя книги>.<имя base>`.
///
/// `base` = `storage.snapshot_path`, например `data/product_details.json`
/// для `bom.xlsx` даёт `data/bom.xlsx.product_details.json`.
pub fn snapshot_path_for(base: &Path, workbook: &Path) -> PathBuf {
    let base_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "product_details.json".to_string());
    let name = match workbook.file_name() {
        Some(book) => format!("{}.{}", book.to_string_lossy(), base_name),
        None => base_name,
    };
    base.with_file_name(name)
}

/// Сохранить результаты прогона в JSON (файл перезаписывается целиком)
pub fn write_snapshot(path: &Path, results: &ResultMap) -> Result<(), ResolveError> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| ResolveError::Persistence(format!("无法序列化结果: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            ResolveError::Persistence(format!("无法创建目录 {}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(path, json).map_err(|e| {
        tracing::error!("Failed to write snapshot {}: {}", path.display(), e);
        ResolveError::Persistence(format!("无法保存 {}: {}", path.display(), e))
    })?;

    tracing::info!("Snapshot with {} record(s) saved to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u501_resolve_part_status::{PartIdentifier, ProductRecord};

    #[test]
    fn test_snapshot_keeps_order_and_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("product_details.json");

        let mut results = ResultMap::new();
        results.insert(
            PartIdentifier::parse("ZZZ").unwrap(),
            ProductRecord::failure("未找到产品信息"),
        );
        results.insert(
            PartIdentifier::parse("AAA").unwrap(),
            ProductRecord::failure("HTTP 500"),
        );

        write_snapshot(&path, &results).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("查询失败: 未找到产品信息"));
        assert!(text.find("\"ZZZ\"").unwrap() < text.find("\"AAA\"").unwrap());

        let back: ResultMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_snapshot_path_is_keyed_by_workbook_name() {
        let base = Path::new("data").join("product_details.json");
        assert_eq!(
            snapshot_path_for(&base, Path::new("/tmp/uploads/bom.xlsx")),
            Path::new("data").join("bom.xlsx.product_details.json")
        );
        assert_ne!(
            snapshot_path_for(&base, Path::new("bom.xlsx")),
            snapshot_path_for(&base, Path::new("bom.xlsm"))
        );
        assert_eq!(
            snapshot_path_for(Path::new("product_details.json"), Path::new("a.xlsx")),
            Path::new("a.xlsx.product_details.json")
        );
    }

    #[test]
    fn test_unwritable_path_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        // каталог вместо файла
        let err = write_snapshot(dir.path(), &ResultMap::new()).unwrap_err();
        assert!(matches!(err, ResolveError::Persistence(_)));
    }
}
