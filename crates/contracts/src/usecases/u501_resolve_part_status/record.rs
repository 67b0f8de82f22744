use super::identifier::PartIdentifier;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Префикс статуса для неудачного запроса
pub const FAILURE_PREFIX: &str = "查询失败";

/// Нормализованный результат запроса одной детали
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub status: String,
    pub description: String,
    pub manufacturer: String,
    pub product_url: String,
    pub datasheet_url: String,
    pub quantity_available: u64,
}

impl ProductRecord {
    /// Запись-заглушка для детали, по которой не удалось получить статус.
    /// Схема остаётся той же, чтобы столбцы в таблице были прямоугольными.
    pub fn failure(reason: impl AsRef<str>) -> Self {
        Self {
            status: format!("{}: {}", FAILURE_PREFIX, reason.as_ref()),
            description: String::new(),
            manufacturer: String::new(),
            product_url: String::new(),
            datasheet_url: String::new(),
            quantity_available: 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.starts_with(FAILURE_PREFIX)
    }
}

/// Упорядоченное отображение PartIdentifier -> ProductRecord.
///
/// Порядок вставки = порядок входных данных. Повторная вставка ключа
/// заменяет значение, не меняя его позицию. В JSON сериализуется объектом.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap {
    entries: Vec<(PartIdentifier, ProductRecord)>,
    index: HashMap<PartIdentifier, usize>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: PartIdentifier, record: ProductRecord) -> Option<ProductRecord> {
        if let Some(&pos) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[pos].1, record));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, record));
        None
    }

    pub fn get(&self, key: &PartIdentifier) -> Option<&ProductRecord> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartIdentifier, &ProductRecord)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &PartIdentifier> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

struct ResultMapVisitor;

impl<'de> Visitor<'de> for ResultMapVisitor {
    type Value = ResultMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of part identifiers to product records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = ResultMap::new();
        while let Some((key, record)) = access.next_entry::<PartIdentifier, ProductRecord>()? {
            result.insert(key, record);
        }
        Ok(result)
    }
}

impl<'de> Deserialize<'de> for ResultMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ResultMapVisitor)
    }
}
