use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Поля ProductRecord, которые можно выгрузить в таблицу
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputField {
    Status,
    Description,
    Manufacturer,
    ProductUrl,
    DatasheetUrl,
    QuantityAvailable,
}

impl OutputField {
    /// Код поля (совпадает с serde-представлением)
    pub fn code(&self) -> &'static str {
        match self {
            OutputField::Status => "status",
            OutputField::Description => "description",
            OutputField::Manufacturer => "manufacturer",
            OutputField::ProductUrl => "product_url",
            OutputField::DatasheetUrl => "datasheet_url",
            OutputField::QuantityAvailable => "quantity_available",
        }
    }

    /// Подпись столбца по умолчанию
    pub fn default_label(&self) -> &'static str {
        match self {
            OutputField::Status => "状态",
            OutputField::Description => "描述",
            OutputField::Manufacturer => "制造商",
            OutputField::ProductUrl => "产品链接",
            OutputField::DatasheetUrl => "数据手册",
            OutputField::QuantityAvailable => "可用数量",
        }
    }

    /// Все поля в порядке вывода столбцов
    pub fn all() -> Vec<OutputField> {
        vec![
            OutputField::Status,
            OutputField::Description,
            OutputField::Manufacturer,
            OutputField::ProductUrl,
            OutputField::DatasheetUrl,
            OutputField::QuantityAvailable,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "status" => Some(OutputField::Status),
            "description" => Some(OutputField::Description),
            "manufacturer" => Some(OutputField::Manufacturer),
            "product_url" => Some(OutputField::ProductUrl),
            "datasheet_url" => Some(OutputField::DatasheetUrl),
            "quantity_available" => Some(OutputField::QuantityAvailable),
            _ => None,
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Набор выбранных полей (битовая маска).
///
/// В JSON представляется списком кодов: `["status", "manufacturer"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputFieldSet(u8);

impl OutputFieldSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        OutputField::all().into_iter().collect()
    }

    pub fn status_only() -> Self {
        Self::empty().with(OutputField::Status)
    }

    pub fn with(mut self, field: OutputField) -> Self {
        self.insert(field);
        self
    }

    pub fn insert(&mut self, field: OutputField) {
        self.0 |= field.bit();
    }

    pub fn remove(&mut self, field: OutputField) {
        self.0 &= !field.bit();
    }

    pub fn contains(&self, field: OutputField) -> bool {
        self.0 & field.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Выбранные поля в каноническом порядке
    pub fn fields(&self) -> Vec<OutputField> {
        OutputField::all()
            .into_iter()
            .filter(|f| self.contains(*f))
            .collect()
    }
}

impl FromIterator<OutputField> for OutputFieldSet {
    fn from_iter<I: IntoIterator<Item = OutputField>>(iter: I) -> Self {
        let mut set = OutputFieldSet::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

impl Serialize for OutputFieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputFieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<OutputField>::deserialize(deserializer)?;
        Ok(fields.into_iter().collect())
    }
}
