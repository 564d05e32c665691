use chrono::{DateTime, NaiveDate, NaiveDateTime};
use contracts::dashboards::d402_sales_overview::SalesRecord;
use std::io::Read;
use thiserror::Error;

/// Loaded sales records. Read-only once built.
pub type RecordSet = Vec<SalesRecord>;

pub const COL_ORDER_DATE: &str = "data_venda";
pub const COL_ORDER_ID: &str = "id_pedido";
pub const COL_CITY: &str = "cidade";
pub const COL_CHANNEL: &str = "canal_venda";
pub const COL_CATEGORY: &str = "categoria_produto";
pub const COL_PRODUCT: &str = "produto";
pub const COL_TOTAL_VALUE: &str = "valor_total";

/// Required columns, in the order they are reported when missing
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_ORDER_DATE,
    COL_ORDER_ID,
    COL_CITY,
    COL_CHANNEL,
    COL_CATEGORY,
    COL_PRODUCT,
    COL_TOTAL_VALUE,
];

/// Ошибки загрузки CSV с продажами
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid date '{value}' in column data_venda at line {line}")]
    InvalidDate { line: u64, value: String },

    #[error("Invalid amount '{value}' in column valor_total at line {line}")]
    InvalidValue { line: u64, value: String },
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Positions of the required columns inside the header row
struct ColumnIndex {
    order_date: usize,
    order_id: usize,
    city: usize,
    channel: usize,
    category: usize,
    product: usize,
    total_value: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        // All present, checked above
        let at = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            order_date: at(COL_ORDER_DATE),
            order_id: at(COL_ORDER_ID),
            city: at(COL_CITY),
            channel: at(COL_CHANNEL),
            category: at(COL_CATEGORY),
            product: at(COL_PRODUCT),
            total_value: at(COL_TOTAL_VALUE),
        })
    }
}

/// Parse a delimited sales table with a header row.
///
/// The whole source is rejected on the first structural problem; there is
/// no per-row skipping.
pub fn load<R: Read>(mut source: R) -> Result<RecordSet, LoadError> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    load_bytes(&bytes)
}

pub fn load_bytes(bytes: &[u8]) -> Result<RecordSet, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Parse(format!("source is not valid UTF-8: {}", e)))?;
    // Strip UTF-8 BOM if present
    let text = text.trim_start_matches('\u{FEFF}');

    if text.trim().is_empty() {
        return Err(LoadError::Parse("source is empty, no header row".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize| row.get(i).unwrap_or_default();

        let raw_date = field(columns.order_date);
        let order_date = parse_order_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
            line,
            value: raw_date.to_string(),
        })?;

        let raw_value = field(columns.total_value);
        let total_value = parse_total_value(raw_value).ok_or_else(|| LoadError::InvalidValue {
            line,
            value: raw_value.to_string(),
        })?;

        records.push(SalesRecord {
            order_date,
            order_id: field(columns.order_id).to_string(),
            city: field(columns.city).to_string(),
            sales_channel: field(columns.channel).to_string(),
            product_category: field(columns.category).to_string(),
            product_name: field(columns.product).to_string(),
            total_value,
        });
    }

    tracing::info!("Loaded {} sales records", records.len());
    Ok(records)
}

/// ISO-8601 date, optionally with a time part that is dropped
fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Non-negative amount; "-0" is stored as +0
fn parse_total_value(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v + 0.0)
}
