use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub(crate) struct PropertyRow {
    pub id: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub property_type: String,
    #[serde(deserialize_with = "decimal_from_str")]
    pub total_leasable_area: Decimal,
    #[serde(default)]
    pub declared_unit_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnitRow {
    pub id: String,
    pub property_id: String,
    pub unit_number: String,
    #[serde(deserialize_with = "decimal_from_str")]
    pub total_area: Decimal,
    #[serde(deserialize_with = "decimal_from_str")]
    pub total_rent: Decimal,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantRow {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseRow {
    pub id: String,
    pub tenant_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(deserialize_with = "decimal_from_str")]
    pub total_rent_amount: Decimal,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseUnitRow {
    pub lease_id: String,
    pub unit_id: String,
}

/// Deserializes every row of a headered CSV, pairing each with its 1-based line number.
pub(crate) fn read_rows<T, R>(reader: R) -> Result<Vec<(usize, T)>, csv::Error>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<T>().enumerate() {
        // Line 1 is the header.
        rows.push((index + 2, record?));
    }
    Ok(rows)
}

fn decimal_from_str<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).map_err(serde::de::Error::custom)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept).
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}
