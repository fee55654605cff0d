use crate::dates::is_iso_key;
use crate::errors::StoreError;
use crate::models::{AppData, Entry};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path};
use tokio::fs;
use tracing::{error, warn};

/// Reads the local data file. Any failure degrades to the default state.
pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) if value.is_object() => normalize_state(&value),
            Ok(_) => {
                error!("data file is not a JSON object, starting fresh");
                AppData::default()
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

pub fn normalize_state(value: &Value) -> AppData {
    AppData {
        goal: value.get("goal").and_then(coerce_number).unwrap_or(0),
        entries: value
            .get("entries")
            .map(normalize_entries)
            .unwrap_or_default(),
    }
}

/// Brings every stored entry to the `{count, notes}` shape. Bare numbers are
/// the legacy format. Entries with bad keys or unknown shapes are dropped.
pub fn normalize_entries(raw: &Value) -> BTreeMap<String, Entry> {
    let Some(map) = raw.as_object() else {
        return BTreeMap::new();
    };

    let mut entries = BTreeMap::new();
    for (date, value) in map {
        if !is_iso_key(date) {
            warn!(date = %date, "skipping entry with malformed date key");
            continue;
        }

        let entry = match value {
            Value::Number(_) => Entry {
                count: coerce_number(value).unwrap_or(0),
                notes: String::new(),
            },
            Value::Object(fields) if fields.contains_key("count") => Entry {
                count: fields.get("count").and_then(coerce_number).unwrap_or(0),
                notes: fields
                    .get("notes")
                    .and_then(Value::as_str)
                    .map(|notes| Entry::new(0, notes).notes)
                    .unwrap_or_default(),
            },
            other => {
                warn!(date = %date, value = %other, "skipping entry with unknown format");
                continue;
            }
        };
        entries.insert(date.clone(), entry);
    }
    entries
}

/// Numbers from stored JSON are coerced rather than rejected: negative or
/// non-finite values become 0 and fractions are floored.
pub fn coerce_number(value: &Value) -> Option<u32> {
    let number = value.as_f64()?;
    if !number.is_finite() || number <= 0.0 {
        return Some(0);
    }
    Some(number.floor().min(f64::from(u32::MAX)) as u32)
}
