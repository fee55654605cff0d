use crate::dates::date_key;
use crate::models::AppData;
use chrono::NaiveDate;

pub const CSV_HEADER: &str = "Date,Drinks,Notes,Goal (At Time of Export)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
}

/// One row per logged day, oldest first. Notes are flattened so every row
/// keeps exactly four columns.
pub fn export_csv(data: &AppData, today: NaiveDate) -> CsvExport {
    let mut rows = vec![CSV_HEADER.to_string()];
    for (date, entry) in &data.entries {
        let notes = entry
            .notes
            .replace(',', ";")
            .replace(['\r', '\n'], " ");
        rows.push(format!("{date},{},{notes},{}", entry.count, data.goal));
    }

    CsvExport {
        filename: format!("consumption_history_{}.csv", date_key(today)),
        body: rows.join("\n"),
    }
}
