//! Plain comma-separated import/export of pools and winner history.
//!
//! Fields are never quoted: names containing commas do not survive a round trip.

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use thiserror::Error;
use tracing::debug;

use crate::state::entrant::{Entrant, SourceTag, WinnerRecord};

/// Header written by [`export_pool`].
pub const POOL_HEADER: [&str; 4] = ["name", "city", "flag", "externalId"];
/// Header written by [`export_winners`].
pub const WINNERS_HEADER: [&str; 3] = ["name", "city", "flag"];

/// Minimum number of fields a data row needs (`name,city,flag`).
const MIN_FIELDS: usize = 3;

/// Failure while rendering CSV output.
#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("failed to write csv record")]
    Write(#[from] csv::Error),
    #[error("failed to flush csv output")]
    Flush(#[from] std::io::Error),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Parse `name,city,flag[,externalId]` rows. The first line is a header and is skipped.
///
/// Rows with fewer than three fields or an empty name are dropped.
pub fn parse_entrants(text: &str) -> Vec<Entrant> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut entrants = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                debug!(row = index + 1, error = %err, "skipping unreadable csv row");
                continue;
            }
        };

        if record.len() < MIN_FIELDS {
            debug!(row = index + 1, fields = record.len(), "skipping malformed csv row");
            continue;
        }

        let name = &record[0];
        if name.trim().is_empty() {
            debug!(row = index + 1, "skipping csv row without a name");
            continue;
        }

        let mut entrant = Entrant::new(name, &record[1]);
        entrant.source = SourceTag::from_flag(&record[2]);
        if let Some(id) = record.get(3).filter(|id| !id.is_empty()) {
            entrant = entrant.with_external_id(id);
        }
        entrants.push(entrant);
    }
    entrants
}

/// Render a pool as `name,city,flag,externalId`. An empty pool yields the header only.
pub fn export_pool(entries: &[Entrant]) -> Result<String, CsvExportError> {
    let mut writer = writer();
    writer.write_record(POOL_HEADER)?;
    for entrant in entries {
        writer.write_record([
            entrant.name.as_str(),
            entrant.city.as_str(),
            entrant.source.as_flag(),
            entrant.external_id.as_deref().unwrap_or_default(),
        ])?;
    }
    finish(writer)
}

/// Render the winner history as `name,city,flag`.
pub fn export_winners(history: &[WinnerRecord]) -> Result<String, CsvExportError> {
    let mut writer = writer();
    writer.write_record(WINNERS_HEADER)?;
    for record in history {
        let entrant = &record.entrant;
        writer.write_record([
            entrant.name.as_str(),
            entrant.city.as_str(),
            entrant.source.as_flag(),
        ])?;
    }
    finish(writer)
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .flexible(true)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CsvExportError> {
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
