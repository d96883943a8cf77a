//! Spreadsheet export of the current list.

use chrono::Local;

use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::listing::view::ListView;
use crate::repository::Exporter;
use crate::services::listing::{ensure_access, request_descriptor};
use crate::services::{ServiceError, ServiceResult};

const BOM: &str = "\u{feff}";

/// File offered for download.
#[derive(Debug, PartialEq, Eq)]
pub struct CsvDownload {
    pub file_name: String,
    pub body: Vec<u8>,
}

/// Re-parses the backend payload, trims every cell, drops blank rows and
/// writes a spreadsheet-friendly CSV with a UTF-8 byte order mark.
pub fn reformat_csv(raw: &str) -> ServiceResult<Vec<u8>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.trim_start_matches(BOM).as_bytes());

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(BOM.as_bytes().to_vec());

    for record in reader.records() {
        let record = record?;
        let cells: Vec<&str> = record.iter().map(str::trim).collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        writer.write_record(&cells)?;
    }

    writer
        .into_inner()
        .map_err(|err| ServiceError::Export(err.to_string()))
}

/// Exports what the list currently shows: search and committed filters, no
/// paging.
pub async fn export_list<R>(
    repo: &R,
    session: &SessionContext,
    resource: Resource,
    view: &ListView,
) -> ServiceResult<CsvDownload>
where
    R: Exporter + ?Sized,
{
    ensure_access(session, resource)?;
    let endpoint = resource.export_endpoint().ok_or(ServiceError::NotFound)?;
    let params = request_descriptor(resource, &view.descriptor()).to_unpaged_params();

    let raw = repo
        .export_csv(session, endpoint, &params)
        .await
        .map_err(|err| {
            log::error!("Export of {resource} failed: {err}");
            ServiceError::from(err)
        })?;
    let body = reformat_csv(&raw)?;

    Ok(CsvDownload {
        file_name: format!(
            "{}-{}.csv",
            resource.slug(),
            Local::now().format("%Y-%m-%d")
        ),
        body,
    })
}
