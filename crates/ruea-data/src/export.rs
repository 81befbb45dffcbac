//! Bulk downloads and local CSV export

use std::path::Path;

use chrono::NaiveDate;
use reqwest::Url;
use tokio::io::AsyncWriteExt;

use ruea_core::record::raw_text;
use ruea_core::{FilterSet, QueryParams, Record, SortSpec};

use crate::sources::http_source::{endpoint_url, error_detail};
use crate::{DataError, RequestError};

/// Download format offered by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn filter_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }

    /// Suggested file name for a download made on `date`
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("ruea_{}.{}", date.format("%Y%m%d"), self.extension())
    }

    fn path(&self) -> String {
        format!("/ruea/download.{}", self.extension())
    }
}

/// URL of the server-side download for the current filters and order.
///
/// Carries no window: the file contains every matching row.
pub fn download_url(
    base_url: &str,
    format: ExportFormat,
    filters: &FilterSet,
    sort: &SortSpec,
) -> Result<Url, RequestError> {
    let mut params: QueryParams = filters.to_params();
    params.extend(&sort.to_params());
    endpoint_url(base_url, &format.path(), &params)
}

/// Stream the body at `url` into `path`, returning the bytes written.
///
/// A failed transfer removes the partial file.
pub async fn download_to_file(client: &reqwest::Client, url: Url, path: &Path) -> Result<u64, DataError> {
    tracing::info!("Downloading {} to {}", url, path.display());

    let response = client.get(url).send().await.map_err(RequestError::from)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Download failed");
        return Err(RequestError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        }
        .into());
    }

    match write_body(response, path).await {
        Ok(written) => {
            tracing::info!(bytes = written, "Download finished");
            Ok(written)
        }
        Err(e) => {
            if let Err(remove) = tokio::fs::remove_file(path).await {
                tracing::warn!("Could not remove partial download {}: {}", path.display(), remove);
            }
            Err(e)
        }
    }
}

async fn write_body(mut response: reqwest::Response, path: &Path) -> Result<u64, DataError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(RequestError::from)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// Write already-fetched rows as CSV.
///
/// `columns` selects and orders the output; when empty, the keys of the first
/// row are used. Returns the number of data rows written.
pub fn write_records_csv(rows: &[Record], columns: &[String], path: &Path) -> Result<usize, DataError> {
    let columns: Vec<String> = if columns.is_empty() {
        rows.first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        columns.to_vec()
    };

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;

    for row in rows {
        writer.write_record(columns.iter().map(|column| raw_text(row, column)))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}
