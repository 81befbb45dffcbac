//! Download of the filtered rows
//!
//! With a server the file is produced by the download endpoint and streamed
//! to disk. Without one (demo mode) the matching rows are scanned and written
//! locally as CSV.

use std::path::PathBuf;
use std::sync::Arc;

use egui::{RichText, Ui};

use ruea_core::{FilterSet, LoadSlot, SortSpec};
use ruea_data::{
    download_to_file, download_url, fetch_all, write_records_csv, DataError, ExportFormat, FetchLimits,
    HttpTransport, Loaded, ResolutionSource, RueaApi,
};
use ruea_ui::{icon_button, icons, theme};

use crate::tables::discover_columns;
use crate::ViewerContext;

/// Result of a finished export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOutcome {
    pub path: Option<PathBuf>,
    pub bytes: u64,
    /// Rows written by a local export; unknown for server downloads
    pub rows: usize,
}

struct ExportResult(Result<ExportOutcome, DataError>);

impl From<ExportResult> for Loaded<ExportOutcome> {
    fn from(result: ExportResult) -> Self {
        match result.0 {
            Ok(outcome) => Loaded {
                rows: outcome.rows,
                data: outcome,
                source: ResolutionSource::Server,
                reason: None,
                error: None,
            },
            Err(e) => Loaded {
                rows: 0,
                data: ExportOutcome::default(),
                source: ResolutionSource::Degraded,
                reason: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Everything an export needs, detached from the UI
#[derive(Clone)]
pub struct ExportJob {
    pub format: ExportFormat,
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub path: PathBuf,
}

impl ExportJob {
    /// Run the export: server download when `http` is set, local CSV otherwise
    pub async fn run(
        self,
        api: RueaApi,
        http: Option<Arc<HttpTransport>>,
        limits: FetchLimits,
    ) -> Result<ExportOutcome, DataError> {
        if let Some(http) = http {
            let url = download_url(http.base_url(), self.format, &self.filters, &self.sort)?;
            let bytes = download_to_file(http.client(), url, &self.path).await?;
            return Ok(ExportOutcome {
                path: Some(self.path),
                bytes,
                rows: 0,
            });
        }

        if self.format != ExportFormat::Csv {
            return Err(DataError::Config(format!(
                "{} export requires a server",
                self.format.filter_name()
            )));
        }

        let rows = fetch_all(&api, &self.filters, limits).await?;
        let columns = discover_columns(&rows);
        let path = self.path.clone();
        let written = tokio::task::spawn_blocking(move || write_records_csv(&rows, &columns, &path)).await??;
        let bytes = tokio::fs::metadata(&self.path).await?.len();

        Ok(ExportOutcome {
            path: Some(self.path),
            bytes,
            rows: written,
        })
    }
}

/// CSV and XLSX buttons with the status of the last export
pub struct ExportButtons {
    slot: Arc<LoadSlot<ExportOutcome>>,
}

impl Default for ExportButtons {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportButtons {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(LoadSlot::default()),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, ctx: &ViewerContext, filters: &FilterSet, sort: &SortSpec) {
        let state = self.slot.snapshot();

        ui.add_enabled_ui(!state.loading, |ui| {
            for format in [ExportFormat::Csv, ExportFormat::Xlsx] {
                let available = ctx.http.is_some() || format == ExportFormat::Csv;
                let tooltip = if available {
                    format!("Descargar {} con los filtros actuales", format.filter_name())
                } else {
                    "Disponible solo con servidor".to_string()
                };

                let clicked = ui
                    .add_enabled_ui(available, |ui| {
                        icon_button(ui, icons::DOWNLOAD, &format.extension().to_uppercase(), &tooltip)
                    })
                    .inner
                    .clicked();
                if clicked {
                    self.start(ctx, format, filters, sort);
                }
            }
        });

        if state.loading {
            ui.spinner();
        } else if let Some(error) = &state.error {
            ui.label(RichText::new(icons::WARNING).color(theme::error_color()))
                .on_hover_text(error);
        } else if let Some(path) = &state.data.path {
            ui.label(RichText::new(icons::SAVE).color(theme::success_color()))
                .on_hover_text(format!("Guardado en {}", path.display()));
        }
    }

    fn start(&self, ctx: &ViewerContext, format: ExportFormat, filters: &FilterSet, sort: &SortSpec) {
        let file_name = format.file_name(chrono::Local::now().date_naive());
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&file_name)
            .add_filter(format.filter_name(), &[format.extension()])
            .save_file()
        else {
            return;
        };

        tracing::info!(format = format.extension(), path = %path.display(), "Export requested");
        let job = ExportJob {
            format,
            filters: filters.clone(),
            sort: sort.clone(),
            path,
        };
        let api = ctx.api.clone();
        let http = ctx.http.clone();
        let limits = ctx.config.fetch_limits();

        ctx.loader.load("Exportación", &self.slot, async move {
            ExportResult(job.run(api, http, limits).await)
        });
    }
}
