//! Main application entry point

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use eframe::egui::{self, Context};
use tracing::info;

use ruea_core::events::events::{DataLoaded, FallbackUsed, FiltersChanged, LoadFailed};
use ruea_core::{handler_from_fn, Event, EventBus};
use ruea_data::{DashboardConfig, HttpTransport, Loader, RueaApi, Transport};
use ruea_ui::{AppShell, StatusFeed, StatusKind, Theme};
use ruea_views::{GeneralView, StatsView, ViewerContext, Viewport};

mod demo;

const THEME_KEY: &str = "ruea_theme";
const LAYOUT_KEY: &str = "ruea_layout";

/// Where the data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backend {
    Server,
    Demo { rows: usize, with_stats: bool },
}

#[derive(Debug, Parser)]
#[command(
    name = "ruea-dashboard",
    version,
    about = "Tablero del Registro de Usuarios de Extensión Agropecuaria (RUEA)"
)]
struct Cli {
    /// Serve synthetic rows from memory instead of the API
    #[arg(long)]
    demo: bool,

    /// Leave the stats endpoint out of the demo server, so statistics are computed client-side
    #[arg(long, requires = "demo")]
    without_stats: bool,

    /// Rows generated for the demo server
    #[arg(long, value_name = "N", default_value_t = 2_500, requires = "demo")]
    demo_rows: usize,

    /// Origin of the API, overriding the configuration file
    #[arg(long = "api", value_name = "URL", conflicts_with = "demo")]
    api_base_url: Option<String>,
}

impl Cli {
    fn backend(&self) -> Backend {
        if self.demo {
            Backend::Demo {
                rows: self.demo_rows,
                with_stats: !self.without_stats,
            }
        } else {
            Backend::Server
        }
    }

    fn apply(&self, config: &mut DashboardConfig) {
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
    }
}

/// Main application state
struct RueaDashboardApp {
    shell: AppShell,
    viewport: Viewport,
    viewer_context: ViewerContext,
    status: StatusFeed,
    source_label: String,

    /// Runs every load; dropped with the app
    _runtime: tokio::runtime::Runtime,
}

impl RueaDashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, backend: Backend) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("ruea-loader")
            .build()?;

        let status = StatusFeed::default();
        let events = Arc::new(EventBus::new());
        subscribe_status(&events, &status);

        let egui_ctx = cc.egui_ctx.clone();
        let loader = Loader::new(runtime.handle().clone(), events).with_repaint(move || egui_ctx.request_repaint());

        let config = Arc::new(config);
        let (transport, http): (Arc<dyn Transport>, Option<Arc<HttpTransport>>) = match backend {
            Backend::Server => {
                let http = Arc::new(HttpTransport::new(config.api_base_url.clone(), config.request_timeout)?);
                (http.clone(), Some(http))
            }
            Backend::Demo { rows, with_stats } => (Arc::new(demo::demo_transport(rows, with_stats)), None),
        };
        let source_label = match &http {
            Some(http) => http.base_url().to_string(),
            None => format!("demo ({})", transport.source_name()),
        };
        info!("Data source: {}", source_label);

        let mut viewer_context = ViewerContext::new(RueaApi::new(transport), loader, config.clone());
        if let Some(http) = http {
            viewer_context = viewer_context.with_http(http);
        }

        let mut viewport = Viewport::new();
        viewport.add_space_view(Box::new(GeneralView::new(&config)));
        viewport.add_space_view(Box::new(StatsView::new(&config)));

        let mut theme = Theme::default();
        if let Some(storage) = cc.storage {
            if let Some(saved) = eframe::get_value::<Theme>(storage, THEME_KEY) {
                theme = saved;
            }
            if let Some(layout) = storage
                .get_string(LAYOUT_KEY)
                .and_then(|text| serde_json::from_str(&text).ok())
            {
                viewport.load_layout(&layout);
            }
        }

        Ok(Self {
            shell: AppShell::new(viewport.titles(), theme),
            viewport,
            viewer_context,
            status,
            source_label,
            _runtime: runtime,
        })
    }
}

/// Mirror load events into the status bar
fn subscribe_status(events: &EventBus, status: &StatusFeed) {
    let feed = status.clone();
    events.subscribe::<FiltersChanged>(handler_from_fn(move |event: &dyn Event| {
        feed.push(StatusKind::Info, event.describe())
    }));
    let feed = status.clone();
    events.subscribe::<DataLoaded>(handler_from_fn(move |event: &dyn Event| {
        feed.push(StatusKind::Info, event.describe())
    }));
    let feed = status.clone();
    events.subscribe::<FallbackUsed>(handler_from_fn(move |event: &dyn Event| {
        tracing::warn!("{}", event.describe());
        feed.push(StatusKind::Warning, event.describe())
    }));
    let feed = status.clone();
    events.subscribe::<LoadFailed>(handler_from_fn(move |event: &dyn Event| {
        tracing::error!("{}", event.describe());
        feed.push(StatusKind::Error, event.describe())
    }));
}

impl eframe::App for RueaDashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let viewport = &mut self.viewport;
        let viewer_context = &self.viewer_context;
        self.shell
            .show(ctx, &self.status, &self.source_label, |ui, active| viewport.ui(ui, viewer_context, active));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, THEME_KEY, &self.shell.theme);
        storage.set_string(LAYOUT_KEY, self.viewport.save_layout().to_string());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut config = DashboardConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;
    let backend = cli.backend();
    info!(?backend, api = %config.api_base_url, "Starting RUEA dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "RUEA - Registro de Usuarios de Extensión Agropecuaria",
        options,
        Box::new(move |cc| match RueaDashboardApp::new(cc, config, backend) {
            Ok(app) => Box::new(app) as Box<dyn eframe::App>,
            Err(e) => {
                tracing::error!("Failed to start dashboard: {:#}", e);
                Box::new(StartupError(e.to_string()))
            }
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}

/// Shown instead of the dashboard when it could not be built
struct StartupError(String);

impl eframe::App for StartupError {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("No se pudo iniciar el tablero");
            ruea_ui::error_banner(ui, &self.0);
        });
    }
}
