mod results;
mod settings;
mod upload;

use eframe::{App, Frame, egui};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tumor_core::{AppConfig, HttpPredictionClient, PredictionTask, SelectedFile, Session};

/// Longest side of the preview texture.
const PREVIEW_MAX: u32 = 512;
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Release builds may stamp their own version; otherwise the crate version.
const APP_VERSION: &str = match option_env!("BRAINSCAN_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Analyze,
    Settings,
}

/// Preview texture; `None` when the bytes could not be decoded.
type Preview = Option<egui::TextureHandle>;

pub(crate) struct UiApp {
    session: Session<Preview>,
    task: Option<PredictionTask>,
    client: Option<Arc<HttpPredictionClient>>,
    /// What the config file holds; only user edits are merged into it.
    stored_config: AppConfig,
    /// Settings in use, including environment overrides.
    config: AppConfig,
    config_path: PathBuf,
    panel: Panel,
    status: String,
    app_version: &'static str,
    // Settings form, applied on save.
    pending_endpoint: String,
    pending_timeout_secs: u64,
    pending_detect_mime: bool,
}

impl UiApp {
    pub(crate) fn new(stored_config: AppConfig, config: AppConfig, config_path: PathBuf) -> Self {
        let mut app = Self {
            session: Session::new(),
            task: None,
            client: None,
            pending_endpoint: config.client.endpoint.clone(),
            pending_timeout_secs: config.client.timeout_secs,
            pending_detect_mime: matches!(config.client.mime, tumor_core::MimePolicy::Detect),
            stored_config,
            config,
            config_path,
            panel: Panel::Analyze,
            status: String::new(),
            app_version: APP_VERSION,
        };
        app.rebuild_client();
        app
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn rebuild_client(&mut self) {
        match HttpPredictionClient::new(&self.config.client) {
            Ok(client) => {
                tracing::info!("prediction endpoint: {}", client.endpoint());
                self.client = Some(Arc::new(client));
            }
            Err(e) => {
                tracing::warn!("cannot create prediction client: {e:#}");
                self.client = None;
                self.status = format!("Prediction service unavailable: {e:#}");
            }
        }
    }

    fn select(&mut self, ctx: &egui::Context, file: SelectedFile) {
        let accepted = self
            .session
            .select_file(file, |f| load_preview(ctx, &f.name, &f.bytes));
        if accepted {
            self.status.clear();
        }
    }

    fn select_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        match SelectedFile::from_path(&path) {
            Ok(file) => self.select(ctx, file),
            Err(e) => {
                tracing::warn!("{e:#}");
                self.status = format!("Could not open image: {e:#}");
            }
        }
    }

    fn can_submit(&self) -> bool {
        self.client.is_some() && self.session.can_submit()
    }

    fn submit(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        if let Some(submission) = self.session.begin_submission(&self.config.client.mime) {
            self.task = Some(PredictionTask::spawn(client, submission));
        }
    }

    fn poll_task(&mut self, ctx: &egui::Context) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        match task.try_finish() {
            Some((ticket, outcome)) => {
                self.session.finish_submission(ticket, outcome);
                self.task = None;
            }
            None => ctx.request_repaint_after(POLL_INTERVAL),
        }
    }

    fn take_dropped_file(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return;
        };
        if let Some(path) = file.path {
            self.select_path(ctx, path);
        } else if let Some(bytes) = file.bytes {
            self.select(ctx, SelectedFile::new(file.name, bytes.to_vec()));
        }
    }
}

fn load_preview(ctx: &egui::Context, name: &str, bytes: &[u8]) -> Preview {
    match image::load_from_memory(bytes) {
        Ok(img) => {
            let img = if img.width() > PREVIEW_MAX || img.height() > PREVIEW_MAX {
                img.thumbnail(PREVIEW_MAX, PREVIEW_MAX)
            } else {
                img
            };
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            Some(ctx.load_texture(
                format!("preview:{name}"),
                color,
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(e) => {
            tracing::warn!("no preview for {name}: {e}");
            None
        }
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_task(ctx);
        if !self.session.is_in_flight() {
            self.take_dropped_file(ctx);
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.panel, Panel::Analyze, "Analyze");
                ui.selectable_value(&mut self.panel, Panel::Settings, "Settings");
                ui.separator();
                ui.label(format!("Endpoint: {}", self.config.client.endpoint));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.panel {
                    Panel::Analyze => self.render_analyze_panel(ctx, ui),
                    Panel::Settings => self.render_settings_panel(ui),
                });
        });
    }
}

impl UiApp {
    fn render_analyze_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading(egui::RichText::new("Brain Tumor Detection").size(28.0).strong());
            ui.label(
                "Advanced AI-powered analysis for early detection and classification of brain tumors using MRI imaging",
            );
        });
        ui.add_space(16.0);
        ui.columns(2, |cols| {
            render_info_panel(&mut cols[0]);
            self.render_upload_panel(ctx, &mut cols[1]);
        });
        ui.add_space(16.0);
        if let Some(msg) = self.session.failure() {
            results::render_error(ui, msg.as_str());
        }
        if let Some(result) = self.session.result() {
            results::render_result(ui, &tumor_core::ResultView::from_result(result));
        }
    }
}

fn render_info_panel(ui: &mut egui::Ui) {
    ui.group(|ui| {
        ui.heading("About Brain Tumors");
        ui.add_space(6.0);
        for (title, text) in [
            (
                "Definition:",
                "Abnormal growths of cells in the brain, which can be benign or malignant",
            ),
            (
                "Causes:",
                "Genetic factors, radiation exposure, and inherited conditions",
            ),
            (
                "Importance:",
                "Early detection is crucial for effective treatment outcomes",
            ),
        ] {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(title).strong());
                ui.label(text);
            });
        }
        ui.add_space(8.0);
        ui.label(
            egui::RichText::new("Medical Disclaimer")
                .strong()
                .color(egui::Color32::from_rgb(146, 64, 14)),
        );
        ui.label(
            egui::RichText::new(
                "This tool is for educational purposes only. Always consult with healthcare professionals for medical diagnosis.",
            )
            .small(),
        );
    });
}
