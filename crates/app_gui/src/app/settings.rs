//! Settings panel for the prediction endpoint and request options.

use super::{Panel, UiApp};
use eframe::egui;
use tumor_core::{AppConfig, ClientConfig, MimePolicy, encoding::DEFAULT_MIME};

impl UiApp {
    /// Renders the settings screen; changes only apply after saving.
    pub(super) fn render_settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Prediction endpoint");
            ui.text_edit_singleline(&mut self.pending_endpoint);
        });
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            ui.label("Request timeout");
            ui.add(
                egui::DragValue::new(&mut self.pending_timeout_secs)
                    .range(1..=600)
                    .suffix(" s")
                    .speed(1),
            );
        });
        ui.add_space(12.0);
        ui.checkbox(
            &mut self.pending_detect_mime,
            "Declare the detected image type",
        );
        ui.label(format!(
            "When off, every upload is sent as {DEFAULT_MIME}. Only enable this if the prediction service accepts other types."
        ));

        ui.add_space(12.0);
        let editable = !self.session.is_in_flight();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(editable, egui::Button::new("Save"))
                .clicked()
            {
                self.apply_settings();
            }
            if ui.button("Revert").clicked() {
                self.reset_settings_form();
            }
        });

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(6.0);
        ui.label(format!("Configuration file: {}", self.config_path.display()));
        ui.label(format!("App version: {}", self.app_version));
    }

    fn pending_client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.pending_endpoint.trim().to_string(),
            timeout_secs: self.pending_timeout_secs,
            mime: if self.pending_detect_mime {
                MimePolicy::Detect
            } else {
                match &self.config.client.mime {
                    MimePolicy::Fixed(mime) => MimePolicy::Fixed(mime.clone()),
                    MimePolicy::Detect => MimePolicy::default(),
                }
            },
            ..self.config.client.clone()
        }
    }

    fn apply_settings(&mut self) {
        let edited = self.pending_client_config();
        if let Err(e) = edited.validate() {
            self.status = format!("Settings not saved: {e}");
            return;
        }
        let to_save = AppConfig {
            client: self
                .stored_config
                .client
                .merge_edits(&self.config.client, &edited),
        };
        self.config.client = edited;
        self.rebuild_client();
        if self.client.is_none() {
            return;
        }
        match to_save.save(&self.config_path) {
            Ok(()) => {
                self.stored_config = to_save;
                self.status = format!("Settings saved to {}", self.config_path.display());
                self.panel = Panel::Analyze;
            }
            Err(e) => {
                tracing::warn!("cannot save settings: {e:#}");
                self.status = format!("Settings applied but not saved: {e:#}");
            }
        }
    }

    fn reset_settings_form(&mut self) {
        self.pending_endpoint = self.config.client.endpoint.clone();
        self.pending_timeout_secs = self.config.client.timeout_secs;
        self.pending_detect_mime = matches!(self.config.client.mime, MimePolicy::Detect);
    }
}
