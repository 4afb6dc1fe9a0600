//! Image picker, preview and submit button.

use super::UiApp;
use eframe::egui;
use rfd::FileDialog;

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tif", "tiff"];

impl UiApp {
    pub(super) fn render_upload_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.heading("Upload MRI Image");
            ui.add_space(6.0);

            let picker_enabled = !self.session.is_in_flight();
            let picker_label = match self.session.selected_file_name() {
                Some(_) => "Click to change image",
                None => "Choose MRI image...",
            };
            if ui
                .add_enabled(picker_enabled, egui::Button::new(picker_label))
                .clicked()
                && let Some(path) = FileDialog::new()
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .set_directory(".")
                    .pick_file()
            {
                self.select_path(ctx, path);
            }

            match self.session.selected_file_name() {
                Some(name) => {
                    ui.label(
                        egui::RichText::new(name)
                            .strong()
                            .color(egui::Color32::from_rgb(22, 163, 74)),
                    );
                }
                None => {
                    ui.label("Drop your MRI image here");
                    ui.label(egui::RichText::new("or click to browse").small());
                }
            }

            match self.session.preview() {
                Some(Some(texture)) => {
                    ui.add_space(6.0);
                    ui.add(
                        egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                            .max_width(ui.available_width().min(320.0)),
                    );
                }
                Some(None) => {
                    ui.label(egui::RichText::new("Preview not available").italics());
                }
                None => {}
            }

            ui.add_space(8.0);
            let analyzing = self.session.is_in_flight();
            let clicked = ui
                .add_enabled(
                    self.can_submit(),
                    egui::Button::new(if analyzing {
                        "Analyzing..."
                    } else {
                        "Detect Tumor"
                    })
                    .min_size(egui::vec2(ui.available_width(), 32.0)),
                )
                .clicked();
            if analyzing {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Waiting for the prediction service");
                });
            }
            if clicked {
                self.submit();
            }
        });
    }
}
