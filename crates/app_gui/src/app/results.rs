//! Error box and results card.

use eframe::egui::{self, Color32, RichText};
use tumor_core::{ConfidenceTier, ResultView};

const BAR_WIDTH: f32 = 160.0;

pub(crate) fn tier_color(tier: ConfidenceTier) -> Color32 {
    match tier {
        ConfidenceTier::High => Color32::from_rgb(22, 163, 74),
        ConfidenceTier::Medium => Color32::from_rgb(202, 138, 4),
        ConfidenceTier::Low => Color32::from_rgb(220, 38, 38),
    }
}

pub(super) fn render_error(ui: &mut egui::Ui, message: &str) {
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(254, 242, 242))
        .show(ui, |ui| {
            ui.label(RichText::new("Error").strong().color(Color32::from_rgb(153, 27, 27)));
            ui.label(RichText::new(message).color(Color32::from_rgb(185, 28, 28)));
        });
}

pub(super) fn render_result(ui: &mut egui::Ui, view: &ResultView) {
    ui.group(|ui| {
        ui.heading("Analysis Results");
        ui.add_space(6.0);
        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.label(RichText::new("DETECTED TUMOR TYPE").small());
            ui.label(RichText::new(&view.label).size(24.0).strong());
            ui.add_space(8.0);

            let color = tier_color(view.tier);
            ui.label(RichText::new("CONFIDENCE LEVEL").small());
            ui.horizontal(|ui| {
                ui.add(
                    egui::ProgressBar::new(view.confidence)
                        .desired_width(BAR_WIDTH)
                        .fill(color),
                );
                ui.label(RichText::new(&view.confidence_text).strong().color(color));
            });
            ui.label(RichText::new(view.tier.label()).color(color));

            let ui = &mut cols[1];
            ui.label(RichText::new("ALL CLASSIFICATIONS").small());
            egui::Grid::new("probabilities")
                .num_columns(3)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    for row in &view.rows {
                        ui.label(&row.display_name);
                        ui.add(egui::ProgressBar::new(row.fraction).desired_width(BAR_WIDTH / 2.0));
                        ui.label(RichText::new(&row.percent).small());
                        ui.end_row();
                    }
                });
        });
    });
}
