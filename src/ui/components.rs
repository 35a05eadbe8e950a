//! Reusable UI components
//!
//! This module contains standalone UI components that can be used
//! throughout the application.

use crate::highlight;
use crate::theme;
use crate::types::BackendStatus;
use eframe::egui;

/// Text and color of the backend connectivity pill
pub fn backend_label(status: BackendStatus) -> (&'static str, egui::Color32) {
    match status {
        BackendStatus::Checking => ("Checking Backend...", theme::STATUS_WARNING),
        BackendStatus::Connected => ("Backend Connected", theme::STATUS_SUCCESS),
        BackendStatus::Error => ("Backend Not Connected", theme::STATUS_ERROR),
    }
}

/// Rounded status indicator with a colored dot
pub fn status_pill(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    egui::Frame::new()
        .fill(theme::BG_ELEVATED)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
        .corner_radius(12.0)
        .inner_margin(egui::Margin::symmetric(10, 4))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 4.0, color);
                ui.label(
                    egui::RichText::new(text)
                        .size(theme::FONT_SMALL + 1.0)
                        .color(theme::TEXT_SECONDARY),
                );
            });
        });
}

/// Inline error message box
pub fn error_banner(ui: &mut egui::Ui, message: &str) {
    egui::Frame::new()
        .fill(egui::Color32::from_rgba_unmultiplied(0xf8, 0x71, 0x71, 18))
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::STATUS_ERROR))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(12, 8))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!("{}  {}", egui_phosphor::regular::WARNING_CIRCLE, message))
                    .color(theme::STATUS_ERROR),
            );
        });
}

/// Centered hint shown where output will appear
pub fn placeholder(ui: &mut egui::Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(egui::RichText::new(text).color(theme::TEXT_DIM).italics());
    });
}

/// Read-only highlighted Clarity code with a line-number gutter
pub fn code_view(ui: &mut egui::Ui, id_salt: &str, code: &str) {
    theme::code_frame().show(ui, |ui| {
        egui::ScrollArea::both()
            .id_salt(id_salt)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    ui.spacing_mut().item_spacing.x = theme::SPACING_LG;
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(highlight::line_numbers(code))
                                .monospace()
                                .size(theme::FONT_CODE)
                                .color(theme::SYNTAX_GUTTER),
                        )
                        .selectable(false),
                    );
                    ui.add(
                        egui::Label::new(highlight::layout_job(code, theme::FONT_CODE))
                            .wrap_mode(egui::TextWrapMode::Extend),
                    );
                });
            });
    });
}
