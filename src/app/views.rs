//! View rendering (header, converter, tutor)

use super::App;
use crate::theme;
use crate::types::*;
use crate::ui::components::{backend_label, code_view, error_banner, placeholder, status_pill};
use eframe::egui;
use egui_extras::{Size, StripBuilder};
use egui_phosphor::regular as icons;
use std::time::Instant;

impl App {
    // ========================================================================
    // HEADER & FOOTER
    // ========================================================================

    pub(crate) fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .exact_height(theme::HEADER_HEIGHT)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new("Solidity to Clarity Code Converter")
                                .size(theme::FONT_TITLE)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        );
                        ui.label(
                            egui::RichText::new("Convert your Solidity NFT smart contracts to Clarity language")
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_MUTED),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let tabs = [
                            (View::Tutor, icons::GRADUATION_CAP, "AI Tutor"),
                            (View::Converter, icons::CODE, "Converter"),
                        ];
                        for (view, icon, label) in tabs {
                            let text = egui::RichText::new(format!("{}  {}", icon, label)).size(theme::FONT_BODY);
                            if ui.selectable_label(self.view == view, text).clicked() {
                                self.view = view;
                            }
                        }
                    });
                });
            });
    }

    pub(crate) fn render_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(16, 6)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Powered by Groq AI")
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(&self.api_base_url)
                                .size(theme::FONT_SMALL)
                                .monospace()
                                .color(theme::TEXT_DIM),
                        );
                    });
                });
            });
    }

    // ========================================================================
    // CONVERTER
    // ========================================================================

    pub(crate) fn render_converter(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let input_id = ui.make_persistent_id("solidity_input");

        // Ctrl+Enter in the source box submits, before the editor eats the newline
        if ui.memory(|m| m.has_focus(input_id))
            && ui.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter))
        {
            self.converter.convert();
        }

        // Status bar
        ui.horizontal(|ui| {
            let (text, color) = backend_label(self.converter.state.backend());
            status_pill(ui, text, color);
            let (text, color) = match self.converter.state.convert_phase() {
                ConvertPhase::Loading => ("Processing...", theme::STATUS_WARNING),
                _ if self.converter.state.error_message().is_some() => ("Error", theme::STATUS_ERROR),
                _ => ("Ready", theme::STATUS_SUCCESS),
            };
            status_pill(ui, text, color);
        });
        ui.add_space(theme::SPACING_MD);

        if let Some(notice) = self.file_notice.clone() {
            error_banner(ui, &notice);
            ui.add_space(theme::SPACING_MD);
        }

        // Source and output side by side
        let panel_height = (ui.available_height() - 150.0).max(theme::CODE_PANEL_MIN_HEIGHT);
        ui.allocate_ui(egui::vec2(ui.available_width(), panel_height), |ui| {
            StripBuilder::new(ui)
                .sizes(Size::remainder(), 2)
                .horizontal(|mut strip| {
                    strip.cell(|ui| self.render_source_panel(ui, input_id));
                    strip.cell(|ui| self.render_output_panel(ui, ctx));
                });
        });

        ui.add_space(theme::SPACING_LG);
        self.render_versions(ui);

        if let Some(message) = self.converter.state.error_message() {
            let message = message.to_string();
            ui.add_space(theme::SPACING_MD);
            error_banner(ui, &message);
        }

        ui.add_space(theme::SPACING_LG);
        let label = if self.converter.state.is_loading() {
            "Converting..."
        } else {
            "Convert to Clarity"
        };
        let button = theme::button_accent(label).min_size(egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE));
        if ui.add_enabled(self.converter.state.can_convert(), button).clicked() {
            self.converter.convert();
        }
    }

    fn render_source_panel(&mut self, ui: &mut egui::Ui, input_id: egui::Id) {
        theme::section_frame().show(ui, |ui| {
            ui.set_min_size(ui.available_size());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Solidity Code").size(theme::FONT_HEADING).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let open = theme::button(format!("{}  Open", icons::FOLDER_OPEN));
                    if ui.add_enabled(!self.converter.state.is_loading(), open).clicked() {
                        self.open_solidity_file();
                    }
                });
            });
            ui.add_space(theme::SPACING_SM);

            egui::ScrollArea::vertical()
                .id_salt("solidity_scroll")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_enabled(
                        !self.converter.state.is_loading(),
                        egui::TextEdit::multiline(&mut self.converter.state.input)
                            .id(input_id)
                            .code_editor()
                            .hint_text("Paste your Solidity NFT smart contract code here...")
                            .desired_width(f32::INFINITY)
                            .desired_rows(20),
                    );
                });
        });
    }

    fn render_output_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut explain = false;

        theme::section_frame().show(ui, |ui| {
            ui.set_min_size(ui.available_size());
            let has_output = !self.converter.state.output().is_empty();

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Clarity Code").size(theme::FONT_HEADING).strong());
                if !has_output {
                    return;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let copy_label = if self.converter.state.is_copied(Instant::now()) {
                        format!("{}  Copied!", icons::CHECK)
                    } else {
                        format!("{}  Copy", icons::COPY)
                    };
                    if ui.add(theme::button(copy_label)).on_hover_text("Copy to clipboard").clicked() {
                        if let Some(text) = self.converter.copy_to_clipboard(Instant::now()) {
                            ctx.copy_text(text);
                        }
                    }

                    let deploying = self.converter.state.is_deploying();
                    let deploy_label = if deploying {
                        format!("{}  Deploying...", icons::ROCKET_LAUNCH)
                    } else {
                        format!("{}  Deploy", icons::ROCKET_LAUNCH)
                    };
                    if ui
                        .add_enabled(!deploying, theme::button_deploy(deploy_label))
                        .on_hover_text("Deploy to Stacks (mock)")
                        .clicked()
                    {
                        self.converter.deploy();
                    }

                    if ui.add(theme::button(format!("{}  Save", icons::FLOPPY_DISK))).clicked() {
                        self.save_clarity_file();
                    }
                    if ui
                        .add(theme::button(format!("{}  Explain", icons::LIGHTBULB)))
                        .on_hover_text("Open in the AI tutor")
                        .clicked()
                    {
                        explain = true;
                    }
                });
            });
            ui.add_space(theme::SPACING_SM);

            if !has_output {
                placeholder(ui, "Converted Clarity code will appear here");
                return;
            }

            if let Some(receipt) = self.converter.state.receipt() {
                let response = ui.label(
                    egui::RichText::new(format!("{}  Deployed: {}", icons::CHECK_CIRCLE, receipt.contract_id))
                        .color(theme::STATUS_SUCCESS),
                );
                if !receipt.extra.is_empty() {
                    let details = receipt
                        .extra
                        .iter()
                        .map(|(key, value)| format!("{}: {}", key, value))
                        .collect::<Vec<_>>()
                        .join("\n");
                    response.on_hover_text(details);
                }
                ui.add_space(theme::SPACING_SM);
            }

            code_view(ui, "clarity_output", self.converter.state.output());
        });

        if explain {
            self.explain_output();
        }
    }

    fn render_versions(&mut self, ui: &mut egui::Ui) {
        let history = self.converter.state.history();
        if history.is_empty() {
            return;
        }

        let labels: Vec<String> = history.iter().map(|r| r.label()).collect();
        let selected = history.selected();
        let mut restore = None;

        ui.label(
            egui::RichText::new(format!("{}  Versions", icons::CLOCK_COUNTER_CLOCKWISE))
                .size(theme::FONT_BODY)
                .color(theme::TEXT_SECONDARY),
        );
        ui.horizontal_wrapped(|ui| {
            for (idx, label) in labels.into_iter().enumerate() {
                if ui.add(theme::version_chip(label, selected == Some(idx))).clicked() {
                    restore = Some(idx);
                }
            }
        });

        if let Some(idx) = restore {
            self.converter.restore_version(idx);
        }
    }

    // ========================================================================
    // TUTOR
    // ========================================================================

    pub(crate) fn render_tutor(&mut self, ui: &mut egui::Ui) {
        ui.label(egui::RichText::new("AI Tutor").size(theme::FONT_TITLE).strong());
        ui.label(
            egui::RichText::new("Paste Clarity code to get an explanation and guidance.")
                .color(theme::TEXT_MUTED),
        );
        ui.add_space(theme::SPACING_MD);

        theme::section_frame().show(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("tutor_input_scroll")
                .max_height(240.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.tutor.state.input)
                            .code_editor()
                            .hint_text("Paste Clarity code here...")
                            .desired_width(f32::INFINITY)
                            .desired_rows(10),
                    );
                });
        });
        ui.add_space(theme::SPACING_MD);

        let label = if self.tutor.state.is_loading() {
            "Explaining..."
        } else {
            "Explain Code"
        };
        let button = theme::button_accent(label).min_size(egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE));
        if ui.add_enabled(self.tutor.state.can_explain(), button).clicked() {
            self.tutor.explain();
        }

        if let Some(message) = self.tutor.state.error_message() {
            let message = message.to_string();
            ui.add_space(theme::SPACING_MD);
            error_banner(ui, &message);
        }

        if let Some(explanation) = self.tutor.state.explanation() {
            ui.add_space(theme::SPACING_MD);
            theme::section_frame().show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("tutor_explanation")
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(explanation)
                                    .size(theme::FONT_BODY)
                                    .color(theme::TEXT_SECONDARY),
                            )
                            .selectable(true),
                        );
                    });
            });
        }
    }
}
