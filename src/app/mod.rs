//! App module - contains the main application state and logic

mod files;
mod views;

use crate::api::ApiClient;
use crate::converter::Converter;
use crate::settings::Settings;
use crate::theme;
use crate::tutor::Tutor;
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) converter: Converter,
    pub(crate) tutor: Tutor,
    pub(crate) view: View,
    // Last file open/save failure
    pub(crate) file_notice: Option<String>,
    pub(crate) api_base_url: String,
    // Settings
    pub(crate) settings: Settings,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let api_base_url = settings.api_base_url();
        let client = ApiClient::new(api_base_url.clone(), settings.request_timeout());
        info!(url = %api_base_url, timeout = ?settings.request_timeout(), "Backend configured");

        let ctx = cc.egui_ctx.clone();
        let repaint: Repaint = Arc::new(move || ctx.request_repaint());

        let mut converter = Converter::new(client.clone(), runtime.clone(), repaint.clone());
        let tutor = Tutor::new(client, runtime, repaint);

        // Probe the backend once on startup
        converter.check_backend_status();

        Self {
            converter,
            tutor,
            view: settings.last_view,
            file_notice: None,
            api_base_url,
            needs_center: settings.window_x.is_none() || settings.window_y.is_none(),
            settings,
            window_pos: None,
            window_size: None,
            data_dir,
        }
    }

    pub fn save_settings(&mut self) {
        if let Some(pos) = self.window_pos {
            self.settings.window_x = Some(pos.x);
            self.settings.window_y = Some(pos.y);
        }
        if let Some(size) = self.window_size {
            self.settings.window_w = Some(size.x);
            self.settings.window_h = Some(size.y);
        }
        self.settings.last_view = self.view;
        self.settings.save(&self.data_dir);
    }

    /// Applies results from finished background requests.
    pub(crate) fn poll_requests(&mut self) {
        self.converter.poll();
        self.tutor.poll();
    }

    /// Hands the displayed output to the tutor and switches to it.
    pub(crate) fn explain_output(&mut self) {
        let output = self.converter.state.output();
        if output.is_empty() || !self.tutor.state.load_input(output) {
            return;
        }
        self.view = View::Tutor;
        self.tutor.explain();
    }
}
