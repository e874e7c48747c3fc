//! Main application module

mod panels;
mod toolbar;
mod viewport_panel;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::actions::{ActionContext, complete_import, dispatch_action};
use crate::config::{ConfigManager, SharedConfig, create_shared_config};
use crate::jobs::ImportSlot;
use crate::state::{AppAction, SharedAppState, create_shared_state};
use crate::viewport::{SharedViewportState, ViewportState};

pub use viewport_panel::ViewportPanel;

/// Main application
pub struct CadViewerApp {
    app_state: SharedAppState,
    config: SharedConfig,
    viewport_state: Option<SharedViewportState>,
    import_slot: ImportSlot,
    viewport_panel: ViewportPanel,
}

impl CadViewerApp {
    /// Create a new app
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = create_shared_config(ConfigManager::load_default());

        // Create viewport state if WGPU is available
        let viewport_state = cc.wgpu_render_state.as_ref().map(|render_state| {
            let device = render_state.device.clone();
            let queue = render_state.queue.clone();
            let format = render_state.target_format;
            let renderer_config = config.read().config().renderer.clone();

            Arc::new(Mutex::new(ViewportState::new(
                device,
                queue,
                format,
                &renderer_config,
            )))
        });

        if viewport_state.is_none() {
            tracing::warn!("WGPU not available, viewport disabled");
        }

        Self {
            app_state: create_shared_state(),
            config,
            viewport_state,
            import_slot: ImportSlot::new(),
            viewport_panel: ViewportPanel::new(),
        }
    }

    /// Queue dropped files; only the first one is imported
    fn handle_dropped_files(&self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let mut files = dropped.into_iter();
        let Some(file) = files.next() else {
            return;
        };
        if files.next().is_some() {
            tracing::info!("Several files dropped, importing the first");
        }

        let action = match (file.path, file.bytes) {
            (Some(path), _) => AppAction::OpenPath(path),
            (None, Some(bytes)) => AppAction::OpenBytes {
                name: file.name,
                data: bytes.to_vec(),
            },
            (None, None) => {
                tracing::warn!("Dropped file '{}' has neither path nor contents", file.name);
                return;
            }
        };
        self.app_state.lock().queue_action(action);
    }

    /// Process pending actions and finished jobs
    fn process_actions(&mut self, egui_ctx: &egui::Context) {
        let ctx = ActionContext {
            app_state: &self.app_state,
            config: &self.config,
            viewport_state: &self.viewport_state,
            import_slot: &self.import_slot,
            egui_ctx,
        };

        if let Some(finished) = self.import_slot.take() {
            complete_import(finished, &ctx);
        }

        let actions = self.app_state.lock().take_pending_actions();
        for action in actions {
            dispatch_action(action, &ctx);
        }
    }
}

impl eframe::App for CadViewerApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.process_actions(ctx);

        toolbar::render_toolbar(ctx, &self.app_state);
        panels::render_status_bar(ctx, &self.app_state);
        panels::render_settings_panel(ctx, &self.app_state, &self.config, &self.viewport_state);
        panels::render_json_panel(ctx, &self.app_state);

        let render_state = frame.wgpu_render_state();
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.viewport_panel.ui(
                    ui,
                    &self.app_state,
                    render_state,
                    &self.viewport_state,
                );
            });

        if self.app_state.lock().status.is_loading() {
            // Keep the spinner animating until the job reports back
            ctx.request_repaint();
        }
    }
}
