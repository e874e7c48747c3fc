//! Top toolbar

use cv_core::CadFormat;

use crate::state::{AppAction, SharedAppState};

/// Render the toolbar
pub fn render_toolbar(ctx: &egui::Context, app_state: &SharedAppState) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            open_button(ui, app_state);

            ui.separator();

            if ui.button("Fit").on_hover_text("Frame the model").clicked() {
                app_state.lock().queue_action(AppAction::FitCamera);
            }
            if ui
                .button("Reset")
                .on_hover_text("Return to the default view")
                .clicked()
            {
                app_state.lock().queue_action(AppAction::ResetCamera);
            }
            if ui.button("Clear").clicked() {
                app_state.lock().queue_action(AppAction::ClearModel);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut state = app_state.lock();
                ui.toggle_value(&mut state.show_json, "JSON");
                ui.toggle_value(&mut state.show_settings, "Settings");
            });
        });
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn open_button(ui: &mut egui::Ui, app_state: &SharedAppState) {
    if ui.button("Open...").clicked()
        && let Some(path) = rfd::FileDialog::new()
            .add_filter("CAD files", &CadFormat::EXTENSIONS)
            .add_filter("All files", &["*"])
            .pick_file()
    {
        app_state.lock().queue_action(AppAction::OpenPath(path));
    }
}

#[cfg(target_arch = "wasm32")]
fn open_button(ui: &mut egui::Ui, app_state: &SharedAppState) {
    if ui.button("Open...").clicked() {
        let app_state = app_state.clone();
        let repaint = ui.ctx().clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("CAD files", &CadFormat::EXTENSIONS)
                .pick_file()
                .await
            {
                let name = file.file_name();
                let data = file.read().await;
                app_state
                    .lock()
                    .queue_action(AppAction::OpenBytes { name, data });
                repaint.request_repaint();
            }
        });
    }
}
