//! Side panels and status bar

use cv_core::{DeflectionType, LinearUnit};

use crate::config::SharedConfig;
use crate::state::{ImportStatus, SharedAppState};
use crate::viewport::SharedViewportState;

/// Render the status bar
pub fn render_status_bar(ctx: &egui::Context, app_state: &SharedAppState) {
    let state = app_state.lock();
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            match &state.status {
                ImportStatus::Loading { .. } => {
                    ui.spinner();
                    ui.label(state.status.message());
                }
                ImportStatus::Failed(_) => {
                    ui.colored_label(ui.visuals().error_fg_color, state.status.message());
                }
                _ => {
                    ui.label(state.status.message());
                }
            }

            if let Some(notice) = &state.notice {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, notice);
            }
        });
    });
}

/// Render the tessellation and view settings panel
pub fn render_settings_panel(
    ctx: &egui::Context,
    app_state: &SharedAppState,
    config: &SharedConfig,
    viewport_state: &Option<SharedViewportState>,
) {
    if !app_state.lock().show_settings {
        return;
    }

    egui::SidePanel::left("settings_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.heading("Tessellation");
            ui.label("Applied to the next import.");
            ui.add_space(4.0);

            let mut cfg = config.write();
            let params = &mut cfg.config_mut().tessellation;

            egui::Grid::new("tessellation_grid")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Unit");
                    egui::ComboBox::from_id_salt("linear_unit")
                        .selected_text(params.linear_unit.name())
                        .show_ui(ui, |ui| {
                            for unit in LinearUnit::ALL {
                                ui.selectable_value(&mut params.linear_unit, unit, unit.name());
                            }
                        });
                    ui.end_row();

                    ui.label("Deflection");
                    ui.vertical(|ui| {
                        for kind in [DeflectionType::BoundingBoxRatio, DeflectionType::AbsoluteValue]
                        {
                            ui.radio_value(&mut params.linear_deflection_type, kind, kind.name());
                        }
                    });
                    ui.end_row();

                    ui.label("Linear");
                    ui.add(
                        egui::DragValue::new(&mut params.linear_deflection)
                            .speed(0.0001)
                            .range(0.00001..=100.0)
                            .max_decimals(5),
                    );
                    ui.end_row();

                    ui.label("Angular (rad)");
                    ui.add(
                        egui::DragValue::new(&mut params.angular_deflection)
                            .speed(0.01)
                            .range(0.01..=std::f64::consts::PI)
                            .max_decimals(3),
                    );
                    ui.end_row();
                });

            ui.separator();
            ui.heading("View");

            let camera_cfg = &mut cfg.config_mut().renderer.camera;
            let fov_changed = ui
                .add(egui::Slider::new(&mut camera_cfg.fov_degrees, 10.0..=120.0).text("FOV"))
                .changed();
            if fov_changed && let Some(vp) = viewport_state {
                let renderer_cfg = cfg.config().renderer.clone();
                vp.lock().apply_config(&renderer_cfg);
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                ui.separator();
                ui.heading("Converter");
                ui.add(
                    egui::TextEdit::singleline(&mut cfg.config_mut().importer.command)
                        .hint_text("occt-import"),
                );
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Reset to Defaults").clicked() {
                    cfg.reset_to_defaults();
                    if let Some(vp) = viewport_state {
                        vp.lock().apply_config(&cfg.config().renderer);
                    }
                }

                #[cfg(not(target_arch = "wasm32"))]
                if ui.button("Save").clicked()
                    && let Err(e) = cfg.save()
                {
                    tracing::error!("Failed to save config: {}", e);
                    app_state.lock().notice = Some(format!("Failed to save config: {}", e));
                }
            });
        });
}

/// Render the JSON dump of the last kernel result
pub fn render_json_panel(ctx: &egui::Context, app_state: &SharedAppState) {
    let state = app_state.lock();
    if !state.show_json {
        return;
    }

    egui::SidePanel::right("json_panel")
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Import Result");
                if let Some(json) = &state.result_json
                    && ui.small_button("Copy").clicked()
                {
                    ui.ctx().copy_text(json.clone());
                }
            });
            ui.separator();

            match &state.result_json {
                Some(json) => {
                    egui::ScrollArea::both().show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut json.as_str())
                                .code_editor()
                                .desired_width(f32::INFINITY),
                        );
                    });
                }
                None => {
                    ui.weak("No result yet");
                }
            }
        });
}
