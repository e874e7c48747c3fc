//! 3D viewport panel

use crate::state::SharedAppState;
use crate::viewport::SharedViewportState;

/// Pixels of scroll per zoom step
const SCROLL_PER_ZOOM_STEP: f32 = 50.0;

/// 3D viewport panel
#[derive(Default)]
pub struct ViewportPanel;

impl ViewportPanel {
    pub fn new() -> Self {
        Self
    }

    /// Draw the viewport and feed it camera input
    pub fn ui(
        &self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: Option<&egui_wgpu::RenderState>,
        viewport_state: &Option<SharedViewportState>,
    ) {
        let (Some(render_state), Some(viewport_state)) = (render_state, viewport_state) else {
            self.fallback_ui(ui);
            return;
        };

        let available_size = ui.available_size();
        let width = available_size.x as u32;
        let height = available_size.y as u32;
        if width == 0 || height == 0 {
            return;
        }

        // Ensure texture and render
        let texture_id = {
            let mut state = viewport_state.lock();
            let mut egui_renderer = render_state.renderer.write();
            let tex_id = state.ensure_texture(width, height, &mut egui_renderer);
            state.render();
            tex_id
        };

        let response = ui.add(
            egui::Image::new(egui::load::SizedTexture::new(
                texture_id,
                [available_size.x, available_size.y],
            ))
            .sense(egui::Sense::click_and_drag()),
        );

        self.handle_camera_input(ui, &response, viewport_state);
        paint_overlays(ui, &response, app_state);
    }

    fn handle_camera_input(
        &self,
        ui: &egui::Ui,
        response: &egui::Response,
        viewport_state: &SharedViewportState,
    ) {
        let delta = response.drag_delta();
        let mut state = viewport_state.lock();

        if response.dragged_by(egui::PointerButton::Primary) {
            state.adapter.orbit(delta.x, delta.y);
        } else if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            state.adapter.pan(delta.x, delta.y);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                state.adapter.zoom(scroll / SCROLL_PER_ZOOM_STEP);
            }
        }

        if response.double_clicked() {
            state.adapter.fit_camera();
        }
    }

    fn fallback_ui(&self, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, egui::Sense::hover());

        painter.rect_filled(response.rect, 0.0, egui::Color32::from_rgb(30, 30, 30));
        painter.text(
            response.rect.center(),
            egui::Align2::CENTER_CENTER,
            "3D Viewport\n(WebGPU not available)",
            egui::FontId::proportional(16.0),
            egui::Color32::GRAY,
        );
    }
}

/// Loading spinner, drop hint and empty-scene hint
fn paint_overlays(ui: &mut egui::Ui, response: &egui::Response, app_state: &SharedAppState) {
    let rect = response.rect;
    let painter = ui.painter_at(rect);

    let hovering_files = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    if hovering_files {
        painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(96));
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop to import",
            egui::FontId::proportional(22.0),
            egui::Color32::WHITE,
        );
        return;
    }

    let state = app_state.lock();
    if state.status.is_loading() {
        let spinner_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(48.0, 48.0));
        ui.put(spinner_rect, egui::Spinner::new().size(48.0));
    } else if state.status == Default::default() {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop a .step, .iges or .brep file here",
            egui::FontId::proportional(16.0),
            egui::Color32::DARK_GRAY,
        );
    }
}
