//! Action handlers
//!
//! Runs queued [`AppAction`]s against the viewport and starts or completes
//! import jobs. Everything here executes on the UI thread.

use cv_core::{CadFormat, ImportError};
use cv_renderer::ViewerError;

use crate::config::SharedConfig;
use crate::jobs::{self, FinishedImport, ImportSettings, ImportSlot, ImportSource};
use crate::state::{AppAction, SharedAppState};
use crate::viewport::SharedViewportState;

/// Shared context for action handlers
pub struct ActionContext<'a> {
    pub app_state: &'a SharedAppState,
    pub config: &'a SharedConfig,
    pub viewport_state: &'a Option<SharedViewportState>,
    pub import_slot: &'a ImportSlot,
    pub egui_ctx: &'a egui::Context,
}

/// Dispatch an action to the appropriate handler
pub fn dispatch_action(action: AppAction, ctx: &ActionContext) {
    match action {
        #[cfg(not(target_arch = "wasm32"))]
        AppAction::OpenPath(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            start_import(name, ImportSource::Path(path), ctx);
        }
        #[cfg(target_arch = "wasm32")]
        AppAction::OpenPath(path) => {
            tracing::warn!("Cannot open {} in the browser", path.display());
        }
        AppAction::OpenBytes { name, data } => {
            start_import(name, ImportSource::Bytes(data), ctx);
        }
        AppAction::FitCamera => {
            if let Some(vp) = ctx.viewport_state {
                vp.lock().adapter.fit_camera();
            }
        }
        AppAction::ResetCamera => {
            if let Some(vp) = ctx.viewport_state {
                vp.lock().adapter.reset_camera();
            }
        }
        AppAction::ClearModel => {
            if let Some(vp) = ctx.viewport_state {
                let mut vp = vp.lock();
                if vp.adapter.is_busy() {
                    ctx.app_state.lock().notice = Some(ViewerError::Busy.to_string());
                    return;
                }
                vp.adapter.clear_model();
                vp.adapter.reset_camera();
            }
            let mut state = ctx.app_state.lock();
            state.status = Default::default();
            state.result_json = None;
        }
    }
}

/// Claim the scene for `name` and start the import job
fn start_import(name: String, source: ImportSource, ctx: &ActionContext) {
    if CadFormat::from_file_name(&name).is_none() {
        let err = ImportError::UnsupportedFormat(name);
        tracing::warn!("{}", err);
        ctx.app_state.lock().import_failed(err.to_string());
        return;
    }

    let Some(vp) = ctx.viewport_state else {
        ctx.app_state
            .lock()
            .import_failed("3D viewport unavailable (WebGPU not supported)");
        return;
    };

    match vp.lock().adapter.begin_import() {
        Ok(()) => {}
        Err(ViewerError::Busy) => {
            ctx.app_state.lock().notice = Some(ViewerError::Busy.to_string());
            return;
        }
        Err(e) => {
            ctx.app_state.lock().import_failed(e.to_string());
            return;
        }
    }

    ctx.app_state.lock().import_started(&name);

    let settings = {
        let cfg = ctx.config.read();
        let cfg = cfg.config();
        ImportSettings {
            params: cfg.tessellation,
            command: cfg.importer.command.clone(),
            args: cfg.importer.args.clone(),
            wasm_base_url: cfg.web.wasm_base_url.clone(),
        }
    };

    jobs::spawn_import(
        name,
        source,
        settings,
        ctx.import_slot.clone(),
        ctx.egui_ctx.clone(),
    );
}

/// Hand a finished job to the scene
pub fn complete_import(finished: FinishedImport, ctx: &ActionContext) {
    let FinishedImport { file_name, outcome } = finished;

    let Some(vp) = ctx.viewport_state else {
        return;
    };
    let mut vp = vp.lock();
    let result = vp.adapter.finish_import(outcome);
    let json = vp.adapter.last_result().map(|r| r.to_pretty_json());
    drop(vp);

    let mut state = ctx.app_state.lock();
    state.result_json = json;
    match result {
        Ok(summary) => state.import_succeeded(&file_name, &summary),
        Err(e) => state.import_failed(e.to_string()),
    }
}
