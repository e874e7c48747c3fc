//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use cv_renderer::SceneSummary;
use parking_lot::Mutex;

/// Actions queued by the UI and handled once per frame
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Import a file from disk (native only)
    OpenPath(PathBuf),
    /// Import a file already read into memory
    OpenBytes { name: String, data: Vec<u8> },
    /// Frame the current model
    FitCamera,
    /// Return the camera to the default pose
    ResetCamera,
    /// Remove the current model
    ClearModel,
}

/// Where the current file is in the pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImportStatus {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Import outstanding
    Loading { file_name: String },
    /// Last import succeeded
    Loaded {
        file_name: String,
        mesh_count: usize,
        skipped: usize,
        triangle_count: usize,
    },
    /// Last import failed
    Failed(String),
}

impl ImportStatus {
    /// Whether an import is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, ImportStatus::Loading { .. })
    }

    /// One-line description for the status bar
    pub fn message(&self) -> String {
        match self {
            ImportStatus::Idle => "Drop a STEP, IGES or BREP file to view it".to_string(),
            ImportStatus::Loading { file_name } => format!("Loading {}...", file_name),
            ImportStatus::Loaded {
                file_name,
                mesh_count,
                skipped,
                triangle_count,
            } => {
                let mut line = format!(
                    "{}: {} meshes, {} triangles",
                    file_name, mesh_count, triangle_count
                );
                if *skipped > 0 {
                    line.push_str(&format!(", {} skipped", skipped));
                }
                line
            }
            ImportStatus::Failed(reason) => reason.clone(),
        }
    }
}

/// Application state
#[derive(Default)]
pub struct AppState {
    /// Pipeline status
    pub status: ImportStatus,
    /// Transient notice (e.g. a rejected import), cleared on the next import
    pub notice: Option<String>,
    /// Pretty-printed JSON of the last kernel result
    pub result_json: Option<String>,
    /// Show the JSON dump panel
    pub show_json: bool,
    /// Show the settings panel
    pub show_settings: bool,
    /// Pending actions
    pending_actions: Vec<AppAction>,
}

impl AppState {
    /// Create a new app state
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: AppAction) {
        self.pending_actions.push(action);
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// An import was started for `file_name`
    pub fn import_started(&mut self, file_name: &str) {
        self.status = ImportStatus::Loading {
            file_name: file_name.to_string(),
        };
        self.notice = None;
        self.result_json = None;
    }

    /// An import finished and the scene shows `summary`
    pub fn import_succeeded(&mut self, file_name: &str, summary: &SceneSummary) {
        self.status = ImportStatus::Loaded {
            file_name: file_name.to_string(),
            mesh_count: summary.mesh_count,
            skipped: summary.skipped.len(),
            triangle_count: summary.triangle_count,
        };
    }

    /// An import failed with a user-facing message
    pub fn import_failed(&mut self, message: impl Into<String>) {
        self.status = ImportStatus::Failed(message.into());
    }
}

pub type SharedAppState = Arc<Mutex<AppState>>;

/// Create a new shared app state
pub fn create_shared_state() -> SharedAppState {
    Arc::new(Mutex::new(AppState::new()))
}
