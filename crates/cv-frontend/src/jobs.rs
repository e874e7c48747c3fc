//! Background import jobs
//!
//! The scene lives on the UI thread. A job only reads the file and calls
//! the kernel; its outcome is parked in an [`ImportSlot`] which the app
//! polls once per frame.

use std::sync::Arc;

use cv_core::{ImportError, ImportResult, TessellationParams};
use parking_lot::Mutex;

/// Outcome of one finished job
#[derive(Debug)]
pub struct FinishedImport {
    /// File the job was started for
    pub file_name: String,
    /// Kernel result or the failure that stopped the pipeline
    pub outcome: Result<ImportResult, ImportError>,
}

/// Hand-off point between a job and the UI thread
#[derive(Clone, Default)]
pub struct ImportSlot(Arc<Mutex<Option<FinishedImport>>>);

impl ImportSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a finished job
    pub fn put(&self, finished: FinishedImport) {
        let previous = self.0.lock().replace(finished);
        if let Some(previous) = previous {
            tracing::warn!("Dropping unclaimed import of '{}'", previous.file_name);
        }
    }

    /// Claim the finished job, if any
    pub fn take(&self) -> Option<FinishedImport> {
        self.0.lock().take()
    }
}

/// Where the file bytes come from
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// A file on disk, read by the job
    #[cfg(not(target_arch = "wasm32"))]
    Path(std::path::PathBuf),
    /// Bytes already in memory
    Bytes(Vec<u8>),
}

/// Kernel settings captured when the job starts
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Tessellation parameters
    pub params: TessellationParams,
    /// Native converter program
    pub command: String,
    /// Native converter arguments
    pub args: Vec<String>,
    /// Base URL of the browser kernel's `.wasm` asset
    pub wasm_base_url: String,
}

#[cfg(not(target_arch = "wasm32"))]
fn read_source(file_name: &str, source: ImportSource) -> Result<Vec<u8>, ImportError> {
    match source {
        ImportSource::Path(path) => std::fs::read(&path).map_err(|e| ImportError::Read {
            name: file_name.to_string(),
            reason: e.to_string(),
        }),
        ImportSource::Bytes(data) => Ok(data),
    }
}

/// Run the import on a worker thread (native)
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_import(
    file_name: String,
    source: ImportSource,
    settings: ImportSettings,
    slot: ImportSlot,
    repaint: egui::Context,
) {
    std::thread::spawn(move || {
        let outcome = run_native_import(&file_name, source, &settings);
        slot.put(FinishedImport { file_name, outcome });
        repaint.request_repaint();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn run_native_import(
    file_name: &str,
    source: ImportSource,
    settings: &ImportSettings,
) -> Result<ImportResult, ImportError> {
    let data = read_source(file_name, source)?;
    tracing::debug!("Read {} bytes from '{}'", data.len(), file_name);

    let importer = cv_core::CommandImporter::new(settings.command.clone(), settings.args.clone());
    cv_core::import_bytes(&importer, file_name, &data, &settings.params)
}

/// Run the import as a local future (browser)
#[cfg(target_arch = "wasm32")]
pub fn spawn_import(
    file_name: String,
    source: ImportSource,
    settings: ImportSettings,
    slot: ImportSlot,
    repaint: egui::Context,
) {
    wasm_bindgen_futures::spawn_local(async move {
        let ImportSource::Bytes(data) = source;
        let outcome = match crate::importer_wasm::OcctJsImporter::shared(&settings.wasm_base_url)
            .await
        {
            Ok(importer) => cv_core::import_bytes(&importer, &file_name, &data, &settings.params),
            Err(e) => Err(ImportError::Failed(e.to_string())),
        };
        slot.put(FinishedImport { file_name, outcome });
        repaint.request_repaint();
    });
}
