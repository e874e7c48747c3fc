//! CAD import invocation
//!
//! The kernel that parses STEP/IGES/BREP files lives outside this crate. It is
//! reached through the [`CadImporter`] trait; [`import_bytes`] picks the entry
//! point from the file extension and turns every kind of kernel failure into
//! an [`ImportError`].

#[cfg(not(target_arch = "wasm32"))]
mod command;
mod options;
mod result;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
pub use command::CommandImporter;
pub use options::{DeflectionType, LinearUnit, TessellationParams};
pub use result::{BufferAttribute, ImportResult, MeshAttributes, MeshRecord};

/// CAD file formats the kernel can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadFormat {
    Step,
    Iges,
    Brep,
}

impl CadFormat {
    /// Every accepted extension, lowercase
    pub const EXTENSIONS: [&'static str; 5] = ["step", "stp", "iges", "igs", "brep"];

    /// Detect format from a file name (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::from_path(Path::new(file_name))
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("step") | Some("stp") => Some(CadFormat::Step),
            Some("iges") | Some("igs") => Some(CadFormat::Iges),
            Some("brep") => Some(CadFormat::Brep),
            _ => None,
        }
    }

    /// Get format name
    pub fn name(&self) -> &'static str {
        match self {
            CadFormat::Step => "STEP",
            CadFormat::Iges => "IGES",
            CadFormat::Brep => "BREP",
        }
    }

    /// Lowercase tag passed to external kernels
    pub fn tag(&self) -> &'static str {
        match self {
            CadFormat::Step => "step",
            CadFormat::Iges => "iges",
            CadFormat::Brep => "brep",
        }
    }

    fn read<I: CadImporter + ?Sized>(
        self,
        importer: &I,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        match self {
            CadFormat::Step => importer.read_step(data, params),
            CadFormat::Iges => importer.read_iges(data, params),
            CadFormat::Brep => importer.read_brep(data, params),
        }
    }
}

/// An external CAD kernel with one reader per format
pub trait CadImporter {
    fn read_step(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError>;

    fn read_iges(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError>;

    fn read_brep(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError>;
}

/// Failures raised by a kernel implementation
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImporterError {
    #[error("CAD kernel unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Kernel(String),
}

/// Errors surfaced to the user by the import pipeline
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImportError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read '{name}': {reason}")]
    Read { name: String, reason: String },

    /// The kernel raised an error or panicked
    #[error("Import failed: {0}")]
    Failed(String),

    /// The kernel ran but reported `success = false`
    #[error("Import failed: {reason}")]
    Rejected {
        reason: String,
        result: Box<ImportResult>,
    },
}

impl ImportError {
    /// The kernel result behind the failure, if one was produced
    pub fn result(&self) -> Option<&ImportResult> {
        match self {
            ImportError::Rejected { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Run the kernel entry point matching `file_name`'s extension
///
/// Unsupported extensions fail before the kernel is touched. Kernel errors,
/// panics and unsuccessful results all come back as [`ImportError`].
pub fn import_bytes<I: CadImporter + ?Sized>(
    importer: &I,
    file_name: &str,
    data: &[u8],
    params: &TessellationParams,
) -> Result<ImportResult, ImportError> {
    let format = CadFormat::from_file_name(file_name)
        .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;

    tracing::info!(
        "Importing '{}' as {} ({} bytes)",
        file_name,
        format.name(),
        data.len()
    );

    let params = params.sanitized();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| format.read(importer, data, &params)));

    match outcome {
        Ok(Ok(result)) if result.success => {
            tracing::info!("Kernel returned {} meshes", result.meshes.len());
            Ok(result)
        }
        Ok(Ok(result)) => {
            let reason = result
                .error
                .clone()
                .unwrap_or_else(|| format!("{} reader reported failure", format.name()));
            Err(ImportError::Rejected {
                reason,
                result: Box::new(result),
            })
        }
        Ok(Err(e)) => Err(ImportError::Failed(e.to_string())),
        Err(payload) => Err(ImportError::Failed(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "CAD kernel panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records which entry point was hit
    #[derive(Default)]
    struct StubImporter {
        calls: RefCell<Vec<CadFormat>>,
        response: Option<ImportResult>,
        fail_with: Option<String>,
        panic_with: Option<&'static str>,
    }

    impl StubImporter {
        fn respond(&self, format: CadFormat) -> Result<ImportResult, ImporterError> {
            self.calls.borrow_mut().push(format);
            if let Some(msg) = self.panic_with {
                panic!("{}", msg);
            }
            if let Some(msg) = &self.fail_with {
                return Err(ImporterError::Kernel(msg.clone()));
            }
            Ok(self
                .response
                .clone()
                .unwrap_or_else(|| ImportResult::succeeded(Vec::new())))
        }
    }

    impl CadImporter for StubImporter {
        fn read_step(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.respond(CadFormat::Step)
        }

        fn read_iges(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.respond(CadFormat::Iges)
        }

        fn read_brep(
            &self,
            _data: &[u8],
            _params: &TessellationParams,
        ) -> Result<ImportResult, ImporterError> {
            self.respond(CadFormat::Brep)
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(CadFormat::from_file_name("a.step"), Some(CadFormat::Step));
        assert_eq!(CadFormat::from_file_name("a.STP"), Some(CadFormat::Step));
        assert_eq!(CadFormat::from_file_name("a.Iges"), Some(CadFormat::Iges));
        assert_eq!(CadFormat::from_file_name("a.igs"), Some(CadFormat::Iges));
        assert_eq!(CadFormat::from_file_name("dir/a.BREP"), Some(CadFormat::Brep));
        assert_eq!(CadFormat::from_file_name("a.stl"), None);
        assert_eq!(CadFormat::from_file_name("step"), None);
        assert_eq!(CadFormat::from_file_name(""), None);
    }

    #[test]
    fn test_dispatch_hits_matching_entry_point() {
        let cases = [
            ("part.step", CadFormat::Step),
            ("part.stp", CadFormat::Step),
            ("part.iges", CadFormat::Iges),
            ("part.IGS", CadFormat::Iges),
            ("part.brep", CadFormat::Brep),
        ];

        for (name, expected) in cases {
            let importer = StubImporter::default();
            import_bytes(&importer, name, b"data", &TessellationParams::default()).unwrap();
            assert_eq!(*importer.calls.borrow(), vec![expected], "file {}", name);
        }
    }

    #[test]
    fn test_unsupported_extension_never_calls_kernel() {
        for name in ["model.stl", "model.obj", "noextension", "model.step.txt"] {
            let importer = StubImporter::default();
            let err = import_bytes(&importer, name, b"data", &TessellationParams::default())
                .unwrap_err();
            assert!(matches!(err, ImportError::UnsupportedFormat(_)));
            assert!(err.to_string().starts_with("Unsupported file type"));
            assert!(importer.calls.borrow().is_empty());
        }
    }

    #[test]
    fn test_unsuccessful_result_is_rejected() {
        let importer = StubImporter {
            response: Some(ImportResult::failed("no shapes")),
            ..Default::default()
        };
        let err = import_bytes(&importer, "a.step", b"", &TessellationParams::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Import failed: no shapes");
        assert!(!err.result().unwrap().success);
    }

    #[test]
    fn test_unsuccessful_result_without_reason() {
        let importer = StubImporter {
            response: Some(ImportResult::default()),
            ..Default::default()
        };
        let err = import_bytes(&importer, "a.igs", b"", &TessellationParams::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Import failed: IGES reader reported failure");
    }

    #[test]
    fn test_kernel_error_is_surfaced() {
        let importer = StubImporter {
            fail_with: Some("out of memory".into()),
            ..Default::default()
        };
        let err = import_bytes(&importer, "a.brep", b"", &TessellationParams::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Failed(ref m) if m == "out of memory"));
    }

    #[test]
    fn test_kernel_panic_is_caught() {
        let importer = StubImporter {
            panic_with: Some("kernel exploded"),
            ..Default::default()
        };
        let err = import_bytes(&importer, "a.step", b"", &TessellationParams::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Failed(ref m) if m == "kernel exploded"));
    }
}
