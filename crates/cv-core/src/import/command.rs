//! Native kernel bridge: an external converter process
//!
//! The converter is invoked as `<program> <args...> <format> <params-json>`,
//! receives the file bytes on stdin and prints an [`ImportResult`] as JSON on
//! stdout. A non-zero exit status is a kernel error carrying stderr.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use super::{CadFormat, CadImporter, ImportResult, ImporterError, TessellationParams};

/// Runs an external converter for every import
#[derive(Debug, Clone)]
pub struct CommandImporter {
    program: String,
    args: Vec<String>,
}

impl CommandImporter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn run(
        &self,
        format: CadFormat,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        let params_json =
            serde_json::to_string(params).map_err(|e| ImporterError::Kernel(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(format.tag())
            .arg(&params_json)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ImporterError::Unavailable(format!("{}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ImporterError::Kernel("converter stdin unavailable".into()))?;
        let payload = data.to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&payload));

        let output = child
            .wait_with_output()
            .map_err(|e| ImporterError::Kernel(e.to_string()))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // The converter may exit before draining stdin; its output decides.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("Converter closed stdin early");
            }
            Ok(Err(e)) => return Err(ImporterError::Kernel(e.to_string())),
            Err(_) => return Err(ImporterError::Kernel("stdin writer panicked".into())),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim();
            return Err(ImporterError::Kernel(if reason.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                reason.to_string()
            }));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ImporterError::Kernel(format!("invalid converter output: {}", e)))
    }
}

impl CadImporter for CommandImporter {
    fn read_step(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.run(CadFormat::Step, data, params)
    }

    fn read_iges(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.run(CadFormat::Iges, data, params)
    }

    fn read_brep(
        &self,
        data: &[u8],
        params: &TessellationParams,
    ) -> Result<ImportResult, ImporterError> {
        self.run(CadFormat::Brep, data, params)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandImporter {
        CommandImporter::new("sh", vec!["-c".into(), script.into(), "converter".into()])
    }

    #[test]
    fn test_reads_json_from_stdout() {
        let importer = shell(
            r#"cat > /dev/null; printf '{"success":true,"meshes":[{"attributes":{"position":{"array":[0,0,0,1,0,0,0,1,0]}},"index":{"array":[0,1,2]}}]}'"#,
        );
        let result = importer
            .read_step(b"ISO-10303-21;", &TessellationParams::default())
            .unwrap();
        assert!(result.success);
        assert_eq!(result.meshes.len(), 1);
    }

    #[test]
    fn test_passes_format_tag() {
        let importer =
            shell(r#"cat > /dev/null; printf '{"success":false,"error":"%s"}' "$1""#);
        let result = importer
            .read_iges(b"", &TessellationParams::default())
            .unwrap();
        assert_eq!(result.error.as_deref(), Some("iges"));
    }

    #[test]
    fn test_nonzero_exit_is_kernel_error() {
        let importer = shell("cat > /dev/null; echo 'cannot parse' >&2; exit 3");
        let err = importer
            .read_brep(b"garbage", &TessellationParams::default())
            .unwrap_err();
        assert!(matches!(err, ImporterError::Kernel(ref m) if m == "cannot parse"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let importer = CommandImporter::new("/nonexistent/occt-import", Vec::new());
        let err = importer
            .read_step(b"", &TessellationParams::default())
            .unwrap_err();
        assert!(matches!(err, ImporterError::Unavailable(_)));
    }
}
