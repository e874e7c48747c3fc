//! Import result data model
//!
//! Mirrors the JSON emitted by the CAD kernel (`attributes.position.array`,
//! `index.array`, ...) so results deserialize directly and can be dumped back
//! out verbatim for inspection. Unknown fields such as the assembly tree or
//! B-rep face ranges are ignored.
//!
//! Sub-meshes are decoded one at a time. A record that does not fit the
//! model (a `null` coordinate, a string index, ...) is kept as a malformed
//! placeholder so its siblings still load.

use serde::{Deserialize, Serialize};

/// Output of one CAD import call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawImportResult")]
pub struct ImportResult {
    /// Whether the kernel managed to read the file
    pub success: bool,
    /// Kernel-provided reason when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Tessellated sub-parts, in kernel order
    #[serde(default)]
    pub meshes: Vec<MeshRecord>,
}

impl ImportResult {
    /// A successful result holding the given meshes
    pub fn succeeded(meshes: Vec<MeshRecord>) -> Self {
        Self {
            success: true,
            error: None,
            meshes,
        }
    }

    /// A failed result with a reason
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            meshes: Vec::new(),
        }
    }

    /// Parse a result from the kernel's JSON output
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON for the inspection panel
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unprintable: {e}>"))
    }
}

/// Wire shape of [`ImportResult`] before per-record decoding
#[derive(Deserialize)]
struct RawImportResult {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    meshes: Vec<serde_json::Value>,
}

impl From<RawImportResult> for ImportResult {
    fn from(raw: RawImportResult) -> Self {
        Self {
            success: raw.success,
            error: raw.error,
            meshes: raw
                .meshes
                .into_iter()
                .enumerate()
                .map(|(i, value)| MeshRecord::from_value(i, value))
                .collect(),
        }
    }
}

/// A flat typed buffer, serialized as `{ "array": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferAttribute<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub array: Option<Vec<T>>,
}

impl<T> BufferAttribute<T> {
    pub fn new(array: Vec<T>) -> Self {
        Self { array: Some(array) }
    }
}

/// Per-vertex attribute buffers of a sub-mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<BufferAttribute<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<BufferAttribute<f32>>,
}

/// One tessellated sub-part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    /// Identifier used in diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: MeshAttributes,
    /// Triangle vertex indices into `attributes.position`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BufferAttribute<u32>>,
    /// RGB channels, expected in `0..=255`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<f64>>,
    /// Decode error when the record did not match the wire format
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl MeshRecord {
    /// Record with positions and triangle indices
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            name: None,
            attributes: MeshAttributes {
                position: Some(BufferAttribute::new(positions)),
                normal: None,
            },
            index: Some(BufferAttribute::new(indices)),
            color: None,
            malformed: None,
        }
    }

    /// Decode one record, keeping a malformed placeholder on failure
    fn from_value(position: usize, value: serde_json::Value) -> Self {
        let name = value
            .get("name")
            .and_then(|n| n.as_str())
            .map(str::to_string);
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Mesh {} ({}) is malformed: {}",
                    position,
                    name.as_deref().unwrap_or("unnamed"),
                    e
                );
                Self {
                    name,
                    malformed: Some(e.to_string()),
                    ..Default::default()
                }
            }
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.attributes.normal = Some(BufferAttribute::new(normals));
        self
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color.map(f64::from).to_vec());
        self
    }

    /// Flat position buffer, if present
    pub fn positions(&self) -> Option<&[f32]> {
        self.attributes
            .position
            .as_ref()
            .and_then(|a| a.array.as_deref())
    }

    /// Flat normal buffer, if present
    pub fn normals(&self) -> Option<&[f32]> {
        self.attributes
            .normal
            .as_ref()
            .and_then(|a| a.array.as_deref())
    }

    /// Flat index buffer, if present
    pub fn indices(&self) -> Option<&[u32]> {
        self.index.as_ref().and_then(|a| a.array.as_deref())
    }
}
