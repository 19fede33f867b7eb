use crate::foundation::error::{VizError, VizResult};
use crate::spec::model::{Animation, LayerKind, VisualizationSpec};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A non-fatal problem found in a spec.
///
/// Issues never stop rendering; the affected layer or track is skipped at draw time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecIssue {
    /// Index of the offending layer.
    pub layer: usize,
    /// Index of the offending animation, if the issue is track-specific.
    pub animation: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for SpecIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.animation {
            Some(a) => write!(f, "layers[{}].animations[{a}]: {}", self.layer, self.message),
            None => write!(f, "layers[{}]: {}", self.layer, self.message),
        }
    }
}

impl VisualizationSpec {
    /// Parse a spec from a JSON reader.
    #[tracing::instrument(skip(r))]
    pub fn from_reader<R: std::io::Read>(r: R) -> VizResult<Self> {
        let spec: Self = serde_json::from_reader(r)
            .map_err(|e| VizError::validation(format!("parse visualization spec JSON: {e}")))?;
        tracing::debug!(id = %spec.id, layers = spec.layers.len(), "parsed spec");
        Ok(spec)
    }

    /// Parse a spec from a JSON string.
    pub fn from_json_str(s: &str) -> VizResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a spec from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> VizResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VizError::validation(format!("open visualization spec '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize with every default filled in.
    pub fn to_json_string_pretty(&self) -> VizResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VizError::serde(e.to_string()))
    }

    /// Report problems that will cause layers or tracks to be skipped.
    pub fn validate(&self) -> Vec<SpecIssue> {
        let mut issues = Vec::new();
        for (li, layer) in self.layers.iter().enumerate() {
            if let LayerKind::Unknown(name) = &layer.kind {
                let message = if name.is_empty() {
                    "missing layer type".to_owned()
                } else {
                    format!("unknown layer type \"{name}\"")
                };
                issues.push(SpecIssue {
                    layer: li,
                    animation: None,
                    message,
                });
            }
            for (ai, anim) in layer.animations.iter().enumerate() {
                let message = match anim {
                    Animation::Unsupported { property, reason } => {
                        format!("{reason} (property \"{property}\")")
                    }
                    Animation::Linear(l) if l.end < l.start => format!(
                        "end {} precedes start {}; resolves immediately to {}",
                        l.end, l.start, l.to
                    ),
                    Animation::Linear(l) if !(l.from.is_finite() && l.to.is_finite()) => {
                        "non-finite from/to".to_owned()
                    }
                    _ => continue,
                };
                issues.push(SpecIssue {
                    layer: li,
                    animation: Some(ai),
                    message,
                });
            }
        }
        issues
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spec/load.rs"]
mod tests;
