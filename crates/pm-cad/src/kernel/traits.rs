//! Geometry engine trait definitions
//!
//! The modeling core never builds solids itself. It hands each
//! participating feature, together with the sketches it reads and the
//! effective parameter table, to a geometry engine and keeps only the
//! opaque handle that comes back.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::feature::Feature;
use crate::sketch::Sketch;

/// Opaque handle to a shape owned by the geometry engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub Uuid);

impl ShapeHandle {
    /// Create a fresh random handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for geometry engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Geometry engine not available: {0}")]
    Unavailable(String),

    #[error("Invalid feature '{feature}': {reason}")]
    InvalidFeature { feature: String, reason: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Everything the engine needs to evaluate one feature
#[derive(Debug, Clone, Copy)]
pub struct FeatureRequest<'a> {
    /// Timeline position of the feature
    pub index: usize,
    /// The feature description
    pub feature: &'a Feature,
    /// Sketches the feature reads, primary first; missing ones are omitted
    pub sketches: &'a [&'a Sketch],
    /// User parameters shadowed by the active configuration
    pub parameters: &'a BTreeMap<String, f64>,
}

/// Interface of an external geometry engine
pub trait GeometryEngine: Send {
    /// Get the name of this engine
    fn name(&self) -> &str;

    /// Check if the engine is available
    fn is_available(&self) -> bool;

    /// Evaluate one feature and return a handle to the resulting shape
    fn evaluate(&mut self, request: &FeatureRequest<'_>) -> Result<ShapeHandle, EngineError>;
}

/// An engine that always reports it is unavailable
#[derive(Debug, Default)]
pub struct NullEngine;

impl GeometryEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn evaluate(&mut self, _request: &FeatureRequest<'_>) -> Result<ShapeHandle, EngineError> {
        Err(EngineError::Unavailable("No geometry engine available".into()))
    }
}

/// One call received by a [`RecordingEngine`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub index: usize,
    pub feature: String,
    pub sketches: Vec<String>,
    pub parameters: BTreeMap<String, f64>,
}

/// An engine that records what it was asked to evaluate
///
/// Useful for checking which features participate in a rebuild.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Vec<RecordedCall>,
    failing: HashSet<String>,
}

impl RecordingEngine {
    /// Create an engine that accepts every feature
    pub fn new() -> Self {
        Self::default()
    }

    /// Make evaluation of the named feature fail
    pub fn failing_on(mut self, feature: impl Into<String>) -> Self {
        self.failing.insert(feature.into());
        self
    }

    /// Every call received, in order
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Names of the features received, in order
    pub fn evaluated(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.feature.as_str()).collect()
    }

    /// Forget recorded calls
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl GeometryEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn evaluate(&mut self, request: &FeatureRequest<'_>) -> Result<ShapeHandle, EngineError> {
        self.calls.push(RecordedCall {
            index: request.index,
            feature: request.feature.name.clone(),
            sketches: request.sketches.iter().map(|s| s.name().to_string()).collect(),
            parameters: request.parameters.clone(),
        });

        if self.failing.contains(&request.feature.name) {
            return Err(EngineError::OperationFailed(format!(
                "{} rejected by recording engine",
                request.feature.name
            )));
        }
        Ok(ShapeHandle::new())
    }
}
