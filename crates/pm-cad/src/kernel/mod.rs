//! Geometry Engine Seam
//!
//! Abstraction over the external engine that turns feature descriptions
//! into shapes.

mod traits;

pub use traits::{
    EngineError, FeatureRequest, GeometryEngine, NullEngine, RecordedCall, RecordingEngine,
    ShapeHandle,
};
