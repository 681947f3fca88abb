//! Parametric Part Modeling Core
//!
//! This crate provides:
//! - Owner-scoped identifier generation
//! - 2D sketches with geometry, constraints and named parameters
//! - Single-operator parameter expressions and rule conditions
//! - A direct-assignment constraint pass with a pluggable step table
//! - Part feature timelines with suppression, rollback and reorder
//! - Configurations, rules and reference geometry
//! - The seam to an external geometry engine

pub mod config;
pub mod expression;
pub mod feature;
pub mod ids;
pub mod kernel;
pub mod part;
pub mod report;
pub mod sketch;

// Re-exports for convenience
pub use config::{ConfigError, ModelerConfig};
pub use expression::{
    EvaluationReport, ExpressionError, Parameter, ParameterFailure, SymbolTable,
    evaluate_condition, evaluate_expression, evaluate_parameters,
};
pub use feature::{BooleanOp, Feature, FeatureKind, FeatureParams};
pub use ids::IdGenerator;
pub use kernel::{
    EngineError, FeatureRequest, GeometryEngine, NullEngine, RecordingEngine, ShapeHandle,
};
pub use part::{
    BaseAxis, BasePlane, Configuration, CoordinateSystem, Part, PartError, RebuildReport, Rule,
    RuleReport, WorkAxis, WorkPlane, WorkPoint,
};
pub use report::PassReport;
pub use sketch::{
    Constraint, ConstraintKind, ConstraintSolver, GeometryEntity, GeometryKind, Point2D, Sketch,
    SketchError, StepContext,
};
