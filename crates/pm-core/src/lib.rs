//! Assembly Modeling Core
//!
//! This crate provides:
//! - Rigid transforms for placed components
//! - Assemblies owning copies of parts, with mates and joints
//! - An ordered mate pass with a pluggable step table
//! - Degree-of-freedom accounting and over/under-constraint checks
//! - Assembly configurations, component flags and interfaces
//! - Exploded-view offsets

pub mod assembly;
pub mod transform;

// Re-exports for convenience
pub use assembly::{
    Assembly, AssemblyComponent, AssemblyConfiguration, AssemblyError, ComponentId, Joint, JointKind, JointLimits,
    MateConstraint, MateContext, MateKind, MateSolver, MateStep,
};
pub use transform::Transform;

pub use pm_cad::{ModelerConfig, Part, PassReport};
