//! Assembly graph
//!
//! An assembly places owned copies of parts as components and relates them
//! with mates and joints. Components are never removed, so component ids
//! stay valid for every mate and joint that names them.

mod configuration;
mod dof;
mod joint;
mod mate;
mod solver;

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use pm_cad::config::DEFAULT_DISTANCE_EPSILON;
use pm_cad::{IdGenerator, ModelerConfig, Part, PartError};

use crate::transform::Transform;

pub use configuration::AssemblyConfiguration;
pub use joint::{Joint, JointKind, JointLimits};
pub use mate::{MateConstraint, MateKind};
pub use solver::{MateContext, MateSolver, MateStep};

/// Component identifier, unique within an assembly
pub type ComponentId = u64;

/// A part placed in an assembly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyComponent {
    pub id: ComponentId,
    /// Owned copy of the part as it was when placed
    pub part: Part,
    pub transform: Transform,
    /// Shown with a simplified representation
    #[serde(default)]
    pub lightweight: bool,
    /// Subassembly whose members may still move internally
    #[serde(default)]
    pub flexible: bool,
    /// Named interfaces used to pair components automatically
    #[serde(default)]
    pub interfaces: Vec<String>,
}

/// Raw assembly data for (de)serialization (without the id index)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssemblyData {
    name: String,
    components: Vec<AssemblyComponent>,
    mates: Vec<MateConstraint>,
    #[serde(default)]
    joints: Vec<Joint>,
    mate_axis: DVec3,
    distance_epsilon: f64,
    #[serde(default)]
    explosion_offsets: BTreeMap<ComponentId, DVec3>,
    #[serde(default)]
    explosion_factor: f64,
    #[serde(default)]
    configurations: Vec<AssemblyConfiguration>,
    #[serde(default)]
    active_configuration: Option<usize>,
    component_ids: IdGenerator,
    mate_ids: IdGenerator,
    joint_ids: IdGenerator,
}

/// An assembly of placed parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AssemblyData", into = "AssemblyData")]
pub struct Assembly {
    pub name: String,
    components: Vec<AssemblyComponent>,
    /// Component id to index in `components`
    component_index: HashMap<ComponentId, usize>,
    mates: Vec<MateConstraint>,
    joints: Vec<Joint>,
    /// Unit axis used by axial mates
    mate_axis: DVec3,
    distance_epsilon: f64,
    explosion_offsets: BTreeMap<ComponentId, DVec3>,
    explosion_factor: f64,
    configurations: Vec<AssemblyConfiguration>,
    /// Index into `configurations`
    active_configuration: Option<usize>,
    component_ids: IdGenerator,
    mate_ids: IdGenerator,
    joint_ids: IdGenerator,
}

impl From<Assembly> for AssemblyData {
    fn from(assembly: Assembly) -> Self {
        Self {
            name: assembly.name,
            components: assembly.components,
            mates: assembly.mates,
            joints: assembly.joints,
            mate_axis: assembly.mate_axis,
            distance_epsilon: assembly.distance_epsilon,
            explosion_offsets: assembly.explosion_offsets,
            explosion_factor: assembly.explosion_factor,
            configurations: assembly.configurations,
            active_configuration: assembly.active_configuration,
            component_ids: assembly.component_ids,
            mate_ids: assembly.mate_ids,
            joint_ids: assembly.joint_ids,
        }
    }
}

impl From<AssemblyData> for Assembly {
    fn from(data: AssemblyData) -> Self {
        let mut assembly = Self {
            name: data.name,
            components: data.components,
            component_index: HashMap::new(),
            mates: data.mates,
            joints: data.joints,
            mate_axis: data.mate_axis.normalize_or(DVec3::X),
            distance_epsilon: if data.distance_epsilon.is_nan() || data.distance_epsilon < 0.0 {
                DEFAULT_DISTANCE_EPSILON
            } else {
                data.distance_epsilon
            },
            explosion_offsets: data.explosion_offsets,
            explosion_factor: if data.explosion_factor.is_nan() {
                0.0
            } else {
                data.explosion_factor.clamp(0.0, 1.0)
            },
            active_configuration: data
                .active_configuration
                .filter(|&index| index < data.configurations.len()),
            configurations: data.configurations,
            component_ids: data.component_ids,
            mate_ids: data.mate_ids,
            joint_ids: data.joint_ids,
        };
        for component in &assembly.components {
            assembly.component_ids.reserve(component.id);
        }
        assembly.rebuild_index();
        assembly
    }
}

impl Default for Assembly {
    fn default() -> Self {
        Self::new("Assembly")
    }
}

impl Assembly {
    /// Create a new empty assembly with default tolerances
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &ModelerConfig::default())
    }

    /// Create a new empty assembly using a modeler configuration
    pub fn with_config(name: impl Into<String>, config: &ModelerConfig) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            component_index: HashMap::new(),
            mates: Vec::new(),
            joints: Vec::new(),
            mate_axis: config.mate_axis.normalize_or(DVec3::X),
            distance_epsilon: config.distance_epsilon,
            explosion_offsets: BTreeMap::new(),
            explosion_factor: 0.0,
            configurations: Vec::new(),
            active_configuration: None,
            component_ids: IdGenerator::new(),
            mate_ids: IdGenerator::new(),
            joint_ids: IdGenerator::new(),
        }
    }

    /// Rebuild the id index (after deserialization)
    fn rebuild_index(&mut self) {
        self.component_index = self
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
    }

    // ============== Components ==============

    /// Place a copy of `part` and return the new component id
    ///
    /// Later edits to `part` do not affect the placed copy.
    pub fn add_component(&mut self, part: &Part, transform: Transform) -> ComponentId {
        let mut id = self.component_ids.next_number();
        while self.contains_component(id) {
            id = self.component_ids.next_number();
        }
        self.component_index.insert(id, self.components.len());
        self.components.push(AssemblyComponent {
            id,
            part: part.clone(),
            transform,
            lightweight: false,
            flexible: false,
            interfaces: Vec::new(),
        });
        tracing::debug!("Assembly '{}': placed '{}' as component {}", self.name, part.name, id);
        id
    }

    /// Components in placement order
    pub fn components(&self) -> &[AssemblyComponent] {
        &self.components
    }

    /// Find a component by id
    pub fn find_component(&self, id: ComponentId) -> Option<&AssemblyComponent> {
        self.component_index.get(&id).map(|&i| &self.components[i])
    }

    fn find_component_mut(&mut self, id: ComponentId) -> Result<&mut AssemblyComponent, AssemblyError> {
        self.component_index
            .get(&id)
            .map(|&i| &mut self.components[i])
            .ok_or(AssemblyError::ComponentNotFound(id))
    }

    /// Check if a component exists
    pub fn contains_component(&self, id: ComponentId) -> bool {
        self.component_index.contains_key(&id)
    }

    /// Set the transform of a component
    pub fn set_component_transform(&mut self, id: ComponentId, transform: Transform) -> Result<(), AssemblyError> {
        self.find_component_mut(id)?.transform = transform;
        Ok(())
    }

    /// Show a component with its simplified representation
    pub fn set_component_lightweight(&mut self, id: ComponentId, lightweight: bool) -> Result<(), AssemblyError> {
        self.find_component_mut(id)?.lightweight = lightweight;
        Ok(())
    }

    pub fn is_component_lightweight(&self, id: ComponentId) -> bool {
        self.find_component(id).is_some_and(|c| c.lightweight)
    }

    /// Mark a component as a flexible subassembly
    pub fn set_component_flexible(&mut self, id: ComponentId, flexible: bool) -> Result<(), AssemblyError> {
        self.find_component_mut(id)?.flexible = flexible;
        Ok(())
    }

    pub fn is_component_flexible(&self, id: ComponentId) -> bool {
        self.find_component(id).is_some_and(|c| c.flexible)
    }

    /// Attach a named interface to a component
    pub fn add_component_interface(&mut self, id: ComponentId, interface: impl Into<String>) -> Result<(), AssemblyError> {
        self.find_component_mut(id)?.interfaces.push(interface.into());
        Ok(())
    }

    /// Interfaces of a component in the order they were added (empty when unknown)
    pub fn component_interfaces(&self, id: ComponentId) -> &[String] {
        self.find_component(id)
            .map(|c| c.interfaces.as_slice())
            .unwrap_or_default()
    }

    /// Components offering an interface, in placement order
    pub fn components_with_interface(&self, interface: &str) -> Vec<ComponentId> {
        self.components
            .iter()
            .filter(|c| c.interfaces.iter().any(|i| i == interface))
            .map(|c| c.id)
            .collect()
    }

    pub(crate) fn component_position(&self, id: ComponentId) -> Option<usize> {
        self.component_index.get(&id).copied()
    }

    // ============== Mate Axis ==============

    /// Unit axis used by axial mates
    pub fn mate_axis(&self) -> DVec3 {
        self.mate_axis
    }

    /// Set the mate axis; it is stored normalized
    pub fn set_mate_axis(&mut self, axis: DVec3) -> Result<(), AssemblyError> {
        let axis = axis.normalize_or_zero();
        if axis == DVec3::ZERO {
            return Err(AssemblyError::DegenerateAxis);
        }
        self.mate_axis = axis;
        Ok(())
    }

    /// Distances at or below this are treated as zero by the mate pass
    pub fn distance_epsilon(&self) -> f64 {
        self.distance_epsilon
    }

    // ============== Exploded View ==============

    /// Set the explosion offset of a component
    pub fn set_explosion_offset(&mut self, id: ComponentId, offset: DVec3) -> Result<(), AssemblyError> {
        if !self.contains_component(id) {
            return Err(AssemblyError::ComponentNotFound(id));
        }
        self.explosion_offsets.insert(id, offset);
        Ok(())
    }

    /// Explosion offset of a component (zero when unset)
    pub fn explosion_offset(&self, id: ComponentId) -> DVec3 {
        self.explosion_offsets
            .get(&id)
            .copied()
            .unwrap_or(DVec3::ZERO)
    }

    /// Set how far the explosion is applied; clamped to [0, 1]
    pub fn set_explosion_factor(&mut self, factor: f64) {
        self.explosion_factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
    }

    pub fn explosion_factor(&self) -> f64 {
        self.explosion_factor
    }

    /// Remove every explosion offset
    pub fn clear_explosion_offsets(&mut self) {
        self.explosion_offsets.clear();
    }

    pub fn has_explosion_offsets(&self) -> bool {
        !self.explosion_offsets.is_empty()
    }

    /// Transform for display: the placement moved by offset × factor
    ///
    /// The stored placement is not changed, so mates and DOF are unaffected.
    pub fn display_transform(&self, id: ComponentId) -> Option<Transform> {
        let component = self.find_component(id)?;
        Some(
            component
                .transform
                .translated(self.explosion_offset(id) * self.explosion_factor),
        )
    }

    // ============== Validation ==============

    /// Validate mates, joints and configurations
    pub fn validate(&self) -> Result<(), Vec<AssemblyError>> {
        let mut errors = match self.validate_mates() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };
        if let Err(joint_errors) = self.validate_joints() {
            errors.extend(joint_errors);
        }
        if let Err(configuration_errors) = self.validate_configurations() {
            errors.extend(configuration_errors);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Assembly-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),
    #[error("Mate not found: {0}")]
    MateNotFound(String),
    #[error("Joint not found: {0}")]
    JointNotFound(String),
    #[error("'{name}' references missing component {component}")]
    MissingComponent { name: String, component: ComponentId },
    #[error("'{0}' relates a component to itself")]
    SelfReference(String),
    #[error("Mate axis must be a non-zero vector")]
    DegenerateAxis,
    #[error("Configuration {index} out of range ({len} configurations)")]
    ConfigurationOutOfRange { index: usize, len: usize },
    #[error("Configuration '{configuration}' selects part configuration {index} of component {component}, which has {len}")]
    PartConfigurationOutOfRange {
        configuration: String,
        component: ComponentId,
        index: usize,
        len: usize,
    },
    #[error("Part error: {0}")]
    Part(#[from] PartError),
}
