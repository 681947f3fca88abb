//! Assembly configurations
//!
//! An assembly configuration picks, per component, which configuration of
//! the placed part is used. Components it does not mention keep the
//! configuration their part copy has active. Arrangements are the same
//! records under another name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pm_cad::Part;

use super::{Assembly, AssemblyError, ComponentId};

/// A named assembly variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfiguration {
    pub name: String,
    /// Component id to configuration index in that component's part
    #[serde(default)]
    pub component_configurations: BTreeMap<ComponentId, usize>,
}

impl AssemblyConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component_configurations: BTreeMap::new(),
        }
    }

    /// Builder: select a part configuration for a component
    pub fn with_component_configuration(mut self, component: ComponentId, index: usize) -> Self {
        self.component_configurations.insert(component, index);
        self
    }
}

impl Assembly {
    /// Append a configuration and return its index
    pub fn add_configuration(&mut self, configuration: AssemblyConfiguration) -> usize {
        tracing::debug!(
            "Assembly '{}': added configuration '{}'",
            self.name,
            configuration.name
        );
        self.configurations.push(configuration);
        self.configurations.len() - 1
    }

    pub fn configurations(&self) -> &[AssemblyConfiguration] {
        &self.configurations
    }

    /// Append an arrangement; arrangements share the configuration list
    pub fn add_arrangement(&mut self, arrangement: AssemblyConfiguration) -> usize {
        self.add_configuration(arrangement)
    }

    pub fn arrangements(&self) -> &[AssemblyConfiguration] {
        &self.configurations
    }

    pub fn active_configuration_index(&self) -> Option<usize> {
        self.active_configuration
    }

    pub fn active_configuration(&self) -> Option<&AssemblyConfiguration> {
        self.active_configuration
            .and_then(|index| self.configurations.get(index))
    }

    /// Activate a configuration, or deactivate with `None`
    pub fn set_active_configuration(&mut self, index: Option<usize>) -> Result<(), AssemblyError> {
        if let Some(index) = index {
            if index >= self.configurations.len() {
                return Err(AssemblyError::ConfigurationOutOfRange {
                    index,
                    len: self.configurations.len(),
                });
            }
        }
        self.active_configuration = index;
        Ok(())
    }

    /// Part configuration index the component is evaluated with
    pub fn component_configuration(&self, id: ComponentId) -> Option<usize> {
        let component = self.find_component(id)?;
        self.active_configuration()
            .and_then(|c| c.component_configurations.get(&id).copied())
            .or_else(|| component.part.active_configuration_index())
    }

    /// Copy of the component's part with the active assembly configuration applied
    pub fn configured_part(&self, id: ComponentId) -> Result<Part, AssemblyError> {
        let component = self
            .find_component(id)
            .ok_or(AssemblyError::ComponentNotFound(id))?;
        let mut part = component.part.clone();

        let Some(configuration) = self.active_configuration() else {
            return Ok(part);
        };
        if let Some(&index) = configuration.component_configurations.get(&id) {
            let len = part.configurations().len();
            if index >= len {
                return Err(AssemblyError::PartConfigurationOutOfRange {
                    configuration: configuration.name.clone(),
                    component: id,
                    index,
                    len,
                });
            }
            part.set_active_configuration(Some(index))?;
        }
        Ok(part)
    }

    /// Parameter table of a component under the active assembly configuration
    pub fn component_parameters(&self, id: ComponentId) -> Result<BTreeMap<String, f64>, AssemblyError> {
        Ok(self.configured_part(id)?.effective_parameters())
    }

    /// Check that every configuration names existing components and part configurations
    pub fn validate_configurations(&self) -> Result<(), Vec<AssemblyError>> {
        let mut errors = Vec::new();

        for configuration in &self.configurations {
            for (&component, &index) in &configuration.component_configurations {
                let Some(placed) = self.find_component(component) else {
                    errors.push(AssemblyError::MissingComponent {
                        name: configuration.name.clone(),
                        component,
                    });
                    continue;
                };
                let len = placed.part.configurations().len();
                if index >= len {
                    errors.push(AssemblyError::PartConfigurationOutOfRange {
                        configuration: configuration.name.clone(),
                        component,
                        index,
                        len,
                    });
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
