//! User Parameters, Rules and Configurations
//!
//! User parameters use the same evaluator as sketch parameters. Rules
//! assign a parameter when a condition holds. A configuration is a named
//! set of overrides; the active one shadows user parameters during
//! evaluation without touching the stored values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Part, PartError};
use crate::config::DEFAULT_CONDITION_TOLERANCE;
use crate::expression::{
    EvaluationReport, Parameter, evaluate_condition, evaluate_expression, evaluate_parameters,
    symbol_table,
};

/// A named set of parameter overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub overrides: BTreeMap<String, f64>,
}

impl Configuration {
    /// Create a configuration without overrides
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: BTreeMap::new(),
        }
    }

    /// Add an override
    pub fn with_override(mut self, parameter: impl Into<String>, value: f64) -> Self {
        self.overrides.insert(parameter.into(), value);
        self
    }
}

/// Assign `then_parameter` when `condition` holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Caller-defined trigger label (evaluation is always explicit)
    #[serde(default)]
    pub trigger: String,
    /// `lhs OP rhs` with OP one of `>= <= == != > <`
    pub condition: String,
    pub then_parameter: String,
    /// Value expression; empty means 0
    #[serde(default)]
    pub then_expression: String,
}

impl Rule {
    /// Create a rule
    pub fn new(
        name: impl Into<String>,
        condition: impl Into<String>,
        then_parameter: impl Into<String>,
        then_expression: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: String::new(),
            condition: condition.into(),
            then_parameter: then_parameter.into(),
            then_expression: then_expression.into(),
        }
    }

    /// Set the trigger label
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }
}

/// Result of evaluating a part's rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleReport {
    /// Rules whose condition held and whose assignment was made
    pub fired: Vec<String>,
    /// Rules that could not be evaluated or applied
    pub failures: Vec<(String, PartError)>,
    /// Parameter re-evaluation, run when at least one rule fired
    pub parameters: Option<EvaluationReport>,
}

impl Part {
    // ============== User Parameters ==============

    /// Append a user parameter
    pub fn add_user_parameter(&mut self, parameter: Parameter) {
        self.user_parameters.push(parameter);
    }

    /// User parameters in declaration order
    pub fn user_parameters(&self) -> &[Parameter] {
        &self.user_parameters
    }

    /// Last user parameter declared with `name`
    pub fn find_parameter(&self, name: &str) -> Option<&Parameter> {
        self.user_parameters.iter().rev().find(|p| p.name == name)
    }

    fn find_parameter_mut(&mut self, name: &str) -> Result<&mut Parameter, PartError> {
        self.user_parameters
            .iter_mut()
            .rev()
            .find(|p| p.name == name)
            .ok_or_else(|| PartError::ParameterNotFound(name.to_string()))
    }

    /// Set the stored value of a user parameter
    pub fn set_parameter_value(&mut self, name: &str, value: f64) -> Result<(), PartError> {
        self.find_parameter_mut(name)?.value = value;
        Ok(())
    }

    /// Set (or clear, with an empty string) the driving expression of a user parameter
    pub fn set_parameter_expression(&mut self, name: &str, expression: &str) -> Result<(), PartError> {
        self.find_parameter_mut(name)?.expression = expression.to_string();
        Ok(())
    }

    /// Remove the last user parameter declared with `name`
    pub fn remove_parameter(&mut self, name: &str) -> Result<Parameter, PartError> {
        let index = self
            .user_parameters
            .iter()
            .rposition(|p| p.name == name)
            .ok_or_else(|| PartError::ParameterNotFound(name.to_string()))?;
        Ok(self.user_parameters.remove(index))
    }

    /// Evaluate driven user parameters in declaration order
    pub fn evaluate_parameters(&mut self) -> EvaluationReport {
        evaluate_parameters(&mut self.user_parameters)
    }

    // ============== Rules ==============

    /// Append a rule
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Remove a rule by name
    pub fn remove_rule(&mut self, name: &str) -> Option<Rule> {
        let index = self.rules.iter().position(|r| r.name == name)?;
        Some(self.rules.remove(index))
    }

    /// Evaluate rules with the default condition tolerance
    pub fn evaluate_rules(&mut self) -> RuleReport {
        self.evaluate_rules_with_tolerance(DEFAULT_CONDITION_TOLERANCE)
    }

    /// Evaluate rules in order
    ///
    /// Later rules see the assignments of earlier ones. Rules with an empty
    /// condition or target are ignored; a condition that cannot be evaluated
    /// is recorded as a failure and the rule does not fire. When any rule
    /// fired, user parameters are re-evaluated.
    pub fn evaluate_rules_with_tolerance(&mut self, tolerance: f64) -> RuleReport {
        let mut report = RuleReport::default();
        let mut symbols = symbol_table(self.user_parameters.iter());

        for rule in &self.rules {
            if rule.condition.trim().is_empty() || rule.then_parameter.is_empty() {
                continue;
            }

            match evaluate_condition(&rule.condition, &symbols, tolerance) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::debug!("Rule '{}': condition not evaluated: {}", rule.name, e);
                    report.failures.push((rule.name.clone(), e.into()));
                    continue;
                }
            }

            let expression = if rule.then_expression.trim().is_empty() {
                "0"
            } else {
                rule.then_expression.as_str()
            };
            let value = match evaluate_expression(expression, &symbols) {
                Ok(value) => value,
                Err(e) => {
                    report.failures.push((rule.name.clone(), e.into()));
                    continue;
                }
            };

            let Some(target) = self
                .user_parameters
                .iter_mut()
                .rev()
                .find(|p| p.name == rule.then_parameter)
            else {
                report.failures.push((
                    rule.name.clone(),
                    PartError::ParameterNotFound(rule.then_parameter.clone()),
                ));
                continue;
            };

            target.value = value;
            symbols.insert(rule.then_parameter.clone(), value);
            tracing::debug!("Rule '{}' set {} = {}", rule.name, rule.then_parameter, value);
            report.fired.push(rule.name.clone());
        }

        if !report.fired.is_empty() {
            report.parameters = Some(evaluate_parameters(&mut self.user_parameters));
        }
        report
    }

    // ============== Configurations ==============

    /// Append a configuration and return its index
    pub fn add_configuration(&mut self, configuration: Configuration) -> usize {
        self.configurations.push(configuration);
        self.configurations.len() - 1
    }

    /// Configurations in creation order
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    /// Edit a configuration's overrides
    pub fn configuration_mut(&mut self, index: usize) -> Option<&mut Configuration> {
        self.configurations.get_mut(index)
    }

    /// Index of the active configuration
    pub fn active_configuration_index(&self) -> Option<usize> {
        self.active_configuration
    }

    /// The active configuration
    pub fn active_configuration(&self) -> Option<&Configuration> {
        self.active_configuration
            .and_then(|index| self.configurations.get(index))
    }

    /// Activate a configuration, or deactivate with `None`
    pub fn set_active_configuration(&mut self, index: Option<usize>) -> Result<(), PartError> {
        if let Some(index) = index {
            if index >= self.configurations.len() {
                return Err(PartError::ConfigurationOutOfRange {
                    index,
                    len: self.configurations.len(),
                });
            }
        }
        self.active_configuration = index;
        Ok(())
    }

    /// Parameter table seen by feature evaluation
    ///
    /// Driven parameters are evaluated again on a copy of the user
    /// parameters, so the table never carries a stale derived value. With an
    /// active configuration its overrides first replace the matching
    /// parameters (dropping their expressions), and values derived from an
    /// overridden parameter follow it. Overrides for names that are not user
    /// parameters are included as well. Stored values are never touched.
    pub fn effective_parameters(&self) -> BTreeMap<String, f64> {
        let configuration = self.active_configuration();

        let mut shadow = self.user_parameters.clone();
        if let Some(configuration) = configuration {
            for parameter in shadow.iter_mut() {
                if let Some(value) = configuration.overrides.get(&parameter.name) {
                    parameter.value = *value;
                    parameter.expression.clear();
                }
            }
        }
        evaluate_parameters(&mut shadow);

        let mut table: BTreeMap<String, f64> =
            shadow.into_iter().map(|p| (p.name, p.value)).collect();
        if let Some(configuration) = configuration {
            for (name, value) in &configuration.overrides {
                table.insert(name.clone(), *value);
            }
        }
        table
    }
}
