//! Parameter Expressions
//!
//! Named scalar parameters may be driven by a formula. The formula
//! language is deliberately small: after whitespace is stripped an
//! expression is either a single operand or exactly one binary operator
//! between two operands. Operands are symbol names or floating-point
//! literals.
//!
//! The split operator is chosen by priority, not by position: the first
//! `+` wins if there is one, otherwise the first `-`, then `*`, then `/`.
//! A leading minus therefore always splits (`-5` has an empty left
//! operand and fails), as does the minus of an exponent (`1e-3`).
//!
//! Rule conditions use the same operand resolution around a single
//! comparison operator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Symbol table mapping parameter names to values
pub type SymbolTable = HashMap<String, f64>;

/// A named scalar, optionally driven by an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name used to reference this parameter from expressions
    pub name: String,
    /// Current value (last successfully evaluated value if driven)
    pub value: f64,
    /// Driving expression; empty for a plain value
    #[serde(default)]
    pub expression: String,
}

impl Parameter {
    /// Create a plain-valued parameter
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            expression: String::new(),
        }
    }

    /// Create a parameter driven by an expression
    pub fn with_expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            expression: expression.into(),
        }
    }

    /// Whether the value comes from an expression
    pub fn is_driven(&self) -> bool {
        !self.expression.trim().is_empty()
    }
}

/// Errors raised while resolving a single expression or condition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("Empty expression")]
    Empty,
    #[error("Cannot resolve operand '{0}'")]
    UnresolvedOperand(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("No comparison operator in condition '{0}'")]
    MissingComparison(String),
}

/// A parameter that failed to resolve during a batch evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFailure {
    /// Position in the evaluated list
    pub index: usize,
    /// Parameter name
    pub name: String,
    /// Why it failed
    pub error: ExpressionError,
}

/// Result of evaluating a list of parameters in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    /// Number of driven parameters that resolved
    pub resolved: usize,
    /// Parameters that kept their previous value
    pub failures: Vec<ParameterFailure>,
}

impl EvaluationReport {
    /// True when every driven parameter resolved
    pub fn all_resolved(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed parameters, in evaluation order
    pub fn failures(&self) -> &[ParameterFailure] {
        &self.failures
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: EvaluationReport) {
        self.resolved += other.resolved;
        self.failures.extend(other.failures);
    }
}

// ============== Arithmetic ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Split priority order
    const PRIORITY: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ExpressionError> {
        match self {
            Operator::Add => Ok(lhs + rhs),
            Operator::Subtract => Ok(lhs - rhs),
            Operator::Multiply => Ok(lhs * rhs),
            Operator::Divide if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
            Operator::Divide => Ok(lhs / rhs),
        }
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn resolve_operand(operand: &str, symbols: &SymbolTable) -> Result<f64, ExpressionError> {
    if let Some(value) = symbols.get(operand) {
        return Ok(*value);
    }
    operand
        .parse::<f64>()
        .map_err(|_| ExpressionError::UnresolvedOperand(operand.to_string()))
}

/// Evaluate one expression against a symbol table
pub fn evaluate_expression(expression: &str, symbols: &SymbolTable) -> Result<f64, ExpressionError> {
    let trimmed = strip_whitespace(expression);
    if trimmed.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let split = Operator::PRIORITY
        .into_iter()
        .find_map(|op| trimmed.find(op.symbol()).map(|pos| (pos, op)));

    match split {
        None => resolve_operand(&trimmed, symbols),
        Some((pos, op)) => {
            let lhs = resolve_operand(&trimmed[..pos], symbols)?;
            let rhs = resolve_operand(&trimmed[pos + 1..], symbols)?;
            op.apply(lhs, rhs)
        }
    }
}

/// Build a symbol table from parameters; a later duplicate name wins
pub fn symbol_table<'a>(parameters: impl IntoIterator<Item = &'a Parameter>) -> SymbolTable {
    parameters
        .into_iter()
        .map(|p| (p.name.clone(), p.value))
        .collect()
}

/// Evaluate driven parameters in declaration order
///
/// The symbol table is seeded with every parameter's current value and
/// updated as each driven parameter resolves, so a parameter sees the
/// fresh values of those declared before it. A failing parameter keeps its
/// previous value and evaluation continues.
pub fn evaluate_parameters(parameters: &mut [Parameter]) -> EvaluationReport {
    let mut symbols = symbol_table(parameters.iter());
    evaluate_parameters_with(parameters, &mut symbols)
}

/// Evaluate driven parameters against a caller-seeded symbol table
pub fn evaluate_parameters_with(
    parameters: &mut [Parameter],
    symbols: &mut SymbolTable,
) -> EvaluationReport {
    let mut report = EvaluationReport::default();

    for (index, parameter) in parameters.iter_mut().enumerate() {
        if !parameter.is_driven() {
            continue;
        }
        match evaluate_expression(&parameter.expression, symbols) {
            Ok(value) => {
                parameter.value = value;
                symbols.insert(parameter.name.clone(), value);
                report.resolved += 1;
            }
            Err(error) => {
                tracing::debug!(
                    "Parameter '{}' = '{}' did not resolve: {}",
                    parameter.name,
                    parameter.expression,
                    error
                );
                report.failures.push(ParameterFailure {
                    index,
                    name: parameter.name.clone(),
                    error,
                });
            }
        }
    }

    report
}

// ============== Conditions ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
    Greater,
    Less,
}

/// Two-character tokens come first so that they win a tie at the same position
const COMPARISONS: [(&str, Comparison); 6] = [
    (">=", Comparison::GreaterEqual),
    ("<=", Comparison::LessEqual),
    ("==", Comparison::Equal),
    ("!=", Comparison::NotEqual),
    (">", Comparison::Greater),
    ("<", Comparison::Less),
];

impl Comparison {
    fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Comparison::GreaterEqual => lhs >= rhs,
            Comparison::LessEqual => lhs <= rhs,
            Comparison::Equal => (lhs - rhs).abs() < tolerance,
            Comparison::NotEqual => (lhs - rhs).abs() >= tolerance,
            Comparison::Greater => lhs > rhs,
            Comparison::Less => lhs < rhs,
        }
    }
}

/// Evaluate `lhs <cmp> rhs` where both sides are single-operator expressions
///
/// The comparison operator is the earliest one in the text.
pub fn evaluate_condition(
    condition: &str,
    symbols: &SymbolTable,
    tolerance: f64,
) -> Result<bool, ExpressionError> {
    let trimmed = strip_whitespace(condition);
    if trimmed.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut best: Option<(usize, &str, Comparison)> = None;
    for (token, comparison) in COMPARISONS {
        if let Some(pos) = trimmed.find(token) {
            if best.is_none_or(|(current, _, _)| pos < current) {
                best = Some((pos, token, comparison));
            }
        }
    }

    let Some((pos, token, comparison)) = best else {
        return Err(ExpressionError::MissingComparison(trimmed));
    };

    let lhs = evaluate_expression(&trimmed[..pos], symbols)?;
    let rhs = evaluate_expression(&trimmed[pos + token.len()..], symbols)?;
    Ok(comparison.holds(lhs, rhs, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn symbols(pairs: &[(&str, f64)]) -> SymbolTable {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_single_operand() {
        let table = symbols(&[("W", 4.0)]);
        assert_eq!(evaluate_expression("W", &table), Ok(4.0));
        assert_eq!(evaluate_expression(" 2.5 ", &table), Ok(2.5));
    }

    #[test]
    fn test_binary_operators() {
        let table = symbols(&[("W", 4.0), ("H", 10.0)]);
        assert_eq!(evaluate_expression("W + H", &table), Ok(14.0));
        assert_eq!(evaluate_expression("H-W", &table), Ok(6.0));
        assert_eq!(evaluate_expression("H * 2", &table), Ok(20.0));
        assert_relative_eq!(evaluate_expression("W/8", &table).unwrap(), 0.5);
    }

    #[test]
    fn test_division_by_zero() {
        let table = symbols(&[("Z", 0.0)]);
        assert_eq!(
            evaluate_expression("1/Z", &table),
            Err(ExpressionError::DivisionByZero)
        );
    }

    #[test]
    fn test_unknown_symbol() {
        let table = SymbolTable::new();
        assert_eq!(
            evaluate_expression("Q*2", &table),
            Err(ExpressionError::UnresolvedOperand("Q".to_string()))
        );
    }

    #[test]
    fn test_leading_minus_splits() {
        let table = SymbolTable::new();
        assert_eq!(
            evaluate_expression("-5", &table),
            Err(ExpressionError::UnresolvedOperand(String::new()))
        );
        assert!(evaluate_expression("1e-3", &table).is_err());
    }

    #[test]
    fn test_plus_has_priority_over_position() {
        // "2*3+1" splits at '+', so the left operand "2*3" is not a literal
        let table = SymbolTable::new();
        assert!(evaluate_expression("2*3+1", &table).is_err());
        let table = symbols(&[("2*3", 6.0)]);
        assert_eq!(evaluate_expression("2*3+1", &table), Ok(7.0));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(
            evaluate_expression("   ", &SymbolTable::new()),
            Err(ExpressionError::Empty)
        );
    }

    #[test]
    fn test_parameters_see_earlier_results() {
        let mut params = vec![
            Parameter::new("H", 10.0),
            Parameter::with_expression("A", "H*2"),
            Parameter::with_expression("B", "A+1"),
        ];
        let report = evaluate_parameters(&mut params);
        assert!(report.all_resolved());
        assert_eq!(report.resolved, 2);
        assert_eq!(params[1].value, 20.0);
        assert_eq!(params[2].value, 21.0);
    }

    #[test]
    fn test_declaration_order_matters() {
        let mut params = vec![
            Parameter::with_expression("B", "A+1"),
            Parameter::with_expression("A", "5"),
        ];
        evaluate_parameters(&mut params);
        // B saw A's seeded value (0), not the freshly evaluated 5
        assert_eq!(params[0].value, 1.0);
        assert_eq!(params[1].value, 5.0);
    }

    #[test]
    fn test_failure_keeps_previous_value_and_continues() {
        let mut params = vec![
            Parameter {
                name: "A".into(),
                value: 7.0,
                expression: "Missing*2".into(),
            },
            Parameter::with_expression("B", "3"),
        ];
        let report = evaluate_parameters(&mut params);
        assert!(!report.all_resolved());
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].name, "A");
        assert_eq!(params[0].value, 7.0);
        assert_eq!(params[1].value, 3.0);
    }

    #[test]
    fn test_duplicate_names_later_wins() {
        let params = vec![Parameter::new("X", 1.0), Parameter::new("X", 2.0)];
        let table = symbol_table(params.iter());
        assert_eq!(table["X"], 2.0);
    }

    #[test]
    fn test_condition_operators() {
        let table = symbols(&[("L", 120.0)]);
        let tol = 1e-12;
        assert_eq!(evaluate_condition("L > 100", &table, tol), Ok(true));
        assert_eq!(evaluate_condition("L < 100", &table, tol), Ok(false));
        assert_eq!(evaluate_condition("L >= 120", &table, tol), Ok(true));
        assert_eq!(evaluate_condition("L <= 119", &table, tol), Ok(false));
        assert_eq!(evaluate_condition("L == 120", &table, tol), Ok(true));
        assert_eq!(evaluate_condition("L != 120", &table, tol), Ok(false));
    }

    #[test]
    fn test_condition_sides_are_expressions() {
        let table = symbols(&[("L", 50.0), ("W", 20.0)]);
        assert_eq!(evaluate_condition("L > W*2", &table, 1e-12), Ok(true));
        assert_eq!(evaluate_condition("L-10 == W*2", &table, 1e-12), Ok(true));
    }

    #[test]
    fn test_condition_without_operator() {
        assert!(matches!(
            evaluate_condition("L", &SymbolTable::new(), 1e-12),
            Err(ExpressionError::MissingComparison(_))
        ));
    }
}
