use std::collections::BTreeMap;

use crate::{
    error::{ConfigError, ConfigResult},
    interpreter::{
        evaluator::core::{EvalOptions, Evaluator, Scope},
        value::core::Value,
    },
};

/// A variable computed from other variables of the same sample.
///
/// `depends` lists the names that must be resolved first. Variables read by
/// `formula` are waited on as well, so a short `depends` list still resolves
/// in the right order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependentSampler {
    /// Names this variable is computed from.
    pub depends: Vec<String>,
    /// Formula giving the value.
    pub formula: String,
}

impl DependentSampler {
    /// Creates a dependent variable.
    pub fn new<S: Into<String>>(depends: impl IntoIterator<Item = S>,
                                formula: impl Into<String>)
                                -> Self {
        Self { depends: depends.into_iter().map(Into::into).collect(),
               formula: formula.into(), }
    }

    /// Names this variable waits on: the declared dependencies and every
    /// variable its formula reads.
    ///
    /// # Errors
    /// [`ConfigError::InvalidExpression`] when the formula does not parse.
    pub fn requirements(&self, scope: &Scope, evaluator: &Evaluator) -> ConfigResult<Vec<String>> {
        let parsed = evaluator.parse(&self.formula, &scope.suffix_names())
                              .map_err(|e| {
                                  ConfigError::InvalidExpression { expression: self.formula
                                                                                   .clone(),
                                                                   message:    e.to_string(), }
                              })?;

        let mut names = self.depends.clone();
        names.extend(parsed.names.variables.iter().cloned());
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn evaluate(&self, scope: &Scope, evaluator: &Evaluator) -> ConfigResult<Value> {
        let options = EvalOptions::default();
        evaluator.evaluate(&self.formula, scope, &options)
                 .map(|(value, _)| value)
                 .map_err(|e| ConfigError::ReferenceEvaluation { expression: self.formula.clone(),
                                                                 message:    e.to_string(), })
    }
}

/// Resolves dependent variables into `scope`, in as many passes as needed.
///
/// Each pass computes every pending variable whose requirements are already
/// in the scope. A pass that resolves nothing means the remaining variables
/// wait on each other or on names that will never appear.
///
/// # Errors
/// - [`ConfigError::CircularDependency`] naming the unresolved variables.
/// - [`ConfigError::InvalidExpression`] or
///   [`ConfigError::ReferenceEvaluation`] when a formula fails.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
///
/// use mathgrader::{
///     interpreter::{evaluator::core::{Evaluator, Scope}, value::core::Value},
///     sampling::dependent::{DependentSampler, resolve_dependents},
/// };
///
/// let evaluator = Evaluator::new();
/// let mut scope = Scope::with_defaults().with_variable("x", 2.0);
/// let pending = BTreeMap::from([
///     ("z".to_string(), DependentSampler::new(["y"], "y + 1")),
///     ("y".to_string(), DependentSampler::new(["x"], "x^2")),
/// ]);
///
/// resolve_dependents(&pending, &mut scope, &evaluator).unwrap();
/// assert_eq!(scope.variables["z"], Value::from(5.0));
/// ```
pub fn resolve_dependents(pending: &BTreeMap<String, DependentSampler>,
                          scope: &mut Scope,
                          evaluator: &Evaluator)
                          -> ConfigResult<()> {
    let mut remaining = pending.iter()
                               .map(|(name, sampler)| {
                                   sampler.requirements(scope, evaluator)
                                          .map(|needs| (name.as_str(), sampler, needs))
                               })
                               .collect::<ConfigResult<Vec<_>>>()?;

    let mut pass = 0;
    while !remaining.is_empty() {
        pass += 1;
        let (ready, waiting): (Vec<_>, Vec<_>) =
            remaining.into_iter().partition(|(_, _, needs)| {
                                     needs.iter().all(|need| scope.variables.contains_key(need))
                                 });

        if ready.is_empty() {
            let names = waiting.iter().map(|(name, ..)| (*name).to_string()).collect();
            return Err(ConfigError::CircularDependency { names });
        }

        for (name, sampler, _) in ready {
            let value = sampler.evaluate(scope, evaluator)?;
            log::debug!("resolved dependent '{name}' = {value} in pass {pass}");
            scope.variables.insert(name.to_string(), value);
        }
        remaining = waiting;
    }

    Ok(())
}
