use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::{
    ast::UsedNames,
    error::{ConfigError, ConfigResult},
    interpreter::{
        evaluator::core::{Evaluator, Scope},
        value::core::Value,
    },
    sampling::{
        array::{ArraySampler, IdentityMultipleSampler, OrthogonalSampler, SquareMatrixSampler},
        dependent::{DependentSampler, resolve_dependents},
        function::FunctionSamplingSet,
        scalar::ScalarSampler,
    },
};

/// Where the values of one variable come from.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSamplingSet {
    /// A single number.
    Scalar(ScalarSampler),
    /// A vector, matrix or tensor of fixed shape.
    Array(ArraySampler),
    /// A square matrix with structural constraints.
    SquareMatrices(SquareMatrixSampler),
    /// An orthogonal or unitary matrix.
    Orthogonal(OrthogonalSampler),
    /// A random multiple of the identity matrix.
    IdentityMultiples(IdentityMultipleSampler),
    /// A formula in other variables of the same sample.
    Dependent(DependentSampler),
}

impl Default for VariableSamplingSet {
    fn default() -> Self {
        Self::Scalar(ScalarSampler::default())
    }
}

macro_rules! sampling_set_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for VariableSamplingSet {
                fn from(set: $ty) -> Self {
                    Self::$variant(set)
                }
            }
        )*
    };
}

sampling_set_from! {
    Scalar(ScalarSampler),
    Array(ArraySampler),
    SquareMatrices(SquareMatrixSampler),
    Orthogonal(OrthogonalSampler),
    IdentityMultiples(IdentityMultipleSampler),
    Dependent(DependentSampler),
}

impl VariableSamplingSet {
    /// Draws one value for a set that does not depend on other variables.
    ///
    /// Returns `None` for [`VariableSamplingSet::Dependent`], which is
    /// resolved after the rest of the sample.
    pub fn sample_independent<R: Rng + ?Sized>(&self,
                                               name: &str,
                                               rng: &mut R)
                                               -> Option<ConfigResult<Value>> {
        let value = match self {
            Self::Scalar(set) => Ok(set.sample(rng)),
            Self::Array(set) => set.sample(name, rng),
            Self::SquareMatrices(set) => set.sample(name, rng),
            Self::Orthogonal(set) => set.sample(name, rng),
            Self::IdentityMultiples(set) => Ok(set.sample(rng)),
            Self::Dependent(_) => return None,
        };
        Some(value)
    }

    /// Checks the set before any sampling happens.
    pub fn validate(&self, name: &str) -> ConfigResult<()> {
        match self {
            Self::Scalar(set) => set.validate(name),
            Self::Array(set) => set.validate(name),
            Self::SquareMatrices(set) => set.validate(name),
            Self::Orthogonal(set) => set.validate(name),
            Self::IdentityMultiples(set) => set.validate(name),
            Self::Dependent(set) if set.formula.trim().is_empty() => {
                Err(ConfigError::sampling_set(name, "dependent formula is empty"))
            },
            Self::Dependent(_) => Ok(()),
        }
    }
}

/// Splits a numbered variable such as `a_{3}` or `a_{-1}` into its head and
/// index.
///
/// # Example
/// ```
/// use mathgrader::sampling::core::split_numbered;
///
/// assert_eq!(split_numbered("a_{3}"), Some(("a", 3)));
/// assert_eq!(split_numbered("a_{-1}"), Some(("a", -1)));
/// assert_eq!(split_numbered("a_{x}"), None);
/// assert_eq!(split_numbered("a_3"), None);
/// ```
#[must_use]
pub fn split_numbered(name: &str) -> Option<(&str, i64)> {
    let (head, index) = name.strip_suffix('}')?.rsplit_once("_{")?;
    if head.is_empty() {
        return None;
    }
    Some((head, index.parse().ok()?))
}

/// Sampling sets for every declared variable and function of a check.
#[derive(Debug, Clone, Default)]
pub struct SamplingPlan {
    /// Sets for variables, keyed by name. Numbered variables are keyed by
    /// their head.
    pub variables:     BTreeMap<String, VariableSamplingSet>,
    /// Heads of numbered variables, such as `a` for `a_{1}`, `a_{2}`, ...
    pub numbered_vars: BTreeSet<String>,
    /// Sets for function names.
    pub functions:     BTreeMap<String, FunctionSamplingSet>,
}

impl SamplingPlan {
    /// Checks every set before any sampling happens.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, set) in &self.variables {
            set.validate(name)?;
        }
        for (name, set) in &self.functions {
            set.validate(name)?;
        }
        Ok(())
    }

    /// The set a variable name is drawn from, directly or through its
    /// numbered head.
    #[must_use]
    pub fn set_for(&self, name: &str) -> Option<&VariableSamplingSet> {
        if let Some(set) = self.variables.get(name) {
            return Some(set);
        }
        let (head, _) = split_numbered(name)?;
        if !self.numbered_vars.contains(head) {
            return None;
        }
        self.variables.get(head)
    }

    /// The variable names a sample must contain for formulas that use `used`.
    ///
    /// Starts from the referenced names this plan knows about and follows
    /// dependent variables to everything they need.
    pub fn required_variables(&self,
                              used: &UsedNames,
                              scope: &Scope,
                              evaluator: &Evaluator)
                              -> ConfigResult<BTreeSet<String>> {
        let mut required = BTreeSet::new();
        let mut queue = used.variables
                            .iter()
                            .filter(|name| self.set_for(name).is_some())
                            .cloned()
                            .collect::<Vec<_>>();

        while let Some(name) = queue.pop() {
            if !required.insert(name.clone()) {
                continue;
            }
            if let Some(VariableSamplingSet::Dependent(dependent)) = self.set_for(&name) {
                queue.extend(dependent.requirements(scope, evaluator)?
                                      .into_iter()
                                      .filter(|need| self.set_for(need).is_some()));
            }
        }

        Ok(required)
    }

    /// Builds a fresh scope for one sample.
    ///
    /// `base` is cloned and never modified. Functions and independent
    /// variables are drawn in name order, then dependent variables are
    /// resolved against the result.
    ///
    /// # Example
    /// ```
    /// use mathgrader::{
    ///     interpreter::evaluator::core::{Evaluator, Scope},
    ///     sampling::{core::SamplingPlan, scalar::{Interval, ScalarSampler}},
    /// };
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut plan = SamplingPlan::default();
    /// plan.variables.insert("x".to_string(),
    ///                       ScalarSampler::RealInterval(Interval::new(2.0, 3.0)).into());
    ///
    /// let evaluator = Evaluator::new();
    /// let base = Scope::with_defaults();
    /// let used = evaluator.parse("x + 1", &base.suffix_names()).unwrap().names.clone();
    /// let mut rng = StdRng::seed_from_u64(3);
    ///
    /// let scope = plan.sample_scope(&used, &base, &evaluator, &mut rng).unwrap();
    /// let x = scope.variables["x"].as_scalar().unwrap().re();
    /// assert!((2.0..=3.0).contains(&x));
    /// assert!(!base.variables.contains_key("x"));
    /// ```
    pub fn sample_scope<R: Rng + ?Sized>(&self,
                                         used: &UsedNames,
                                         base: &Scope,
                                         evaluator: &Evaluator,
                                         rng: &mut R)
                                         -> ConfigResult<Scope> {
        let mut scope = base.clone();

        for (name, set) in &self.functions {
            if used.functions.contains(name) {
                scope.functions.insert(name.clone(), set.sample(name, rng)?);
            }
        }

        let mut dependents = BTreeMap::new();
        for name in self.required_variables(used, base, evaluator)? {
            let Some(set) = self.set_for(&name) else {
                continue;
            };
            match set.sample_independent(&name, rng) {
                Some(value) => {
                    scope.variables.insert(name, value?);
                },
                None => {
                    if let VariableSamplingSet::Dependent(dependent) = set {
                        dependents.insert(name, dependent.clone());
                    }
                },
            }
        }

        resolve_dependents(&dependents, &mut scope, evaluator)?;
        Ok(scope)
    }
}
