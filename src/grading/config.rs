use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::{ConfigError, ConfigResult},
    grading::{comparer::Comparer, tolerance::Tolerance},
    interpreter::value::core::Value,
    sampling::{core::VariableSamplingSet, function::FunctionSamplingSet},
};

/// Message used when the input contains a forbidden string.
pub const DEFAULT_FORBIDDEN_MESSAGE: &str = "Invalid Input: This particular answer is forbidden";

/// One acceptable answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Parameter formulas handed to the comparer, usually just the expected
    /// expression.
    pub expect:        Vec<String>,
    /// Credit for matching this answer.
    pub grade_decimal: f64,
    /// Message shown when this answer matches.
    pub msg:           String,
}

impl Answer {
    /// A full-credit answer with a single expected formula.
    pub fn new(formula: impl Into<String>) -> Self {
        Self { expect:        vec![formula.into()],
               grade_decimal: 1.0,
               msg:           String::new(), }
    }

    /// A full-credit answer with several comparer parameters.
    pub fn with_params<S: Into<String>>(params: impl IntoIterator<Item = S>) -> Self {
        Self { expect:        params.into_iter().map(Into::into).collect(),
               grade_decimal: 1.0,
               msg:           String::new(), }
    }

    /// Sets the credit and message.
    #[must_use]
    pub fn graded(mut self, grade_decimal: f64, msg: impl Into<String>) -> Self {
        self.grade_decimal = grade_decimal;
        self.msg = msg.into();
        self
    }
}

impl From<&str> for Answer {
    fn from(formula: &str) -> Self {
        Self::new(formula)
    }
}

/// The constant `I` made available to formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityConstant {
    /// The identity matrix of the given dimension.
    Sized(usize),
    /// An identity whose dimension adapts to the matrix it meets.
    Multiple,
}

/// Everything needed to check a student's input.
///
/// Start from [`CheckConfig::new`] or [`Default`], adjust fields or use the
/// setters, then hand it to [`crate::grading::protocol::Checker::new`],
/// which validates it.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Acceptable answers; the best scoring one wins.
    pub answers:            Vec<Answer>,
    /// Variable names the formulas may use.
    pub variables:          Vec<String>,
    /// Heads of numbered variables, such as `a` for `a_{1}`.
    pub numbered_vars:      Vec<String>,
    /// Sampling sets by variable name. Unlisted variables use the default
    /// real interval.
    pub sample_from:        BTreeMap<String, VariableSamplingSet>,
    /// Functions the formulas may use besides the default library.
    pub user_functions:     BTreeMap<String, FunctionSamplingSet>,
    /// Constants the formulas may use besides `pi`, `e`, `i` and `j`.
    pub user_constants:     BTreeMap<String, Value>,
    /// Extra number suffixes and their multipliers.
    pub suffixes:           BTreeMap<String, f64>,
    /// Enables the metric suffixes `k M G T m u n p`.
    pub metric_suffixes:    bool,
    /// Number of samples drawn.
    pub samples:            usize,
    /// Samples that may disagree without failing the check.
    pub failable_evals:     usize,
    /// Tolerance handed to the comparer.
    pub tolerance:          Tolerance,
    /// How answers and inputs are compared.
    pub comparer:           Comparer,
    /// When set, only these default functions are permitted.
    pub whitelist:          Option<Vec<String>>,
    /// Default functions that are not permitted.
    pub blacklist:          Vec<String>,
    /// Strings that may not appear in the input, ignoring whitespace.
    pub forbidden_strings:  Vec<String>,
    /// Message given when a forbidden string appears.
    pub forbidden_message:  String,
    /// Functions the input must use.
    pub required_functions: Vec<String>,
    /// Largest array dimension allowed in the input.
    pub max_array_dim:      Option<usize>,
    /// Whether square matrices may be raised to negative powers.
    pub negative_powers:    bool,
    /// Whether `I` is defined, and how.
    pub identity:           Option<IdentityConstant>,
    /// Appends per-sample evaluation data to the message.
    pub debug:              bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self { answers:            Vec::new(),
               variables:          Vec::new(),
               numbered_vars:      Vec::new(),
               sample_from:        BTreeMap::new(),
               user_functions:     BTreeMap::new(),
               user_constants:     BTreeMap::new(),
               suffixes:           BTreeMap::new(),
               metric_suffixes:    false,
               samples:            5,
               failable_evals:     0,
               tolerance:          Tolerance::default(),
               comparer:           Comparer::default(),
               whitelist:          None,
               blacklist:          Vec::new(),
               forbidden_strings:  Vec::new(),
               forbidden_message:  DEFAULT_FORBIDDEN_MESSAGE.to_string(),
               required_functions: Vec::new(),
               max_array_dim:      None,
               negative_powers:    true,
               identity:           None,
               debug:              false, }
    }
}

impl CheckConfig {
    /// A configuration with a single answer and default settings.
    ///
    /// # Example
    /// ```
    /// use mathgrader::grading::{config::CheckConfig, tolerance::Tolerance};
    ///
    /// let config = CheckConfig::new("x^2").with_variables(["x"])
    ///                                     .with_tolerance(Tolerance::Absolute(1e-6));
    /// assert_eq!(config.samples, 5);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(answer: impl Into<Answer>) -> Self {
        Self { answers: vec![answer.into()],
               ..Self::default() }
    }

    /// Adds another acceptable answer.
    #[must_use]
    pub fn with_answer(mut self, answer: impl Into<Answer>) -> Self {
        self.answers.push(answer.into());
        self
    }

    /// Declares variable names.
    #[must_use]
    pub fn with_variables<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.variables.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a numbered variable head.
    #[must_use]
    pub fn with_numbered_var(mut self, head: impl Into<String>) -> Self {
        self.numbered_vars.push(head.into());
        self
    }

    /// Sets the sampling set of a variable.
    #[must_use]
    pub fn with_sample_from(mut self,
                            name: impl Into<String>,
                            set: impl Into<VariableSamplingSet>)
                            -> Self {
        self.sample_from.insert(name.into(), set.into());
        self
    }

    /// Adds a user function.
    #[must_use]
    pub fn with_user_function(mut self, name: impl Into<String>, set: FunctionSamplingSet) -> Self {
        self.user_functions.insert(name.into(), set);
        self
    }

    /// Adds a user constant.
    #[must_use]
    pub fn with_user_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user_constants.insert(name.into(), value.into());
        self
    }

    /// Sets the number of samples.
    #[must_use]
    pub const fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Sets how many samples may disagree.
    #[must_use]
    pub const fn with_failable_evals(mut self, failable_evals: usize) -> Self {
        self.failable_evals = failable_evals;
        self
    }

    /// Sets the tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the comparer.
    #[must_use]
    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = comparer;
        self
    }

    /// Checks the configuration for mistakes that do not need sampling to
    /// find.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] or [`ConfigError::SamplingSet`] describing the
    /// first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.answers.is_empty() {
            return Err(ConfigError::invalid("at least one answer is required"));
        }
        let expected_params = self.comparer.param_count();
        for answer in &self.answers {
            if answer.expect.len() != expected_params {
                return Err(ConfigError::invalid(format!("answer {:?} supplies {} comparer \
                                                         parameter(s), but the comparer \
                                                         expects {expected_params}",
                                                        answer.expect,
                                                        answer.expect.len())));
            }
            if !(0.0..=1.0).contains(&answer.grade_decimal) {
                return Err(ConfigError::invalid(format!("grade_decimal must lie in [0, 1], \
                                                         got {}",
                                                        answer.grade_decimal)));
            }
        }

        if self.samples == 0 {
            return Err(ConfigError::invalid("samples must be positive"));
        }
        if let Comparer::Correlated(comparer) = &self.comparer
           && self.samples < comparer.min_samples()
        {
            return Err(ConfigError::invalid(format!("this comparer needs at least {} samples",
                                                    comparer.min_samples())));
        }
        self.tolerance.validate()?;

        if self.whitelist.is_some() && !self.blacklist.is_empty() {
            return Err(ConfigError::invalid("whitelist and blacklist cannot both be set"));
        }
        if let Some(name) = self.required_functions.iter().find(|f| self.blacklist.contains(f)) {
            return Err(ConfigError::invalid(format!("required function '{name}' is \
                                                     blacklisted")));
        }

        let declared = self.variables
                           .iter()
                           .chain(&self.numbered_vars)
                           .collect::<BTreeSet<_>>();
        if let Some(name) = self.sample_from.keys().find(|name| !declared.contains(name)) {
            return Err(ConfigError::sampling_set(name.as_str(),
                                                 "sample_from names a variable that is not \
                                                  declared"));
        }
        if let Some((name, _)) = self.suffixes.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::invalid(format!("suffix '{name}' must have a finite \
                                                     multiplier")));
        }
        if let Some(IdentityConstant::Sized(0)) = self.identity {
            return Err(ConfigError::invalid("identity dimension must be positive"));
        }

        Ok(())
    }
}
