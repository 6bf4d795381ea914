use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use crate::{
    ast::Expr,
    error::{MathError, MathResult},
    interpreter::{
        cache::{ParseCache, ParsedExpression},
        evaluator::{
            function::core::{MathFunction, default_functions},
            utils::validate_names,
        },
        value::{array::MathArray, core::Value},
    },
};

/// Suffixes available by default: `%` divides by one hundred.
pub const DEFAULT_SUFFIXES: &[(&str, f64)] = &[("%", 0.01)];

/// Metric prefixes that may be enabled as number suffixes.
pub const METRIC_SUFFIXES: &[(&str, f64)] = &[("k", 1e3),
                                              ("M", 1e6),
                                              ("G", 1e9),
                                              ("T", 1e12),
                                              ("m", 1e-3),
                                              ("u", 1e-6),
                                              ("n", 1e-9),
                                              ("p", 1e-12)];

/// The default constants: `pi`, `e`, and the imaginary units `i` and `j`.
#[must_use]
pub fn default_variables() -> HashMap<String, Value> {
    HashMap::from([("pi".to_string(), Value::from(std::f64::consts::PI)),
                   ("e".to_string(), Value::from(std::f64::consts::E)),
                   ("i".to_string(), Value::complex(0.0, 1.0)),
                   ("j".to_string(), Value::complex(0.0, 1.0))])
}

/// Everything a formula may refer to during one evaluation.
///
/// Scopes are cheap to clone and are rebuilt for every sample; a parsed tree
/// never holds on to one.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Variables and constants by name.
    pub variables: HashMap<String, Value>,
    /// Functions by name.
    pub functions: HashMap<String, MathFunction>,
    /// Number suffixes and their multipliers.
    pub suffixes:  HashMap<String, f64>,
}

impl Scope {
    /// An empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default constants, function library and `%` suffix.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::evaluator::core::Scope;
    ///
    /// let scope = Scope::with_defaults();
    /// assert!(scope.variables.contains_key("pi"));
    /// assert!(scope.functions.contains_key("sin"));
    /// assert_eq!(scope.suffixes.get("%"), Some(&0.01));
    /// ```
    #[must_use]
    pub fn with_defaults() -> Self {
        Self { variables: default_variables(),
               functions: default_functions(),
               suffixes:  DEFAULT_SUFFIXES.iter()
                                          .map(|(name, value)| ((*name).to_string(), *value))
                                          .collect(), }
    }

    /// Adds or replaces a variable.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Adds or replaces a function under its own name.
    #[must_use]
    pub fn with_function(mut self, function: MathFunction) -> Self {
        self.functions.insert(function.name().to_string(), function);
        self
    }

    /// Adds or replaces a number suffix.
    #[must_use]
    pub fn with_suffix(mut self, name: impl Into<String>, multiplier: f64) -> Self {
        self.suffixes.insert(name.into(), multiplier);
        self
    }

    /// Adds the metric prefixes `k M G T m u n p` as suffixes.
    #[must_use]
    pub fn with_metric_suffixes(mut self) -> Self {
        self.suffixes
            .extend(METRIC_SUFFIXES.iter().map(|(name, value)| ((*name).to_string(), *value)));
        self
    }

    /// The suffix names, which determine how formulas are parsed.
    #[must_use]
    pub fn suffix_names(&self) -> BTreeSet<String> {
        self.suffixes.keys().cloned().collect()
    }
}

/// Per-evaluation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Largest array dimension allowed in the result of any array literal:
    /// `0` forbids vectors, `1` forbids matrices, `2` forbids tensors.
    pub max_array_dim:   Option<usize>,
    /// Whether infinite results are accepted instead of raising an overflow.
    pub allow_inf:       bool,
    /// Whether square matrices may be raised to negative integer powers.
    pub negative_powers: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { max_array_dim:   None,
               allow_inf:       false,
               negative_powers: true, }
    }
}

/// What an evaluation referred to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalMetadata {
    /// Variable names referenced by the formula.
    pub variables_used:     BTreeSet<String>,
    /// Function names referenced by the formula.
    pub functions_used:     BTreeSet<String>,
    /// Suffix names referenced by the formula.
    pub suffixes_used:      BTreeSet<String>,
    /// Highest dimension of any array literal that was evaluated.
    pub max_array_dim_used: usize,
}

/// Parses and evaluates formulas, sharing one parse cache.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{
///     evaluator::core::{EvalOptions, Evaluator, Scope},
///     value::core::Value,
/// };
///
/// let evaluator = Evaluator::new();
/// let scope = Scope::with_defaults().with_variable("x", 3.0);
/// let (value, metadata) = evaluator.evaluate("x^2 + 1", &scope, &EvalOptions::default())
///                                  .unwrap();
///
/// assert_eq!(value, Value::from(10.0));
/// assert!(metadata.variables_used.contains("x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    cache: Arc<ParseCache>,
}

impl Evaluator {
    /// An evaluator with a fresh cache of its own.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator that parses through `cache`, which may be shared.
    #[must_use]
    pub const fn with_cache(cache: Arc<ParseCache>) -> Self {
        Self { cache }
    }

    /// The cache this evaluator parses through.
    #[must_use]
    pub const fn cache(&self) -> &Arc<ParseCache> {
        &self.cache
    }

    /// Parses `formula` under the given suffix names.
    pub fn parse(&self,
                 formula: &str,
                 suffixes: &BTreeSet<String>)
                 -> MathResult<Arc<ParsedExpression>> {
        Ok(self.cache.parse(formula, suffixes)?)
    }

    /// Parses and evaluates `formula` against `scope`.
    ///
    /// # Errors
    /// Any [`MathError`]: parse failures, undefined names, shape and domain
    /// errors, overflow, division by zero, and array-dimension violations.
    pub fn evaluate(&self,
                    formula: &str,
                    scope: &Scope,
                    options: &EvalOptions)
                    -> MathResult<(Value, EvalMetadata)> {
        let parsed = self.parse(formula, &scope.suffix_names())?;
        evaluate_parsed(&parsed, scope, options)
    }
}

/// Evaluates an already parsed formula.
///
/// Every referenced name is validated against `scope` before any evaluation
/// happens. The array dimension limit is enforced on the finished result.
pub fn evaluate_parsed(parsed: &ParsedExpression,
                       scope: &Scope,
                       options: &EvalOptions)
                       -> MathResult<(Value, EvalMetadata)> {
    validate_names(scope, &parsed.names)?;

    let mut context = Context::new(scope, *options);
    let value = context.eval(&parsed.tree)?;

    let metadata = EvalMetadata { variables_used:     parsed.names.variables.clone(),
                                  functions_used:     parsed.names.functions.clone(),
                                  suffixes_used:      parsed.names.suffixes.clone(),
                                  max_array_dim_used: context.max_array_dim_used, };

    if let Some(limit) = options.max_array_dim
       && metadata.max_array_dim_used > limit
    {
        return Err(array_dim_error(limit));
    }

    Ok((value, metadata))
}

fn array_dim_error(limit: usize) -> MathError {
    let message = match limit {
        0 => "Vector and matrix expressions have been forbidden in this entry.",
        1 => "Matrix expressions have been forbidden in this entry.",
        _ => "Tensor expressions have been forbidden in this entry.",
    };
    MathError::invalid_input(message)
}

/// State of one walk over a parse tree.
///
/// `Context` borrows the scope immutably: evaluation never changes the
/// bindings, and variable lookups hand out copies.
pub struct Context<'a> {
    /// Names available to the formula.
    pub scope:              &'a Scope,
    /// Switches for this evaluation.
    pub options:            EvalOptions,
    /// Highest array literal dimension seen so far.
    pub max_array_dim_used: usize,
}

impl<'a> Context<'a> {
    /// Creates a context for one evaluation.
    #[must_use]
    pub const fn new(scope: &'a Scope, options: EvalOptions) -> Self {
        Self { scope,
               options,
               max_array_dim_used: 0 }
    }

    /// Evaluates an expression node.
    ///
    /// Children are evaluated left to right. Once a child comes back as NaN
    /// its siblings are skipped and NaN is returned. Each node's own result is
    /// then checked: NaN passes through, and infinity raises an overflow
    /// unless [`EvalOptions::allow_inf`] is set.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    ///
    /// # Returns
    /// The value of the expression.
    pub fn eval(&mut self, expr: &Expr) -> MathResult<Value> {
        let value = match expr {
            Expr::Number { value, suffix } => self.eval_number(*value, suffix.as_deref())?,
            Expr::Variable { name } => self.eval_variable(name)?,
            Expr::Function { name, arguments } => self.eval_function_call(name, arguments)?,
            Expr::Array { elements } => self.eval_array_literal(elements)?,
            Expr::Power { operands, negations } => self.eval_power(operands, negations)?,
            Expr::Negation { count, operand } => self.eval_negation(*count, operand)?,
            Expr::Parallel { operands } => self.eval_parallel(operands)?,
            Expr::Product { operands, operators } => self.eval_product(operands, operators)?,
            Expr::Sum { operands, operators, .. } => self.eval_sum(operands, operators)?,
            Expr::Parentheses { inner } => self.eval(inner)?,
        };

        self.check_node(value)
    }

    fn eval_number(&self, value: f64, suffix: Option<&str>) -> MathResult<Value> {
        let Some(suffix) = suffix else {
            return Ok(Value::from(value));
        };
        let multiplier =
            self.scope
                .suffixes
                .get(suffix)
                .ok_or_else(|| MathError::UndefinedSuffix { name: suffix.to_string() })?;

        Ok(Value::from(value * multiplier))
    }

    fn eval_variable(&self, name: &str) -> MathResult<Value> {
        self.scope.variables.get(name).cloned().ok_or_else(|| {
            MathError::UndefinedVariable { name:    name.to_string(),
                                           message: format!("Invalid Input: {name} not \
                                                             permitted in answer as a \
                                                             variable"), }
        })
    }

    /// Evaluates an array literal.
    ///
    /// Elements must be all scalars, giving a vector, or all arrays of one
    /// shape, which are stacked along a new leading axis.
    fn eval_array_literal(&mut self, elements: &[Expr]) -> MathResult<Value> {
        let Some(values) = self.eval_children(elements)? else {
            return Ok(Value::nan());
        };

        let ragged = || {
            MathError::shape("Unable to parse vector/matrix. If you're trying to enter a \
                              matrix, this is most likely caused by an unequal number of \
                              elements in each row.")
        };

        let array = if values.iter().all(|v| matches!(v, Value::Scalar(_))) {
            MathArray::vector(values.iter().filter_map(Value::as_scalar).collect())
        } else {
            let rows = values.into_iter()
                             .map(|v| match v {
                                 Value::Array(a) => Ok(a),
                                 _ => Err(ragged()),
                             })
                             .collect::<MathResult<Vec<_>>>()?;
            MathArray::stack(&rows)
        }.ok_or_else(ragged)?;

        self.max_array_dim_used = self.max_array_dim_used.max(array.ndim());
        Ok(Value::Array(array))
    }
}
