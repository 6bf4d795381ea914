use std::{collections::BTreeSet, fmt::Write, sync::Arc};

use rand::Rng;

use crate::{
    ast::UsedNames,
    error::{ConfigError, ConfigResult, GradingError},
    grading::{
        comparer::Comparer,
        config::{Answer, CheckConfig, IdentityConstant},
        policy::InputPolicy,
        result::{ComparisonResult, Verdict},
    },
    interpreter::{
        cache::ParsedExpression,
        evaluator::core::{EvalOptions, Evaluator, Scope, evaluate_parsed},
        value::{array::MathArray, core::Value, scalar::Scalar},
    },
    sampling::core::{SamplingPlan, VariableSamplingSet},
};

/// Everything evaluated for one sample.
#[derive(Debug, Clone)]
struct SampleRecord {
    scope:          Scope,
    params:         Vec<Vec<Value>>,
    student:        Value,
    functions_used: BTreeSet<String>,
}

/// Checks student inputs against a validated configuration.
///
/// Construction validates the configuration and parses every answer once;
/// [`Checker::check`] can then be called for any number of inputs.
///
/// # Example
/// ```
/// use mathgrader::grading::{config::CheckConfig, protocol::Checker, result::Verdict};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let checker = Checker::new(CheckConfig::new("2*sin(x)*cos(x)").with_variables(["x"])).unwrap();
/// let mut rng = StdRng::seed_from_u64(0);
///
/// assert_eq!(checker.check("sin(2*x)", &mut rng).unwrap().ok, Verdict::Correct);
/// assert_eq!(checker.check("sin(x)", &mut rng).unwrap().ok, Verdict::Incorrect);
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    config:    CheckConfig,
    plan:      SamplingPlan,
    base:      Scope,
    policy:    InputPolicy,
    evaluator: Evaluator,
    answers:   Vec<Vec<Arc<ParsedExpression>>>,
}

impl Checker {
    /// Validates `config` and prepares it for checking.
    ///
    /// # Errors
    /// Any [`ConfigError`]: invalid settings, malformed sampling sets, or
    /// answer and dependent formulas that do not parse.
    pub fn new(config: CheckConfig) -> ConfigResult<Self> {
        Self::with_evaluator(config, Evaluator::new())
    }

    /// Like [`Checker::new`], parsing through the given evaluator's cache.
    pub fn with_evaluator(config: CheckConfig, evaluator: Evaluator) -> ConfigResult<Self> {
        config.validate()?;

        let base = base_scope(&config);
        let plan = sampling_plan(&config);
        plan.validate()?;

        let suffixes = base.suffix_names();
        let parse = |formula: &str| {
            evaluator.parse(formula, &suffixes)
                     .map_err(|e| ConfigError::InvalidExpression { expression: formula.to_string(),
                                                                   message:    e.to_string(), })
        };

        let answers = config.answers
                            .iter()
                            .map(|answer| answer.expect.iter().map(|f| parse(f.as_str())).collect())
                            .collect::<ConfigResult<Vec<Vec<_>>>>()?;
        for set in plan.variables.values() {
            if let VariableSamplingSet::Dependent(dependent) = set {
                parse(dependent.formula.as_str())?;
            }
        }

        Ok(Self { policy: InputPolicy::from_config(&config),
                  config,
                  plan,
                  base,
                  evaluator,
                  answers })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// The scope every sample starts from.
    #[must_use]
    pub const fn base_scope(&self) -> &Scope {
        &self.base
    }

    fn options(&self) -> EvalOptions {
        EvalOptions { max_array_dim:   self.config.max_array_dim,
                      allow_inf:       false,
                      negative_powers: self.config.negative_powers, }
    }

    /// Checks one student input.
    ///
    /// Draws `samples` scopes, evaluates every answer's parameters and the
    /// input under each, and compares them. The best scoring answer decides
    /// the result. A result with any credit is then subject to the input
    /// policy.
    ///
    /// # Errors
    /// - [`GradingError::Student`] when the input fails to parse or evaluate,
    ///   has the wrong shape, or breaks the input policy.
    /// - [`GradingError::Config`] when sampling or a reference formula fails.
    pub fn check<R: Rng + ?Sized>(&self,
                                  student: &str,
                                  rng: &mut R)
                                  -> Result<ComparisonResult, GradingError> {
        let parsed = self.evaluator.parse(student, &self.base.suffix_names())?;

        let mut used = UsedNames::default();
        used.extend(&parsed.names);
        for params in &self.answers {
            for param in params {
                used.extend(&param.names);
            }
        }

        let options = self.options();
        let reference_options = EvalOptions { max_array_dim: None,
                                              ..options };

        let mut records = Vec::with_capacity(self.config.samples);
        for index in 1..=self.config.samples {
            let scope = self.plan.sample_scope(&used, &self.base, &self.evaluator, rng)?;
            log::debug!("sample {index}: {}", describe_variables(&scope, &used));

            let reference = |param: &Arc<ParsedExpression>| {
                evaluate_reference(param, &scope, &reference_options)
            };
            let params = self.answers
                             .iter()
                             .map(|answer| answer.iter().map(reference).collect())
                             .collect::<ConfigResult<Vec<Vec<_>>>>()?;

            let (value, metadata) = evaluate_parsed(&parsed, &scope, &options)?;
            log::debug!("sample {index}: student evaluates to {value}");

            records.push(SampleRecord { scope,
                                        params,
                                        student: value,
                                        functions_used: metadata.functions_used });
        }

        let mut best: Option<ComparisonResult> = None;
        for (index, answer) in self.config.answers.iter().enumerate() {
            let result = self.grade_answer(index, answer, &records)?;
            log::debug!("answer {:?}: {result}", answer.expect);
            if best.as_ref().is_none_or(|b| result.grade_decimal > b.grade_decimal) {
                best = Some(result);
            }
        }
        let mut result = best.unwrap_or_else(ComparisonResult::incorrect);

        if result.ok != Verdict::Incorrect {
            let functions_used = records.iter()
                                        .flat_map(|r| r.functions_used.iter().cloned())
                                        .collect::<BTreeSet<_>>();
            self.policy.check(student, &functions_used)?;
        }

        if self.config.debug {
            let appendix = debug_appendix(student, &used, &records);
            if result.msg.is_empty() {
                result.msg = appendix;
            } else {
                result.msg = format!("{}\n\n{appendix}", result.msg);
            }
        }

        Ok(result)
    }

    /// Compares the samples against one answer and consolidates the results.
    fn grade_answer(&self,
                    index: usize,
                    answer: &Answer,
                    records: &[SampleRecord])
                    -> Result<ComparisonResult, GradingError> {
        let answer_result = ComparisonResult::from_grade(answer.grade_decimal, answer.msg.clone());
        let tolerance = &self.config.tolerance;

        match &self.config.comparer {
            Comparer::Correlated(comparer) => {
                let params = records.iter().map(|r| r.params[index].clone()).collect::<Vec<_>>();
                let student = records.iter().map(|r| r.student.clone()).collect::<Vec<_>>();
                let result = comparer.compare(&params, &student, tolerance)?;
                if result.is_correct() {
                    return Ok(answer_result);
                }
                Ok(ComparisonResult::from_grade(result.grade_decimal * answer.grade_decimal,
                                                result.msg))
            },
            Comparer::PerSample(comparer) => {
                let mut failures = 0;
                for (sample, record) in records.iter().enumerate() {
                    let result =
                        comparer.compare(&record.params[index], &record.student, tolerance)?;
                    if result.is_correct() {
                        continue;
                    }
                    failures += 1;
                    if failures > self.config.failable_evals {
                        log::debug!("sample {} disagrees, exceeding {} failable evaluation(s)",
                                    sample + 1,
                                    self.config.failable_evals);
                        return Ok(result);
                    }
                    log::debug!("sample {} disagrees, tolerated", sample + 1);
                }
                Ok(answer_result)
            },
        }
    }
}

fn evaluate_reference(param: &ParsedExpression,
                      scope: &Scope,
                      options: &EvalOptions)
                      -> ConfigResult<Value> {
    evaluate_parsed(param, scope, options).map(|(value, _)| value)
                                          .map_err(|e| ConfigError::ReferenceEvaluation {
                                              expression: param.text.clone(),
                                              message:    e.to_string(),
                                          })
}

fn base_scope(config: &CheckConfig) -> Scope {
    let mut scope = Scope::with_defaults();
    scope.variables.extend(config.user_constants.iter().map(|(k, v)| (k.clone(), v.clone())));
    scope.suffixes.extend(config.suffixes.iter().map(|(k, v)| (k.clone(), *v)));
    if config.metric_suffixes {
        scope = scope.with_metric_suffixes();
    }
    match config.identity {
        Some(IdentityConstant::Sized(n)) => {
            scope = scope.with_variable("I", MathArray::identity(n));
        },
        Some(IdentityConstant::Multiple) => {
            scope = scope.with_variable("I", Value::IdentityMultiple(Scalar::ONE));
        },
        None => {},
    }
    scope
}

fn sampling_plan(config: &CheckConfig) -> SamplingPlan {
    let variables = config.variables
                          .iter()
                          .chain(&config.numbered_vars)
                          .map(|name| {
                              let set = config.sample_from.get(name).cloned().unwrap_or_default();
                              (name.clone(), set)
                          })
                          .collect();

    SamplingPlan { variables,
                   numbered_vars: config.numbered_vars.iter().cloned().collect(),
                   functions: config.user_functions.clone() }
}

fn describe_variables(scope: &Scope, used: &UsedNames) -> String {
    used.variables
        .iter()
        .filter_map(|name| scope.variables.get(name).map(|value| format!("{name} = {value}")))
        .collect::<Vec<_>>()
        .join(", ")
}

fn debug_appendix(student: &str, used: &UsedNames, records: &[SampleRecord]) -> String {
    let rule = "==========================================";
    let mut out = String::new();
    let _ = writeln!(out, "MathGrader Debug Info");
    let _ = writeln!(out, "Student Response: {student}");
    let functions = used.functions.iter().cloned().collect::<Vec<_>>();
    let _ = writeln!(out, "Functions referenced: {}", functions.join(", "));

    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out,
                         "Evaluation Data for Sample Number {} of {}",
                         index + 1,
                         records.len());
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Variables: {}", describe_variables(&record.scope, used));
        let _ = writeln!(out, "Student Eval: {}", record.student);
        for (answer, params) in record.params.iter().enumerate() {
            let params = params.iter().map(ToString::to_string).collect::<Vec<_>>();
            let _ = writeln!(out, "Compare to (answer {}): [{}]", answer + 1, params.join(", "));
        }
    }
    out.trim_end().to_string()
}
