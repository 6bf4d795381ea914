use mathgrader::{
    error::{ConfigError, GradingError, MathError},
    grading::{
        comparer::{
            BetweenComparer, Comparer, CongruenceComparer, LinearComparer, PROPORTIONAL_MESSAGE,
        },
        config::{Answer, CheckConfig, IdentityConstant},
        protocol::Checker,
        result::{ComparisonResult, Verdict},
        tolerance::Tolerance,
    },
    interpreter::value::core::Value,
    sampling::{
        dependent::DependentSampler,
        function::FunctionSamplingSet,
        scalar::{Interval, ScalarSampler},
    },
};
use rand::{SeedableRng, rngs::StdRng};

fn check(config: CheckConfig, input: &str) -> Result<ComparisonResult, GradingError> {
    let checker = Checker::new(config).unwrap();
    checker.check(input, &mut StdRng::seed_from_u64(42))
}

fn verdict(config: CheckConfig, input: &str) -> Verdict {
    check(config, input).unwrap().ok
}

fn student_error(config: CheckConfig, input: &str) -> MathError {
    match check(config, input) {
        Err(GradingError::Student(error)) => error,
        other => panic!("expected a student error for {input:?}, got {other:?}"),
    }
}

fn config_error(config: CheckConfig) -> ConfigError {
    match Checker::new(config) {
        Err(error) => error,
        Ok(_) => panic!("expected the configuration to be rejected"),
    }
}

#[test]
fn equivalent_constant_expressions() {
    let config = CheckConfig::new("(cos(3/2)+sin(3/2))/cos(3/2+2*pi)")
        .with_tolerance(Tolerance::Percent(0.1));

    assert_eq!(verdict(config.clone(), "1+tan(3/2)"), Verdict::Correct);
    assert_eq!(verdict(config, "1+tan(3/2)+0.1"), Verdict::Incorrect);

    let config = CheckConfig::new("1+tan(3/2)").with_tolerance(Tolerance::Percent(0.1));
    assert_eq!(verdict(config.clone(), "(cos(3/2)+sin(3/2))/cos(3/2+2*pi)"), Verdict::Correct);
    assert_eq!(verdict(config, "(cos(3/2)+sin(3/2))/cos(3/2+2*pi) + 0.1"),
               Verdict::Incorrect);
}

#[test]
fn variables_are_sampled() {
    let config = CheckConfig::new("(x+y)^2").with_variables(["x", "y"]);

    assert_eq!(verdict(config.clone(), "x^2 + 2*x*y + y^2"), Verdict::Correct);
    assert_eq!(verdict(config, "x^2 + y^2"), Verdict::Incorrect);
}

#[test]
fn undeclared_variables_are_student_errors() {
    let error = student_error(CheckConfig::new("x").with_variables(["x"]), "x + z");
    assert!(matches!(error, MathError::UndefinedVariable { ref name, .. } if name == "z"));
    assert_eq!(error.to_string(), "Invalid Input: z not permitted in answer as a variable");
}

#[test]
fn failable_evaluations_tolerate_disagreement() {
    let always_one = ScalarSampler::DiscreteSet(vec![Value::from(1.0)]);
    let config = CheckConfig::new("x").with_variables(["x"])
                                      .with_sample_from("x", always_one)
                                      .with_samples(3);

    assert_eq!(verdict(config.clone(), "x + 1"), Verdict::Incorrect);
    assert_eq!(verdict(config.clone().with_failable_evals(2), "x + 1"), Verdict::Incorrect);
    assert_eq!(verdict(config.with_failable_evals(3), "x + 1"), Verdict::Correct);
}

#[test]
fn failable_evaluations_count_disagreeing_samples() {
    let values = ScalarSampler::DiscreteSet(vec![Value::from(1.0), Value::from(2.0)]);
    let samples = 8;

    // "1" only disagrees with "x" on the samples that draw 2.
    let disagreements = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..samples).filter(|_| values.sample(&mut rng) == Value::from(2.0)).count()
    };
    let seed = (0..).find(|&seed| (2..samples).contains(&disagreements(seed))).unwrap();
    let failing = disagreements(seed);

    let config = CheckConfig::new("x").with_variables(["x"])
                                      .with_sample_from("x", values.clone())
                                      .with_samples(samples);
    let grade = |failable_evals| {
        let checker = Checker::new(config.clone().with_failable_evals(failable_evals)).unwrap();
        checker.check("1", &mut StdRng::seed_from_u64(seed)).unwrap().ok
    };

    assert_eq!(grade(failing), Verdict::Correct);
    assert_eq!(grade(failing + 1), Verdict::Correct);
    assert_eq!(grade(failing - 1), Verdict::Incorrect);
}

#[test]
fn best_answer_wins() {
    let config = CheckConfig::new("x").with_variables(["x"])
                                      .with_answer(Answer::new("2*x").graded(0.5, "Close."));

    let result = check(config.clone(), "x*2").unwrap();
    assert_eq!(result.ok, Verdict::Partial);
    assert_eq!(result.grade_decimal, 0.5);
    assert_eq!(result.msg, "Close.");

    assert!(check(config, "x").unwrap().is_correct());
}

#[test]
fn blacklisted_functions_are_rejected_after_a_match() {
    let mut config = CheckConfig::new("sin(2*x)").with_variables(["x"]);
    config.blacklist = vec!["sin".to_string(), "cos".to_string()];

    let error = student_error(config.clone(), "2*sin(x)*cos(x)");
    assert_eq!(error.to_string(),
               "Invalid Input: functions 'cos', 'sin' not permitted in answer");

    // Wrong answers are graded, not policed.
    assert_eq!(verdict(config, "sin(x)"), Verdict::Incorrect);
}

#[test]
fn whitelisted_and_user_functions() {
    let mut config = CheckConfig::new("f(x) + sqrt(x)")
        .with_variables(["x"])
        .with_user_function("f", FunctionSamplingSet::default());
    config.whitelist = Some(vec!["sqrt".to_string()]);

    assert_eq!(verdict(config.clone(), "sqrt(x) + f(x)"), Verdict::Correct);
    let error = student_error(config, "f(x) + abs(sqrt(x))");
    assert_eq!(error.to_string(), "Invalid Input: function 'abs' not permitted in answer");
}

#[test]
fn required_functions_must_appear() {
    let mut config = CheckConfig::new("1").with_variables(["x"]);
    config.required_functions = vec!["sin".to_string()];

    assert_eq!(verdict(config.clone(), "sin(x)^2 + cos(x)^2"), Verdict::Correct);
    let error = student_error(config, "1");
    assert_eq!(error.to_string(), "Invalid Input: Answer must contain the function sin");
}

#[test]
fn forbidden_strings_ignore_whitespace() {
    let mut config = CheckConfig::new("x^2").with_variables(["x"]);
    config.forbidden_strings = vec!["x*x".to_string()];

    let error = student_error(config.clone(), "x * x");
    assert_eq!(error.to_string(), "Invalid Input: This particular answer is forbidden");
    assert_eq!(verdict(config.clone(), "x^2"), Verdict::Correct);

    config.forbidden_message = "Simplify your answer.".to_string();
    assert_eq!(student_error(config, "x *x").to_string(), "Simplify your answer.");
}

#[test]
fn shape_mismatches_are_explained() {
    let config = CheckConfig::new("[1, x]").with_variables(["x"]);

    let error = student_error(config.clone(), "x");
    assert_eq!(error.to_string(), "Expected answer to be a vector, but input is a scalar.");
    let error = student_error(config.clone(), "[1, x, 0]");
    assert!(error.to_string().ends_with("of incorrect shape."), "{error}");
    assert_eq!(verdict(config, "[1, x]"), Verdict::Correct);
}

#[test]
fn array_dimension_limits_apply_to_input_only() {
    let mut config = CheckConfig::new("[1, 2] * [3, 4]");
    config.max_array_dim = Some(0);

    assert_eq!(verdict(config.clone(), "11"), Verdict::Correct);
    let error = student_error(config, "[1, 2] * [3, 4]");
    assert_eq!(error.to_string(),
               "Vector and matrix expressions have been forbidden in this entry.");
}

#[test]
fn between_comparer() {
    let config = CheckConfig::new(Answer::with_params(["0", "1"]))
        .with_comparer(Comparer::per_sample(BetweenComparer::default()));

    assert_eq!(verdict(config.clone(), "1"), Verdict::Correct);
    assert_eq!(verdict(config.clone(), "1.5"), Verdict::Incorrect);
    assert_eq!(student_error(config.clone(), "2 + i").to_string(), "Input must be real.");

    let strict = config.with_comparer(Comparer::per_sample(BetweenComparer { strict: true }));
    assert_eq!(verdict(strict.clone(), "1"), Verdict::Incorrect);
    assert_eq!(verdict(strict, "0.5"), Verdict::Correct);
}

#[test]
fn congruence_comparer() {
    let modulus = 2.0 * std::f64::consts::PI;
    let comparer = Comparer::per_sample(CongruenceComparer { modulus });
    let config = CheckConfig::new("x").with_variables(["x"]).with_comparer(comparer);

    assert_eq!(verdict(config.clone(), "x + 2*pi"), Verdict::Correct);
    assert_eq!(verdict(config.clone(), "x - 4*pi"), Verdict::Correct);
    assert_eq!(verdict(config, "x + pi"), Verdict::Incorrect);
}

#[test]
fn linear_comparer_recognizes_proportional_answers() {
    let comparer = Comparer::correlated(LinearComparer::default());
    let config = CheckConfig::new("x^2").with_variables(["x"]).with_comparer(comparer);

    assert!(check(config.clone(), "x*x").unwrap().is_correct());

    let result = check(config.clone(), "3*x^2").unwrap();
    assert_eq!(result.ok, Verdict::Partial);
    assert_eq!(result.grade_decimal, 0.5);
    assert_eq!(result.msg, PROPORTIONAL_MESSAGE);

    assert_eq!(verdict(config, "x^2 + 1"), Verdict::Incorrect);
}

#[test]
fn linear_comparer_offsets() {
    let comparer = LinearComparer { offset: Some(0.25),
                                    offset_msg: "Check your constant.".to_string(),
                                    ..LinearComparer::default() };
    let config = CheckConfig::new("x^2").with_variables(["x"])
                                        .with_comparer(Comparer::correlated(comparer));

    let result = check(config, "x^2 + 1").unwrap();
    assert_eq!(result.grade_decimal, 0.25);
    assert_eq!(result.msg, "Check your constant.");
}

#[test]
fn linear_comparer_needs_three_samples() {
    let comparer = Comparer::correlated(LinearComparer::default());
    let config = CheckConfig::new("x").with_variables(["x"])
                                      .with_samples(2)
                                      .with_comparer(comparer);
    assert!(matches!(config_error(config), ConfigError::Invalid { .. }));
}

#[test]
fn dependent_and_numbered_variables() {
    let config = CheckConfig::new("y").with_variables(["x", "y"])
                                      .with_sample_from("y", DependentSampler::new(["x"], "2*x"));
    assert_eq!(verdict(config, "x + x"), Verdict::Correct);

    let config = CheckConfig::new("a_{1} - a_{2}").with_numbered_var("a");
    assert_eq!(verdict(config.clone(), "-(a_{2} - a_{1})"), Verdict::Correct);
    assert_eq!(verdict(config, "a_{2} - a_{1}"), Verdict::Incorrect);
}

#[test]
fn constants_suffixes_and_identity() {
    let config = CheckConfig::new("g*t").with_variables(["t"])
                                        .with_user_constant("g", 9.8);
    assert_eq!(verdict(config, "9.8*t"), Verdict::Correct);

    let mut config = CheckConfig::new("0.002");
    config.metric_suffixes = true;
    assert_eq!(verdict(config, "2m"), Verdict::Correct);

    let mut config = CheckConfig::new("[[3, 1], [0, 3]]");
    config.identity = Some(IdentityConstant::Sized(2));
    assert_eq!(verdict(config.clone(), "3*I + [[0, 1], [0, 0]]"), Verdict::Correct);
    config.identity = Some(IdentityConstant::Multiple);
    assert_eq!(verdict(config, "3*I + [[0, 1], [0, 0]]"), Verdict::Correct);
}

#[test]
fn configuration_mistakes_are_rejected_up_front() {
    let declared = || CheckConfig::new("x").with_variables(["x"]);

    assert!(matches!(config_error(CheckConfig::default()), ConfigError::Invalid { .. }));
    assert!(matches!(config_error(declared().with_samples(0)), ConfigError::Invalid { .. }));
    assert!(matches!(config_error(declared().with_tolerance(Tolerance::Absolute(-1.0))),
                     ConfigError::Invalid { .. }));
    let between = Comparer::per_sample(BetweenComparer::default());
    assert!(matches!(config_error(declared().with_comparer(between)), ConfigError::Invalid { .. }));
    assert!(matches!(config_error(CheckConfig::new(Answer::new("x").graded(1.5, ""))),
                     ConfigError::Invalid { .. }));

    let mut both = declared();
    both.whitelist = Some(vec!["sin".to_string()]);
    both.blacklist = vec!["cos".to_string()];
    assert!(matches!(config_error(both), ConfigError::Invalid { .. }));

    let mut required = declared();
    required.blacklist = vec!["sin".to_string()];
    required.required_functions = vec!["sin".to_string()];
    assert!(matches!(config_error(required), ConfigError::Invalid { .. }));

    let mut identity = declared();
    identity.identity = Some(IdentityConstant::Sized(0));
    assert!(matches!(config_error(identity), ConfigError::Invalid { .. }));

    let undeclared = declared().with_sample_from("y", ScalarSampler::default());
    assert!(matches!(config_error(undeclared),
                     ConfigError::SamplingSet { ref name, .. } if name == "y"));

    let bad_set = declared().with_sample_from("x",
                                              ScalarSampler::RealInterval(Interval::new(2.0, 1.0)));
    assert!(matches!(config_error(bad_set), ConfigError::SamplingSet { .. }));

    assert!(matches!(config_error(CheckConfig::new("2*(x")),
                     ConfigError::InvalidExpression { .. }));
    let dependent = CheckConfig::new("y").with_variables(["y"])
                                         .with_sample_from("y", DependentSampler::new(["x"], "(x"));
    assert!(matches!(config_error(dependent), ConfigError::InvalidExpression { .. }));
}

#[test]
fn errors_say_who_caused_them() {
    let config = CheckConfig::new("1/(x - x)").with_variables(["x"]);
    let error = check(config, "x").unwrap_err();
    assert!(!error.is_student_facing());
    assert!(matches!(error, GradingError::Config(ConfigError::ReferenceEvaluation { .. })));

    let config = CheckConfig::new("x").with_variables(["x"]);
    let error = check(config, "x +").unwrap_err();
    assert!(error.is_student_facing());
}

#[test]
fn circular_dependents_surface_when_sampled() {
    let config = CheckConfig::new("p").with_variables(["p", "q"])
                                      .with_sample_from("p", DependentSampler::new(["q"], "q"))
                                      .with_sample_from("q", DependentSampler::new(["p"], "p"));
    let error = check(config, "p").unwrap_err();
    assert!(matches!(error, GradingError::Config(ConfigError::CircularDependency { .. })));
}

#[test]
fn debug_appendix_lists_samples() {
    let mut config = CheckConfig::new("x").with_variables(["x"]).with_samples(2);
    config.debug = true;

    let result = check(config, "x").unwrap();
    assert!(result.is_correct());
    assert!(result.msg.starts_with("MathGrader Debug Info\nStudent Response: x"),
            "{}",
            result.msg);
    assert!(result.msg.contains("Evaluation Data for Sample Number 2 of 2"));
    assert!(result.msg.contains("Compare to (answer 1): ["));
}

#[test]
fn tolerances_parse_and_bound() {
    assert_eq!("5%".parse::<Tolerance>().unwrap(), Tolerance::Percent(5.0));
    assert_eq!("0.5".parse::<Tolerance>().unwrap(), Tolerance::Absolute(0.5));
    assert!("wide".parse::<Tolerance>().is_err());

    let expected = Value::from(200.0);
    assert!(Tolerance::Percent(1.0).within(&expected, &Value::from(201.5)));
    assert!(!Tolerance::Percent(1.0).within(&expected, &Value::from(203.0)));
    assert!(Tolerance::Absolute(0.1).within(&Value::from(0.0), &Value::from(0.05)));
    assert!(!Tolerance::default().within(&Value::nan(), &Value::nan()));
}
