use std::{collections::BTreeSet, f64::consts::PI, sync::Arc};

use approx::assert_abs_diff_eq;
use mathgrader::{
    error::{MathError, ParseError},
    evaluate,
    interpreter::{
        cache::ParseCache,
        evaluator::{
            core::{EvalOptions, Evaluator, Scope},
            function::core::MathFunction,
        },
        value::{array::MathArray, core::Value},
    },
};

fn eval_with(formula: &str, scope: &Scope) -> Result<Value, MathError> {
    evaluate(formula, scope, &EvalOptions::default()).map(|(value, _)| value)
}

fn eval(formula: &str) -> Result<Value, MathError> {
    eval_with(formula, &Scope::with_defaults())
}

fn assert_real(formula: &str, expected: f64) {
    let value = eval(formula).unwrap_or_else(|e| panic!("{formula} failed: {e}"));
    let scalar = value.as_scalar()
                      .unwrap_or_else(|| panic!("{formula} gave a non-scalar {value}"));
    assert_abs_diff_eq!(scalar.re(), expected, epsilon = 1e-12);
    assert_abs_diff_eq!(scalar.im(), 0.0, epsilon = 1e-12);
}

fn assert_error_message(formula: &str, scope: &Scope, expected: &str) {
    match eval_with(formula, scope) {
        Ok(value) => panic!("{formula} evaluated to {value}, expected an error"),
        Err(e) => assert_eq!(e.to_string(), expected, "wrong message for {formula}"),
    }
}

fn vector(data: &[f64]) -> Value {
    Value::Array(MathArray::real_vector(data).unwrap())
}

fn matrix(rows: &[Vec<f64>]) -> Value {
    Value::Array(MathArray::real_matrix(rows).unwrap())
}

#[test]
fn negation_parity() {
    assert_real("-3", -3.0);
    assert_real("--3", 3.0);
    assert_real("---3", -3.0);
    assert_real("----3", 3.0);
    assert_real("+3", 3.0);
    assert_real("1--1", 2.0);

    for formula in ["--+3", "+-+3", "1---1", "1+-+1", "++3"] {
        assert!(matches!(eval(formula), Err(MathError::Parse(_))), "{formula} should not parse");
    }
}

#[test]
fn power_is_right_associative() {
    assert_real("2^3^2", 512.0);
    assert_real("2^-2^2", 0.0625);
    assert_real("(2^3)^2", 64.0);
    assert_real("-2^2", -4.0);
}

#[test]
fn parallel_operator() {
    let value = eval("4||3||2").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value.re(), 12.0 / 13.0, epsilon = 1e-12);

    assert!(eval("1||0").unwrap().has_nan());
    assert_error_message("[1,2]||3",
                         &Scope::with_defaults(),
                         "Cannot use the parallel operator with a vector of length 2.");
}

#[test]
fn nan_short_circuits_before_overflow() {
    assert!(eval("(1||0)*10^400").unwrap().has_nan());
    assert_eq!(eval("10^400*(1||0)"), Err(MathError::Overflow));

    let options = EvalOptions { allow_inf: true,
                                ..EvalOptions::default() };
    let (value, _) = evaluate("10^400", &Scope::with_defaults(), &options).unwrap();
    assert_eq!(value, Value::from(f64::INFINITY));
}

#[test]
fn operator_precedence_and_suffixes() {
    assert_real("1+2*3", 7.0);
    assert_real("2*3^2", 18.0);
    assert_real("12/3/2", 2.0);
    assert_real("50%", 0.5);
    assert_real("2*50%", 1.0);

    assert!(matches!(eval("2k"), Err(MathError::Parse(_))));
    let metric = Scope::with_defaults().with_metric_suffixes();
    let value = eval_with("2k + 3m", &metric).unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value.re(), 2000.003, epsilon = 1e-9);

    let kilo = Scope::with_defaults().with_suffix("k", 1024.0);
    assert_eq!(eval_with("2k", &kilo).unwrap(), Value::from(2048.0));
}

#[test]
fn implicit_multiplication_is_rejected() {
    let scope = Scope::with_defaults().with_variable("x", 2.0);
    for formula in ["2x", "2(x)", "(1)(2)", "x(2)"] {
        assert!(eval_with(formula, &scope).is_err(), "{formula} should fail");
    }
}

#[test]
fn complex_results() {
    for formula in ["sqrt(-4)", "(-4)^0.5"] {
        let value = eval(formula).unwrap().as_scalar().unwrap();
        assert_abs_diff_eq!(value.re(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(value.im(), 2.0, epsilon = 1e-12);
    }

    let value = eval("i^2").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value.re(), -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(value.im(), 0.0, epsilon = 1e-12);

    let value = eval("ln(-1)").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value.im(), PI, epsilon = 1e-12);

    assert_real("abs(3+4*i)", 5.0);
    assert_real("re(3+4*i)", 3.0);
    assert_real("im(conj(3+4*i))", -4.0);
}

#[test]
fn default_functions() {
    assert_real("sin(pi/2)", 1.0);
    assert_real("2*sin(pi/6)*cos(pi/6) - sin(pi/3)", 0.0);
    assert_real("sec(0)", 1.0);
    assert_real("arctan2(1, 1)", PI / 4.0);
    assert_real("log10(1000)", 3.0);
    assert_real("log2(8)", 3.0);
    assert_real("exp(0)", 1.0);
    assert_real("fact(5)", 120.0);
    assert_real("factorial(0)", 1.0);
}

#[test]
fn factorial_domain() {
    let value = eval("fact(0.5)").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value.re(), PI.sqrt() / 2.0, epsilon = 1e-12);

    for formula in ["fact(-1)", "fact(-2)"] {
        assert!(matches!(eval(formula), Err(MathError::Domain { .. })), "{formula}");
    }

    assert_eq!(eval("fact(500)"), Err(MathError::Overflow));
    let options = EvalOptions { allow_inf: true,
                                ..EvalOptions::default() };
    let (value, _) = evaluate("fact(500)", &Scope::with_defaults(), &options).unwrap();
    assert_eq!(value, Value::from(f64::INFINITY));
}

#[test]
fn argument_count() {
    assert_error_message("sin(1, 2)",
                         &Scope::with_defaults(),
                         "Wrong number of arguments passed to sin(...): Expected 1 inputs, but \
                          received 2.");
}

#[test]
fn division_by_zero() {
    assert_eq!(eval("1/0"), Err(MathError::ZeroDivision));
    assert_eq!(eval("0^-1"), Err(MathError::ZeroDivision));
}

#[test]
fn undefined_names_suggest_alternatives() {
    let scope = Scope::with_defaults().with_variable("x", 5.0);
    assert_error_message("X",
                         &scope,
                         "Invalid Input: X not permitted in answer as a variable (did you mean \
                          x?)");

    let error = eval_with("Sin(x)", &scope).unwrap_err();
    assert!(matches!(error, MathError::UndefinedFunction { .. }));
    assert!(error.to_string().contains("did you mean sin?"), "{error}");

    let error = eval_with("x(2)", &scope).unwrap_err();
    assert!(error.to_string().contains("did you forget to use * for multiplication?"),
            "{error}");

    let error = eval_with("sin", &scope).unwrap_err();
    assert!(error.to_string().contains("did you forget the parentheses after sin?"),
            "{error}");
}

#[test]
fn unbalanced_brackets() {
    let error = eval("(1+(2)").unwrap_err();
    assert!(matches!(error, MathError::Parse(ParseError::UnbalancedBrackets { .. })));
    assert!(error.to_string().contains("1 parenthesis was opened without being closed"));
}

#[test]
fn array_algebra() {
    assert_eq!(eval("[1, 2] + [3, 4]").unwrap(), vector(&[4.0, 6.0]));
    assert_eq!(eval("[1, 2] * [3, 4]").unwrap(), Value::from(11.0));
    assert_eq!(eval("2 * [1, 2]").unwrap(), vector(&[2.0, 4.0]));
    assert_eq!(eval("[[1, 2], [3, 4]] * [1, 1]").unwrap(), vector(&[3.0, 7.0]));
    assert_eq!(eval("[[1, 2], [3, 4]]^2").unwrap(),
               matrix(&[vec![7.0, 10.0], vec![15.0, 22.0]]));
    assert_real("det([[1, 2], [3, 4]])", -2.0);
    assert_real("trace([[1, 2], [3, 4]])", 5.0);
    assert_real("norm([3, 4])", 5.0);
    assert_eq!(eval("cross([1, 0, 0], [0, 1, 0])").unwrap(), vector(&[0.0, 0.0, 1.0]));
    assert_eq!(eval("trans([[1, 2], [3, 4]])").unwrap(),
               matrix(&[vec![1.0, 3.0], vec![2.0, 4.0]]));
}

#[test]
fn matrix_inverse_and_negative_powers() {
    let value = eval("[[1, 2], [3, 4]]^-1").unwrap();
    let inverse = value.as_array().unwrap();
    let expected = [-2.0, 1.0, 1.5, -0.5];
    for (entry, want) in inverse.data().iter().zip(expected) {
        assert_abs_diff_eq!(entry.re(), want, epsilon = 1e-12);
    }

    let options = EvalOptions { negative_powers: false,
                                ..EvalOptions::default() };
    let error = evaluate("[[1, 2], [3, 4]]^-1", &Scope::with_defaults(), &options).unwrap_err();
    assert_eq!(error.to_string(), "Cannot raise a matrix to negative powers.");

    assert!(matches!(eval("[[1, 2], [2, 4]]^-1"), Err(MathError::Domain { .. })));
}

#[test]
fn complex_determinants_and_inverses() {
    let det = eval("det([[i, 0], [0, i]])").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(det.re(), -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(det.im(), 0.0, epsilon = 1e-12);

    let det = eval("det([[1, 2], [3, 4]] + i*[[1, 0], [0, 1]])").unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(det.re(), -3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(det.im(), 5.0, epsilon = 1e-12);

    let value = eval("[[i, 0], [0, 2]]^-1").unwrap();
    let inverse = value.as_array().unwrap();
    let expected = [(0.0, -1.0), (0.0, 0.0), (0.0, 0.0), (0.5, 0.0)];
    for (entry, (re, im)) in inverse.data().iter().zip(expected) {
        assert_abs_diff_eq!(entry.re(), re, epsilon = 1e-12);
        assert_abs_diff_eq!(entry.im(), im, epsilon = 1e-12);
    }

    assert!(matches!(eval("[[i, 1], [-1, i]]^-1"), Err(MathError::Domain { .. })));
}

#[test]
fn shape_errors_are_exact() {
    let scope = Scope::with_defaults();
    assert_error_message("[[1, 2, 3], [4, 5, 6]] + [[1, 2], [3, 4], [5, 6]]",
                         &scope,
                         "Cannot add/subtract a matrix of shape (rows: 2, cols: 3) with a \
                          matrix of shape (rows: 3, cols: 2).");
    assert_error_message("[1, 2] * [1, 2, 3]",
                         &scope,
                         "Cannot calculate the dot product of a vector of length 2 with a \
                          vector of length 3.");
    assert_error_message("[[1, 2], [3]]",
                         &scope,
                         "Unable to parse vector/matrix. If you're trying to enter a matrix, \
                          this is most likely caused by an unequal number of elements in each \
                          row.");
}

#[test]
fn ambiguous_triple_vector_product() {
    let scope = Scope::with_defaults().with_variable("i", vector(&[1.0, 0.0, 0.0]))
                                      .with_variable("j", vector(&[0.0, 1.0, 0.0]))
                                      .with_variable("k", vector(&[0.0, 0.0, 1.0]));
    let message = "Multiplying three or more vectors is ambiguous. Please make your meaning \
                   explicit using parentheses.";

    assert_error_message("i*i*j", &scope, message);
    assert_error_message("i*2*i*3*j", &scope, message);
    assert_eq!(eval_with("(i*i)*j", &scope).unwrap(), vector(&[0.0, 1.0, 0.0]));
}

#[test]
fn vectors_after_a_dot_product_need_parentheses() {
    let scope = Scope::with_defaults().with_variable("v", vector(&[1.0, 0.0, 0.0]))
                                      .with_variable("w", vector(&[1.0, 1.0, 0.0]))
                                      .with_variable("u", vector(&[0.0, 0.0, 1.0]))
                                      .with_variable("M",
                                                     matrix(&[vec![2.0, 0.0, 0.0],
                                                              vec![0.0, 2.0, 0.0],
                                                              vec![0.0, 0.0, 2.0]]));
    let message = "Multiplying three or more vectors is ambiguous. Please make your meaning \
                   explicit using parentheses.";

    assert_eq!(eval_with("v*M*w", &scope).unwrap(), Value::from(2.0));
    assert_eq!(eval_with("2*v*3*w", &scope).unwrap(), Value::from(6.0));
    assert_eq!(eval_with("v*w*M", &scope).unwrap(),
               matrix(&[vec![2.0, 0.0, 0.0], vec![0.0, 2.0, 0.0], vec![0.0, 0.0, 2.0]]));
    assert_eq!(eval_with("(v*w)*M*u", &scope).unwrap(), vector(&[0.0, 0.0, 2.0]));

    // (v*w)*(M*u) and (v*(w*M))*u differ.
    assert_error_message("v*w*M*u", &scope, message);
    assert_error_message("M*v*w*u", &scope, message);
}

#[test]
fn max_array_dim_is_enforced() {
    let scope = Scope::with_defaults();
    let limited = |dim| EvalOptions { max_array_dim: Some(dim),
                                      ..EvalOptions::default() };

    let error = evaluate("[1, 2]", &scope, &limited(0)).unwrap_err();
    assert_eq!(error.to_string(),
               "Vector and matrix expressions have been forbidden in this entry.");
    let error = evaluate("[[1, 2], [3, 4]]", &scope, &limited(1)).unwrap_err();
    assert_eq!(error.to_string(), "Matrix expressions have been forbidden in this entry.");
    assert!(evaluate("[[1, 2], [3, 4]]", &scope, &limited(2)).is_ok());

    let (_, metadata) = evaluate("[[1, 2], [3, 4]]", &scope, &EvalOptions::default()).unwrap();
    assert_eq!(metadata.max_array_dim_used, 2);
}

#[test]
fn metadata_lists_used_names() {
    let scope = Scope::with_defaults().with_variable("x", 1.0);
    let (_, metadata) = evaluate("sin(x) + 50%", &scope, &EvalOptions::default()).unwrap();
    assert_eq!(metadata.variables_used, BTreeSet::from(["x".to_string()]));
    assert_eq!(metadata.functions_used, BTreeSet::from(["sin".to_string()]));
    assert_eq!(metadata.suffixes_used, BTreeSet::from(["%".to_string()]));
}

#[test]
fn user_functions_are_reframed() {
    let reciprocal = MathFunction::new("f", 1, |args| {
        let x = args[0].as_scalar().unwrap_or_default();
        Ok(Value::Scalar(mathgrader::interpreter::value::scalar::Scalar::ONE.checked_div(x)?))
    });
    let scope = Scope::with_defaults().with_function(reciprocal);

    assert_eq!(eval_with("f(4)", &scope).unwrap(), Value::from(0.25));
    assert_error_message("f(0)",
                         &scope,
                         "There was an error evaluating function f(...). Its input does not \
                          seem to be in its domain.");
}

#[test]
fn parse_cache_is_shared_and_stable() {
    let cache = Arc::new(ParseCache::new());
    let evaluator = Evaluator::with_cache(Arc::clone(&cache));
    let suffixes = Scope::with_defaults().suffix_names();

    let first = evaluator.parse("x^2 + 1", &suffixes).unwrap();
    let second = evaluator.parse("x ^ 2+1", &suffixes).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);

    let scope = Scope::with_defaults().with_variable("x", 3.0);
    let options = EvalOptions::default();
    for _ in 0..3 {
        let (value, _) = evaluator.evaluate("x^2 + 1", &scope, &options).unwrap();
        assert_eq!(value, Value::from(10.0));
    }
    assert_eq!(scope.variables["x"], Value::from(3.0));
}
