use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use mathgrader::{
    calculus::{
        integral::{integrate, integrate_with},
        quadrature::QuadratureOptions,
        summation::{Parity, summation},
    },
    error::MathError,
    interpreter::{
        evaluator::core::{Evaluator, Scope},
        value::{array::MathArray, core::Value},
    },
};

fn scope() -> Scope {
    Scope::with_defaults().with_variable("a", 2.0)
}

fn integral(lower: &str, upper: &str, integrand: &str) -> Result<(f64, f64), MathError> {
    let result = integrate(&Evaluator::new(), &scope(), lower, upper, integrand, "x")?;
    Ok((result.re(), result.im()))
}

fn sum(lower: &str, upper: &str, summand: &str, parity: Parity) -> Result<Value, MathError> {
    summation(&Evaluator::new(), &scope(), lower, upper, summand, "n", parity)
}

fn real_sum(lower: &str, upper: &str, summand: &str) -> f64 {
    let value = sum(lower, upper, summand, Parity::All).unwrap();
    value.as_scalar().unwrap().re()
}

#[test]
fn finite_integrals() {
    let (re, im) = integral("0", "pi", "sin(x)").unwrap();
    assert_abs_diff_eq!(re, 2.0, epsilon = 1e-10);
    assert_eq!(im, 0.0);

    let (re, _) = integral("0", "a", "x").unwrap();
    assert_abs_diff_eq!(re, 2.0, epsilon = 1e-12);

    let (re, _) = integral("a", "0", "x").unwrap();
    assert_abs_diff_eq!(re, -2.0, epsilon = 1e-12);

    let (re, _) = integral("1", "1", "1/x").unwrap();
    assert_eq!(re, 0.0);
}

#[test]
fn infinite_integrals() {
    let (re, _) = integral("-infty", "infty", "e^(-x^2)").unwrap();
    assert_abs_diff_eq!(re, PI.sqrt(), epsilon = 1e-7);

    let (re, _) = integral("1", "infty", "1/x^2").unwrap();
    assert_abs_diff_eq!(re, 1.0, epsilon = 1e-7);

    let (re, _) = integral("-infty", "0", "1/(1+x^2)").unwrap();
    assert_abs_diff_eq!(re, PI / 2.0, epsilon = 1e-7);
}

#[test]
fn complex_integrands() {
    let (re, im) = integral("0", "1", "e^(i*x)").unwrap();
    assert_abs_diff_eq!(re, 1.0_f64.sin(), epsilon = 1e-10);
    assert_abs_diff_eq!(im, 1.0 - 1.0_f64.cos(), epsilon = 1e-10);

    // sqrt turns complex only for negative x.
    let (re, im) = integral("-1", "1", "sqrt(x)").unwrap();
    assert_abs_diff_eq!(re, 2.0 / 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(im, 2.0 / 3.0, epsilon = 1e-6);
}

#[test]
fn integration_errors() {
    let error = integral("0", "i", "x").unwrap_err();
    assert_eq!(error.to_string(),
               "Integration Error: Integration limits must be real but have evaluated to \
                complex numbers.");

    let error = integral("0", "1", "[x, 1]").unwrap_err();
    assert!(matches!(error, MathError::Integration { .. }));
    assert!(error.to_string().contains("must evaluate to a scalar"), "{error}");

    let error = integral("0", "1", "y").unwrap_err();
    assert!(matches!(error, MathError::UndefinedVariable { .. }));
}

#[test]
fn subdivision_limit_is_reported() {
    let options = QuadratureOptions { limit: 2,
                                      ..QuadratureOptions::default() };
    let error = integrate_with(&Evaluator::new(),
                               &scope(),
                               ["0", "1"],
                               "sin(1/x)",
                               "x",
                               &options).unwrap_err();
    assert_eq!(error.to_string(),
               "Integration Error: The maximum number of subdivisions (2) has been achieved.");
}

#[test]
fn finite_sums() {
    assert_eq!(real_sum("1", "10", "n"), 55.0);
    assert_eq!(real_sum("0", "3", "a^n"), 15.0);
    assert_eq!(real_sum("5", "1", "n"), 0.0);
    assert_eq!(real_sum("-2", "2", "n^3"), 0.0);

    let even = sum("1", "10", "n", Parity::Even).unwrap();
    assert_eq!(even, Value::from(30.0));
    let odd = sum("-3", "3", "1", Parity::Odd).unwrap();
    assert_eq!(odd, Value::from(4.0));
}

#[test]
fn infinite_sums_use_cutoffs() {
    let basel = real_sum("1", "infty", "1/n^2");
    assert_abs_diff_eq!(basel, PI * PI / 6.0, epsilon = 1.1e-3);

    let exp_two = real_sum("0", "infty", "a^n/fact(n)");
    assert_abs_diff_eq!(exp_two, 2.0_f64.exp(), epsilon = 1e-9);

    // -1000..=1000 is symmetric, so the odd terms cancel.
    assert_eq!(real_sum("-infty", "infty", "n"), 0.0);
}

#[test]
fn factorial_series_stop_before_overflow() {
    let e = real_sum("0", "infty", "1/fact(n)");
    assert_abs_diff_eq!(e, 1.0_f64.exp(), epsilon = 1e-12);

    let two_e = real_sum("0", "infty", "n^2/factorial(n)");
    assert_abs_diff_eq!(two_e, 2.0 * 1.0_f64.exp(), epsilon = 1e-12);

    // fact(171) is past the largest finite double.
    assert_eq!(sum("0", "200", "1/fact(n)", Parity::All), Err(MathError::Overflow));
}

#[test]
fn array_sums() {
    let value = sum("1", "3", "[n, 1]", Parity::All).unwrap();
    assert_eq!(value, Value::Array(MathArray::real_vector(&[6.0, 3.0]).unwrap()));
}

#[test]
fn summation_errors() {
    let error = sum("0.5", "3", "n", Parity::All).unwrap_err();
    assert_eq!(error.to_string(),
               "Summation Error: Summation limits must be integers, but have evaluated to \
                non-integers.");

    let error = sum("0", "i", "n", Parity::All).unwrap_err();
    assert!(matches!(error, MathError::Summation { .. }));

    let error = sum("0", "10^7", "n", Parity::All).unwrap_err();
    assert!(matches!(error, MathError::Summation { .. }));

    let error = sum("1", "3", "1/(n-2)", Parity::All).unwrap_err();
    assert_eq!(error, MathError::ZeroDivision);
}

#[test]
fn parity_names() {
    assert_eq!("odd".parse::<Parity>().unwrap(), Parity::Odd);
    assert_eq!("even".parse::<Parity>().unwrap(), Parity::Even);
    assert_eq!("all".parse::<Parity>().unwrap(), Parity::All);
    assert!("prime".parse::<Parity>().is_err());
}
