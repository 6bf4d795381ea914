use std::collections::BTreeMap;

use approx::assert_abs_diff_eq;
use mathgrader::{
    error::ConfigError,
    interpreter::{
        evaluator::{
            core::{EvalOptions, Evaluator, Scope},
            function::core::MathFunction,
        },
        value::{array::MathArray, core::Value},
    },
    sampling::{
        array::{
            ArraySampler, Determinant, IdentityMultipleSampler, OrthogonalSampler,
            SquareMatrixSampler, Symmetry,
        },
        core::{SamplingPlan, VariableSamplingSet},
        dependent::{DependentSampler, resolve_dependents},
        function::{FunctionSamplingSet, RandomFunction},
        scalar::{Interval, ScalarSampler},
    },
};
use rand::{SeedableRng, rngs::StdRng};

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn real(value: &Value) -> f64 {
    let scalar = value.as_scalar().unwrap_or_else(|| panic!("{value} is not a scalar"));
    assert_eq!(scalar.im(), 0.0, "{value} is not real");
    scalar.re()
}

fn array(value: &Value) -> &MathArray {
    value.as_array().unwrap_or_else(|| panic!("{value} is not an array"))
}

fn assert_close_to_identity(matrix: &MathArray) {
    let n = matrix.shape()[0];
    for row in 0..n {
        for col in 0..n {
            let expected = if row == col { 1.0 } else { 0.0 };
            let entry = matrix.get(row, col);
            assert_abs_diff_eq!(entry.re(), expected, epsilon = 1e-9);
            assert_abs_diff_eq!(entry.im(), 0.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn scalar_samplers_stay_in_range() {
    let mut rng = rng(1);

    let interval = ScalarSampler::RealInterval(Interval::new(-2.0, 2.0));
    let integers = ScalarSampler::IntegerRange { start: -3,
                                                 stop:  3, };
    let discrete = ScalarSampler::DiscreteSet(vec![Value::from(1.0), Value::from(10.0)]);
    let sector = ScalarSampler::complex_sector();
    let rectangle = ScalarSampler::complex_rectangle();

    for _ in 0..200 {
        assert!((-2.0..=2.0).contains(&real(&interval.sample(&mut rng))));

        let n = real(&integers.sample(&mut rng));
        assert!((-3.0..=3.0).contains(&n) && n.fract() == 0.0, "{n}");

        let d = real(&discrete.sample(&mut rng));
        assert!(d == 1.0 || d == 10.0);

        let z = sector.sample(&mut rng).as_scalar().unwrap();
        assert!((1.0 - 1e-12..=3.0 + 1e-12).contains(&z.abs()));
        assert!(z.re() >= -1e-12 && z.im() >= -1e-12);

        let w = rectangle.sample(&mut rng).as_scalar().unwrap();
        assert!((1.0..=3.0).contains(&w.re()) && (1.0..=3.0).contains(&w.im()));
    }

    assert_eq!(ScalarSampler::default(),
               ScalarSampler::RealInterval(Interval::new(1.0, 5.0)));
}

#[test]
fn malformed_scalar_sets_are_rejected() {
    let cases = [ScalarSampler::RealInterval(Interval::new(3.0, 1.0)),
                 ScalarSampler::RealInterval(Interval::new(0.0, f64::INFINITY)),
                 ScalarSampler::IntegerRange { start: 5,
                                               stop:  1, },
                 ScalarSampler::DiscreteSet(Vec::new()),
                 ScalarSampler::ComplexSector { modulus:  Interval::new(-1.0, 1.0),
                                                argument: Interval::new(0.0, 1.0), }];

    for set in cases {
        assert!(matches!(set.validate("x"), Err(ConfigError::SamplingSet { .. })), "{set:?}");
    }
}

#[test]
fn array_samplers_respect_shape_and_norm() {
    let mut rng = rng(2);

    for sampler in [ArraySampler::real_vectors(3),
                    ArraySampler::complex_vectors(2),
                    ArraySampler::real_matrices(2, 3),
                    ArraySampler::complex_matrices(3, 3)]
    {
        sampler.validate("A").unwrap();
        for _ in 0..20 {
            let value = sampler.sample("A", &mut rng).unwrap();
            assert_eq!(value.shape(), sampler.shape.as_slice());
            assert!((1.0 - 1e-9..=5.0 + 1e-9).contains(&value.norm()));
            assert_eq!(array(&value).is_real(), !sampler.complex);
        }
    }
}

#[test]
fn square_matrices_honour_structure() {
    let mut rng = rng(3);

    let symmetric = SquareMatrixSampler { dimension: 3,
                                          symmetry: Symmetry::Symmetric,
                                          traceless: true,
                                          ..SquareMatrixSampler::default() };
    let value = symmetric.sample("S", &mut rng).unwrap();
    let s = array(&value);
    assert_abs_diff_eq!(s.trace().re(), 0.0, epsilon = 1e-9);
    for row in 0..3 {
        for col in 0..3 {
            assert_abs_diff_eq!(s.get(row, col).re(), s.get(col, row).re(), epsilon = 1e-12);
        }
    }

    let hermitian = SquareMatrixSampler { dimension: 2,
                                          symmetry: Symmetry::Hermitian,
                                          determinant: Some(Determinant::One),
                                          ..SquareMatrixSampler::default() };
    let value = hermitian.sample("H", &mut rng).unwrap();
    let h = array(&value);
    assert_abs_diff_eq!(h.determinant().re(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(h.get(0, 1).im(), -h.get(1, 0).im(), epsilon = 1e-12);

    let singular = SquareMatrixSampler { dimension: 3,
                                         symmetry: Symmetry::Antisymmetric,
                                         determinant: Some(Determinant::Zero),
                                         ..SquareMatrixSampler::default() };
    singular.validate("A").unwrap();
    let value = singular.sample("A", &mut rng).unwrap();
    assert!(array(&value).determinant().abs() < 1e-9);
}

#[test]
fn unsupported_square_matrix_combinations_are_rejected() {
    let even_antisymmetric = SquareMatrixSampler { dimension: 2,
                                                   symmetry: Symmetry::Antisymmetric,
                                                   determinant: Some(Determinant::Zero),
                                                   ..SquareMatrixSampler::default() };
    assert!(even_antisymmetric.validate("A").is_err());

    let empty = SquareMatrixSampler { dimension: 0,
                                      ..SquareMatrixSampler::default() };
    assert!(empty.validate("A").is_err());
}

#[test]
fn orthogonal_and_unitary_matrices() {
    let mut rng = rng(4);

    let orthogonal = OrthogonalSampler { dimension: 3,
                                         complex:   false,
                                         unit_det:  false, };
    let value = orthogonal.sample("Q", &mut rng).unwrap();
    let q = array(&value);
    assert_close_to_identity(&q.matmul(&q.transpose()));

    let unitary = OrthogonalSampler { dimension: 2,
                                      complex:   true,
                                      unit_det:  true, };
    let value = unitary.sample("U", &mut rng).unwrap();
    let u = array(&value);
    assert_close_to_identity(&u.matmul(&u.conj_transpose()));
    assert_abs_diff_eq!(u.determinant().re(), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(u.determinant().im(), 0.0, epsilon = 1e-9);
}

#[test]
fn identity_multiples() {
    let sampler = IdentityMultipleSampler { dimension: 2,
                                            scale:     Interval::new(2.0, 2.0), };
    let value = sampler.sample(&mut rng(5));
    assert_eq!(value,
               Value::Array(MathArray::real_matrix(&[vec![2.0, 0.0], vec![0.0, 2.0]]).unwrap()));
}

#[test]
fn random_functions_are_fixed_once_drawn() {
    let mut rng = rng(6);
    let f = RandomFunction::default().sample("f", &mut rng);

    let first = f.call(&[Value::from(0.3)]).unwrap();
    let second = f.call(&[Value::from(0.3)]).unwrap();
    assert_eq!(first, second);
    assert!(real(&first).abs() <= 10.0 + 1e-9);

    let complex = f.call(&[Value::complex(0.3, 0.1)]).unwrap();
    assert_ne!(complex.as_scalar().unwrap().im(), 0.0);

    let vector_valued = RandomFunction { input_dim: 2,
                                         output_dim: 3,
                                         ..RandomFunction::default() };
    let g = vector_valued.sample("g", &mut rng);
    assert_eq!(g.call(&[Value::from(1.0), Value::from(2.0)]).unwrap().shape(), &[3]);
    assert!(g.call(&[Value::from(1.0)]).is_err());

    let error = f.call(&[Value::Array(MathArray::real_vector(&[1.0, 2.0]).unwrap())])
                 .unwrap_err();
    assert!(error.to_string().contains("expects scalar inputs"), "{error}");
}

#[test]
fn specific_functions_take_the_slot_name() {
    let double = MathFunction::new("double", 1, |args| {
        let x = args[0].as_scalar().unwrap_or_default();
        Ok(Value::Scalar(x + x))
    });
    let set = FunctionSamplingSet::Specific(vec![double]);
    let f = set.sample("f", &mut rng(7)).unwrap();

    assert_eq!(f.name(), "f");
    assert_eq!(f.call(&[Value::from(2.0)]).unwrap(), Value::from(4.0));
    assert!(FunctionSamplingSet::Specific(Vec::new()).validate("f").is_err());
}

#[test]
fn dependents_resolve_in_order() {
    let evaluator = Evaluator::new();
    let mut scope = Scope::with_defaults().with_variable("x", 3.0);
    let pending = BTreeMap::from([("a".to_string(), DependentSampler::new(["b"], "2*b")),
                                  ("b".to_string(), DependentSampler::new(["c"], "c+1")),
                                  ("c".to_string(), DependentSampler::new(["x"], "x^2"))]);

    resolve_dependents(&pending, &mut scope, &evaluator).unwrap();
    assert_eq!(scope.variables["c"], Value::from(9.0));
    assert_eq!(scope.variables["b"], Value::from(10.0));
    assert_eq!(scope.variables["a"], Value::from(20.0));
}

#[test]
fn circular_dependents_are_config_errors() {
    let evaluator = Evaluator::new();
    let mut scope = Scope::with_defaults();
    let pending = BTreeMap::from([("p".to_string(), DependentSampler::new(["q"], "q+1")),
                                  ("q".to_string(), DependentSampler::new(["p"], "p+1")),
                                  ("r".to_string(), DependentSampler::new(["pi"], "pi"))]);

    let error = resolve_dependents(&pending, &mut scope, &evaluator).unwrap_err();
    assert_eq!(error,
               ConfigError::CircularDependency { names: vec!["p".to_string(),
                                                             "q".to_string()], });
    assert!(scope.variables.contains_key("r"));

    let broken = BTreeMap::from([("s".to_string(), DependentSampler::new(["pi"], "pi+"))]);
    let error = resolve_dependents(&broken, &mut scope, &evaluator).unwrap_err();
    assert!(matches!(error, ConfigError::InvalidExpression { .. }));
}

#[test]
fn plans_sample_only_what_is_referenced() {
    let evaluator = Evaluator::new();
    let base = Scope::with_defaults();

    let mut plan = SamplingPlan::default();
    plan.variables.insert("x".to_string(),
                          ScalarSampler::RealInterval(Interval::new(1.0, 2.0)).into());
    plan.variables.insert("unused".to_string(), VariableSamplingSet::default());
    plan.variables.insert("y".to_string(), DependentSampler::new(["x"], "x + 10").into());
    plan.variables.insert("a".to_string(),
                          ScalarSampler::DiscreteSet(vec![Value::from(7.0)]).into());
    plan.numbered_vars.insert("a".to_string());
    plan.functions.insert("f".to_string(), FunctionSamplingSet::default());
    plan.validate().unwrap();

    let used = evaluator.parse("y + a_{2} + f(1)", &base.suffix_names()).unwrap().names.clone();
    let scope = plan.sample_scope(&used, &base, &evaluator, &mut rng(8)).unwrap();

    let x = real(&scope.variables["x"]);
    assert!((1.0..=2.0).contains(&x));
    assert_eq!(real(&scope.variables["y"]), x + 10.0);
    assert_eq!(scope.variables["a_{2}"], Value::from(7.0));
    assert!(!scope.variables.contains_key("unused"));
    assert!(scope.functions.contains_key("f"));

    let (value, _) = evaluator.evaluate("y + a_{2} + f(1)", &scope, &EvalOptions::default())
                              .unwrap();
    assert!(value.as_scalar().is_some());
}
