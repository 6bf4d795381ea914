use std::fs;

use mathgrader::{
    evaluate,
    interpreter::evaluator::core::{EvalOptions, Scope},
};
use walkdir::WalkDir;

/// Runs every `tests/cases/*.txt` table.
///
/// Each non-empty line not starting with `#` is either
/// `expression => expected`, where `expected` is a real number or `nan`, or
/// `! expression` for a formula that must fail.
#[test]
fn expression_tables() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/cases").into_iter()
                                   .filter_map(Result::ok)
                                   .filter(|e| e.path().extension().is_some_and(|ext| ext == "txt"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (line_number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            count += 1;
            let location = format!("{}:{}", path.display(), line_number + 1);

            if let Some(formula) = line.strip_prefix('!') {
                assert_failure(formula.trim(), &location);
            } else {
                let (formula, expected) =
                    line.split_once("=>")
                        .unwrap_or_else(|| panic!("{location}: missing '=>' in '{line}'"));
                assert_value(formula.trim(), expected.trim(), &location);
            }
        }
    }

    assert!(count > 0, "No expression cases found in tests/cases");
}

fn scope() -> Scope {
    Scope::with_defaults().with_variable("x", 2.0)
                          .with_variable("y", 3.0)
}

fn assert_value(formula: &str, expected: &str, location: &str) {
    let (value, _) = evaluate(formula, &scope(), &EvalOptions::default())
        .unwrap_or_else(|e| panic!("{location}: '{formula}' failed: {e}"));
    let scalar = value.as_scalar()
                      .unwrap_or_else(|| panic!("{location}: '{formula}' gave {value}"));

    if expected == "nan" {
        assert!(scalar.is_nan(), "{location}: '{formula}' gave {scalar}, expected NaN");
        return;
    }

    let expected = expected.parse::<f64>()
                           .unwrap_or_else(|e| panic!("{location}: bad expectation: {e}"));
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!((scalar.re() - expected).abs() <= tolerance && scalar.im().abs() <= tolerance,
            "{location}: '{formula}' gave {scalar}, expected {expected}");
}

fn assert_failure(formula: &str, location: &str) {
    if let Ok((value, _)) = evaluate(formula, &scope(), &EvalOptions::default()) {
        panic!("{location}: '{formula}' evaluated to {value} but was expected to fail");
    }
}
