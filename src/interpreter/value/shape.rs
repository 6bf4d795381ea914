/// Describes a shape the way error messages present it.
///
/// # Example
/// ```
/// use mathgrader::interpreter::value::shape::describe_shape;
///
/// assert_eq!(describe_shape(&[]), "scalar");
/// assert_eq!(describe_shape(&[3]), "vector of length 3");
/// assert_eq!(describe_shape(&[2, 3]), "matrix of shape (rows: 2, cols: 3)");
/// assert_eq!(describe_shape(&[2, 3, 4]), "tensor of shape (2, 3, 4)");
/// ```
#[must_use]
pub fn describe_shape(shape: &[usize]) -> String {
    match shape {
        [] => "scalar".to_string(),
        [n] => format!("vector of length {n}"),
        [rows, cols] => format!("matrix of shape (rows: {rows}, cols: {cols})"),
        dims => {
            let dims = dims.iter().map(ToString::to_string).collect::<Vec<_>>();
            format!("tensor of shape ({})", dims.join(", "))
        },
    }
}

/// Names the kind of object a shape represents: `scalar`, `vector`, `matrix`
/// or `tensor`.
#[must_use]
pub const fn shape_kind(shape: &[usize]) -> &'static str {
    match shape.len() {
        0 => "scalar",
        1 => "vector",
        2 => "matrix",
        _ => "tensor",
    }
}
