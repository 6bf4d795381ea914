/// The outcome of a comparison: [`result::Verdict`] and
/// [`result::ComparisonResult`].
pub mod result;

/// Absolute and relative tolerances.
pub mod tolerance;

/// Comparers deciding whether an input matches an answer, one sample at a
/// time or across all samples.
pub mod comparer;

/// The [`config::CheckConfig`] describing one problem.
pub mod config;

/// Forbidden strings, required functions and permitted functions.
pub mod policy;

/// The sampling protocol tying configuration, sampling, evaluation and
/// comparison together.
pub mod protocol;
