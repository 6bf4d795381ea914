use std::fmt::Display;

/// Overall outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Full credit.
    Correct,
    /// Some credit, but not all.
    Partial,
    /// No credit.
    Incorrect,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Correct => write!(f, "correct"),
            Self::Partial => write!(f, "partial"),
            Self::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// The result of comparing a student's input with an expected answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Outcome.
    pub ok:            Verdict,
    /// Credit awarded, between 0 and 1.
    pub grade_decimal: f64,
    /// Feedback shown to the student; may be empty.
    pub msg:           String,
}

impl ComparisonResult {
    /// Full credit, no message.
    #[must_use]
    pub const fn correct() -> Self {
        Self { ok:            Verdict::Correct,
               grade_decimal: 1.0,
               msg:           String::new(), }
    }

    /// No credit, no message.
    #[must_use]
    pub const fn incorrect() -> Self {
        Self { ok:            Verdict::Incorrect,
               grade_decimal: 0.0,
               msg:           String::new(), }
    }

    /// A result whose verdict follows from its grade.
    ///
    /// # Example
    /// ```
    /// use mathgrader::grading::result::{ComparisonResult, Verdict};
    ///
    /// assert_eq!(ComparisonResult::from_grade(1.0, "").ok, Verdict::Correct);
    /// assert_eq!(ComparisonResult::from_grade(0.5, "close").ok, Verdict::Partial);
    /// assert_eq!(ComparisonResult::from_grade(0.0, "").ok, Verdict::Incorrect);
    /// ```
    #[must_use]
    pub fn from_grade(grade_decimal: f64, msg: impl Into<String>) -> Self {
        let grade_decimal = grade_decimal.clamp(0.0, 1.0);
        let ok = if grade_decimal >= 1.0 {
            Verdict::Correct
        } else if grade_decimal > 0.0 {
            Verdict::Partial
        } else {
            Verdict::Incorrect
        };
        Self { ok,
               grade_decimal,
               msg: msg.into() }
    }

    /// A result that is correct or incorrect with no message.
    #[must_use]
    pub const fn from_bool(ok: bool) -> Self {
        if ok { Self::correct() } else { Self::incorrect() }
    }

    /// Whether full credit was awarded.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.ok == Verdict::Correct
    }
}

impl Display for ComparisonResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (grade {})", self.ok, self.grade_decimal)?;
        if !self.msg.is_empty() {
            write!(f, ": {}", self.msg)?;
        }
        Ok(())
    }
}
