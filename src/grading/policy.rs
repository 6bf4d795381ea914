use std::collections::BTreeSet;

use crate::{
    error::{MathError, MathResult},
    grading::config::CheckConfig,
    interpreter::evaluator::function::core::BUILTIN_FUNCTIONS,
    util::text::{pluralize, strip_whitespace},
};

/// Integrity rules applied to an input that compared as correct.
///
/// These hold regardless of numeric agreement: an input may be numerically
/// right and still be rejected for using a function it was not meant to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPolicy {
    permitted:         BTreeSet<String>,
    required:          Vec<String>,
    forbidden_strings: Vec<String>,
    forbidden_message: String,
}

impl InputPolicy {
    /// Derives the rules from a check configuration.
    ///
    /// Permitted functions are the whitelist, or the default library minus
    /// the blacklist, plus every user function.
    #[must_use]
    pub fn from_config(config: &CheckConfig) -> Self {
        let mut permitted = match &config.whitelist {
            Some(whitelist) => whitelist.iter().cloned().collect::<BTreeSet<_>>(),
            None => BUILTIN_FUNCTIONS.iter()
                                     .filter(|name| !config.blacklist.iter().any(|b| b == *name))
                                     .map(|name| (*name).to_string())
                                     .collect(),
        };
        permitted.extend(config.user_functions.keys().cloned());

        Self { permitted,
               required: config.required_functions.clone(),
               forbidden_strings: config.forbidden_strings
                                        .iter()
                                        .map(|s| strip_whitespace(s))
                                        .filter(|s| !s.is_empty())
                                        .collect(),
               forbidden_message: config.forbidden_message.clone() }
    }

    /// Names of the functions an input may use.
    #[must_use]
    pub const fn permitted(&self) -> &BTreeSet<String> {
        &self.permitted
    }

    /// Applies the rules to the raw input and the functions it used.
    ///
    /// Forbidden strings are checked first, then required functions, then
    /// permitted functions.
    ///
    /// # Errors
    /// [`MathError::InvalidInput`] describing the violation.
    ///
    /// # Example
    /// ```
    /// use std::collections::BTreeSet;
    ///
    /// use mathgrader::grading::{config::CheckConfig, policy::InputPolicy};
    ///
    /// let mut config = CheckConfig::new("sin(2*x)");
    /// config.blacklist = vec!["sin".to_string()];
    /// let policy = InputPolicy::from_config(&config);
    ///
    /// let used = BTreeSet::from(["sin".to_string()]);
    /// let error = policy.check("sin(2*x)", &used).unwrap_err();
    /// assert_eq!(error.to_string(), "Invalid Input: function 'sin' not permitted in answer");
    /// ```
    pub fn check(&self, input: &str, functions_used: &BTreeSet<String>) -> MathResult<()> {
        let stripped = strip_whitespace(input);
        if self.forbidden_strings.iter().any(|s| stripped.contains(s.as_str())) {
            return Err(MathError::invalid_input(self.forbidden_message.clone()));
        }

        if let Some(name) = self.required.iter().find(|name| !functions_used.contains(*name)) {
            return Err(MathError::invalid_input(format!("Invalid Input: Answer must contain \
                                                         the function {name}")));
        }

        let forbidden = functions_used.iter()
                                      .filter(|name| !self.permitted.contains(*name))
                                      .map(|name| format!("'{name}'"))
                                      .collect::<Vec<_>>();
        if !forbidden.is_empty() {
            return Err(MathError::invalid_input(format!("Invalid Input: {} {} not permitted \
                                                         in answer",
                                                        pluralize(forbidden.len(),
                                                                  "function",
                                                                  "functions"),
                                                        forbidden.join(", "))));
        }

        Ok(())
    }
}
