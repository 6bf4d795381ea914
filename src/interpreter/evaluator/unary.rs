use crate::{
    ast::Expr,
    error::MathResult,
    interpreter::{
        evaluator::{
            binary::{array::negate_value, power::pow_values},
            core::Context,
        },
        value::core::Value,
    },
};

impl Context<'_> {
    /// Evaluates `count` leading minus signs: an odd count negates the
    /// operand, an even count leaves it unchanged.
    pub(crate) fn eval_negation(&mut self, count: usize, operand: &Expr) -> MathResult<Value> {
        let value = self.eval(operand)?;
        if value.has_nan() {
            return Ok(Value::nan());
        }

        if count % 2 == 1 {
            return Ok(negate_value(&value));
        }
        Ok(value)
    }

    /// Evaluates a power chain from the right.
    ///
    /// `a^b^c` is `a^(b^c)`. When a `-` directly follows a `^`, everything
    /// to its right is negated before it is used as the exponent.
    ///
    /// # Parameters
    /// - `operands`: The base followed by each exponent.
    /// - `negations`: One marker per `^`.
    ///
    /// # Returns
    /// The value of the whole chain.
    pub(crate) fn eval_power(&mut self,
                             operands: &[Expr],
                             negations: &[bool])
                             -> MathResult<Value> {
        let Some(values) = self.eval_children(operands)? else {
            return Ok(Value::nan());
        };
        let Some((last, bases)) = values.split_last() else {
            return Ok(Value::nan());
        };
        let negative_powers = self.options.negative_powers;

        bases.iter()
             .zip(negations)
             .rev()
             .try_fold(last.clone(), |exponent, (base, &negated)| {
                 let exponent = if negated { negate_value(&exponent) } else { exponent };
                 pow_values(base, &exponent, negative_powers)
             })
    }
}
