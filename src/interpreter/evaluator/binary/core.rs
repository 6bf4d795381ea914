use crate::{
    ast::{Expr, ProductOperator, SumOperator},
    error::{MathError, MathResult},
    interpreter::{
        evaluator::{
            binary::{
                array::{add_values, sub_values},
                matmul::{div_values, mul_values},
            },
            core::Context,
        },
        value::{core::Value, scalar::Scalar},
    },
};

impl Context<'_> {
    /// Evaluates a chain of additions and subtractions from left to right.
    pub(crate) fn eval_sum(&mut self,
                           operands: &[Expr],
                           operators: &[SumOperator])
                           -> MathResult<Value> {
        let Some(values) = self.eval_children(operands)? else {
            return Ok(Value::nan());
        };
        let Some((first, rest)) = values.split_first() else {
            return Ok(Value::nan());
        };

        rest.iter()
            .zip(operators)
            .try_fold(first.clone(), |acc, (value, op)| match op {
                SumOperator::Add => add_values(&acc, value),
                SumOperator::Subtract => sub_values(&acc, value),
            })
    }

    /// Evaluates a chain of multiplications and divisions from left to
    /// right.
    ///
    /// Because `vector * vector` is a dot product, a flat chain that meets
    /// another vector after two vectors have already been dotted has no
    /// single reading and is rejected; the student must add parentheses.
    ///
    /// # Parameters
    /// - `operands`: Operands, in order.
    /// - `operators`: One operator between each pair of operands.
    ///
    /// # Returns
    /// The product, or a [`MathError::Shape`] for ambiguous or incompatible
    /// operands.
    pub(crate) fn eval_product(&mut self,
                               operands: &[Expr],
                               operators: &[ProductOperator])
                               -> MathResult<Value> {
        let Some(values) = self.eval_children(operands)? else {
            return Ok(Value::nan());
        };

        let Some((first, rest)) = values.split_first() else {
            return Ok(Value::nan());
        };

        // Once two vectors have contracted to a scalar, any later vector
        // makes the grouping matter.
        let mut contracted = false;
        rest.iter()
            .zip(operators)
            .try_fold(first.clone(), |acc, (value, op)| match op {
                ProductOperator::Multiply => {
                    if value.is_vector() {
                        if contracted {
                            return Err(MathError::shape("Multiplying three or more vectors is \
                                                         ambiguous. Please make your meaning \
                                                         explicit using parentheses."));
                        }
                        contracted = acc.is_vector();
                    }
                    mul_values(&acc, value)
                },
                ProductOperator::Divide => div_values(&acc, value),
            })
    }

    /// Evaluates the parallel operator: `a||b = 1/(1/a + 1/b)`.
    ///
    /// A zero operand makes the result undefined, which is reported as NaN
    /// rather than as an error.
    pub(crate) fn eval_parallel(&mut self, operands: &[Expr]) -> MathResult<Value> {
        let Some(values) = self.eval_children(operands)? else {
            return Ok(Value::nan());
        };

        let scalars = values.iter()
                            .map(|v| {
                                v.as_scalar().ok_or_else(|| {
                                                 MathError::shape(format!(
                                    "Cannot use the parallel operator with a {}.",
                                    v.describe()
                                ))
                                             })
                            })
                            .collect::<MathResult<Vec<_>>>()?;

        if scalars.iter().any(|s| s.is_zero()) {
            return Ok(Value::nan());
        }

        let total = scalars.iter()
                           .try_fold(Scalar::ZERO, |acc, s| Ok::<_, MathError>(acc + s.recip()?))?;
        Ok(Value::Scalar(total.recip()?))
    }
}
