use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use crate::{
    ast::Expr,
    error::{MathError, MathResult},
    interpreter::{
        evaluator::{
            core::Context,
            function::{
                array, builtin,
                domain::{DomainShape, check_domain},
                special,
            },
        },
        value::core::Value,
    },
};

/// The callable body of a [`MathFunction`].
pub type FunctionBody = dyn Fn(&[Value]) -> MathResult<Value> + Send + Sync;

/// How many arguments a function takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The function must receive exactly this many arguments.
    Exact(usize),
    /// The function checks its own arguments, including their count.
    SelfValidating,
}

/// A named mathematical function available to formulas.
///
/// Bodies are shared behind an `Arc`, so cloning a function or a whole scope
/// is cheap. Errors raised by the body are reframed to name the function.
#[derive(Clone)]
pub struct MathFunction {
    name:  String,
    arity: Arity,
    body:  Arc<FunctionBody>,
}

impl Debug for MathFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MathFunction")
         .field("name", &self.name)
         .field("arity", &self.arity)
         .finish_non_exhaustive()
    }
}

impl MathFunction {
    /// Wraps a closure taking exactly `arity` arguments.
    ///
    /// # Example
    /// ```
    /// use mathgrader::interpreter::{evaluator::function::core::MathFunction, value::core::Value};
    ///
    /// let double = MathFunction::new("double", 1, |args| {
    ///     let x = args[0].as_scalar().unwrap();
    ///     Ok(Value::Scalar(x + x))
    /// });
    /// assert_eq!(double.call(&[Value::from(2.5)]).unwrap(), Value::from(5.0));
    /// assert!(double.call(&[]).is_err());
    /// ```
    pub fn new<F>(name: impl Into<String>, arity: usize, body: F) -> Self
        where F: Fn(&[Value]) -> MathResult<Value> + Send + Sync + 'static
    {
        Self { name:  name.into(),
               arity: Arity::Exact(arity),
               body:  Arc::new(body), }
    }

    /// Wraps a closure that validates its own argument list.
    pub fn self_validating<F>(name: impl Into<String>, body: F) -> Self
        where F: Fn(&[Value]) -> MathResult<Value> + Send + Sync + 'static
    {
        Self { name:  name.into(),
               arity: Arity::SelfValidating,
               body:  Arc::new(body), }
    }

    /// Wraps a closure behind a per-argument shape check.
    ///
    /// Every argument is validated before `body` runs, and a failure lists
    /// the status of each argument.
    pub fn with_domain<F>(name: impl Into<String>, shapes: Vec<DomainShape>, body: F) -> Self
        where F: Fn(&[Value]) -> MathResult<Value> + Send + Sync + 'static
    {
        let name = name.into();
        let label = name.clone();
        Self::self_validating(name, move |args| {
            check_domain(&label, &shapes, args)?;
            body(args)
        })
    }

    /// The same function under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self { name:  name.into(),
               arity: self.arity,
               body:  Arc::clone(&self.body), }
    }

    /// The name used in error messages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared arity.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.arity
    }

    /// Calls the function.
    ///
    /// # Errors
    /// [`MathError::ArgumentCount`] for a wrong number of arguments, or
    /// whatever the body raises, reframed by [`MathError::within_function`].
    pub fn call(&self, args: &[Value]) -> MathResult<Value> {
        if let Arity::Exact(expected) = self.arity
           && args.len() != expected
        {
            return Err(MathError::ArgumentCount { name: self.name.clone(),
                                                  expected,
                                                  received: args.len() });
        }

        (self.body)(args).map_err(|e| e.within_function(&self.name))
    }
}

/// Signature of the functions in the default library.
type BuiltinFn = fn(&[Value]) -> MathResult<Value>;

/// Defines the default function library as a static table.
///
/// Each entry gives a name, the expected shape of every argument and the
/// function pointer implementing it. The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                domain: $domain:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:   &'static str,
            domain: &'static [DomainShape],
            func:   BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, domain: $domain, func: $func },
            )*
        ];
        /// Names of every function in the default library.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

const SCALAR: &[DomainShape] = &[DomainShape::Scalar];
const SCALAR_PAIR: &[DomainShape] = &[DomainShape::Scalar, DomainShape::Scalar];
const ANY: &[DomainShape] = &[DomainShape::Any];
const SQUARE: &[DomainShape] = &[DomainShape::SquareMatrix];
const MATRIX: &[DomainShape] = &[DomainShape::Matrix(None)];
const VECTOR_3_PAIR: &[DomainShape] =
    &[DomainShape::Vector(Some(3)), DomainShape::Vector(Some(3))];

builtin_functions! {
    "sin"       => { domain: SCALAR, func: builtin::sin },
    "cos"       => { domain: SCALAR, func: builtin::cos },
    "tan"       => { domain: SCALAR, func: builtin::tan },
    "sec"       => { domain: SCALAR, func: builtin::sec },
    "csc"       => { domain: SCALAR, func: builtin::csc },
    "cot"       => { domain: SCALAR, func: builtin::cot },
    "arcsin"    => { domain: SCALAR, func: builtin::arcsin },
    "arccos"    => { domain: SCALAR, func: builtin::arccos },
    "arctan"    => { domain: SCALAR, func: builtin::arctan },
    "arcsec"    => { domain: SCALAR, func: builtin::arcsec },
    "arccsc"    => { domain: SCALAR, func: builtin::arccsc },
    "arccot"    => { domain: SCALAR, func: builtin::arccot },
    "arctan2"   => { domain: SCALAR_PAIR, func: builtin::arctan2 },
    "sinh"      => { domain: SCALAR, func: builtin::sinh },
    "cosh"      => { domain: SCALAR, func: builtin::cosh },
    "tanh"      => { domain: SCALAR, func: builtin::tanh },
    "sech"      => { domain: SCALAR, func: builtin::sech },
    "csch"      => { domain: SCALAR, func: builtin::csch },
    "coth"      => { domain: SCALAR, func: builtin::coth },
    "arcsinh"   => { domain: SCALAR, func: builtin::arcsinh },
    "arccosh"   => { domain: SCALAR, func: builtin::arccosh },
    "arctanh"   => { domain: SCALAR, func: builtin::arctanh },
    "arcsech"   => { domain: SCALAR, func: builtin::arcsech },
    "arccsch"   => { domain: SCALAR, func: builtin::arccsch },
    "arccoth"   => { domain: SCALAR, func: builtin::arccoth },
    "sqrt"      => { domain: SCALAR, func: builtin::sqrt },
    "ln"        => { domain: SCALAR, func: builtin::ln },
    "log10"     => { domain: SCALAR, func: builtin::log10 },
    "log2"      => { domain: SCALAR, func: builtin::log2 },
    "exp"       => { domain: SCALAR, func: builtin::exp },
    "abs"       => { domain: ANY, func: builtin::abs },
    "fact"      => { domain: SCALAR, func: special::factorial },
    "factorial" => { domain: SCALAR, func: special::factorial },
    "re"        => { domain: ANY, func: builtin::re },
    "im"        => { domain: ANY, func: builtin::im },
    "conj"      => { domain: ANY, func: builtin::conj },
    "det"       => { domain: SQUARE, func: array::det },
    "trace"     => { domain: SQUARE, func: array::trace },
    "trans"     => { domain: MATRIX, func: array::trans },
    "ctrans"    => { domain: MATRIX, func: array::ctrans },
    "adj"       => { domain: MATRIX, func: array::ctrans },
    "cross"     => { domain: VECTOR_3_PAIR, func: array::cross },
    "norm"      => { domain: ANY, func: array::norm },
}

static DEFAULT_FUNCTIONS: LazyLock<HashMap<String, MathFunction>> = LazyLock::new(|| {
    BUILTIN_TABLE.iter()
                 .map(|def| {
                     let function =
                         MathFunction::with_domain(def.name, def.domain.to_vec(), def.func);
                     (def.name.to_string(), function)
                 })
                 .collect()
});

/// Returns a copy of the default function library, keyed by name.
///
/// # Example
/// ```
/// use mathgrader::interpreter::{evaluator::function::core::default_functions,
///                               value::core::Value};
///
/// let functions = default_functions();
/// let sqrt = &functions["sqrt"];
/// assert_eq!(sqrt.call(&[Value::from(9.0)]).unwrap(), Value::from(3.0));
/// ```
#[must_use]
pub fn default_functions() -> HashMap<String, MathFunction> {
    DEFAULT_FUNCTIONS.clone()
}

impl Context<'_> {
    /// Evaluates a function call.
    ///
    /// Arguments are evaluated left to right before the function is looked
    /// up in the scope and called.
    ///
    /// # Parameters
    /// - `name`: Function name.
    /// - `arguments`: Argument expressions.
    ///
    /// # Returns
    /// The function result, or an error naming the function.
    pub(crate) fn eval_function_call(&mut self,
                                     name: &str,
                                     arguments: &[Expr])
                                     -> MathResult<Value> {
        let Some(args) = self.eval_children(arguments)? else {
            return Ok(Value::nan());
        };

        let function = self.scope.functions.get(name).ok_or_else(|| {
            MathError::UndefinedFunction { name:    name.to_string(),
                                           message: format!("Invalid Input: {name} not \
                                                             permitted in answer as a \
                                                             function"), }
        })?;

        log::trace!("calling {name} with {} argument(s)", args.len());
        function.call(&args)
    }
}
