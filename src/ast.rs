use std::collections::BTreeSet;

/// Operators that may appear between the operands of a [`Expr::Sum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
}

/// Operators that may appear between the operands of a [`Expr::Product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductOperator {
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

/// An abstract syntax tree (AST) node representing a formula.
///
/// Each variant corresponds to one level of the grammar. Operator levels only
/// produce a node when the operator actually occurs, so `x` parses to a bare
/// [`Expr::Variable`] rather than a chain of single-operand wrappers.
///
/// Trees are immutable once built and never hold a reference to an
/// evaluation scope; the same tree is evaluated against many scopes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal, optionally followed by a suffix such as `%` or `k`.
    ///
    /// Example: `2.5e3`, `50%`.
    Number {
        /// The literal value, before the suffix is applied.
        value:  f64,
        /// The suffix name, if any.
        suffix: Option<String>,
    },
    /// A variable reference.
    ///
    /// Example: `x`, `a_{1}`, `f'`.
    Variable {
        /// The name of the variable.
        name: String,
    },
    /// A function call with at least one argument.
    ///
    /// Example: `sin(x)`, `arctan2(y, x)`.
    Function {
        /// The function name.
        name:      String,
        /// Argument expressions, in order.
        arguments: Vec<Self>,
    },
    /// An array literal. Nested literals produce matrices and tensors.
    ///
    /// Example: `[1, 2, 3]`, `[[1, 2], [3, 4]]`.
    Array {
        /// Element expressions, in order.
        elements: Vec<Self>,
    },
    /// A right-associative exponentiation chain.
    ///
    /// `negations[k]` records whether a `-` directly followed the `k`-th `^`,
    /// so `a^-b^c` is stored as operands `[a, b, c]` and negations
    /// `[true, false]`, meaning `a^(-(b^c))`.
    Power {
        /// Base followed by each exponent.
        operands:  Vec<Self>,
        /// One marker per `^`.
        negations: Vec<bool>,
    },
    /// One or more leading minus signs.
    ///
    /// Example: `--x` has a count of 2 and evaluates to `x`.
    Negation {
        /// Number of minus signs.
        count:   usize,
        /// The negated expression.
        operand: Box<Self>,
    },
    /// The parallel-resistor operator: `a||b||c = 1/(1/a + 1/b + 1/c)`.
    Parallel {
        /// Operands, in order.
        operands: Vec<Self>,
    },
    /// A left-to-right chain of `*` and `/`.
    Product {
        /// Operands, in order.
        operands:  Vec<Self>,
        /// One operator between each pair of operands.
        operators: Vec<ProductOperator>,
    },
    /// A left-to-right chain of `+` and `-`, with an optional leading `+`.
    Sum {
        /// Whether the chain started with a unary `+`.
        leading_plus: bool,
        /// Operands, in order.
        operands:     Vec<Self>,
        /// One operator between each pair of operands.
        operators:    Vec<SumOperator>,
    },
    /// A parenthesized expression.
    ///
    /// Kept as its own node so that explicit grouping is visible to the
    /// evaluator, which matters for chained vector products.
    Parentheses {
        /// The grouped expression.
        inner: Box<Self>,
    },
}

/// Names referenced syntactically by a formula.
///
/// These are collected regardless of whether they are later found in the
/// evaluation scope, and drive both name validation and the decision of which
/// variables need to be sampled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedNames {
    /// Variable names.
    pub variables: BTreeSet<String>,
    /// Function names.
    pub functions: BTreeSet<String>,
    /// Numeric suffixes.
    pub suffixes:  BTreeSet<String>,
}

impl UsedNames {
    /// Adds every name from `other` into `self`.
    pub fn extend(&mut self, other: &Self) {
        self.variables.extend(other.variables.iter().cloned());
        self.functions.extend(other.functions.iter().cloned());
        self.suffixes.extend(other.suffixes.iter().cloned());
    }
}

impl Expr {
    /// Collects every variable, function and suffix name in the tree.
    ///
    /// # Example
    /// ```
    /// use mathgrader::ast::Expr;
    ///
    /// let tree = Expr::Function { name:      "sin".to_string(),
    ///                             arguments: vec![Expr::Variable { name: "x".to_string() }], };
    /// let names = tree.used_names();
    /// assert!(names.functions.contains("sin"));
    /// assert!(names.variables.contains("x"));
    /// ```
    #[must_use]
    pub fn used_names(&self) -> UsedNames {
        let mut names = UsedNames::default();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut UsedNames) {
        match self {
            Self::Number { suffix, .. } => {
                if let Some(suffix) = suffix {
                    names.suffixes.insert(suffix.clone());
                }
            },
            Self::Variable { name } => {
                names.variables.insert(name.clone());
            },
            Self::Function { name, arguments } => {
                names.functions.insert(name.clone());
                arguments.iter().for_each(|arg| arg.collect_names(names));
            },
            Self::Array { elements: children }
            | Self::Power { operands: children, .. }
            | Self::Parallel { operands: children }
            | Self::Product { operands: children, .. }
            | Self::Sum { operands: children, .. } => {
                children.iter().for_each(|child| child.collect_names(names));
            },
            Self::Negation { operand: inner, .. } | Self::Parentheses { inner } => {
                inner.collect_names(names);
            },
        }
    }
}
