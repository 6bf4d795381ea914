use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use mathgrader::{
    calculus::{
        integral::integrate,
        summation::{Parity, summation},
    },
    error::GradingError,
    evaluate,
    grading::{config::CheckConfig, protocol::Checker, tolerance::Tolerance},
    interpreter::evaluator::core::{EvalOptions, Evaluator, Scope},
};
use rand::{SeedableRng, rngs::StdRng};

/// mathgrader evaluates formulas and checks them against reference answers
/// by random sampling.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluates a formula.
    Eval {
        expression: String,

        /// Binds a variable, as in `--var x=2` or `--var z=1+2*i`.
        #[arg(long = "var", value_parser = parse_binding)]
        vars: Vec<(String, String)>,

        /// Accepts infinite results instead of reporting an overflow.
        #[arg(long)]
        allow_inf: bool,

        /// Largest array dimension allowed: 0 scalars, 1 vectors, 2 matrices.
        #[arg(long)]
        max_array_dim: Option<usize>,

        /// Enables the metric suffixes k M G T m u n p.
        #[arg(long)]
        metric: bool,
    },
    /// Checks an input against a reference answer.
    Check {
        /// Reference formula.
        #[arg(long)]
        answer: String,

        /// Formula to check.
        #[arg(long)]
        input: String,

        /// Comma-separated variable names.
        #[arg(long, value_delimiter = ',')]
        variables: Vec<String>,

        /// Number of samples.
        #[arg(long, default_value_t = 5)]
        samples: usize,

        /// Samples allowed to disagree.
        #[arg(long, default_value_t = 0)]
        failable: usize,

        /// Tolerance, absolute (`0.001`) or relative (`0.1%`).
        #[arg(long)]
        tolerance: Option<Tolerance>,

        /// Seed for reproducible sampling.
        #[arg(long)]
        seed: Option<u64>,

        /// Appends per-sample evaluation data to the message.
        #[arg(long)]
        debug: bool,
    },
    /// Computes a definite integral.
    Integrate {
        lower:     String,
        upper:     String,
        integrand: String,

        /// Integration variable.
        #[arg(long, default_value = "x")]
        variable: String,
    },
    /// Sums a formula over a range of integers.
    Sum {
        lower:   String,
        upper:   String,
        summand: String,

        /// Summation variable.
        #[arg(long, default_value = "n")]
        variable: String,

        /// Which integers to include.
        #[arg(long, value_enum, default_value_t = ParityArg::All)]
        parity: ParityArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ParityArg {
    All,
    Even,
    Odd,
}

impl From<ParityArg> for Parity {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::All => Self::All,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
        }
    }
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    let (name, value) = s.split_once('=')
                         .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}

fn run(command: Command) -> Result<(), GradingError> {
    match command {
        Command::Eval { expression,
                        vars,
                        allow_inf,
                        max_array_dim,
                        metric, } => {
            let mut scope = Scope::with_defaults();
            if metric {
                scope = scope.with_metric_suffixes();
            }
            for (name, formula) in vars {
                let (value, _) = evaluate(&formula, &scope, &EvalOptions::default())?;
                scope = scope.with_variable(name, value);
            }

            let options = EvalOptions { max_array_dim,
                                        allow_inf,
                                        ..EvalOptions::default() };
            let (value, _) = evaluate(&expression, &scope, &options)?;
            println!("{value}");
        },
        Command::Check { answer,
                         input,
                         variables,
                         samples,
                         failable,
                         tolerance,
                         seed,
                         debug, } => {
            let mut config = CheckConfig::new(answer.as_str()).with_variables(variables)
                                                              .with_samples(samples)
                                                              .with_failable_evals(failable);
            if let Some(tolerance) = tolerance {
                config = config.with_tolerance(tolerance);
            }
            config.debug = debug;

            let checker = Checker::new(config)?;
            let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            let result = checker.check(&input, &mut rng)?;
            println!("{result}");
        },
        Command::Integrate { lower,
                             upper,
                             integrand,
                             variable, } => {
            let value = integrate(&Evaluator::new(),
                                  &Scope::with_defaults(),
                                  &lower,
                                  &upper,
                                  &integrand,
                                  &variable)?;
            println!("{value}");
        },
        Command::Sum { lower,
                       upper,
                       summand,
                       variable,
                       parity, } => {
            let value = summation(&Evaluator::new(),
                                  &Scope::with_defaults(),
                                  &lower,
                                  &upper,
                                  &summand,
                                  &variable,
                                  parity.into())?;
            println!("{value}");
        },
    }
    Ok(())
}
