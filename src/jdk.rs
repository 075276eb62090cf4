use crate::error::{ErrorKind, JaviError, Span};
use crate::evaluator;
use crate::executor::VariableTable;
use crate::scan;
use rand::Rng;

/// The supported Math methods, the only host-library surface the evaluator
/// maps onto besides System.out.
pub const MATH_METHODS: &[&str] = &[
    "abs", "max", "min", "sqrt", "pow", "round", "floor", "ceil", "random",
];

/// Evaluate a `Math.<method>(args...)` call. Argument expressions are
/// comma-split with the paren-depth-aware splitter (so nested calls like
/// `Math.pow(Math.abs(x), 2)` survive) and each is evaluated recursively.
pub fn eval_math_call(
    method: &str,
    args_text: &str,
    span: &Span,
    vars: &VariableTable,
) -> Result<f64, JaviError> {
    let args = eval_args(method, args_text, span, vars)?;

    match method {
        "abs" => Ok(arity_1(method, &args, span)?.abs()),
        "max" => {
            let (a, b) = arity_2(method, &args, span)?;
            Ok(a.max(b))
        }
        "min" => {
            let (a, b) = arity_2(method, &args, span)?;
            Ok(a.min(b))
        }
        "sqrt" => Ok(arity_1(method, &args, span)?.sqrt()),
        "pow" => {
            let (a, b) = arity_2(method, &args, span)?;
            Ok(a.powf(b))
        }
        "round" => {
            // Half-up, matching Java's Math.round.
            Ok((arity_1(method, &args, span)? + 0.5).floor())
        }
        "floor" => Ok(arity_1(method, &args, span)?.floor()),
        "ceil" => Ok(arity_1(method, &args, span)?.ceil()),
        "random" => {
            if !args.is_empty() {
                return Err(arity_error(method, 0, args.len(), span));
            }
            Ok(rand::thread_rng().gen::<f64>())
        }
        _ => Err(JaviError::new(
            ErrorKind::UnsupportedMathMethod,
            span.clone(),
            format!("Unsupported Math method: Math.{}", method),
        )),
    }
}

fn eval_args(
    method: &str,
    args_text: &str,
    span: &Span,
    vars: &VariableTable,
) -> Result<Vec<f64>, JaviError> {
    if args_text.trim().is_empty() {
        return Ok(Vec::new());
    }

    scan::split_top_level(args_text, ',')
        .into_iter()
        .map(|arg| {
            let value = evaluator::evaluate(arg, span, vars)?;
            value.as_number().ok_or_else(|| {
                JaviError::new(
                    ErrorKind::CoercionFailure,
                    span.clone(),
                    format!(
                        "Math.{} expects numeric arguments, got {} '{}'",
                        method,
                        value.type_name(),
                        value
                    ),
                )
            })
        })
        .collect()
}

fn arity_1(method: &str, args: &[f64], span: &Span) -> Result<f64, JaviError> {
    match args {
        [n] => Ok(*n),
        _ => Err(arity_error(method, 1, args.len(), span)),
    }
}

fn arity_2(method: &str, args: &[f64], span: &Span) -> Result<(f64, f64), JaviError> {
    match args {
        [a, b] => Ok((*a, *b)),
        _ => Err(arity_error(method, 2, args.len(), span)),
    }
}

fn arity_error(method: &str, want: usize, got: usize, span: &Span) -> JaviError {
    JaviError::with_help(
        ErrorKind::UnrecognizedExpression,
        span.clone(),
        format!(
            "Math.{} takes {} argument{}, got {}",
            method,
            want,
            if want == 1 { "" } else { "s" },
            got
        ),
        format!("Check the argument list of Math.{}.", method),
    )
}
