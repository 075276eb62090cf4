use crate::arith;
use crate::error::{JaviError, Span};
use crate::executor::VariableTable;
use crate::jdk;
use crate::scan;
use crate::value::Value;

/// Evaluate an expression against the current variable table.
///
/// Resolution order, first match wins:
/// 1. string/char literal
/// 2. numeric literal
/// 3. boolean literal
/// 4. declared variable
/// 5. `Math.<method>(...)` call spanning the whole expression
/// 6. additive expression, folded left-to-right with Java's mixed
///    string/number `+` semantics
/// 7. arithmetic (`- * /`, parentheses, unary minus)
pub fn evaluate(text: &str, span: &Span, vars: &VariableTable) -> Result<Value, JaviError> {
    let text = text.trim();

    if let Some(inner) = string_literal(text) {
        return Ok(Value::Str(inner.to_string()));
    }

    if let Some(n) = numeric_literal(text) {
        return Ok(Value::Number(n));
    }

    match text {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    if scan::is_identifier(text) {
        if let Some(variable) = vars.get(text) {
            return Ok(variable.value.clone());
        }
        // Unknown bare names fall through; the arithmetic parser names them
        // in its error message.
    }

    if let Some((method, args)) = math_call(text) {
        return jdk::eval_math_call(method, args, span, vars).map(Value::Number);
    }

    let parts = scan::split_top_level(text, '+');
    if parts.len() > 1 && parts.iter().all(|part| !part.trim().is_empty()) {
        return fold_additive(&parts, span, vars);
    }

    arith::evaluate_arithmetic(text, span, vars).map(Value::Number)
}

/// Left-to-right fold over the `+`-split parts, in original order.
///
/// Numeric + numeric adds; anything else concatenates the accumulated value's
/// string form. This ordering is what makes `"x=" + 1 + 2` produce "x=12"
/// while `1 + 2 + "a"` produces "3a".
fn fold_additive(parts: &[&str], span: &Span, vars: &VariableTable) -> Result<Value, JaviError> {
    let mut iter = parts.iter();
    let first = iter.next().expect("split always yields at least one part");
    let mut acc = evaluate(first, span, vars)?;

    for part in iter {
        let next = evaluate(part, span, vars)?;
        acc = match (acc.as_number(), next.as_number()) {
            (Some(a), Some(b)) => Value::Number(a + b),
            _ => Value::Str(format!("{}{}", acc, next)),
        };
    }

    Ok(acc)
}

/// A single string or char literal spanning the whole text: same quote at
/// both ends, no further occurrence of that quote inside. The inner text is
/// returned verbatim, with no escape processing.
pub(crate) fn string_literal(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if first != '"' && first != '\'' {
        return None;
    }
    if text.len() < 2 || !text.ends_with(first) {
        return None;
    }
    let inner = &text[1..text.len() - first.len_utf8()];
    if inner.contains(first) {
        return None;
    }
    Some(inner)
}

/// `digits(.digits)?` spanning the whole text.
fn numeric_literal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_digit() {
        return None;
    }
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if i >= bytes.len() || !bytes[i].is_ascii_digit() {
            return None;
        }
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i != bytes.len() {
        return None;
    }
    text.parse::<f64>().ok()
}

/// A `Math.<method>(...)` call whose closing paren ends the expression.
fn math_call(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("Math.")?;
    let paren_rel = rest.find('(')?;
    let method = &rest[..paren_rel];
    if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let paren_abs = "Math.".len() + paren_rel;
    let close = scan::find_matching(text, paren_abs, '(', ')')?;
    if close != text.len() - 1 {
        return None;
    }
    Some((method, &text[paren_abs + 1..close]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::JavaType;

    fn eval(text: &str) -> Result<Value, JaviError> {
        let vars = VariableTable::new();
        evaluate(text, &Span::single(0), &vars)
    }

    fn eval_with(text: &str, vars: &VariableTable) -> Value {
        evaluate(text, &Span::single(0), vars).unwrap()
    }

    #[test]
    fn test_literals() {
        let tests = vec![
            (r#""hello""#, Value::Str("hello".to_string())),
            ("'c'", Value::Str("c".to_string())),
            ("42", Value::Number(42.0)),
            ("3.14", Value::Number(3.14)),
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
        ];

        for (input, expected) in tests {
            assert_eq!(eval(input).unwrap(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_mixed_plus_folds_left_to_right() {
        // The critical pair: Java's chained + is left-associative, so the
        // numeric prefix sums before a string operand switches to concat.
        let tests = vec![
            (r#""a" + 1 + 2"#, Value::Str("a12".to_string())),
            (r#"1 + 2 + "a""#, Value::Str("3a".to_string())),
            (r#""Hello " + "World""#, Value::Str("Hello World".to_string())),
            ("1 + 2 + 3", Value::Number(6.0)),
            (r#""x" + true"#, Value::Str("xtrue".to_string())),
            (r#"1 + "a" + 2"#, Value::Str("1a2".to_string())),
        ];

        for (input, expected) in tests {
            assert_eq!(eval(input).unwrap(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        let tests = vec![
            ("2 + 3 * 4", 14.0),
            ("(2 + 3) * 4", 20.0),
            ("10 - 2 * 3", 4.0),
            ("-3 + 5", 2.0),
        ];

        for (input, expected) in tests {
            assert_eq!(
                eval(input).unwrap(),
                Value::Number(expected),
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_variable_resolution() {
        let mut vars = VariableTable::new();
        vars.declare("x".to_string(), JavaType::Int, Value::Number(5.0));
        vars.declare(
            "name".to_string(),
            JavaType::Str,
            Value::Str("Ada".to_string()),
        );

        assert_eq!(eval_with("x", &vars), Value::Number(5.0));
        assert_eq!(eval_with("x + 3", &vars), Value::Number(8.0));
        assert_eq!(
            eval_with(r#""hi " + name"#, &vars),
            Value::Str("hi Ada".to_string())
        );
    }

    #[test]
    fn test_math_calls() {
        assert_eq!(eval("Math.sqrt(16)").unwrap(), Value::Number(4.0));
        assert_eq!(
            eval("Math.pow(Math.abs(1 - 3), 2)").unwrap(),
            Value::Number(4.0)
        );
        assert_eq!(
            eval(r#""n=" + Math.max(2, 3)"#).unwrap(),
            Value::Str("n=3".to_string())
        );
    }

    #[test]
    fn test_unknown_math_method() {
        let err = eval("Math.cbrt(8)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedMathMethod);
    }

    #[test]
    fn test_unrecognized_expression() {
        let err = eval("System.exit(0)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnrecognizedExpression);
    }

    #[test]
    fn test_adjacent_string_literals_are_not_one_literal() {
        // Looks like it starts and ends with a quote, but the inner quote
        // means it must be treated as concatenation.
        assert_eq!(eval(r#""a" + "b""#).unwrap(), Value::Str("ab".to_string()));
    }
}
