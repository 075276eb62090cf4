use crate::error::{ErrorKind, JaviError, Span};
use crate::executor::VariableTable;
use crate::jdk;
use crate::scan;

/// Evaluate an arithmetic expression: `+ - * /` with standard precedence,
/// left-to-right associativity, unary minus, parentheses, numeric literals,
/// numeric variables, and `Math.*` calls as primaries.
///
/// A hand-written parser rather than any dynamic evaluation: nothing here
/// ever executes host code, whatever the student source contains.
pub fn evaluate_arithmetic(text: &str, span: &Span, vars: &VariableTable) -> Result<f64, JaviError> {
    let tokens = tokenize(text, span)?;
    let mut parser = ArithParser {
        tokens,
        current: 0,
        text,
        span,
        vars,
    };
    let value = parser.expression()?;
    if !parser.is_at_end() {
        return Err(unrecognized(text, span));
    }
    Ok(value)
}

fn unrecognized(text: &str, span: &Span) -> JaviError {
    JaviError::new(
        ErrorKind::UnrecognizedExpression,
        span.clone(),
        format!("Unrecognized expression: '{}'", text.trim()),
    )
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    MathCall { method: String, args: String },
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
}

fn tokenize(text: &str, span: &Span) -> Result<Vec<Token>, JaviError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            b'-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            b'/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::LeftParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RightParen);
                i += 1;
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                match text[start..i].parse::<f64>() {
                    Ok(n) => tokens.push(Token::Number(n)),
                    Err(_) => return Err(unrecognized(text, span)),
                }
            }
            _ if c.is_ascii_alphabetic() || c == b'_' || c == b'$' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
                {
                    i += 1;
                }
                let ident = &text[start..i];

                if ident == "Math" && i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                    let method_start = i;
                    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                        i += 1;
                    }
                    let method = &text[method_start..i];
                    if method.is_empty() || i >= bytes.len() || bytes[i] != b'(' {
                        return Err(unrecognized(text, span));
                    }
                    let close = scan::find_matching(text, i, '(', ')')
                        .ok_or_else(|| unrecognized(text, span))?;
                    tokens.push(Token::MathCall {
                        method: method.to_string(),
                        args: text[i + 1..close].to_string(),
                    });
                    i = close + 1;
                } else {
                    tokens.push(Token::Ident(ident.to_string()));
                }
            }
            _ => return Err(unrecognized(text, span)),
        }
    }

    Ok(tokens)
}

struct ArithParser<'a> {
    tokens: Vec<Token>,
    current: usize,
    text: &'a str,
    span: &'a Span,
    vars: &'a VariableTable,
}

impl<'a> ArithParser<'a> {
    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, JaviError> {
        let mut value = self.term()?;

        loop {
            if self.match_token(&Token::Plus) {
                value += self.term()?;
            } else if self.match_token(&Token::Minus) {
                value -= self.term()?;
            } else {
                break;
            }
        }

        Ok(value)
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, JaviError> {
        let mut value = self.factor()?;

        loop {
            if self.match_token(&Token::Star) {
                value *= self.factor()?;
            } else if self.match_token(&Token::Slash) {
                // f64 division: dividing by zero yields Infinity or NaN,
                // which print as Java's double division would.
                value /= self.factor()?;
            } else {
                break;
            }
        }

        Ok(value)
    }

    // factor := NUMBER | IDENT | MATH_CALL | '(' expression ')' | '-' factor
    fn factor(&mut self) -> Result<f64, JaviError> {
        if self.match_token(&Token::Minus) {
            return Ok(-self.factor()?);
        }

        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::Ident(name)) => match self.vars.get(&name) {
                Some(variable) => variable.value.as_number().ok_or_else(|| {
                    JaviError::new(
                        ErrorKind::CoercionFailure,
                        self.span.clone(),
                        format!(
                            "Variable '{}' of type {} cannot be used in arithmetic",
                            name,
                            variable.ty.keyword()
                        ),
                    )
                }),
                None => Err(JaviError::new(
                    ErrorKind::UnrecognizedExpression,
                    self.span.clone(),
                    format!("Unknown variable '{}' in expression", name),
                )),
            },
            Some(Token::MathCall { method, args }) => {
                jdk::eval_math_call(&method, &args, self.span, self.vars)
            }
            Some(Token::LeftParen) => {
                let value = self.expression()?;
                if !self.match_token(&Token::RightParen) {
                    return Err(unrecognized(self.text, self.span));
                }
                Ok(value)
            }
            _ => Err(unrecognized(self.text, self.span)),
        }
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.tokens.get(self.current) == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.current).cloned();
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::VariableTable;
    use crate::value::{JavaType, Value};

    fn eval(text: &str) -> Result<f64, JaviError> {
        let vars = VariableTable::new();
        evaluate_arithmetic(text, &Span::single(0), &vars)
    }

    #[test]
    fn test_precedence() {
        let tests = vec![
            ("2 + 3 * 4", 14.0),
            ("2 * 3 + 4", 10.0),
            ("20 - 2 * 3", 14.0),
            ("(2 + 3) * 4", 20.0),
            ("50 / 2 * 2 + 10", 60.0),
            ("100 / 10 / 2", 5.0),
            ("10 - 2 - 3", 5.0),
            ("-5 + 10", 5.0),
            ("2 * -3", -6.0),
            ("((1))", 1.0),
            ("7 / 2", 3.5),
        ];

        for (input, expected) in tests {
            assert_eq!(eval(input).unwrap(), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_variables_resolve() {
        let mut vars = VariableTable::new();
        vars.declare("x".to_string(), JavaType::Int, Value::Number(5.0));
        let result = evaluate_arithmetic("x * 2 - 1", &Span::single(0), &vars).unwrap();
        assert_eq!(result, 9.0);
    }

    #[test]
    fn test_unknown_variable_errors() {
        let err = eval("y * 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnrecognizedExpression);
        assert!(err.message.contains("y"));
    }

    #[test]
    fn test_string_variable_rejected() {
        let mut vars = VariableTable::new();
        vars.declare(
            "s".to_string(),
            JavaType::Str,
            Value::Str("hi".to_string()),
        );
        let err = evaluate_arithmetic("s * 2", &Span::single(0), &vars).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CoercionFailure);
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        assert!(eval("1 / 0").unwrap().is_infinite());
    }

    #[test]
    fn test_math_call_primary() {
        assert_eq!(eval("Math.pow(2, 3) * 2").unwrap(), 16.0);
        assert_eq!(eval("2 * Math.abs(1 - 4)").unwrap(), 6.0);
    }

    #[test]
    fn test_garbage_is_unrecognized() {
        for input in ["foo(1)", "1 ^ 2", "2 +", "(1 + 2", ""] {
            let err = eval(input).unwrap_err();
            assert_eq!(err.kind, ErrorKind::UnrecognizedExpression, "input: {}", input);
        }
    }
}
