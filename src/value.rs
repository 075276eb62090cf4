use crate::error::{ErrorKind, JaviError, Span};
use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;

/// Runtime value produced by the evaluator. Numbers are a single kind: the
/// int/double distinction only exists at the declaration boundary, where
/// `JavaType::coerce` truncates for `int` variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Char(char),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "String",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "char",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_nan() {
                    write!(f, "NaN")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
                } else if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integral numbers print without a decimal point, so that
                    // "x=" + 1 concatenates to "x=1" and println(8.0) prints 8.
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_str(&c.to_string()),
        }
    }
}

/// The declared type of a variable, from the fixed keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavaType {
    Int,
    Double,
    Boolean,
    Str,
    Char,
}

impl JavaType {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "int" => Some(JavaType::Int),
            "double" => Some(JavaType::Double),
            "boolean" => Some(JavaType::Boolean),
            "String" => Some(JavaType::Str),
            "char" => Some(JavaType::Char),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            JavaType::Int => "int",
            JavaType::Double => "double",
            JavaType::Boolean => "boolean",
            JavaType::Str => "String",
            JavaType::Char => "char",
        }
    }

    /// Default value for a declaration without an initializer.
    pub fn zero_value(&self) -> Value {
        match self {
            JavaType::Int => Value::Number(0.0),
            JavaType::Double => Value::Number(0.0),
            JavaType::Boolean => Value::Bool(false),
            JavaType::Str => Value::Str(String::new()),
            JavaType::Char => Value::Char('\0'),
        }
    }

    /// Coerce an evaluated value to this declared type. Applied on every
    /// declaration and assignment so the variable table invariant holds.
    pub fn coerce(&self, value: Value, span: &Span) -> Result<Value, JaviError> {
        match self {
            JavaType::Int => match &value {
                Value::Number(n) => Ok(Value::Number(n.trunc())),
                Value::Str(s) => match s.trim().parse::<f64>() {
                    Ok(n) => Ok(Value::Number(n.trunc())),
                    Err(_) => Err(self.mismatch(&value, span)),
                },
                Value::Char(c) => match c.to_string().parse::<f64>() {
                    Ok(n) => Ok(Value::Number(n.trunc())),
                    Err(_) => Err(self.mismatch(&value, span)),
                },
                Value::Bool(_) => Err(self.mismatch(&value, span)),
            },
            JavaType::Double => match &value {
                Value::Number(n) => Ok(Value::Number(*n)),
                Value::Str(s) => match s.trim().parse::<f64>() {
                    Ok(n) => Ok(Value::Number(n)),
                    Err(_) => Err(self.mismatch(&value, span)),
                },
                Value::Char(c) => match c.to_string().parse::<f64>() {
                    Ok(n) => Ok(Value::Number(n)),
                    Err(_) => Err(self.mismatch(&value, span)),
                },
                Value::Bool(_) => Err(self.mismatch(&value, span)),
            },
            JavaType::Boolean => Ok(Value::Bool(value.is_truthy())),
            JavaType::Str => Ok(Value::Str(value.to_string())),
            JavaType::Char => match &value {
                Value::Char(c) => Ok(Value::Char(*c)),
                other => Ok(Value::Char(
                    other.to_string().chars().next().unwrap_or('\0'),
                )),
            },
        }
    }

    fn mismatch(&self, value: &Value, span: &Span) -> JaviError {
        JaviError::new(
            ErrorKind::CoercionFailure,
            span.clone(),
            format!(
                "Cannot convert {} '{}' to {}",
                value.type_name(),
                value,
                self.keyword()
            ),
        )
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_display_without_decimal() {
        let tests = vec![
            (Value::Number(8.0), "8"),
            (Value::Number(2.5), "2.5"),
            (Value::Number(-3.0), "-3"),
            (Value::Number(0.0), "0"),
            (Value::Number(f64::INFINITY), "Infinity"),
        ];

        for (value, expected) in tests {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(JavaType::Int.zero_value(), Value::Number(0.0));
        assert_eq!(JavaType::Double.zero_value(), Value::Number(0.0));
        assert_eq!(JavaType::Boolean.zero_value(), Value::Bool(false));
        assert_eq!(JavaType::Str.zero_value(), Value::Str(String::new()));
        assert_eq!(JavaType::Char.zero_value(), Value::Char('\0'));
    }

    #[test]
    fn test_int_coercion_truncates() {
        let span = Span::single(0);
        let tests = vec![
            (Value::Number(5.9), Value::Number(5.0)),
            (Value::Number(-2.7), Value::Number(-2.0)),
            (Value::Str("42".to_string()), Value::Number(42.0)),
        ];

        for (input, expected) in tests {
            let coerced = JavaType::Int.coerce(input, &span).unwrap();
            assert_eq!(coerced, expected);
        }
    }

    #[test]
    fn test_int_coercion_rejects_non_numeric_text() {
        let span = Span::single(0);
        let err = JavaType::Int
            .coerce(Value::Str("hello".to_string()), &span)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::CoercionFailure);
    }

    #[test]
    fn test_char_coercion_takes_first_character() {
        let span = Span::single(0);
        let coerced = JavaType::Char
            .coerce(Value::Str("abc".to_string()), &span)
            .unwrap();
        assert_eq!(coerced, Value::Char('a'));

        let empty = JavaType::Char
            .coerce(Value::Str(String::new()), &span)
            .unwrap();
        assert_eq!(empty, Value::Char('\0'));
    }

    #[test]
    fn test_boolean_coercion_is_truthiness() {
        let span = Span::single(0);
        let truthy = JavaType::Boolean
            .coerce(Value::Number(1.0), &span)
            .unwrap();
        assert_eq!(truthy, Value::Bool(true));

        let falsy = JavaType::Boolean
            .coerce(Value::Str(String::new()), &span)
            .unwrap();
        assert_eq!(falsy, Value::Bool(false));
    }
}
