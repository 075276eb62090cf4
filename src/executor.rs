use std::collections::BTreeMap;

use crate::error::{ErrorKind, JaviError, Span};
use crate::evaluator;
use crate::interpreter::EngineConfig;
use crate::scan::{self, Statement};
use crate::value::{JavaType, Value};

/// A declared variable: its declared type and current value. The value is
/// coerced to the declared type on every declaration and assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: JavaType,
    pub value: Value,
}

/// Flat name -> variable mapping for one execution run. No block scoping;
/// the whole main-method body shares one namespace. Ordered so serialized
/// results are deterministic.
#[derive(Debug, Default)]
pub struct VariableTable {
    entries: BTreeMap<String, Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn declare(&mut self, name: String, ty: JavaType, value: Value) {
        self.entries.insert(name, Variable { ty, value });
    }

    pub fn assign(&mut self, name: &str, value: Value) {
        if let Some(variable) = self.entries.get_mut(name) {
            variable.value = value;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.entries.iter()
    }

    pub fn values_snapshot(&self) -> BTreeMap<String, Value> {
        self.entries
            .iter()
            .map(|(name, variable)| (name.clone(), variable.value.clone()))
            .collect()
    }
}

/// Ordered console output for one run: one entry per printed value, plus a
/// line-break entry after each println. Joined verbatim at the end.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    fragments: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    pub fn print(&mut self, text: String) {
        self.fragments.push(text);
    }

    pub fn newline(&mut self) {
        self.fragments.push("\n".to_string());
    }

    pub fn join(&self) -> String {
        self.fragments.concat()
    }
}

/// Execute one statement, mutating the variable table and output buffer.
/// The first error halts the run; the facade reports it with any output
/// produced so far.
pub fn execute_statement(
    statement: &Statement,
    vars: &mut VariableTable,
    out: &mut OutputBuffer,
    config: &EngineConfig,
) -> Result<(), JaviError> {
    let span = &statement.span;
    let text = statement.text.trim();
    let text = match text.strip_suffix(';') {
        Some(stripped) => stripped.trim_end(),
        None => text,
    };

    if text.is_empty() || text.starts_with("//") {
        return Ok(());
    }

    if text == "import" || text.starts_with("import ") {
        return Ok(());
    }

    if let Some(rest) = text.strip_prefix("System.out.println") {
        if rest.trim_start().starts_with('(') {
            return print_statement(rest.trim(), true, span, vars, out);
        }
    }
    if let Some(rest) = text.strip_prefix("System.out.print") {
        if rest.trim_start().starts_with('(') {
            return print_statement(rest.trim(), false, span, vars, out);
        }
    }

    let first_word = text.split_whitespace().next().unwrap_or("");
    if let Some(ty) = JavaType::from_keyword(first_word) {
        return declaration(text[first_word.len()..].trim(), ty, span, vars);
    }

    if let Some(eq) = scan::find_assignment_eq(text) {
        let name = text[..eq].trim();
        if scan::is_identifier(name) {
            return assignment(name, text[eq + 1..].trim(), span, vars, config);
        }
    }

    if config.lenient_statements {
        return Ok(());
    }

    Err(JaviError::new(
        ErrorKind::UnsupportedStatement,
        span.clone(),
        format!("Unsupported statement: '{}'", text),
    ))
}

fn print_statement(
    rest: &str,
    newline: bool,
    span: &Span,
    vars: &VariableTable,
    out: &mut OutputBuffer,
) -> Result<(), JaviError> {
    let malformed = || {
        JaviError::new(
            ErrorKind::UnsupportedStatement,
            span.clone(),
            "Malformed print statement".to_string(),
        )
    };

    let close = scan::find_matching(rest, 0, '(', ')').ok_or_else(malformed)?;
    if close != rest.len() - 1 {
        return Err(malformed());
    }

    let arg = rest[1..close].trim();
    if !arg.is_empty() {
        // String literals unwrap directly; everything else goes through the
        // evaluator.
        let rendered = match evaluator::string_literal(arg) {
            Some(inner) => inner.to_string(),
            None => evaluator::evaluate(arg, span, vars)?.to_string(),
        };
        out.print(rendered);
    }

    if newline {
        out.newline();
    }

    Ok(())
}

fn declaration(
    rest: &str,
    ty: JavaType,
    span: &Span,
    vars: &mut VariableTable,
) -> Result<(), JaviError> {
    let (name, init) = match scan::find_assignment_eq(rest) {
        Some(eq) => (rest[..eq].trim(), Some(rest[eq + 1..].trim())),
        None => (rest, None),
    };

    if !scan::is_identifier(name) {
        return Err(JaviError::new(
            ErrorKind::UnsupportedStatement,
            span.clone(),
            format!("Invalid variable name in declaration: '{}'", name),
        ));
    }

    if vars.contains(name) {
        return Err(JaviError::new(
            ErrorKind::DuplicateDeclaration,
            span.clone(),
            format!("Variable '{}' is already declared", name),
        ));
    }

    let value = match init {
        Some(expr) if !expr.is_empty() => {
            let value = evaluator::evaluate(expr, span, vars)?;
            ty.coerce(value, span)?
        }
        Some(_) => {
            return Err(JaviError::new(
                ErrorKind::UnsupportedStatement,
                span.clone(),
                format!("Missing initializer for variable '{}'", name),
            ));
        }
        None => ty.zero_value(),
    };

    vars.declare(name.to_string(), ty, value);
    Ok(())
}

fn assignment(
    name: &str,
    expr: &str,
    span: &Span,
    vars: &mut VariableTable,
    config: &EngineConfig,
) -> Result<(), JaviError> {
    let ty = match vars.get(name) {
        Some(variable) => variable.ty,
        None => {
            // Lenient mode drops these silently instead of failing.
            if config.lenient_assignments {
                return Ok(());
            }
            return Err(JaviError::new(
                ErrorKind::UndeclaredVariable,
                span.clone(),
                format!("Cannot assign to undeclared variable '{}'", name),
            ));
        }
    };

    if expr.is_empty() {
        return Err(JaviError::new(
            ErrorKind::UnsupportedStatement,
            span.clone(),
            format!("Missing right-hand side in assignment to '{}'", name),
        ));
    }

    let value = evaluator::evaluate(expr, span, vars)?;
    let value = ty.coerce(value, span)?;
    vars.assign(name, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(text: &str) -> Statement {
        Statement {
            text: text.to_string(),
            span: Span::new(0, text.len().max(1)),
        }
    }

    fn run_all(texts: &[&str], config: &EngineConfig) -> Result<(VariableTable, String), JaviError> {
        let mut vars = VariableTable::new();
        let mut out = OutputBuffer::new();
        for text in texts {
            execute_statement(&statement(text), &mut vars, &mut out, config)?;
        }
        Ok((vars, out.join()))
    }

    fn run_strict(texts: &[&str]) -> Result<(VariableTable, String), JaviError> {
        run_all(texts, &EngineConfig::default())
    }

    #[test]
    fn test_print_and_println() {
        let (_, output) = run_strict(&[
            r#"System.out.print("a");"#,
            r#"System.out.print("b");"#,
            r#"System.out.println("c");"#,
            "System.out.println();",
        ])
        .unwrap();
        assert_eq!(output, "abc\n\n");
    }

    #[test]
    fn test_declaration_defaults() {
        let (vars, _) = run_strict(&[
            "int i;",
            "double d;",
            "boolean b;",
            "String s;",
            "char c;",
        ])
        .unwrap();

        assert_eq!(vars.get("i").unwrap().value, Value::Number(0.0));
        assert_eq!(vars.get("d").unwrap().value, Value::Number(0.0));
        assert_eq!(vars.get("b").unwrap().value, Value::Bool(false));
        assert_eq!(vars.get("s").unwrap().value, Value::Str(String::new()));
        assert_eq!(vars.get("c").unwrap().value, Value::Char('\0'));
    }

    #[test]
    fn test_declaration_coerces_initializer() {
        let (vars, _) = run_strict(&["int x = 5.9;", "char c = 'z';", "String s = 42;"]).unwrap();
        assert_eq!(vars.get("x").unwrap().value, Value::Number(5.0));
        assert_eq!(vars.get("c").unwrap().value, Value::Char('z'));
        assert_eq!(vars.get("s").unwrap().value, Value::Str("42".to_string()));
    }

    #[test]
    fn test_duplicate_declaration_is_flagged() {
        let err = run_strict(&["int x = 1;", "int x = 2;"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
    }

    #[test]
    fn test_assignment_coerces_to_declared_type() {
        let (vars, _) = run_strict(&["int x = 1;", "x = 7.8;"]).unwrap();
        assert_eq!(vars.get("x").unwrap().value, Value::Number(7.0));
    }

    #[test]
    fn test_undeclared_assignment_strict_vs_lenient() {
        let err = run_strict(&["x = 5;"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndeclaredVariable);

        let lenient = EngineConfig {
            lenient_assignments: true,
            ..EngineConfig::default()
        };
        assert!(run_all(&["x = 5;"], &lenient).is_ok());
    }

    #[test]
    fn test_unsupported_statement_strict_vs_lenient() {
        let err = run_strict(&["while (true) { }"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedStatement);

        let lenient = EngineConfig {
            lenient_statements: true,
            ..EngineConfig::default()
        };
        assert!(run_all(&["while (true) { }"], &lenient).is_ok());
    }

    #[test]
    fn test_import_and_comment_lines_are_skipped() {
        let (vars, output) =
            run_strict(&["import java.util.Scanner;", "// just a note"]).unwrap();
        assert_eq!(output, "");
        assert_eq!(vars.values_snapshot().len(), 0);
    }

    #[test]
    fn test_equality_is_not_an_assignment() {
        // `x == 5` must not be treated as an assignment to x.
        let err = run_strict(&["int x = 1;", "x == 5;"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedStatement);
    }
}
