use crate::interpreter::{ExecutionResult, Interpreter};

/// Run a Java-subset source file the way a console would: print the
/// program's output, then render any failure as a labeled diagnostic over
/// the student's code.
pub fn run(source: &str, filename: Option<&str>) -> ExecutionResult {
    let interpreter = Interpreter::new();
    let result = interpreter.execute(source);

    print!("{}", result.output);

    if let Some(ref error) = result.error {
        error.report(source, filename);
    }

    result
}
