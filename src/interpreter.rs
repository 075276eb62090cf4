use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::error::JaviError;
use crate::executor::{self, OutputBuffer, VariableTable};
use crate::jdk;
use crate::scan;
use crate::validator;
use crate::value::Value;

/// Engine behavior flags. The defaults are strict; the lenient flags restore
/// the forgiving behavior of the earlier runtime generations for callers that
/// depend on it.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Silently ignore assignments to undeclared variables instead of failing
    /// with UndeclaredVariable.
    pub lenient_assignments: bool,
    /// Skip unrecognized statements instead of failing with
    /// UnsupportedStatement.
    pub lenient_statements: bool,
}

/// The interpreter facade. Stateless between runs: every `execute` call gets
/// a fresh variable table and output buffer, so a single instance can serve
/// overlapping executions safely.
pub struct Interpreter {
    config: EngineConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run a complete Java-subset program.
    ///
    /// Never returns an error to the caller: validation failures, extraction
    /// failures, and statement failures are all captured in the result, with
    /// any output produced before the failure preserved.
    pub fn execute(&self, source: &str) -> ExecutionResult {
        let started = Instant::now();
        let mut vars = VariableTable::new();
        let mut out = OutputBuffer::new();

        let outcome = self.run(source, &mut vars, &mut out);

        let output = out.join();
        let execution_time = started.elapsed().as_millis() as u64;
        let memory_usage = estimate_memory(&vars, &output);

        ExecutionResult {
            success: outcome.is_ok(),
            output,
            error: outcome.err(),
            variables: vars.values_snapshot(),
            execution_time,
            memory_usage,
        }
    }

    fn run(
        &self,
        source: &str,
        vars: &mut VariableTable,
        out: &mut OutputBuffer,
    ) -> Result<(), JaviError> {
        validator::validate(source)?;
        let (body, base) = validator::extract_main_body(source)?;

        for statement in scan::split_statements(body, base) {
            executor::execute_statement(&statement, vars, out, &self.config)?;
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// The sole externally visible artifact of a run. Serializes to the JSON
/// shape the surrounding application returns from its execution endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JaviError>,
    pub variables: BTreeMap<String, Value>,
    /// Wall-clock milliseconds for the run.
    pub execution_time: u64,
    /// Heuristic byte estimate, not a real heap measurement.
    pub memory_usage: u64,
}

/// Deterministic memory heuristic: UTF-16-ish costs for strings, fixed small
/// constants for scalars. Repeated runs of the same source agree exactly.
fn estimate_memory(vars: &VariableTable, output: &str) -> u64 {
    let mut bytes = 0u64;
    for (name, variable) in vars.iter() {
        bytes += name.len() as u64 * 2;
        bytes += match &variable.value {
            Value::Str(s) => s.len() as u64 * 2,
            Value::Number(_) => 8,
            Value::Bool(_) => 1,
            Value::Char(_) => 2,
        };
    }
    bytes + output.len() as u64 * 2
}

/// Static capability descriptor for managed devices (Chromebooks and other
/// machines that cannot install a JVM). Surfaced at the application boundary
/// alongside execution results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDeviceInfo {
    pub execution_mode: &'static str,
    pub requires_jvm: bool,
    pub supported_types: &'static [&'static str],
    pub math_methods: &'static [&'static str],
    pub limitations: &'static [&'static str],
}

pub fn managed_device_info() -> ManagedDeviceInfo {
    ManagedDeviceInfo {
        execution_mode: "in-process interpreter",
        requires_jvm: false,
        supported_types: &["int", "double", "boolean", "String", "char"],
        math_methods: jdk::MATH_METHODS,
        limitations: &[
            "single public class with a main method",
            "no control flow (if/for/while)",
            "no user-defined methods or objects",
            "no Scanner input at runtime",
        ],
    }
}
