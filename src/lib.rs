// javi - Java Subset Interpreter Library
//
// This is the core library for javi, an in-process interpreter for a teaching
// subset of Java, built for managed devices that cannot run a real JVM.

// Public modules
pub mod arith;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod interpreter;
pub mod jdk;
pub mod runner;
pub mod scan;
pub mod validator;
pub mod value;

// Re-export commonly used items
pub use error::{ErrorKind, JaviError, Span};
pub use executor::{OutputBuffer, Variable, VariableTable};
pub use interpreter::{
    managed_device_info, EngineConfig, ExecutionResult, Interpreter, ManagedDeviceInfo,
};
pub use scan::Statement;
pub use value::{JavaType, Value};

// Re-export main functions
pub use runner::run;
