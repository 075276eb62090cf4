mod arith;
mod error;
mod evaluator;
mod executor;
mod interpreter;
mod jdk;
mod runner;
mod scan;
mod validator;
mod value;

use clap::{Arg, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = Command::new("javi")
        .about("A sandboxed Java-subset interpreter for devices without a JVM")
        .arg(
            Arg::new("file")
                .help("The .java file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the execution result as JSON instead of console output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("device-info")
                .long("device-info")
                .help("Print the managed-device capability descriptor and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("device-info") {
        let info = interpreter::managed_device_info();
        println!("{}", serde_json::to_string_pretty(&info).unwrap());
        return ExitCode::SUCCESS;
    }

    match matches.get_one::<String>("file") {
        Some(file_path) => run_file(file_path, matches.get_flag("json")),
        None => {
            eprintln!("Error: No input file given. Usage: javi <FILE> [--json]");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &str, as_json: bool) -> ExitCode {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        return ExitCode::FAILURE;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let filename = path.to_str();

    if as_json {
        let result = interpreter::Interpreter::new().execute(&source);
        println!("{}", serde_json::to_string_pretty(&result).unwrap());
        if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    } else {
        let result = runner::run(&source, filename);
        if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
