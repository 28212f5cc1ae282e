use std::fs;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use serde_json::Value;

use macgyver::cli_utils::{exit_with_usage_error, init_logging, lint_spec, print_json_or_exit, report};
use macgyver::{FormContext, SpecNode, ValidateError, project, widgets};

const USAGE: &str = "USAGE: validate-spec [--verbose] [--skeleton] [--data FILE] <file>...";

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(flag, "Enable verbose output showing pass/fail for each file")]
    verbose: bool,
    #[arrrg(flag, "Print the projected data skeleton of each spec")]
    skeleton: bool,
    #[arrrg(optional, "JSON data file to validate against each spec")]
    data: Option<String>,
}

async fn check_data(spec: SpecNode, data: Value) -> Vec<String> {
    let form = FormContext::new(
        spec,
        Arc::new(widgets::builtin_registry()),
        Arc::new(Mutex::new(data)),
    );
    form.mount_tree();
    match form.validate().await {
        Ok(()) => Vec::new(),
        Err(ValidateError::Invalid(errors)) => errors.iter().map(|e| e.to_string()).collect(),
        Err(e) => vec![e.to_string()],
    }
}

#[tokio::main]
async fn main() {
    let (options, free) = Options::from_command_line(USAGE);
    init_logging(options.verbose);

    if free.is_empty() {
        exit_with_usage_error("no spec files given", USAGE);
    }

    let data = options.data.as_ref().map(|path| {
        fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()))
            .unwrap_or_else(|e| exit_with_usage_error(&format!("cannot read {}: {}", path, e), USAGE))
    });

    let registry = widgets::builtin_registry();
    let mut all_valid = true;

    for path in &free {
        let spec = match SpecNode::load(Path::new(path)) {
            Ok(spec) => spec,
            Err(e) => {
                if options.verbose {
                    report(path, &[e.to_string()]);
                }
                all_valid = false;
                continue;
            }
        };

        let mut problems = lint_spec(&spec, &registry);
        if options.skeleton {
            let skeleton = project(Some(&spec), &registry, true).unwrap_or(Value::Null);
            print_json_or_exit(&skeleton, "skeleton");
        }
        if let Some(data) = &data {
            problems.extend(check_data(spec, data.clone()).await);
        }

        if !problems.is_empty() {
            all_valid = false;
        }
        if options.verbose {
            report(path, &problems);
        }
    }

    if all_valid {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
