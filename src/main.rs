//! Pariksha CLI - Declarative Field Validation
//!
//! Validates values given on the command line against a form schema.

use anyhow::{bail, Context, Result};
use log::debug;
use pariksha::prelude::*;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pariksha");

    if args.len() < 2 {
        print_usage(program);
        return ExitCode::FAILURE;
    }

    let result = match args[1].as_str() {
        "kinds" => {
            list_kinds();
            Ok(true)
        }
        "check" => check(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(true)
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            Ok(false)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn print_usage(program: &str) {
    println!("Pariksha v{} - declarative field validation", pariksha::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  kinds                                   List registered rule kinds");
    println!("  check <schema> [name=value ...] [opts]  Validate values against a schema");
    println!("  help                                    Show this help message");
    println!();
    println!("Check options:");
    println!("  --immediate   Stop at the first failing field");
    println!("  --hidden      Also validate hidden fields");
    println!();
    println!("Toggle fields take true/false, select fields take an index.");
}

fn list_kinds() {
    let registry = Registry::global();
    let registry = registry.read();

    println!("Registered rule kinds ({} total):", registry.len());
    println!();
    for descriptor in registry.rule_kinds() {
        let cross = if descriptor.cross_field { " (cross-field)" } else { "" };
        println!(
            "  • {} [{}]{}",
            descriptor.kind,
            descriptor.data_kind.display_name(),
            cross
        );
        if !descriptor.description.is_empty() {
            println!("      {}", descriptor.description);
        }
        let kinds: Vec<String> = registry
            .adapted_field_kinds(&descriptor.kind)
            .iter()
            .map(|kind| kind.to_string())
            .collect();
        if !kinds.is_empty() {
            println!("      fields: {}", kinds.join(", "));
        }
    }
}

/// Returns `Ok(false)` when validation fails.
fn check(args: &[String]) -> Result<bool> {
    let Some(path) = args.first() else {
        bail!("Please specify a schema file");
    };

    let schema = FormSchema::from_path(path)
        .with_context(|| format!("Failed to load schema '{}'", path))?;
    let fields = schema.headless_fields();

    let mut options = ValidatorOptions::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "--immediate" => options = options.with_mode(Mode::Immediate),
            "--hidden" => options = options.with_hidden_fields(true),
            assignment => {
                let Some((name, value)) = assignment.split_once('=') else {
                    bail!("Expected name=value, got '{}'", assignment);
                };
                let field = fields
                    .get(name)
                    .with_context(|| format!("Schema has no field '{}'", name))?;
                assign(field, value)?;
            }
        }
    }

    let form = schema.bind(|name| fields.get(name).map(|field| field.handle()))?;
    debug!("Bound {} field(s) from '{}'", form.len(), path);

    let validator = Validator::new(form).with_options(options);
    validator.set_validation_listener(Arc::new(PrintListener));

    let report = validator.validate()?;
    println!("{}", report.summary());
    for line in report.detailed_errors() {
        println!("  {}", line);
    }
    Ok(report.is_success())
}

fn assign(field: &HeadlessField, value: &str) -> Result<()> {
    let kind = field.kind();
    let registry = Registry::global();
    let registry = registry.read();

    if registry.is_subkind(&kind, &FieldKind::TOGGLE) || kind == FieldKind::RADIO_GROUP {
        let checked = value
            .parse::<bool>()
            .with_context(|| format!("'{}' expects true or false", field.name()))?;
        field.set_checked(checked);
    } else if registry.is_subkind(&kind, &FieldKind::SELECT) {
        let index = value
            .parse::<usize>()
            .with_context(|| format!("'{}' expects an index", field.name()))?;
        field.set_selected(Some(index));
    } else {
        field.set_text(value);
    }
    Ok(())
}

struct PrintListener;

impl ValidationListener for PrintListener {
    fn on_validation_succeeded(&self) {
        debug!("Validation succeeded");
    }

    fn on_validation_failed(&self, errors: &[ValidationError]) {
        debug!("Validation failed with {} error(s)", errors.len());
    }
}
