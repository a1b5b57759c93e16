use {
    anyhow::Result,
    clap::Subcommand,
    std::path::Path,
    tooby_config::{
        Severity,
        validate::{self, ValidationResult},
    },
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check,
    /// Print the path of the config file in use.
    Path,
}

pub fn handle_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(tooby_config::find_config_file);

    match action {
        ConfigAction::Path => {
            match path {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        },
        ConfigAction::Check => {
            let config = match &path {
                Some(path) => {
                    eprintln!("Checking {}\n", path.display());
                    tooby_config::load_config(path)?
                },
                None => {
                    eprintln!("No config file found; checking defaults.\n");
                    Default::default()
                },
            };
            let result = validate::validate(&config);
            report(&result);
            if result.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn report(result: &ValidationResult) {
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let (errors, warnings) = counts(result);
    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }
}

fn counts(result: &ValidationResult) -> (usize, usize) {
    let errors = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    (errors, result.diagnostics.len() - errors)
}
