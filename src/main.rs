use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use formflow::catalog::{FieldKind, FormCatalog, SectionDefinition};
use formflow::config::FormflowConfig;
use formflow::session::{AdvanceTarget, FormOrder, FormSession, SessionError, SubmitOutcome};
use formflow::telemetry::init_telemetry;

#[derive(Parser)]
#[command(name = "formflow")]
#[command(about = "Catalog-driven multi-step form engine")]
#[command(long_about = "Formflow walks you through a multi-step form one section at a time, \
                       validating required fields, tracking completion progress, and \
                       auto-advancing to the next section after each successful submission.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive form session (default when no subcommand given)
    Run {
        /// Load section definitions from a JSON file instead of the builtin catalog
        #[arg(long, help = "Path to a catalog JSON file")]
        catalog: Option<PathBuf>,
        /// Override the pause before auto-advancing to the next section
        #[arg(long, help = "Auto-advance delay in milliseconds")]
        advance_delay_ms: Option<u64>,
    },
    /// Print the section catalog and exit
    Sections {
        /// Load section definitions from a JSON file instead of the builtin catalog
        #[arg(long, help = "Path to a catalog JSON file")]
        catalog: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FormflowConfig::load()?;
    init_telemetry(&config.log_level)?;

    match cli.command {
        None => tokio::runtime::Runtime::new()?
            .block_on(async { run_command(&config, None, None).await }),
        Some(Commands::Run {
            catalog,
            advance_delay_ms,
        }) => tokio::runtime::Runtime::new()?
            .block_on(async { run_command(&config, catalog, advance_delay_ms).await }),
        Some(Commands::Sections { catalog }) => {
            let catalog = load_catalog(catalog)?;
            for section in catalog.sections() {
                print_section_detail(section);
            }
            Ok(())
        }
    }
}

fn load_catalog(path: Option<PathBuf>) -> Result<FormCatalog> {
    match path {
        Some(path) => FormCatalog::from_json_file(path),
        None => Ok(FormCatalog::builtin()),
    }
}

async fn run_command(
    config: &FormflowConfig,
    catalog_path: Option<PathBuf>,
    advance_delay_ms: Option<u64>,
) -> Result<()> {
    let delay = Duration::from_millis(advance_delay_ms.unwrap_or(config.advance_delay_ms));
    let catalog = Arc::new(load_catalog(catalog_path)?);
    let order = FormOrder::of_catalog(&catalog);
    let mut session = FormSession::new(Arc::clone(&catalog), order)?.with_advance_delay(delay);

    println!("Dynamic Form Builder");
    println!("Select a form type and fill out the details.\n");
    print_section_list(&catalog);
    println!("\nType 'help' for commands.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        // A pending auto-advance races against the next line of input;
        // whichever wins, the session keeps the two consistent.
        let line = match session.advance_deadline() {
            Some(deadline) => tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    report_advance(&mut session);
                    continue;
                }
                line = lines.next_line() => line?,
            },
            None => lines.next_line().await?,
        };

        let Some(line) = line else {
            break; // EOF
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !dispatch(&mut session, line) {
            break;
        }
    }
    Ok(())
}

fn report_advance(session: &mut FormSession) {
    match session.apply_pending_advance() {
        Some(AdvanceTarget::Section(name)) => {
            println!("\nMoving on to \"{name}\".");
            print_active_section(session);
        }
        Some(AdvanceTarget::Idle) => {
            println!("\nAll sections in the sequence are complete.");
            print_section_list(session.catalog());
        }
        None => {}
    }
}

/// Apply one line of input to the session. Returns false to quit.
fn dispatch(session: &mut FormSession, line: &str) -> bool {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    let result = match command {
        "help" => {
            print_help();
            Ok(())
        }
        "sections" => {
            print_section_list(session.catalog());
            Ok(())
        }
        "select" => select_by_name_or_index(session, rest).map(|()| print_active_section(session)),
        "set" => match rest.split_once(char::is_whitespace) {
            Some((field, value)) => session.edit_field(field, value.trim()).map(|progress| {
                println!("{} = {} ({progress}% complete)", field, value.trim());
            }),
            None => {
                println!("Usage: set <field> <value>");
                Ok(())
            }
        },
        "submit" => session.submit().map(report_submit),
        "entries" => {
            print_entries(session);
            Ok(())
        }
        "edit" => session.edit_entry(rest).map(|()| {
            println!("Editing \"{rest}\".");
            print_active_section(session);
        }),
        "delete" => session.delete_entry(rest).map(|()| {
            println!("Entry deleted successfully.");
        }),
        "status" => {
            print_active_section(session);
            Ok(())
        }
        "quit" | "exit" => return false,
        other => {
            println!("Unknown command '{other}'. Type 'help' for commands.");
            Ok(())
        }
    };

    if let Err(err) = result {
        report_error(err);
    }
    true
}

fn select_by_name_or_index(session: &mut FormSession, target: &str) -> Result<(), SessionError> {
    // Accept either the 1-based number from the section list or a full name.
    if let Ok(index) = target.parse::<usize>() {
        let name = session
            .catalog()
            .section_names()
            .nth(index.saturating_sub(1))
            .map(str::to_string);
        if let Some(name) = name {
            return session.select_section(&name);
        }
    }
    session.select_section(target)
}

fn report_submit(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Accepted { was_edit, next } => {
            if was_edit {
                println!("Changes saved successfully!");
            } else {
                println!("Form submitted successfully!");
            }
            match next {
                Some(name) => println!("Next up: \"{name}\"..."),
                None => println!("That was the last section."),
            }
        }
        SubmitOutcome::Rejected { errors } => {
            println!("Please fix the following before submitting:");
            for message in errors.values() {
                println!("  - {message}");
            }
        }
    }
}

fn report_error(err: SessionError) {
    match err {
        SessionError::NoActiveSection => {
            println!("No section selected. Use 'select <name>' first.");
        }
        other => println!("{other}"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  sections              list available form sections");
    println!("  select <name|number>  start filling a section (fresh draft)");
    println!("  set <field> <value>   set one field of the active section");
    println!("  submit                validate and submit the active section");
    println!("  entries               list submitted entries");
    println!("  edit <section>        re-open a submitted entry for editing");
    println!("  delete <section>      delete a submitted entry");
    println!("  status                show the active section and progress");
    println!("  quit                  exit");
}

fn print_section_list(catalog: &FormCatalog) {
    println!("Available sections:");
    for (i, name) in catalog.section_names().enumerate() {
        println!("  {}. {name}", i + 1);
    }
}

fn print_section_detail(section: &SectionDefinition) {
    println!("{}", section.name);
    for field in &section.fields {
        let required = if field.required { " *" } else { "" };
        println!(
            "  {} ({:?}){required}  [{}]",
            field.label, field.kind, field.placeholder
        );
        if field.kind == FieldKind::Select {
            println!("      options: {}", field.options.join(", "));
        }
    }
}

fn print_active_section(session: &FormSession) {
    let Some(active) = session.active_section() else {
        println!("No section selected.");
        return;
    };
    let Some(section) = session.catalog().get(active) else {
        return;
    };

    println!("\n{} {}", section.name, progress_bar(session.progress()));
    for field in &section.fields {
        let required = if field.required { "*" } else { " " };
        let value = session
            .draft()
            .get(&field.name)
            .map(String::as_str)
            .unwrap_or("");
        let hint = if value.is_empty() {
            format!("({})", field.placeholder)
        } else {
            String::new()
        };
        println!("  {required} {} = {value} {hint}", field.name);
        if field.kind == FieldKind::Select && value.is_empty() {
            println!("      options: {}", field.options.join(", "));
        }
        if let Some(message) = session.errors().get(&field.name) {
            println!("      ! {message}");
        }
    }
    if session.is_editing_entry() {
        println!("  (editing existing entry)");
    }
}

fn print_entries(session: &FormSession) {
    if session.submissions().is_empty() {
        println!("No submitted entries yet.");
        return;
    }
    println!("Submitted entries:");
    for (name, record) in session.submissions().entries() {
        println!(
            "  {name} (submitted {})",
            record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let mut keys: Vec<&String> = record.values.keys().collect();
        keys.sort();
        for key in keys {
            println!("    {key}: {}", record.values[key]);
        }
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = (progress as usize) / 10;
    format!("[{}{}] {progress}%", "#".repeat(filled), "-".repeat(10 - filled))
}
