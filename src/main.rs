use anyhow::{Context, Result};
use redraft::cli::commands::{
    ClearHistoryCommand, DiffCommand, ExportCommand, HistoryCommand, RunCommand, StepsCommand,
    ValidateCommand,
};
use redraft::cli::output::*;
use redraft::cli::{Cli, Command};
use redraft::core::config::DEFAULT_HISTORY_CAPACITY;
use redraft::{
    align, escape, HistoryRecord, HistoryStore, PersistenceBackend, PipelineConfig,
    PipelineController, RevisionClientConfig, RevisionServiceClient, StepRegistry, Submission,
};
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

/// Label used for whole-pipeline history records
const FULL_RUN_LABEL: &str = "Full run";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Steps(cmd) => list_steps(cmd)?,
        Command::Diff(cmd) => show_diff(cmd)?,
        Command::History(cmd) => show_history(cmd).await?,
        Command::Export(cmd) => export_history(cmd).await?,
        Command::ClearHistory(cmd) => clear_history(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

/// Resolve the step catalog and client settings from a config file, or
/// fall back to the built-in catalog.
fn load_pipeline(
    config_path: Option<&str>,
) -> Result<(StepRegistry, usize, RevisionClientConfig)> {
    match config_path {
        Some(path) => {
            let config =
                PipelineConfig::from_file(path).context("Failed to load pipeline config")?;
            println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());

            let mut client_config = RevisionClientConfig::default();
            if let Some(command) = &config.command {
                client_config = client_config.with_command(command.clone());
            }
            if let Some(timeout) = config.timeout_secs {
                client_config = client_config.with_timeout(timeout);
            }

            Ok((
                config.to_registry()?,
                config.history_capacity(),
                client_config,
            ))
        }
        None => Ok((
            StepRegistry::default_catalog(),
            DEFAULT_HISTORY_CAPACITY,
            RevisionClientConfig::default(),
        )),
    }
}

/// Open the configured persistence backend
#[cfg(feature = "sqlite")]
async fn open_backend() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(
        redraft::history::SqliteHistoryStore::with_default_path().await?,
    ))
}

#[cfg(not(feature = "sqlite"))]
async fn open_backend() -> Result<Arc<dyn PersistenceBackend>> {
    Ok(Arc::new(redraft::InMemoryPersistence::new()))
}

/// Open the history store and load persisted records
async fn open_history(capacity: usize) -> Result<HistoryStore> {
    let backend = open_backend().await?;
    let mut store = HistoryStore::with_persistence(capacity, backend);
    store.load().await;
    Ok(store)
}

fn read_input(cmd: &RunCommand) -> Result<String> {
    match (&cmd.text, &cmd.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            std::fs::read_to_string(path).context("Failed to read the input file")
        }
        (None, None) => anyhow::bail!("Provide the text to revise via --text or --file"),
    }
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let (registry, capacity, client_config) = load_pipeline(cmd.config.as_deref())?;
    let input = read_input(cmd)?;

    let mut history = if cmd.no_history {
        HistoryStore::new(capacity)
    } else {
        open_history(capacity).await?
    };

    let executor = RevisionServiceClient::new(client_config);
    let controller = PipelineController::new(registry, executor);
    controller.stage_input(&input).await;

    let total = controller.registry().last_number();
    let progress = create_progress_bar(total);

    let mut current_text = input.clone();
    let mut tools_used: Vec<String> = Vec::new();

    loop {
        let step = {
            let state = controller.state().await;
            controller
                .registry()
                .get(state.current_step)
                .cloned()
                .context("Current step missing from the catalog")?
        };
        progress.set_message(step.name.clone());

        match controller.submit_step(&current_text).await {
            Ok(Submission::Completed(outcome)) => {
                let tool = if outcome.tool_used.is_empty() {
                    step.tool_label.clone()
                } else {
                    outcome.tool_used.clone()
                };

                progress.println(format!(
                    "{} {} {}",
                    CHECK,
                    style(&step.name).green(),
                    style(format!("[{}]", tool)).dim()
                ));
                if cmd.show_diff {
                    let spans = align(&escape(&current_text), &escape(&outcome.result));
                    progress.println(format!("    {}", render_spans(&spans)));
                }
                if !outcome.changes.is_empty() {
                    progress.println(format_changes(&outcome.changes));
                }

                if !cmd.no_history {
                    history.append(HistoryRecord::new(
                        step.name.clone(),
                        current_text.clone(),
                        outcome.result.clone(),
                        tool.clone(),
                        outcome.changes.clone(),
                    ));
                }

                tools_used.push(tool);
                current_text = outcome.result;
                progress.inc(1);

                if !controller.advance().await {
                    break;
                }
            }
            Ok(Submission::Discarded) => {
                // Only possible after a reset, which the run loop never
                // issues; treat as a failed step.
                progress.finish_and_clear();
                anyhow::bail!("Step result was discarded");
            }
            Err(e) => {
                progress.finish_and_clear();
                println!("{} {}: {}", CROSS, style(&step.name).red(), style(&e).dim());
                error!("pipeline stopped at step {}: {}", step.number, e);
                std::process::exit(1);
            }
        }
    }
    progress.finish_and_clear();

    if !cmd.no_history {
        history.append(HistoryRecord::new(
            FULL_RUN_LABEL.to_string(),
            input,
            current_text.clone(),
            tools_used.join(", "),
            vec![],
        ));
        history.flush().await;
    }

    println!(
        "\n{} {} steps completed {}",
        CHECK,
        total,
        style("successfully").green()
    );
    println!("\n{}", current_text);

    Ok(())
}

fn list_steps(cmd: &StepsCommand) -> Result<()> {
    let (registry, _, _) = load_pipeline(cmd.config.as_deref())?;

    if cmd.json {
        let steps: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    println!("{} Pipeline steps:", INFO);
    for step in registry.iter() {
        println!("{}", format_step(step));
    }

    Ok(())
}

fn show_diff(cmd: &DiffCommand) -> Result<()> {
    let original =
        std::fs::read_to_string(&cmd.original).context("Failed to read the original file")?;
    let revised =
        std::fs::read_to_string(&cmd.revised).context("Failed to read the revised file")?;

    let spans = align(&escape(&original), &escape(&revised));

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&spans)?);
    } else if spans.is_empty() {
        println!("{} Nothing to compare", INFO);
    } else {
        println!("{}", render_spans(&spans));
    }

    Ok(())
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let history = open_history(DEFAULT_HISTORY_CAPACITY).await?;

    if history.is_empty() {
        println!("{} No revision history found", INFO);
        return Ok(());
    }

    let records: Vec<_> = history.list().take(cmd.limit).collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{} Revision history (showing latest {}):", INFO, cmd.limit);
    for record in records {
        println!("  {}", format_record_summary(record));
        if cmd.verbose {
            println!("    Original: {}", format_output(&record.original_text, 3));
            println!("    Result:   {}", format_output(&record.result_text, 3));
            if !record.changes.is_empty() {
                println!("{}", format_changes(&record.changes));
            }
        }
    }

    Ok(())
}

async fn export_history(cmd: &ExportCommand) -> Result<()> {
    let history = open_history(DEFAULT_HISTORY_CAPACITY).await?;
    let bytes = history.export(cmd.format.into())?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &bytes).context("Failed to write the export file")?;
            println!(
                "{} Exported {} record(s) to {}",
                CHECK,
                history.len(),
                style(path).bold()
            );
        }
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}

async fn clear_history(cmd: &ClearHistoryCommand) -> Result<()> {
    if !cmd.yes {
        println!(
            "{} Clearing history is irreversible; pass {} to confirm",
            WARN,
            style("--yes").bold()
        );
        std::process::exit(1);
    }

    let mut history = open_history(DEFAULT_HISTORY_CAPACITY).await?;
    let count = history.len();
    history.clear();
    history.flush().await;

    println!("{} Cleared {} record(s)", CHECK, count);
    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file);

    match result {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Steps: {}", style(config.steps.len()).cyan());
            println!(
                "  History capacity: {}",
                style(config.history_capacity()).cyan()
            );

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
