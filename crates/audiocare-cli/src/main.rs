use std::io::{Read, Write};

use audiocare_cli::cli::{Cli, Command, VisitRef};
use audiocare_cli::{commands, config, logging};
use audiocare_storage::file_store::FileStore;
use clap::Parser;
use eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let mut config = config::load_or_init(&config_path)?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    logging::init(cli.log_format.unwrap_or(config.log_format));

    let mut store = FileStore::open(&config.data_dir)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "store opened");

    let now = jiff::Timestamp::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::New {
            customer,
            visit,
            stage,
            date,
        } => {
            let session =
                commands::new_session(&mut store, &customer, visit.as_deref(), stage, date, now)?;
            writeln!(out, "{}", session.visit_id)?;
        }
        Command::Show(target) => {
            let session = commands::load_session(&store, &target)?;
            commands::write_json(&mut out, &session)?;
        }
        Command::List { customer } => commands::list(&store, &customer, &mut out)?,
        Command::Summary(target) => {
            let session = commands::load_session(&store, &target)?;
            commands::write_json(&mut out, &session.summary())?;
        }
        Command::Missing(target) => {
            let session = commands::load_session(&store, &target)?;
            commands::missing(&session, &mut out)?;
        }
        Command::Apply { target, json } => apply(&mut store, &target, json, now)?,
        Command::Export {
            customer,
            format,
            output,
        } => {
            let count = match output {
                Some(path) => {
                    let path =
                        commands::export_path(path, config.clinic_name.as_deref(), format, now);
                    tracing::debug!(path = %path.display(), "exporting to file");
                    let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
                    let count = commands::export(&store, customer.as_deref(), format, &mut file)?;
                    file.flush()?;
                    count
                }
                None => commands::export(&store, customer.as_deref(), format, &mut out)?,
            };
            tracing::info!(sessions = count, "export finished");
        }
        Command::Backup { output } => {
            let path = commands::backup(&store, &config.data_dir, output, now)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Restore {
            input,
            merge,
            dry_run,
        } => commands::restore(&mut store, &input, merge, dry_run, &mut out)?,
        Command::Config => {
            writeln!(out, "# {}", config_path.display())?;
            commands::write_json(&mut out, &config)?;
        }
    }

    Ok(())
}

fn apply(
    store: &mut FileStore,
    target: &VisitRef,
    json: Option<String>,
    now: jiff::Timestamp,
) -> Result<()> {
    let json = match json {
        Some(json) => json,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let mutations = commands::parse_mutations(&json)?;
    commands::apply_mutations(store, target, mutations, now)?;
    Ok(())
}
