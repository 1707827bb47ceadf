//! Subcommand bodies. Each takes the repository and an output sink so they
//! run the same against a [`FileStore`](audiocare_storage::file_store::FileStore)
//! or an in-memory store.

use std::io::Write;
use std::path::{Path, PathBuf};

use audiocare_core::ids::{CustomerId, VisitId};
use audiocare_core::keys;
use audiocare_export::ExportTable;
use audiocare_protocol::session::{HaSession, SessionMutation};
use audiocare_protocol::stage::Stage;
use audiocare_storage::backup::{
    RestoreMode, backup_stats, create_backup, restore_backup, validate_backup,
};
use audiocare_storage::error::StorageError;
use audiocare_storage::file_store::FileStore;
use audiocare_storage::repository::SessionRepository;
use eyre::{Result, WrapErr};
use jiff::Timestamp;
use jiff::civil::Date;

use crate::cli::{ExportFormat, VisitRef};

pub fn load_session(repo: &impl SessionRepository, target: &VisitRef) -> Result<HaSession> {
    let customer = CustomerId::from(target.customer.as_str());
    let visit = VisitId::from(target.visit.as_str());
    let session = repo
        .load(&customer, &visit)?
        .ok_or_else(|| StorageError::NotFound {
            key: keys::session(&customer, &visit),
        })?;
    Ok(session)
}

/// Create and save a new session. Pure-tone and speech results are carried
/// over from the customer's most recent earlier visits.
pub fn new_session(
    repo: &mut impl SessionRepository,
    customer: &str,
    visit: Option<&str>,
    stage: Stage,
    visit_date: Option<Date>,
    now: Timestamp,
) -> Result<HaSession> {
    let customer = CustomerId::from(customer);
    let visit = visit.map_or_else(VisitId::generate, VisitId::from);
    customer.validate()?;
    visit.validate()?;

    if repo.load(&customer, &visit)?.is_some() {
        eyre::bail!("session {customer}/{visit} already exists");
    }

    let prior = repo.find_prior_results(&customer, &visit)?;
    let session = HaSession::create(customer, visit, stage, visit_date, prior.as_ref(), now);
    repo.save(&session)?;

    tracing::info!(
        customer = %session.customer_id,
        visit = %session.visit_id,
        stage = %stage,
        seeded = prior.is_some(),
        "session started"
    );
    Ok(session)
}

/// Parse one mutation or an array of them.
pub fn parse_mutations(json: &str) -> Result<Vec<SessionMutation>> {
    let value: serde_json::Value =
        serde_json::from_str(json).wrap_err("edit is not valid JSON")?;
    let mutations = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(mutations)
}

/// Apply every edit in order and save once. Nothing is saved if any edit is
/// refused.
pub fn apply_mutations(
    repo: &mut impl SessionRepository,
    target: &VisitRef,
    mutations: Vec<SessionMutation>,
    now: Timestamp,
) -> Result<HaSession> {
    let mut session = load_session(repo, target)?;
    let count = mutations.len();
    for (index, mutation) in mutations.into_iter().enumerate() {
        session = session
            .try_apply(mutation, now)
            .wrap_err_with(|| format!("edit #{} of {count} refused", index + 1))?;
    }
    repo.save(&session)?;
    tracing::info!(
        customer = %session.customer_id,
        visit = %session.visit_id,
        edits = count,
        "session updated"
    );
    Ok(session)
}

pub fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn list(repo: &impl SessionRepository, customer: &str, out: &mut impl Write) -> Result<()> {
    let sessions = repo.list_for_customer(&CustomerId::from(customer))?;
    for session in &sessions {
        let date = session
            .visit_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let missing = session.missing_required().len();
        let state = if missing == 0 {
            "complete".to_string()
        } else {
            format!("{missing} missing")
        };
        writeln!(out, "{}\t{date}\t{}\t{state}", session.visit_id, session.stage)?;
    }
    Ok(())
}

pub fn missing(session: &HaSession, out: &mut impl Write) -> Result<()> {
    let items = session.missing_required();
    if items.is_empty() {
        writeln!(out, "all required items done")?;
        return Ok(());
    }
    for item in items {
        writeln!(out, "{}\t{}", item.key, item.label)?;
    }
    Ok(())
}

pub fn export(
    repo: &impl SessionRepository,
    customer: Option<&str>,
    format: ExportFormat,
    out: &mut impl Write,
) -> Result<usize> {
    let sessions = match customer {
        Some(customer) => repo.list_for_customer(&CustomerId::from(customer))?,
        None => repo.all()?,
    };
    let table = ExportTable::from_sessions(&sessions);
    match format {
        ExportFormat::Tsv => table.write_tsv(out)?,
        ExportFormat::Json => table.write_json(out)?,
    }
    Ok(sessions.len())
}

/// Where an export goes. A directory gets a file named after the clinic.
pub fn export_path(
    output: PathBuf,
    clinic_name: Option<&str>,
    format: ExportFormat,
    now: Timestamp,
) -> PathBuf {
    if output.is_dir() {
        output.join(export_file_name(clinic_name, format, now))
    } else {
        output
    }
}

pub fn export_file_name(clinic_name: Option<&str>, format: ExportFormat, now: Timestamp) -> String {
    let prefix = clinic_name
        .map(file_slug)
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| "audiocare".to_string());
    let extension = match format {
        ExportFormat::Tsv => "tsv",
        ExportFormat::Json => "json",
    };
    format!("{prefix}-export-{}.{extension}", now.as_second())
}

fn file_slug(name: &str) -> String {
    let lowered: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .flat_map(char::to_lowercase)
        .collect();
    lowered
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Write a backup bundle and return where it went.
pub fn backup(
    repo: &impl SessionRepository,
    data_dir: &Path,
    output: Option<PathBuf>,
    now: Timestamp,
) -> Result<PathBuf> {
    let bundle = create_backup(repo, now)?;
    let path = output.unwrap_or_else(|| data_dir.join(keys::backup(now)));
    let json = serde_json::to_vec_pretty(&bundle)?;
    FileStore::write_atomic(&path, &json)?;
    tracing::info!(
        path = %path.display(),
        sessions = bundle.data.ha_sessions.len(),
        "backup written"
    );
    Ok(path)
}

pub fn restore(
    repo: &mut impl SessionRepository,
    input: &Path,
    merge: bool,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<()> {
    let bytes = std::fs::read(input)
        .map_err(|e| eyre::eyre!("failed to read backup at {}: {e}", input.display()))?;
    let bundle = validate_backup(&bytes)?;

    let stats = backup_stats(&bundle);
    writeln!(
        out,
        "backup {} from {}: {} sessions, {} customers",
        bundle.version, bundle.timestamp, stats.sessions, stats.customers
    )?;
    for (stage, count) in &stats.by_stage {
        writeln!(out, "  {stage}: {count}")?;
    }
    if dry_run {
        return Ok(());
    }

    let mode = if merge {
        RestoreMode::Merge
    } else {
        RestoreMode::Replace
    };
    let report = restore_backup(repo, &bundle, mode)?;
    writeln!(out, "restored {} sessions", report.restored)?;
    for (key, reason) in &report.skipped {
        writeln!(out, "  skipped {key}: {reason}")?;
    }
    Ok(())
}
