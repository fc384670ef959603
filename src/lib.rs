pub mod case;
pub mod common;
pub mod commonattr;
pub mod config;
pub mod correlation;
pub mod database;
pub mod error;
pub mod local_files;
pub mod logging;
pub mod report;

use std::io::Write;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::commonattr::{CommonAttributeSearcher, InterCaseSearcher, IntraCaseSearcher, SearchContext};
use crate::error::{CorrelationError, CorrelationResult};

pub const USAGE: &str = "usage: ffx-correlate <case.db> <case-name> [central-repo.db] [config.json]";

fn run_search(
    searcher: &dyn CommonAttributeSearcher,
    ctx: &SearchContext<'_>,
) -> CorrelationResult<report::SearchReport> {
    let results = searcher.find_matches(ctx)?;
    info!(title = %searcher.tab_title(), values = results.value_count(), "Search complete");
    Ok(report::build_report(searcher, &results, ctx))
}

/// Run the intra-case search, plus the inter-case search when a central
/// repository is available, and write the reports to stdout as JSON
pub fn run(args: &[String]) -> CorrelationResult<()> {
    let (case_db_path, case_name) = match args {
        [case_db, case_name, ..] => (PathBuf::from(case_db), case_name.as_str()),
        _ => return Err(CorrelationError::Usage(USAGE.to_string())),
    };

    let config_path = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    if !case_db_path.exists() {
        return Err(CorrelationError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Case database not found: {}", case_db_path.display()),
        )));
    }
    let case_db = database::SqliteCaseDatabase::open(&case_db_path)?;

    let repo_path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.central_repo_path());
    let repository = if repo_path.exists() {
        Some(database::init_central_repository(&repo_path)?)
    } else {
        warn!("Central repository not found at {:?}; inter-case search disabled", repo_path);
        None
    };

    let mut ctx = SearchContext::new(&case_db, case_name);
    if let Some(repository) = repository {
        ctx = ctx.with_repository(repository);
    }

    // The intra-case search also uses the repository for its frequency threshold
    let mut reports = vec![run_search(&IntraCaseSearcher::all_data_sources(&config), &ctx)?];
    if ctx.repository.is_some() {
        reports.push(run_search(&InterCaseSearcher::all_cases(&config), &ctx)?);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &reports)?;
    writeln!(out)?;
    Ok(())
}

/// Run and map the outcome to a process exit code. Failures are logged once.
pub fn run_cli(args: &[String]) -> i32 {
    match run(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}
