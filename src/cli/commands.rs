//! CLI command implementations
//!
//! Both commands follow the same sequence:
//!
//! 1. Configuration load (optional file, defaults otherwise)
//! 2. Catalog load
//! 3. Query file read, parse and plan
//!
//! `query` then executes the plan to completion in memory and only then
//! creates the output file. `explain` prints the plan as JSON instead.

use std::path::Path;

use uuid::Uuid;

use crate::catalog::Catalog;
use crate::executor;
use crate::observability::{Logger, ObservationScope};
use crate::planner::{parse_query, ExplainPlan, PlannerResult, QueryPlan, QueryPlanner};

use super::args::Command;
use super::config::EngineConfig;
use super::errors::CliResult;
use super::io::{read_query, write_json, write_result};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query {
            database_dir,
            input_file,
            output_file,
            config,
        } => query(&database_dir, &input_file, &output_file, config.as_deref()),
        Command::Explain {
            database_dir,
            input_file,
            config,
        } => explain(&database_dir, &input_file, config.as_deref()),
    }
}

/// Executes the query in `input_file` and writes its result to
/// `output_file`.
///
/// On any failure the output file is left untouched.
pub fn query(
    database_dir: &Path,
    input_file: &Path,
    output_file: &Path,
    config_path: Option<&Path>,
) -> CliResult<()> {
    let config = configure(config_path)?;

    let query_id = Uuid::new_v4().to_string();
    let input_display = input_file.display().to_string();
    let scope = ObservationScope::with_fields(
        "QUERY",
        &[("input_file", &input_display), ("query_id", &query_id)],
    );

    let outcome = plan_file(database_dir, input_file, &config).and_then(|(catalog, planned)| {
        let plan = planned?;
        let result = executor::execute(&plan, &catalog)?;
        write_result(output_file, &result)?;
        Ok(result.len())
    });

    match outcome {
        Ok(rows) => {
            scope.complete_with_fields(&[("rows", &rows.to_string())]);
            Ok(())
        }
        Err(e) => {
            scope.fail(e.code_str(), &e.to_string());
            Err(e)
        }
    }
}

/// Prints the plan for the query in `input_file` as pretty JSON.
///
/// A rejected query still prints its rejection document, then fails.
pub fn explain(database_dir: &Path, input_file: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = configure(config_path)?;
    let (_catalog, planned) = plan_file(database_dir, input_file, &config)?;

    let explain = match &planned {
        Ok(plan) => ExplainPlan::from_plan(plan),
        Err(e) => ExplainPlan::from_error(e),
    };
    write_json(&explain.to_json_pretty()?)?;

    planned?;
    Ok(())
}

/// Builds the explain document without printing it
pub fn explain_plan(
    database_dir: &Path,
    input_file: &Path,
    config_path: Option<&Path>,
) -> CliResult<ExplainPlan> {
    let config = EngineConfig::load_or_default(config_path)?;
    let (_catalog, planned) = plan_file(database_dir, input_file, &config)?;
    Ok(match planned {
        Ok(plan) => ExplainPlan::from_plan(&plan),
        Err(e) => ExplainPlan::from_error(&e),
    })
}

fn configure(config_path: Option<&Path>) -> CliResult<EngineConfig> {
    let config = EngineConfig::load_or_default(config_path)?;
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

/// Loads the catalog and plans the query file.
///
/// Catalog and I/O failures are CLI errors; planner rejections are returned
/// separately so explain can describe them.
fn plan_file(
    database_dir: &Path,
    input_file: &Path,
    config: &EngineConfig,
) -> CliResult<(Catalog, PlannerResult<QueryPlan>)> {
    let catalog = Catalog::load_from(database_dir, &config.schema_file, &config.data_subdir)?;
    let sql = read_query(input_file)?;
    let planned = parse_query(&sql).and_then(|q| QueryPlanner::new(&catalog).plan(&q));
    Ok((catalog, planned))
}
