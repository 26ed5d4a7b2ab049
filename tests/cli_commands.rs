//! CLI command tests against temporary database directories

use std::fs;
use std::path::PathBuf;

use aeroql::cli::{explain_plan, query, run_command, Command};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.txt"), "R A B\nS B C\nBroken\n").unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/R.csv"), "1,10\n2,20\n").unwrap();
        fs::write(dir.path().join("data/S.csv"), "10,100\n30,300\n").unwrap();
        Self { dir }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn sql(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out.csv")
    }
}

#[test]
fn test_query_writes_output_file() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT R.A, S.C FROM R, S WHERE R.B = S.B;\n");

    query(&fx.db(), &input, &fx.out(), None).unwrap();
    assert_eq!(fs::read_to_string(fx.out()).unwrap(), "1, 100\n");
}

#[test]
fn test_empty_result_creates_empty_file() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT * FROM R WHERE R.A > 5");

    query(&fx.db(), &input, &fx.out(), None).unwrap();
    assert_eq!(fs::read_to_string(fx.out()).unwrap(), "");
}

#[test]
fn test_failed_query_writes_nothing() {
    let fx = Fixture::new();
    fs::write(fx.dir.path().join("data/S.csv"), "10,100\n30,oops\n").unwrap();
    let input = fx.sql("q.sql", "SELECT * FROM R, S");

    let err = query(&fx.db(), &input, &fx.out(), None).unwrap_err();
    assert_eq!(err.code_str(), "AERO_MALFORMED_ROW");
    assert!(!fx.out().exists());
}

#[test]
fn test_rejected_query_writes_nothing() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT * FROM R LIMIT 1");

    let err = query(&fx.db(), &input, &fx.out(), None).unwrap_err();
    assert_eq!(err.code_str(), "AERO_QUERY_UNSUPPORTED");
    assert!(!fx.out().exists());
}

#[test]
fn test_skipped_catalog_line_does_not_block_queries() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT * FROM Broken");

    let err = query(&fx.db(), &input, &fx.out(), None).unwrap_err();
    assert_eq!(err.code_str(), "AERO_UNKNOWN_TABLE");
}

#[test]
fn test_table_with_repeated_column_is_not_registered() {
    let fx = Fixture::new();
    fs::write(fx.dir.path().join("schema.txt"), "R A A\n").unwrap();
    fs::write(fx.dir.path().join("data/R.csv"), "1,2\n1,3\n").unwrap();
    let input = fx.sql("q.sql", "SELECT DISTINCT * FROM R");

    let err = query(&fx.db(), &input, &fx.out(), None).unwrap_err();
    assert_eq!(err.code_str(), "AERO_UNKNOWN_TABLE");
    assert!(!fx.out().exists());
}

#[test]
fn test_missing_schema_file() {
    let fx = Fixture::new();
    fs::remove_file(fx.dir.path().join("schema.txt")).unwrap();
    let input = fx.sql("q.sql", "SELECT * FROM R");

    let err = query(&fx.db(), &input, &fx.out(), None).unwrap_err();
    assert_eq!(err.code_str(), "AERO_CATALOG_SCHEMA_MISSING");
}

#[test]
fn test_config_changes_layout() {
    let fx = Fixture::new();
    fs::write(fx.dir.path().join("tables.def"), "T X\n").unwrap();
    fs::create_dir(fx.dir.path().join("csv")).unwrap();
    fs::write(fx.dir.path().join("csv/T.csv"), "3\n1\n2\n").unwrap();
    let config = fx.sql(
        "aeroql.json",
        r#"{"schema_file": "tables.def", "data_subdir": "csv", "log_level": "error"}"#,
    );
    let input = fx.sql("q.sql", "SELECT * FROM T ORDER BY X");

    query(&fx.db(), &input, &fx.out(), Some(&config)).unwrap();
    assert_eq!(fs::read_to_string(fx.out()).unwrap(), "1\n2\n3\n");
}

#[test]
fn test_invalid_config_rejected() {
    let fx = Fixture::new();
    let config = fx.sql("aeroql.json", r#"{"log_level": "chatty"}"#);
    let input = fx.sql("q.sql", "SELECT * FROM R");

    let err = query(&fx.db(), &input, &fx.out(), Some(&config)).unwrap_err();
    assert_eq!(err.code_str(), "AERO_CLI_CONFIG_ERROR");
}

#[test]
fn test_run_command_dispatches_query() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT DISTINCT S.B FROM S ORDER BY S.B DESC");

    run_command(Command::Query {
        database_dir: fx.db(),
        input_file: input,
        output_file: fx.out(),
        config: None,
    })
    .unwrap();
    assert_eq!(fs::read_to_string(fx.out()).unwrap(), "30\n10\n");
}

#[test]
fn test_explain_json() {
    let fx = Fixture::new();
    let input = fx.sql(
        "q.sql",
        "SELECT R.A FROM R JOIN S ON R.B = S.B WHERE R.A = 1",
    );

    let explain = explain_plan(&fx.db(), &input, None).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&explain.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["accepted"], true);
    assert_eq!(json["output_columns"], serde_json::json!(["R.A"]));
    assert_eq!(json["plan"]["operator"], "project");
    let join = &json["plan"]["input"];
    assert_eq!(join["operator"], "join");
    assert_eq!(join["conditions"], serde_json::json!(["R.B = S.B"]));
    assert_eq!(join["left"]["operator"], "select");
    assert_eq!(join["left"]["predicate"], "R.A = 1");
    assert_eq!(join["right"]["operator"], "scan");
}

#[test]
fn test_explain_rejection_document() {
    let fx = Fixture::new();
    let input = fx.sql("q.sql", "SELECT R.Q FROM R");

    let explain = explain_plan(&fx.db(), &input, None).unwrap();
    assert!(!explain.accepted);
    assert_eq!(
        explain.rejection_code.as_deref(),
        Some("AERO_QUERY_UNKNOWN_COLUMN")
    );
    assert!(explain.plan.is_none());
}
