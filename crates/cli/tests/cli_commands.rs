use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const DEFINITIONS: &str = r#"
kpis:
  Availability:
    unit: "%"
    direction: higher_is_better
    threshold_low: 99.0
    threshold_high: 99.9
    peer_avg: 99.7
    subject_area: Accessibility
  Setup Failure Rate:
    unit: "%"
    direction: lower_is_better
    threshold_low: 1.0
    threshold_high: 2.0
    subject_area: Accessibility
  Average Latency:
    unit: ms
    direction: lower_is_better
    threshold_low: 20.0
    threshold_high: 40.0
    subject_area: Integrity
"#;

const OBSERVATIONS: &str = r#"
- kpi: Availability
  current: 99.95
  prior: 99.8
- kpi: Setup Failure Rate
  current: 2.5
  prior: 2.0
- kpi: Average Latency
  current: 30.0
  prior: 0.0
- kpi: Handover Success
  current: 97.0
  prior: 96.0
"#;

const INSIGHT_REPLY: &str = r#"{
  "overall_summary": "Accessibility needs attention on setup failures.",
  "kpi_details": [
    {"kpi_name": "Availability", "status": "Good", "bullets": ["Above target"]},
    {"kpi_name": "Setup Failure Rate", "status": "Critical", "bullets": ["Up 25% period over period"]}
  ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("kpis.yaml"), DEFINITIONS).unwrap();
        fs::write(dir.path().join("observations.yaml"), OBSERVATIONS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("kpi-insight").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("RUST_LOG")
            .env_remove("LLM_PROVIDER")
            .env_remove("LLM_BASE_URL")
            .env_remove("LLM_MAX_RETRIES")
            .env_remove("LLM_TIMEOUT_SECS")
            .env_remove("OPENAI_API_KEY")
            .env_remove("ANTHROPIC_API_KEY")
            .env("NO_COLOR", "1");
        cmd
    }
}

fn chat_completion(content: &str) -> String {
    serde_json::json!({
        "model": "local-model",
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[test]
fn test_check_config_lists_subject_areas() {
    let ws = Workspace::new();

    ws.command()
        .args(["check-config", &ws.path("kpis.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accessibility, Integrity"))
        .stdout(predicate::str::contains("3 KPI definitions are valid"));
}

#[test]
fn test_check_config_reports_inverted_thresholds() {
    let ws = Workspace::new();
    fs::write(
        ws.path("bad.yaml"),
        "kpis:\n  Drop Rate:\n    unit: \"%\"\n    direction: lower_is_better\n    threshold_low: 5.0\n    threshold_high: 1.0\n",
    )
    .unwrap();

    ws.command()
        .args(["check-config", &ws.path("bad.yaml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Drop Rate"));
}

#[test]
fn test_evaluate_json_reports_facts_and_errors() {
    let ws = Workspace::new();

    let output = ws
        .command()
        .args([
            "evaluate",
            &ws.path("kpis.yaml"),
            &ws.path("observations.yaml"),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let facts = json["facts"].as_array().unwrap();
    assert_eq!(facts.len(), 3);
    assert_eq!(facts[0]["kpi"], "Availability");
    assert_eq!(facts[0]["status"], "Good");
    assert_eq!(facts[1]["status"], "Critical");
    assert_eq!(facts[2]["percent_change"], "n/a");

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["kpi"], "Handover Success");
    assert_eq!(errors[0]["code"], "unknown_kpi");
}

#[test]
fn test_evaluate_table_succeeds_despite_item_errors() {
    let ws = Workspace::new();

    ws.command()
        .args(["evaluate", &ws.path("kpis.yaml"), &ws.path("observations.yaml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Setup Failure Rate"))
        .stderr(predicate::str::contains("Handover Success"));
}

#[test]
fn test_evaluate_missing_file_fails() {
    let ws = Workspace::new();

    ws.command()
        .args(["evaluate", &ws.path("missing.yaml"), &ws.path("observations.yaml")])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to load KPI definitions"));
}

#[test]
fn test_insights_for_tab_with_local_provider() {
    let ws = Workspace::new();
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion(INSIGHT_REPLY))
        .expect(1)
        .create();

    ws.command()
        .env("LLM_PROVIDER", "local")
        .env("LLM_BASE_URL", format!("{}/v1", server.url()))
        .args([
            "insights",
            &ws.path("kpis.yaml"),
            &ws.path("observations.yaml"),
            "--tab",
            "Accessibility",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accessibility needs attention"))
        .stdout(predicate::str::contains("Up 25% period over period"));

    mock.assert();
}

#[test]
fn test_insights_for_tab_reports_unknown_kpis() {
    let ws = Workspace::new();
    let mut server = Server::new();
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion(INSIGHT_REPLY))
        .create();

    let output = ws
        .command()
        .env("LLM_PROVIDER", "local")
        .env("LLM_BASE_URL", format!("{}/v1", server.url()))
        .args([
            "insights",
            &ws.path("kpis.yaml"),
            &ws.path("observations.yaml"),
            "--tab",
            "Accessibility",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kpis: Vec<&str> = json["facts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|fact| fact["kpi"].as_str().unwrap())
        .collect();
    // Average Latency belongs to another tab
    assert_eq!(kpis, ["Availability", "Setup Failure Rate"]);

    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["kpi"], "Handover Success");
    assert_eq!(errors[0]["code"], "unknown_kpi");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Handover Success"));
}

#[test]
fn test_insights_malformed_reply_exits_with_provider_failure() {
    let ws = Workspace::new();
    let mut server = Server::new();
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(chat_completion("Here are your insights: everything is fine"))
        .create();

    ws.command()
        .env("LLM_PROVIDER", "local")
        .env("LLM_BASE_URL", format!("{}/v1", server.url()))
        .args([
            "insights",
            &ws.path("kpis.yaml"),
            &ws.path("observations.yaml"),
            "--tab",
            "accessibility",
            "--format",
            "json",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed provider response"))
        .stderr(predicate::str::contains("Hint:"));
}

#[test]
fn test_insights_unknown_tab_fails() {
    let ws = Workspace::new();

    ws.command()
        .env("LLM_PROVIDER", "local")
        .args([
            "insights",
            &ws.path("kpis.yaml"),
            &ws.path("observations.yaml"),
            "--tab",
            "Mobility",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown subject area 'Mobility'"));
}

#[test]
fn test_insights_missing_api_key_is_provider_failure() {
    let ws = Workspace::new();

    ws.command()
        .env("LLM_PROVIDER", "openai")
        .args(["insights", &ws.path("kpis.yaml"), &ws.path("observations.yaml")])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}
