//! End-to-end runs of the `triage` binary against mock GitHub and completion servers.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use pipeline::SOURCE_DIVIDER;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEBUG_SYSTEM: &str = "system:\n  debug:\n    log_level: debug\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// A temp dir with `config.yaml` pointing both services at `server`,
    /// and a `src/` tree holding one Go file. `system` is written verbatim
    /// ahead of the other sections.
    fn new(server: &MockServer, system: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config = format!(
            r#"{system}github:
  api_url: {uri}
ai:
  model: gpt-4o-mini
  base_url: {uri}/v1
  commands:
    describe:
      description: Describe the issue
      system_prompt: "Help:"
"#,
            uri = server.uri()
        );
        std::fs::write(dir.path().join("config.yaml"), config).unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("a.go"), "package a").unwrap();
        Self { dir }
    }

    fn config(&self) -> String {
        self.dir.path().join("config.yaml").display().to_string()
    }

    fn source_root(&self) -> String {
        self.dir.path().join("src").display().to_string()
    }

    fn args(&self, command: &str) -> Vec<String> {
        [
            "--repo",
            "hello",
            "--owner",
            "octo",
            "--issue",
            "7",
            "--command",
            command,
            "--github-token",
            "ghp_test",
            "--api-key",
            "sk-test",
            "--config",
            &self.config(),
            "--source-root",
            &self.source_root(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

async fn run_triage(args: Vec<String>) -> Output {
    run_triage_with_rust_log(args, None).await
}

async fn run_triage_with_rust_log(args: Vec<String>, rust_log: Option<&'static str>) -> Output {
    tokio::task::spawn_blocking(move || {
        let mut command = Command::cargo_bin("triage").unwrap();
        command
            .args(&args)
            .env_remove("GITHUB_TOKEN")
            .env_remove("OPENAI_API_KEY")
            .env_remove("RUST_LOG")
            .env_remove("OTEL_EXPORTER_OTLP_ENDPOINT");
        if let Some(filter) = rust_log {
            command.env("RUST_LOG", filter);
        }
        command.output().unwrap()
    })
    .await
    .unwrap()
}

fn without_flag(args: Vec<String>, flag: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            iter.next();
            continue;
        }
        out.push(arg);
    }
    out
}

async fn mount_issue(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "title": "Bug", "body": "crashes" })),
        )
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "user": { "login": "alice" }, "body": "confirmed" },
            { "id": 2, "user": { "login": "github-actions[bot]" }, "body": "auto-note" }
        ])))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_completion(server: &MockServer, content: &str) {
    let prompt =
        format!("Help:Title:Bug\nBody:crashes\nalice:confirmed\n{SOURCE_DIVIDER}a.go:package a\n");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": prompt }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_post(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/7/comments"))
        .and(body_json(json!({ "body": body })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "html_url": "https://github.com/octo/hello/issues/7#issuecomment-42"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_completion_as_comment() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    mount_issue(&server).await;
    mount_completion(&server, "Try the nightly build.").await;
    mount_post(&server, "Try the nightly build.").await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let logs = stdout(&output);
    assert!(logs.contains("Triage complete"));
    assert!(logs.contains("Try the nightly build."));
    assert!(logs.contains("Title: Bug"));
    assert!(!logs.contains("auto-note"));
}

fn assert_no_diagnostics(logs: &str) {
    assert!(logs.contains("Triage complete"), "logs: {logs}");
    assert!(!logs.contains("Title: Bug"));
    assert!(!logs.contains("crashes"));
    assert!(!logs.contains("alice: confirmed"));
    assert!(!logs.contains("Try the nightly build."));
}

#[tokio::test(flavor = "multi_thread")]
async fn diagnostics_stay_off_without_debug_log_level() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, "");
    mount_issue(&server).await;
    mount_completion(&server, "Try the nightly build.").await;
    mount_post(&server, "Try the nightly build.").await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_no_diagnostics(&stdout(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_rust_log_overrides_debug_log_level() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    mount_issue(&server).await;
    mount_completion(&server, "Try the nightly build.").await;
    mount_post(&server, "Try the nightly build.").await;

    let output = run_triage_with_rust_log(workspace.args("describe"), Some("info")).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_no_diagnostics(&stdout(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_log_format_writes_one_object_per_line() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, "");
    mount_issue(&server).await;
    mount_completion(&server, "Try the nightly build.").await;
    mount_post(&server, "Try the nightly build.").await;
    let mut args = workspace.args("describe");
    args.extend(["--log-format".to_string(), "json".to_string()]);

    let output = run_triage(args).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let events: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let complete = events
        .iter()
        .find(|event| event["fields"]["message"] == "Triage complete")
        .unwrap();
    assert_eq!(complete["level"], "INFO");
    assert_eq!(complete["fields"]["comment_id"], "42");
    assert_eq!(complete["fields"]["issue"], "octo/hello#7");
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_completion_still_posts_comment() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    mount_issue(&server).await;
    mount_completion(&server, "").await;
    mount_post(&server, "").await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_required_argument_exits_1_without_network_calls() {
    for flag in [
        "--repo",
        "--owner",
        "--issue",
        "--command",
        "--github-token",
        "--api-key",
    ] {
        let server = MockServer::start().await;
        let workspace = Workspace::new(&server, DEBUG_SYSTEM);
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let output = run_triage(without_flag(workspace.args("describe"), flag)).await;

        assert_eq!(output.status.code(), Some(1), "flag {flag}");
        assert!(stderr(&output).contains(flag), "stderr should name {flag}");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_issue_number_is_a_usage_error() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    let mut args = workspace.args("describe");
    let issue = args.iter().position(|a| a == "--issue").unwrap();
    args[issue + 1] = "0".to_string();

    let output = run_triage(args).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_command_fails_before_network_calls() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);

    let output = run_triage(workspace.args("summarise")).await;

    assert_eq!(output.status.code(), Some(1));
    let logs = stdout(&output);
    assert!(logs.contains("Unknown command 'summarise' (available: describe)"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_config_is_fatal() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    let mut args = without_flag(workspace.args("describe"), "--config");
    args.push("--config".into());
    args.push(
        Path::new(&workspace.config())
            .with_file_name("missing.yaml")
            .display()
            .to_string(),
    );

    let output = run_triage(args).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Configuration error"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn post_failure_is_fatal() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(&server, DEBUG_SYSTEM);
    mount_issue(&server).await;
    mount_completion(&server, "answer").await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/hello/issues/7/comments"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "Resource not accessible by integration" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Resource not accessible by integration"));
}

#[tokio::test(flavor = "multi_thread")]
async fn abort_policy_stops_when_issue_fetch_fails() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(
        &server,
        &format!("{DEBUG_SYSTEM}  failure_policy: abort\n"),
    );
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Failed to fetch issue details"));
}

#[tokio::test(flavor = "multi_thread")]
async fn degrade_policy_posts_despite_failed_comment_fetch() {
    let server = MockServer::start().await;
    let workspace = Workspace::new(
        &server,
        &format!("{DEBUG_SYSTEM}  failure_policy: degrade\n"),
    );
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "title": "Bug", "body": "crashes" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/hello/issues/7/comments"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    let prompt = format!("Help:Title:Bug\nBody:crashes\n{SOURCE_DIVIDER}a.go:package a\n");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": prompt }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "partial answer" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_post(&server, "partial answer").await;

    let output = run_triage(workspace.args("describe")).await;

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("continuing with an empty value"));
}

#[tokio::test(flavor = "multi_thread")]
async fn help_exits_successfully() {
    let output = run_triage(vec!["--help".to_string()]).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--github-token"));
}
