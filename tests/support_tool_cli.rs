use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const FIXTURE: &str = r#"{
  "cases": [
    {
      "case_number": "00000001",
      "summary": "Server fails to boot",
      "status": "Waiting on Customer",
      "severity": "2 (High)",
      "description": "The server stops at the grub prompt.",
      "comments": [
        {
          "created_by": "Support Engineer",
          "created_date": "2024-01-03T03:04:05Z",
          "text": "Please attach a sosreport."
        }
      ]
    }
  ],
  "solutions": [
    {
      "id": "1001",
      "title": "Kernel panic after update",
      "state": "VERIFIED",
      "resolution": "Boot the previous kernel."
    }
  ],
  "products": [
    {"name": "Enterprise Linux", "versions": ["8.9", "9.2"]}
  ]
}"#;

fn combined_output(output: &Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn support_tool_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_support-tool").expect("support-tool test binary not built")
}

/// Fresh directory holding the fixture and an empty settings path.
fn workspace(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "support-tool-cli-{label}-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create workspace");
    std::fs::write(dir.join("fixture.json"), FIXTURE).expect("write fixture");
    dir
}

fn support_tool(dir: &PathBuf) -> Command {
    let mut command = Command::new(support_tool_bin());
    command
        .env_remove("SUPPORT_TOOL_FIXTURE")
        .env_remove("SUPPORT_TOOL_MAX_RESULTS")
        .arg("--no-logs")
        .arg("--config")
        .arg(dir.join("settings.yaml"))
        .arg("--fixture")
        .arg(dir.join("fixture.json"));
    command
}

fn run_with_stdin(mut command: Command, input: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn support-tool");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for support-tool")
}

#[test]
fn support_tool_help_mentions_name() {
    let output = Command::new(support_tool_bin())
        .arg("--help")
        .output()
        .expect("run support-tool --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Support Tool"));
    assert!(combined.contains("--fixture"));
}

#[test]
fn batch_listcases_prints_case_records() {
    let dir = workspace("listcases");
    let output = support_tool(&dir)
        .arg("listcases")
        .output()
        .expect("run listcases");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("00000001"));
    assert!(combined.contains("Server fails to boot"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_getcase_prints_the_case_documents() {
    let dir = workspace("getcase");
    let output = support_tool(&dir)
        .args(["getcase", "00000001"])
        .output()
        .expect("run getcase");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("The server stops at the grub prompt."));
    assert!(combined.contains("Please attach a sosreport."));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_kb_prints_the_solution() {
    let dir = workspace("kb");
    let output = support_tool(&dir)
        .args(["kb", "1001"])
        .output()
        .expect("run kb");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("Kernel panic after update"));
    assert!(combined.contains("Boot the previous kernel."));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_listversions_prints_the_product_versions() {
    let dir = workspace("listversions");
    let output = support_tool(&dir)
        .args(["listversions", "enterprise", "linux"])
        .output()
        .expect("run listversions");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "8.9\n9.2\n");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn batch_opencase_reports_the_new_case_number() {
    let dir = workspace("opencase");
    let output = support_tool(&dir)
        .args([
            "opencase",
            "-s",
            "Disk full",
            "-p",
            "Enterprise Linux",
            "-v",
            "9.2",
            "-d",
            "The root volume filled up.",
        ])
        .output()
        .expect("run opencase");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("Support case 00000002 has successfully been opened."));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_batch_command_fails() {
    let dir = workspace("unknown");
    let output = support_tool(&dir)
        .arg("bogus")
        .output()
        .expect("run bogus");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("Unknown command 'bogus'"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn piped_stdin_becomes_the_comment_text() {
    let dir = workspace("addcomment");
    let mut command = support_tool(&dir);
    command.args(["addcomment", "-c", "00000001"]);
    let output = run_with_stdin(command, "Rebooted and it works\n");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("Successfully added comment to case 00000001"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn interactive_shell_greets_and_quits() {
    let dir = workspace("interactive");
    let output = run_with_stdin(support_tool(&dir), "q\n");
    let combined = combined_output(&output);
    assert!(output.status.success(), "{combined}");
    assert!(combined.contains("Welcome to the Support Tool."));
    assert!(combined.contains("Command (? for help): "));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_service_reports_a_connection_problem() {
    let dir = workspace("offline");
    let output = Command::new(support_tool_bin())
        .env_remove("SUPPORT_TOOL_FIXTURE")
        .arg("--no-logs")
        .arg("--config")
        .arg(dir.join("settings.yaml"))
        .args(["kb", "1001"])
        .output()
        .expect("run kb offline");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("Problem connecting to the support services API"));
    let _ = std::fs::remove_dir_all(dir);
}
