//! Process-backed test cases.
//!
//! A command case spawns a program and asserts on its exit status and captured output. Processes are driven by a
//! current-thread tokio runtime owned by [`CommandRunner`] so a per-case timeout can kill a hung child.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde::Deserialize;
use testbundle_core::Failure;

/// Lines of captured output quoted in a status-mismatch failure.
const OUTPUT_TAIL_LINES: usize = 20;

/// A command to run as a test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Expected exit status.
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub stdout_contains: Option<String>,
    #[serde(default)]
    pub stderr_contains: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            status: 0,
            stdout_contains: None,
            stderr_contains: None,
            timeout_ms: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs [`CommandSpec`]s to completion and turns their results into failures.
pub struct CommandRunner {
    runtime: tokio::runtime::Runtime,
    default_timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(default_timeout: Option<Duration>) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            runtime,
            default_timeout,
        })
    }

    /// Run `spec` and return every failed check; empty means the case passed.
    pub fn run(&self, spec: &CommandSpec) -> Vec<Failure> {
        let timeout = spec.timeout_ms.map(Duration::from_millis).or(self.default_timeout);
        let output = match self.runtime.block_on(execute(spec, timeout)) {
            Ok(output) => output,
            Err(fault) => return vec![fault],
        };
        check_output(spec, &output)
    }
}

#[tracing::instrument(skip_all, fields(program = %spec.program))]
async fn execute(spec: &CommandSpec, timeout: Option<Duration>) -> Result<Output, Failure> {
    let mut cmd = tokio::process::Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let child = cmd
        .spawn()
        .map_err(|e| Failure::fault(format!("failed to spawn '{}': {}", spec.program, e)))?;
    let wait = child.wait_with_output();

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(timeout_ms = limit.as_millis() as u64, "command timed out; child killed");
                return Err(Failure::fault(format!("timed out after {}ms", limit.as_millis())));
            }
        },
        None => wait.await,
    };
    waited.map_err(|e| Failure::fault(format!("failed to wait for '{}': {}", spec.program, e)))
}

fn check_output(spec: &CommandSpec, output: &Output) -> Vec<Failure> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut failures = Vec::new();

    match output.status.code() {
        Some(code) if code == spec.status => {}
        Some(code) => {
            let mut msg = format!("expected exit status {} but was {}", spec.status, code);
            let tail = output_tail(&stdout, &stderr);
            if !tail.is_empty() {
                msg.push('\n');
                msg.push_str(&tail);
            }
            failures.push(Failure::assertion(msg));
        }
        None => failures.push(Failure::fault(format!("'{}' was terminated by a signal", spec.program))),
    }

    if let Some(needle) = &spec.stdout_contains {
        if !stdout.contains(needle.as_str()) {
            failures.push(Failure::assertion(format!("expected stdout to contain '{}'", needle)));
        }
    }
    if let Some(needle) = &spec.stderr_contains {
        if !stderr.contains(needle.as_str()) {
            failures.push(Failure::assertion(format!("expected stderr to contain '{}'", needle)));
        }
    }
    failures
}

/// The last lines of combined output, trimmed.
fn output_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|l| !l.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}
