//! External command execution.
//!
//! All version-control work goes through one blocking process
//! abstraction that captures `{stdout, stderr, exit code}` and maps
//! non-zero exits to [`Error::Process`]. Known-noisy stderr prefixes are
//! filtered before logging so successful runs stay quiet.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Error;
use crate::log;

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; -1 when the process was terminated by a signal.
    pub code: i32,
}

impl ProcessOutput {
    /// Trimmed stdout, for single-value command output.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Stderr prefixes that are progress chatter, not problems.
const NOISE_PREFIXES: &[&str] = &[
    "Cloning into",
    "warning:",
    "remote:",
    "To https://",
    "branch '",
];

/// Run `program` with `args` in `root`, capturing output.
///
/// # Errors
///
/// [`Error::Io`] if the program cannot be spawned (not installed),
/// [`Error::Process`] on a non-zero exit, with trimmed stderr attached.
pub fn run_tool<S: AsRef<OsStr>>(
    root: &Path,
    program: &str,
    args: &[S],
) -> Result<ProcessOutput, Error> {
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let code = output.status.code().unwrap_or(-1);

    if !output.status.success() {
        return Err(Error::Process {
            name: program.to_string(),
            code,
            stderr: strip_ansi(stderr.trim()).into_owned(),
        });
    }

    let output = ProcessOutput {
        stdout,
        stderr,
        code,
    };
    log_filtered(program, &output.stderr);
    Ok(output)
}

/// Run the version-control tool in `root`.
pub fn git<S: AsRef<OsStr>>(root: &Path, args: &[S]) -> Result<ProcessOutput, Error> {
    run_tool(root, "git", args)
}

/// Log interesting stderr lines of a successful run.
fn log_filtered(name: &str, stderr: &str) {
    let mut kept = Vec::new();
    for line in stderr.lines() {
        let plain = strip_ansi(line);
        let trimmed = plain.trim();
        if !trimmed.is_empty() && !NOISE_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            kept.push(line);
        }
    }
    if !kept.is_empty() {
        log!(name; "{}", kept.join("\n"));
    }
}

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================
