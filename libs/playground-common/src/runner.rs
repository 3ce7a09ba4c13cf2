/// Language Runner - Session State
///
/// Holds the selected language, source buffer and stdin buffer for one
/// runner pane, and decides what gets displayed when a run completes.
///
/// Two guards live here:
/// - a run cannot start while another one from the same session is in flight
/// - every run is tagged with a sequence number; a completion that is not the
///   latest issued is discarded, so out-of-order replies never overwrite a
///   newer result
///
/// The session never talks to the network itself. Callers take a
/// `RunTicket`, perform the relay call, and hand the outcome back.

use crate::templates;
use crate::types::{RunRequest, RunResult};

pub const DEFAULT_LANGUAGE: &str = "javascript";
pub const NO_OUTPUT: &str = "(no output)";

/// Proof that a run was started, carrying its sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    pub seq: u64,
    pub request: RunRequest,
}

/// What the output pane shows for a finished run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunResult),
    /// Request-level failure (transport error, non-200 relay reply)
    Failed { error: String },
}

impl RunOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        RunOutcome::Failed {
            error: error.into(),
        }
    }
}

/// Result of handing an outcome back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Displayed,
    /// A newer run was issued after this one
    Stale,
}

#[derive(Debug, Clone)]
pub struct RunnerSession {
    language: String,
    code: String,
    stdin: String,
    running: bool,
    last_issued: u64,
    outcome: Option<RunOutcome>,
}

impl Default for RunnerSession {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl RunnerSession {
    /// New session pre-filled with the language's template
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            code: templates::template_for(language).unwrap_or_default().to_string(),
            stdin: String::new(),
            running: false,
            last_issued: 0,
            outcome: None,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn stdin(&self) -> &str {
        &self.stdin
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn set_stdin(&mut self, stdin: impl Into<String>) {
        self.stdin = stdin.into();
    }

    /// Switch language. The editor is refilled with the new template only if
    /// it is empty or still holds an unmodified template.
    pub fn switch_language(&mut self, language: &str) {
        self.language = language.to_string();
        let current = self.code.trim();
        if current.is_empty() || templates::is_template(current) {
            self.code = templates::template_for(language).unwrap_or_default().to_string();
        }
    }

    /// Explicit "Template" action: overwrite unconditionally
    pub fn insert_template(&mut self) {
        self.code = templates::template_for(&self.language)
            .unwrap_or_default()
            .to_string();
    }

    /// Start a run. Returns `None` while another run is outstanding.
    pub fn begin_run(&mut self) -> Option<RunTicket> {
        if self.running {
            return None;
        }
        self.running = true;
        self.outcome = None;
        self.last_issued += 1;

        Some(RunTicket {
            seq: self.last_issued,
            request: RunRequest::new(self.language.clone(), self.code.clone())
                .with_stdin(self.stdin.clone()),
        })
    }

    /// Hand back the outcome for a ticket
    pub fn complete(&mut self, ticket: &RunTicket, outcome: RunOutcome) -> Completion {
        if ticket.seq != self.last_issued {
            tracing::debug!(seq = ticket.seq, latest = self.last_issued, "Discarding stale run result");
            return Completion::Stale;
        }
        self.running = false;
        self.outcome = Some(outcome);
        Completion::Displayed
    }

    /// Forget a run without displaying anything (the pane must never stay latched)
    pub fn abandon(&mut self) {
        self.running = false;
        self.last_issued += 1;
    }
}

fn display_or_dash(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

/// Render the output pane: compile diagnostics, stdout, stderr (or a
/// placeholder), then a metadata line.
pub fn render_output(outcome: &RunOutcome) -> String {
    let result = match outcome {
        RunOutcome::Failed { error } => return format!("error: {}", error),
        RunOutcome::Completed(result) => result,
    };

    let mut sections: Vec<&str> = Vec::new();
    if !result.compile_stderr.is_empty() {
        sections.push(&result.compile_stderr);
    }
    if !result.stdout.is_empty() {
        sections.push(&result.stdout);
    }
    if !result.stderr.is_empty() {
        sections.push(&result.stderr);
    }
    if sections.is_empty() {
        sections.push(NO_OUTPUT);
    }

    let mut rendered = sections
        .iter()
        .map(|s| s.trim_end_matches('\n'))
        .collect::<Vec<_>>()
        .join("\n");
    rendered.push('\n');
    rendered.push_str(&format!(
        "{} • time: {}s • mem: {} KB",
        result.language,
        display_or_dash(result.time_seconds),
        display_or_dash(result.memory_kb),
    ));
    rendered
}
