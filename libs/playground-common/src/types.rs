use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize a field that callers may send as `null` or omit entirely.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scalar JSON as the text the backend will see; strings stay unquoted.
fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// `stdin` may arrive as any JSON value; it is forwarded as text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(Value::deserialize(deserializer)?))
}

/// `args` may hold numbers or booleans, or be a lone scalar.
fn lenient_args<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(value_text).collect(),
        other => vec![value_text(other)],
    })
}

/// Body of `POST /exec/run`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub language: String,
    #[serde(default, deserialize_with = "nullable")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stdin: String,
    #[serde(default, deserialize_with = "lenient_args")]
    pub args: Vec<String>,
}

impl RunRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Both `language` and `code` must be present for the relay to forward.
    pub fn has_required_fields(&self) -> bool {
        !self.language.is_empty() && !self.code.is_empty()
    }
}

/// Normalized execution outcome returned to the playground.
///
/// `output` is display-only; `stdout` and `stderr` stay the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub language: String,
    #[serde(default, deserialize_with = "nullable")]
    pub stdout: String,
    #[serde(default, deserialize_with = "nullable")]
    pub stderr: String,
    #[serde(default, deserialize_with = "nullable")]
    pub output: String,
    #[serde(rename = "code", default)]
    pub exit_code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(rename = "time", default)]
    pub time_seconds: Option<f64>,
    #[serde(rename = "memory", default)]
    pub memory_kb: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub compile_stdout: String,
    #[serde(default, deserialize_with = "nullable")]
    pub compile_stderr: String,
}

impl RunResult {
    /// Reshape a successful backend reply. Every missing text field becomes "".
    pub fn from_backend(language: impl Into<String>, response: &BackendResponse) -> Self {
        let run = response.run.clone().unwrap_or_default();
        let compile = response.compile.clone().unwrap_or_default();

        Self {
            success: true,
            language: language.into(),
            output: combine_output(&run.stdout, &run.stderr),
            stdout: run.stdout,
            stderr: run.stderr,
            exit_code: run.code,
            signal: run.signal,
            time_seconds: run.time,
            memory_kb: run.memory,
            compile_stdout: compile.stdout,
            compile_stderr: compile.stderr,
        }
    }
}

/// stdout, then stderr on its own line when there is any.
pub fn combine_output(stdout: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout.to_string()
    } else {
        format!("{}\n{}", stdout, stderr)
    }
}

/// A single source file in the backend payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub content: String,
}

/// Request body sent to the execution backend (Piston `execute` contract)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendPayload {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
    pub stdin: String,
    pub args: Vec<String>,
    pub compile_timeout: u64,
    pub run_timeout: u64,
    pub compile_memory_limit: i64,
    pub run_memory_limit: i64,
}

/// Output of one backend stage (`compile` or `run`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StageOutput {
    #[serde(default, deserialize_with = "nullable")]
    pub stdout: String,
    #[serde(default, deserialize_with = "nullable")]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<f64>,
}

/// Successful backend reply. Interpreted languages have no `compile` stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub run: Option<StageOutput>,
    #[serde(default)]
    pub compile: Option<StageOutput>,
}
