// CLI commands for the playground
use anyhow::{bail, Context, Result};
use playground_common::languages::LanguageMapping;
use playground_common::preview::{build_document, LivePreview, PreviewSources, SANDBOX_POLICY};
use playground_common::runner::{render_output, Completion, RunOutcome, RunnerSession};
use playground_common::templates;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;

use crate::relay_client::RelayClient;

/// How often watched preview sources are re-read
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Run source code through the relay and print the output pane
pub async fn run_code(
    server: &str,
    language: &str,
    file: Option<&Path>,
    stdin_file: Option<&Path>,
    args: Vec<String>,
) -> Result<RunOutcome> {
    // templates are keyed by backend id, so "node" must become "javascript"
    let language = LanguageMapping::default().resolve(language);
    let mut session = RunnerSession::default();
    session.switch_language(&language);

    if let Some(path) = file {
        let code = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.set_code(code);
    } else if templates::template_for(&language).is_some() {
        println!("ℹ️  No --file given, running the {} template", language);
    } else {
        bail!("No template for language '{}', pass --file", language);
    }

    if let Some(path) = stdin_file {
        let stdin = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        session.set_stdin(stdin);
    }

    let client = RelayClient::new(server)?;

    let ticket = match session.begin_run() {
        Some(ticket) => ticket,
        None => bail!("A run is already in progress"),
    };

    println!("⏳ Running…");
    let request = ticket.request.clone().with_args(args);
    let outcome = client.run(&request).await;

    if session.complete(&ticket, outcome) == Completion::Stale {
        bail!("Run result arrived after a newer run was started");
    }

    let outcome = session
        .outcome()
        .cloned()
        .context("Run finished without an outcome")?;

    println!("{}", render_output(&outcome));
    Ok(outcome)
}

/// Print the starter template for a language
pub fn print_template(language: &str) -> Result<()> {
    let canonical = LanguageMapping::default().resolve(language);
    match templates::template_for(&canonical) {
        Some(source) => {
            print!("{}", source);
            Ok(())
        }
        None => bail!("No template for language '{}'", language),
    }
}

/// List recognised language names and the backend identifier each maps to
pub fn list_languages() {
    let mapping = LanguageMapping::default();

    println!("{:<12} {:<12} {}", "NAME", "BACKEND ID", "TEMPLATE");
    for (alias, canonical) in mapping.aliases() {
        let has_template = if templates::template_for(canonical).is_some() {
            "yes"
        } else {
            "-"
        };
        println!("{:<12} {:<12} {}", alias, canonical, has_template);
    }
}

/// Source files for the three preview buffers. A missing path keeps the
/// starter buffer.
#[derive(Debug, Clone, Default)]
pub struct PreviewPaths {
    pub html: Option<PathBuf>,
    pub css: Option<PathBuf>,
    pub js: Option<PathBuf>,
}

impl PreviewPaths {
    pub fn read(&self) -> Result<PreviewSources> {
        let defaults = PreviewSources::default();
        Ok(PreviewSources {
            html: read_or(self.html.as_deref(), defaults.html)?,
            css: read_or(self.css.as_deref(), defaults.css)?,
            js: read_or(self.js.as_deref(), defaults.js)?,
        })
    }
}

fn read_or(path: Option<&Path>, fallback: String) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => Ok(fallback),
    }
}

/// "Download": write the synthesized document as a standalone file
pub fn write_document(out: &Path, document: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(out, document).with_context(|| format!("Failed to write {}", out.display()))
}

/// Build the preview document once
pub fn build_preview(paths: &PreviewPaths, out: &Path) -> Result<()> {
    let sources = paths.read()?;
    write_document(out, &build_document(&sources))?;

    println!("📝 Wrote {}", out.display());
    println!("   Open it in a frame with sandbox=\"{}\"", SANDBOX_POLICY);
    Ok(())
}

/// Rebuild the preview whenever a source file changes (debounced)
pub async fn watch_preview(paths: &PreviewPaths, out: &Path) -> Result<()> {
    let (mut preview, mut rendered) = LivePreview::new(paths.read()?, true);
    preview.run_now();
    let initial = rendered.borrow_and_update().clone();
    write_document(out, &initial)?;

    println!("👀 Watching preview sources, writing {} (Ctrl+C to stop)", out.display());

    let mut ticker = tokio::time::interval(WATCH_POLL_INTERVAL);
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match paths.read() {
                    Ok(latest) if &latest != preview.sources() => {
                        // detached; the debounced task publishes on `rendered`
                        drop(preview.update(|sources| *sources = latest));
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %format!("{:#}", e), "Skipping unreadable preview source"),
                }
            }
            changed = rendered.changed() => {
                if changed.is_err() {
                    break;
                }
                let document = rendered.borrow_and_update().clone();
                write_document(out, &document)?;
                println!("🔄 Rebuilt {}", out.display());
            }
            _ = &mut shutdown => {
                println!("\n👋 Stopped watching");
                break;
            }
        }
    }

    Ok(())
}
