/// Live Preview - HTML/CSS/JS Document Synthesis
///
/// Three independent text buffers are combined into one standalone HTML
/// document. The document is recomputed from scratch on every edit; nothing
/// is diffed or cached. This pipeline never touches the network.
///
/// User JavaScript runs inside a `try`/`catch` so that a thrown error is
/// rendered into the page instead of silently aborting the script.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Delay between the last edit and re-synthesis when auto-run is on
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// `sandbox` attribute for the rendering frame: scripts may run, but the
/// document gets an opaque origin (no storage, cookies or top navigation).
pub const SANDBOX_POLICY: &str = "allow-scripts";

/// Default file name for "Download"
pub const DOWNLOAD_FILE_NAME: &str = "playground.html";

const DEFAULT_HTML: &str = "<!-- Write HTML here -->\n<div class=\"p-4\">\n  <h1>Hello Playground</h1>\n  <p>Edit HTML, CSS, and JS to see changes live.</p>\n</div>";

const DEFAULT_CSS: &str = "/* Write CSS here */\nbody {\n  font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif;\n}\n h1 { color: #22c55e; }\n p { color: #94a3b8; }";

const DEFAULT_JS: &str = "// Write JavaScript here\nconsole.log('Playground ready');";

/// The three editor buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSources {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl PreviewSources {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// Restore the starter buffers
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for PreviewSources {
    fn default() -> Self {
        Self::new(DEFAULT_HTML, DEFAULT_CSS, DEFAULT_JS)
    }
}

/// `</script` inside user JS would close the guard block early
fn escape_script(js: &str) -> String {
    let mut escaped = String::with_capacity(js.len());
    let mut rest = js;
    while let Some(pos) = find_ascii_ci(rest, "</script") {
        escaped.push_str(&rest[..pos]);
        escaped.push_str("<\\/");
        // keep the original casing of "script"
        escaped.push_str(&rest[pos + 2..pos + 8]);
        rest = &rest[pos + 8..];
    }
    escaped.push_str(rest);
    escaped
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Synthesize the standalone preview document
pub fn build_document(sources: &PreviewSources) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8" />
<meta name="viewport" content="width=device-width, initial-scale=1.0" />
<style>
{css}
</style>
</head>
<body>
{html}
<script>
try {{
{js}
}} catch (e) {{
  console.error(e);
  const pre = document.createElement('pre');
  pre.style.color = '#ef4444';
  pre.textContent = e?.stack || e?.message || String(e);
  document.body.appendChild(pre);
}}
</script>
</body>
</html>"#,
        css = sources.css,
        html = sources.html,
        js = escape_script(&sources.js),
    )
}

/// Trailing-edge debouncer: only the most recent `schedule` call fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `action` after the delay unless another call supersedes it.
    /// The task resolves to `true` if the action ran.
    pub fn schedule<F>(&self, action: F) -> JoinHandle<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            action();
            true
        })
    }

    /// Drop any pending firing
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

/// Editor state for the HTML/CSS/JS pane.
///
/// The rendered document is published on a watch channel; subscribers
/// always see the latest synthesis. A stale synthesis is simply replaced.
pub struct LivePreview {
    sources: PreviewSources,
    auto_run: bool,
    debouncer: Debouncer,
    rendered: Arc<watch::Sender<String>>,
}

impl LivePreview {
    pub fn new(sources: PreviewSources, auto_run: bool) -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(String::new());
        let preview = Self {
            sources,
            auto_run,
            debouncer: Debouncer::default(),
            rendered: Arc::new(tx),
        };
        (preview, rx)
    }

    pub fn with_debouncer(mut self, debouncer: Debouncer) -> Self {
        self.debouncer = debouncer;
        self
    }

    pub fn sources(&self) -> &PreviewSources {
        &self.sources
    }

    pub fn auto_run(&self) -> bool {
        self.auto_run
    }

    pub fn set_auto_run(&mut self, enabled: bool) {
        self.auto_run = enabled;
        if !enabled {
            self.debouncer.cancel();
        }
    }

    /// Edit the buffers. With auto-run on, re-synthesis is debounced.
    pub fn update<F>(&mut self, edit: F) -> Option<JoinHandle<bool>>
    where
        F: FnOnce(&mut PreviewSources),
    {
        edit(&mut self.sources);
        if !self.auto_run {
            return None;
        }

        let document = build_document(&self.sources);
        let rendered = Arc::clone(&self.rendered);
        Some(self.debouncer.schedule(move || {
            rendered.send_replace(document);
        }))
    }

    /// Explicit "Run": synthesize immediately, superseding any pending firing
    pub fn run_now(&self) {
        self.debouncer.cancel();
        self.rendered.send_replace(build_document(&self.sources));
    }

    pub fn reset(&mut self) -> Option<JoinHandle<bool>> {
        self.update(PreviewSources::reset)
    }

    /// The document as it would be downloaded right now
    pub fn document(&self) -> String {
        build_document(&self.sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_layout() {
        let doc = build_document(&PreviewSources::new("<p>x</p>", "p { color: red; }", "let a = 1;"));

        assert!(doc.starts_with("<!DOCTYPE html>"));
        let style = doc.find("p { color: red; }").unwrap();
        let body = doc.find("<body>").unwrap();
        let html = doc.find("<p>x</p>").unwrap();
        let script = doc.find("try {\nlet a = 1;\n}").unwrap();
        assert!(style < body && body < html && html < script);
    }

    #[test]
    fn test_thrown_error_is_caught_and_rendered() {
        let doc = build_document(&PreviewSources::new("<p>x</p>", "", "throw new Error('boom')"));

        assert!(doc.contains("try {\nthrow new Error('boom')\n} catch (e) {"));
        assert!(doc.contains("pre.textContent = e?.stack || e?.message || String(e);"));
        assert!(doc.contains("document.body.appendChild(pre);"));
        assert!(doc.contains("boom"));
        // markup still renders ahead of the script
        assert!(doc.find("<p>x</p>").unwrap() < doc.find("<script>").unwrap());
    }

    #[test]
    fn test_closing_script_tag_is_escaped() {
        let doc = build_document(&PreviewSources::new("", "", "const s = '</script><b>';\nconst t = '</SCRIPT>';"));

        assert!(doc.contains(r"'<\/script><b>'"));
        assert!(doc.contains(r"'<\/SCRIPT>'"));
        assert_eq!(doc.matches("</script>").count(), 1);
    }

    #[test]
    fn test_escape_leaves_plain_js_alone() {
        assert_eq!(escape_script("a < b && c > d"), "a < b && c > d");
        assert_eq!(escape_script(""), "");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut sources = PreviewSources::new("a", "b", "c");
        sources.reset();
        assert_eq!(sources, PreviewSources::default());
    }

    #[test]
    fn test_starter_css() {
        let css = PreviewSources::default().css;
        assert!(css.starts_with("/* Write CSS here */\nbody {\n"));
        assert!(css.ends_with("}\n h1 { color: #22c55e; }\n p { color: #94a3b8; }"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_only_last_call_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let first = debouncer.schedule(|| {});
        let second = debouncer.schedule(|| {});
        let third = debouncer.schedule(|| {});

        assert!(!first.await.unwrap());
        assert!(!second.await.unwrap());
        assert!(third.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_cancel() {
        let debouncer = Debouncer::new(Duration::from_millis(300));
        let pending = debouncer.schedule(|| {});
        debouncer.cancel();

        assert!(!pending.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_preview_debounces_edits() {
        let (mut preview, rx) = LivePreview::new(PreviewSources::new("", "", ""), true);

        let a = preview.update(|s| s.html = "<p>1</p>".to_string()).unwrap();
        let b = preview.update(|s| s.html = "<p>12</p>".to_string()).unwrap();
        assert!(rx.borrow().is_empty());

        assert!(!a.await.unwrap());
        assert!(b.await.unwrap());
        assert!(rx.borrow().contains("<p>12</p>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_preview_manual_mode() {
        let (mut preview, rx) = LivePreview::new(PreviewSources::new("", "", ""), false);

        assert!(preview.update(|s| s.css = "h1{}".to_string()).is_none());
        assert!(rx.borrow().is_empty());

        preview.run_now();
        assert!(rx.borrow().contains("h1{}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_now_supersedes_pending_edit() {
        let (mut preview, rx) = LivePreview::new(PreviewSources::new("", "", ""), true);

        let pending = preview.update(|s| s.js = "1".to_string()).unwrap();
        preview.run_now();

        assert!(!pending.await.unwrap());
        assert_eq!(*rx.borrow(), preview.document());
    }
}
