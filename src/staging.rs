//! Staging of inputs too long for the child's line reader.
//!
//! Long inputs are written to a temporary file and loaded with a single
//! `read("<path>");` line. The error trace gp prints for a failure inside
//! such a file names the file; [`scrub_disclosure`] rewrites it to what the
//! user would have seen had the code been typed directly.

use crate::error::{KernelError, Result};
use crate::expect::partial_suffix_len;
use regex::Regex;
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use tracing::debug;

static DISCLOSURE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// First line of the trace left by an error inside a staged file
const DISCLOSURE_START: &str = "  ***   at top-level: read(\"";

/// What the trace starts with for code typed at the prompt
const TOP_LEVEL_TRACE: &str = "  ***   at top-level:    ";

/// Three-line trace: the `read("...")` call, its caret line, and the
/// `in function read:` header.
fn disclosure_pattern() -> &'static Regex {
    DISCLOSURE_PATTERN.get_or_init(|| {
        Regex::new(r#"  \*\*\*   at top-level: read\(".+\n  \*\*\*\s+\^-+\s*\n  \*\*\*\s+in function read:"#)
            .unwrap()
    })
}

/// A command on its way to the child
///
/// Owns the staging file, if any; dropping the command removes it.
#[derive(Debug)]
pub struct PendingCommand {
    /// Line sent to the child
    line: String,
    /// Staging file holding the full source
    staged: Option<NamedTempFile>,
}

impl PendingCommand {
    /// Decide between sending `code` inline and staging it through a file.
    ///
    /// `max_inline` counts characters. Multi-line code is always staged:
    /// the child prompts after every line, which would end the command at
    /// its first line.
    pub fn prepare(code: &str, max_inline: usize) -> Result<Self> {
        if code.chars().count() <= max_inline && !code.contains('\n') {
            return Ok(Self {
                line: code.to_string(),
                staged: None,
            });
        }

        let file = stage(code).map_err(KernelError::Staging)?;
        let line = read_directive(file.path());
        debug!(
            "Staged {} bytes of input in {}",
            code.len(),
            file.path().display()
        );

        Ok(Self {
            line,
            staged: Some(file),
        })
    }

    /// The line to send to the child
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Path of the staging file, if the command was staged
    pub fn staged_path(&self) -> Option<&Path> {
        self.staged.as_ref().map(|file| file.path())
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }
}

/// Write `code` to a fresh temp file and force it to disk
fn stage(code: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("gp-bridge-")
        .suffix(".gp")
        .tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// `read("<path>");` with the path escaped as a gp string literal
fn read_directive(path: &Path) -> String {
    let path = path.to_string_lossy();
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("read(\"{}\");", escaped)
}

/// Rewrite staging traces in not-yet-forwarded output.
///
/// Returns the text to forward and how many bytes of `unseen` it covers.
/// Unless `complete` is set, output from the start of a trace that has not
/// fully arrived yet is held back for the next call.
pub fn scrub_disclosure(unseen: &str, complete: bool) -> (Cow<'_, str>, usize) {
    let pattern = disclosure_pattern();

    let tail_start = pattern
        .find_iter(unseen)
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    let consumed = if complete {
        unseen.len()
    } else {
        held_back_from(&unseen[tail_start..])
            .map(|offset| tail_start + offset)
            .unwrap_or(unseen.len())
    };

    (
        pattern.replace_all(&unseen[..consumed], TOP_LEVEL_TRACE),
        consumed,
    )
}

/// Offset of a trace start (or a prefix of one at the very end) in `text`
fn held_back_from(text: &str) -> Option<usize> {
    if let Some(offset) = text.find(DISCLOSURE_START) {
        return Some(offset);
    }

    match partial_suffix_len(text, DISCLOSURE_START) {
        0 => None,
        len => Some(text.len() - len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = "  ***   at top-level: read(\"/tmp/gp-bridge-x.gp\");\r\n  ***                 ^---------------------\r\n  ***   in function read: 1/0\r\n  ***                           ^--\r\n  *** _/_: impossible inverse in gdiv: 0.\r\n";

    #[test]
    fn test_short_input_is_sent_inline() {
        let cmd = PendingCommand::prepare("factor(2^64+1)", 255).unwrap();
        assert_eq!(cmd.line(), "factor(2^64+1)");
        assert!(!cmd.is_staged());
        assert!(cmd.staged_path().is_none());
    }

    #[test]
    fn test_input_at_threshold_is_inline() {
        let code = "x".repeat(255);
        let cmd = PendingCommand::prepare(&code, 255).unwrap();
        assert!(!cmd.is_staged());
        assert_eq!(cmd.line(), code);
    }

    #[test]
    fn test_threshold_counts_characters() {
        let code = format!("s = \"{}\"", "π".repeat(200));
        assert!(code.len() > 255);
        let cmd = PendingCommand::prepare(&code, 255).unwrap();
        assert!(!cmd.is_staged());
        assert_eq!(cmd.line(), code);

        let code = "π".repeat(256);
        assert!(PendingCommand::prepare(&code, 255).unwrap().is_staged());
    }

    #[test]
    fn test_long_input_is_staged_and_removed() {
        let code = format!("v = [{}];", vec!["1"; 200].join(","));
        let cmd = PendingCommand::prepare(&code, 255).unwrap();
        assert!(cmd.is_staged());

        let path = cmd.staged_path().unwrap().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), code);
        assert_eq!(cmd.line(), format!("read(\"{}\");", path.display()));

        drop(cmd);
        assert!(!path.exists());
    }

    #[test]
    fn test_multiline_input_is_staged() {
        let code = "f(x) = x^2;\nf(3)";
        let cmd = PendingCommand::prepare(code, 255).unwrap();
        assert!(cmd.is_staged());
        assert!(cmd.line().starts_with("read(\""));
        assert!(!cmd.line().contains('\n'));
    }

    #[test]
    fn test_read_directive_escapes_quotes() {
        let line = read_directive(Path::new("/tmp/a\"b\\c"));
        assert_eq!(line, r#"read("/tmp/a\"b\\c");"#);
    }

    #[test]
    fn test_scrub_rewrites_trace() {
        let (out, consumed) = scrub_disclosure(TRACE, false);
        assert_eq!(consumed, TRACE.len());
        assert!(!out.contains("read("));
        assert!(out.starts_with("  ***   at top-level:     1/0\r\n"));
        assert!(out.ends_with("impossible inverse in gdiv: 0.\r\n"));
    }

    #[test]
    fn test_scrub_holds_back_partial_trace() {
        let split = TRACE.find("  ***   in function").unwrap();
        let first = &TRACE[..split];

        let text = format!("before\r\n{}", first);
        let (out, consumed) = scrub_disclosure(&text, false);
        assert_eq!(out, "before\r\n");
        assert_eq!(consumed, "before\r\n".len());

        // The held part comes back with the rest of the trace
        let rest = format!("{}{}", &text[consumed..], &TRACE[split..]);
        let (out, consumed) = scrub_disclosure(&rest, false);
        assert_eq!(consumed, rest.len());
        assert!(out.starts_with("  ***   at top-level:     1/0"));
    }

    #[test]
    fn test_scrub_holds_back_prefix_at_end() {
        let (out, consumed) = scrub_disclosure("done\n  ***   at top", false);
        assert_eq!(out, "done\n");
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_scrub_flushes_everything_when_complete() {
        let text = "  ***   at top-level: read(\"/tmp/x\")";
        let (out, consumed) = scrub_disclosure(text, true);
        assert_eq!(consumed, text.len());
        assert_eq!(out, text);
    }

    #[test]
    fn test_scrub_leaves_other_output_alone() {
        let text = "%1 = 42\n";
        let (out, consumed) = scrub_disclosure(text, false);
        assert_eq!(out, text);
        assert_eq!(consumed, text.len());
    }
}
