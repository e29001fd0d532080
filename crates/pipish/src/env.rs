//! Variable environment with overlay semantics.
//!
//! An [`Env`] is an ordered stack of scope frames searched innermost-first,
//! optionally falling back to the process environment as the outermost
//! scope. Writes always land in the innermost frame. Frames are shared
//! (`Rc`), which is how a sequence's local variables survive across runs:
//! every fresh pipe overlays the same local frame.
//!
//! Reading an unset variable yields the empty string, never an error, and
//! [`Env::expand`] follows POSIX unset-variable semantics (not `set -u`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope frame: a shared, mutable map of variable bindings.
pub type Frame = Rc<RefCell<HashMap<String, String>>>;

/// A stack of variable scopes with optional process-environment fallback.
///
/// Cloning an `Env` shares its frames; two clones see each other's writes.
#[derive(Debug, Clone)]
pub struct Env {
    /// Scope frames. The last entry is the innermost scope.
    frames: Vec<Frame>,
    /// Whether lookups fall through to `std::env::var`.
    process_fallback: bool,
}

impl Env {
    /// Create an environment with one empty local frame over the process
    /// environment.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
            process_fallback: true,
        }
    }

    /// Create an environment that overlays the given frame on top of the
    /// process environment.
    pub fn overlay(locals: Frame) -> Self {
        Self {
            frames: vec![locals],
            process_fallback: true,
        }
    }

    /// Create an environment with one empty frame and no process
    /// fallback. Useful in tests that must not see the host environment.
    pub fn detached() -> Self {
        Self {
            frames: vec![Frame::default()],
            process_fallback: false,
        }
    }

    /// Look a variable up, searching frames innermost-first and then the
    /// process environment. Unset variables read as `""`.
    pub fn get(&self, name: &str) -> String {
        self.get_opt(name).unwrap_or_default()
    }

    /// Look a variable up, distinguishing "unset" from "set to empty".
    pub fn get_opt(&self, name: &str) -> Option<String> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.borrow().get(name) {
                return Some(value.clone());
            }
        }
        if self.process_fallback {
            return std::env::var(name).ok();
        }
        None
    }

    /// Set a variable in the innermost frame.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(frame) = self.frames.last() {
            frame.borrow_mut().insert(name.into(), value.into());
        }
    }

    /// Remove a variable from the innermost frame.
    pub fn unset(&self, name: &str) {
        if let Some(frame) = self.frames.last() {
            frame.borrow_mut().remove(name);
        }
    }

    /// True if the variable is set in any frame (process environment
    /// included, when fallback is enabled).
    pub fn contains(&self, name: &str) -> bool {
        self.get_opt(name).is_some()
    }

    /// Expand `$NAME` and `${NAME}` references in a template.
    ///
    /// Besides ordinary identifiers, the expander recognizes positional
    /// parameters (`$1`, `$12`, ...) and the special parameters `$#`,
    /// `$*`, `$@`, `$$`, `$-`, `$?` and `$0`, which are stored in the
    /// environment under their bare names (`#`, `*`, and so on).
    /// Undefined names expand to the empty string. A `$` that starts no
    /// recognizable name is copied through literally.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.char_indices().peekable();

        while let Some((idx, ch)) = chars.next() {
            if ch != '$' {
                out.push(ch);
                continue;
            }
            match chars.peek().copied() {
                Some((brace_start, '{')) => {
                    // ${NAME}: everything up to the closing brace
                    match template[brace_start..].find('}') {
                        Some(rel_end) => {
                            let name = &template[brace_start + 1..brace_start + rel_end];
                            out.push_str(&self.get(name));
                            // skip past the closing brace
                            while let Some((i, _)) = chars.next() {
                                if i == brace_start + rel_end {
                                    break;
                                }
                            }
                        }
                        None => {
                            // unterminated ${, copy the rest literally
                            out.push_str(&template[idx..]);
                            return out;
                        }
                    }
                }
                Some((_, c)) if c.is_ascii_digit() => {
                    let mut name = String::new();
                    while let Some(&(_, d)) = chars.peek() {
                        if d.is_ascii_digit() {
                            name.push(d);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push_str(&self.get(&name));
                }
                Some((_, c)) if is_special_param(c) => {
                    chars.next();
                    out.push_str(&self.get(&c.to_string()));
                }
                Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {
                    let mut name = String::new();
                    while let Some(&(_, w)) = chars.peek() {
                        if w.is_ascii_alphanumeric() || w == '_' {
                            name.push(w);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    out.push_str(&self.get(&name));
                }
                _ => out.push('$'),
            }
        }

        out
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-character special parameters recognized after `$`.
fn is_special_param(c: char) -> bool {
    matches!(c, '#' | '*' | '@' | '$' | '-' | '?')
}
