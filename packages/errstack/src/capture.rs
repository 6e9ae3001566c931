//! Call-stack capture
//!
//! A [`StackCapture`] policy asks a [`FrameSource`] for at most
//! `max_depth + 1` frames and renders them as compact
//! `symbol(file.rs:line)` strings. When the stack is deeper than the
//! policy allows, the last retained entry is replaced by `"..."`.
//!
//! The process-wide default depth is read on every capture made through
//! [`StackCapture::from_defaults`]. It starts at [`DEFAULT_MAX_STACK_DEPTH`]
//! unless `ERRSTACK_MAX_DEPTH` says otherwise.

use crate::config::StackConfig;
use crate::error::{BoxError, StackError};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Depth used when nothing else is configured
pub const DEFAULT_MAX_STACK_DEPTH: usize = 10;

/// Entry that replaces the last retained frame of a truncated capture
pub const TRUNCATION_MARKER: &str = "...";

/// Rendering of a frame with neither symbol nor location
pub const UNKNOWN_FRAME: &str = "<unknown>";

/// Frames examined while looking for the capture entry point before giving up
const PROLOGUE_LIMIT: usize = 32;

static ENV_CONFIG: Lazy<StackConfig> = Lazy::new(|| {
    StackConfig::from_env().unwrap_or_else(|e| {
        warn!("Ignoring stack capture settings from environment: {e}");
        StackConfig::default()
    })
});

static MAX_STACK_DEPTH: Lazy<AtomicUsize> =
    Lazy::new(|| AtomicUsize::new(ENV_CONFIG.max_stack_depth));

static SYMBOLS: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(ENV_CONFIG.symbols));

/// Current process-wide maximum capture depth
#[must_use]
pub fn max_stack_depth() -> usize {
    MAX_STACK_DEPTH.load(Ordering::Relaxed)
}

/// Change the process-wide maximum capture depth
///
/// Only affects captures made through [`StackCapture::from_defaults`], which
/// includes every free function and macro of this crate.
pub fn set_max_stack_depth(depth: usize) {
    MAX_STACK_DEPTH.store(depth, Ordering::Relaxed);
}

/// Whether default captures include symbol names
#[must_use]
pub fn symbols_enabled() -> bool {
    SYMBOLS.load(Ordering::Relaxed)
}

/// Enable or disable symbol names in default captures
pub fn set_symbols_enabled(enabled: bool) {
    SYMBOLS.store(enabled, Ordering::Relaxed);
}

/// One call site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Function or method name, without hash suffix
    pub symbol: Option<String>,
    /// Source file
    pub file: Option<PathBuf>,
    /// Line within `file`
    pub line: Option<u32>,
}

impl Frame {
    /// Create a fully resolved frame
    pub fn new(symbol: impl Into<String>, file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            symbol: Some(symbol.into()),
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Create a frame with a location but no symbol name
    pub fn location(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            symbol: None,
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Render as `symbol(file.rs:line)`, keeping only the file's base name
    #[must_use]
    pub fn render(&self, symbols: bool) -> String {
        let location = self
            .file
            .as_deref()
            .map(|file| format!("{}:{}", base_name(file), self.line.unwrap_or(0)));
        let symbol = self.symbol.as_deref().filter(|_| symbols);

        match (symbol, location) {
            (Some(symbol), Some(location)) => format!("{symbol}({location})"),
            (Some(symbol), None) => symbol.to_string(),
            (None, Some(location)) => location,
            (None, None) => UNKNOWN_FRAME.to_string(),
        }
    }
}

fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Something that can describe the callers of the current call site
pub trait FrameSource {
    /// Return at most `limit` frames, innermost first, after dropping `skip`
    fn frames(&self, skip: usize, limit: usize) -> Vec<Frame>;
}

impl<S: FrameSource + ?Sized> FrameSource for &S {
    fn frames(&self, skip: usize, limit: usize) -> Vec<Frame> {
        (**self).frames(skip, limit)
    }
}

/// Live stack walker backed by the `backtrace` crate
///
/// Frames of the unwinder and of this crate's own wrapping functions are
/// dropped before `skip` is applied, so the first frame is the code that
/// called into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceSource;

impl FrameSource for BacktraceSource {
    fn frames(&self, skip: usize, limit: usize) -> Vec<Frame> {
        walk(skip, limit)
    }
}

#[inline(never)]
fn walk(skip: usize, limit: usize) -> Vec<Frame> {
    let mut walker = Walker::new(skip, limit);
    if limit == 0 {
        return walker.frames;
    }

    let marker = walk as *const () as usize;
    backtrace::trace(|raw| {
        if walker.before_marker {
            if raw.symbol_address() as usize == marker {
                walker.before_marker = false;
                walker.pending.clear();
                return true;
            }
            walker.pending.extend(resolve(raw));
            if walker.pending.len() < PROLOGUE_LIMIT {
                return true;
            }
            // Entry point not recognised; keep what was buffered.
            walker.before_marker = false;
            return walker.drain_pending();
        }
        resolve(raw).into_iter().all(|frame| walker.accept(frame))
    });

    if walker.before_marker {
        walker.drain_pending();
    }
    walker.frames
}

/// Resolve a physical frame into one logical frame per inlined function
fn resolve(raw: &backtrace::Frame) -> Vec<Frame> {
    let mut resolved = Vec::new();
    backtrace::resolve_frame(raw, |symbol| {
        resolved.push(Frame {
            symbol: symbol.name().map(|name| format!("{name:#}")),
            file: symbol.filename().map(Path::to_path_buf),
            line: symbol.lineno(),
        });
    });
    if resolved.is_empty() {
        resolved.push(Frame::default());
    }
    resolved
}

struct Walker {
    skip: usize,
    limit: usize,
    before_marker: bool,
    in_prologue: bool,
    pending: Vec<Frame>,
    frames: Vec<Frame>,
}

impl Walker {
    fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            before_marker: true,
            in_prologue: true,
            pending: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Returns `false` once enough frames have been collected
    fn accept(&mut self, frame: Frame) -> bool {
        if self.in_prologue && frame.symbol.as_deref().is_some_and(is_internal) {
            return true;
        }
        self.in_prologue = false;

        if self.skip > 0 {
            self.skip -= 1;
            return true;
        }
        self.frames.push(frame);
        self.frames.len() < self.limit
    }

    fn drain_pending(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        pending.into_iter().all(|frame| self.accept(frame))
    }
}

/// Whether a symbol belongs to the stack walker or this crate's wrapping code
fn is_internal(symbol: &str) -> bool {
    let path = symbol.trim_start_matches('<');
    if path.contains("::tests::") {
        return false;
    }
    path.starts_with("backtrace::")
        || path.starts_with("errstack::")
        || symbol.contains(" as errstack::")
}

/// Capture policy: how deep to walk, whether to keep symbol names, and where
/// frames come from
#[derive(Debug, Clone)]
pub struct StackCapture<S = BacktraceSource> {
    max_depth: usize,
    symbols: bool,
    source: S,
}

impl StackCapture {
    /// Live capture bounded at `max_depth` frames
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            symbols: true,
            source: BacktraceSource,
        }
    }

    /// Live capture using the current process-wide settings
    #[must_use]
    pub fn from_defaults() -> Self {
        Self {
            max_depth: max_stack_depth(),
            symbols: symbols_enabled(),
            source: BacktraceSource,
        }
    }

    /// Live capture configured from a [`StackConfig`]
    #[must_use]
    pub fn from_config(config: &StackConfig) -> Self {
        Self {
            max_depth: config.max_stack_depth,
            symbols: config.symbols,
            source: BacktraceSource,
        }
    }
}

impl Default for StackCapture {
    fn default() -> Self {
        Self::from_defaults()
    }
}

impl<S: FrameSource> StackCapture<S> {
    /// Use a different frame source with the same limits
    #[must_use]
    pub fn with_source<T: FrameSource>(self, source: T) -> StackCapture<T> {
        StackCapture {
            max_depth: self.max_depth,
            symbols: self.symbols,
            source,
        }
    }

    /// Include or omit symbol names in rendered frames
    #[must_use]
    pub fn with_symbols(mut self, symbols: bool) -> Self {
        self.symbols = symbols;
        self
    }

    /// Maximum number of real frames kept
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Capture and render the caller's frames after dropping `skip` of them
    ///
    /// Never returns more than `max_depth + 1` entries.
    #[must_use]
    pub fn capture(&self, skip: usize) -> Vec<String> {
        let mut frames = self.source.frames(skip, self.max_depth.saturating_add(1));
        let truncated = frames.len() > self.max_depth;
        frames.truncate(self.max_depth);

        let mut rendered: Vec<String> = frames.iter().map(|f| f.render(self.symbols)).collect();
        if truncated {
            debug!("Stack capture truncated at {} frames", self.max_depth);
            rendered.push(TRUNCATION_MARKER.to_string());
        }
        rendered
    }

    /// Wrap an error with frames from this policy
    #[must_use]
    pub fn wrap<E: Into<BoxError>>(&self, err: E) -> StackError {
        StackError::wrap_with(self, err)
    }

    /// Create a message error with frames from this policy
    #[must_use]
    pub fn message(&self, args: fmt::Arguments<'_>) -> StackError {
        StackError::msg_with(self, args)
    }

    /// Annotate an error at the current call site using this policy
    #[must_use]
    pub fn annotate<E: Into<BoxError>>(&self, err: E, args: fmt::Arguments<'_>) -> StackError {
        StackError::annotate_with(self, err, args)
    }
}

/// Fixed frame list, for deterministic captures
///
/// `skip` and `limit` are applied to the list exactly as a live walk would
/// apply them to the real stack.
#[derive(Debug, Clone, Default)]
pub struct StaticFrames {
    frames: Vec<Frame>,
}

impl StaticFrames {
    /// Frames listed innermost first
    #[must_use]
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FrameSource for StaticFrames {
    fn frames(&self, skip: usize, limit: usize) -> Vec<Frame> {
        self.frames.iter().skip(skip).take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_frame() {
        let frame = Frame::new("app::run", "/home/me/app/src/run.rs", 42);
        assert_eq!(frame.render(true), "app::run(run.rs:42)");
        assert_eq!(frame.render(false), "run.rs:42");
    }

    #[test]
    fn test_render_partial_frames() {
        let symbol_only = Frame {
            symbol: Some("libc_start".to_string()),
            ..Frame::default()
        };
        assert_eq!(symbol_only.render(true), "libc_start");
        assert_eq!(symbol_only.render(false), UNKNOWN_FRAME);
        assert_eq!(Frame::location("lib.rs", 7).render(true), "lib.rs:7");
        assert_eq!(Frame::default().render(true), UNKNOWN_FRAME);
    }

    #[test]
    fn test_internal_symbols() {
        assert!(is_internal("backtrace::backtrace::trace"));
        assert!(is_internal("errstack::capture::walk"));
        assert!(is_internal(
            "<errstack::capture::BacktraceSource as errstack::capture::FrameSource>::frames"
        ));
        assert!(is_internal(
            "<core::result::Result<T,E> as errstack::error::extensions::ResultExt<T>>::with_stacks"
        ));
        assert!(!is_internal("errstack::capture::tests::test_live_capture"));
        assert!(!is_internal("app::main"));
        assert!(!is_internal("core::ops::function::FnOnce::call_once"));
    }

    #[test]
    fn test_static_frames_skip_and_limit() {
        let source = StaticFrames::new(vec![
            Frame::location("a.rs", 1),
            Frame::location("b.rs", 2),
            Frame::location("c.rs", 3),
        ]);
        assert_eq!(source.frames(1, 1), vec![Frame::location("b.rs", 2)]);
        assert_eq!(source.frames(0, 10).len(), 3);
        assert!(source.frames(5, 10).is_empty());
    }

    #[test]
    fn test_live_capture_starts_at_caller() {
        let frames = StackCapture::new(64).capture(0);
        assert!(!frames.is_empty());
        assert!(frames.len() <= 65);
        assert!(
            frames[0].contains("test_live_capture_starts_at_caller"),
            "first frame was {:?}",
            frames[0]
        );
    }

    #[test]
    fn test_zero_depth_is_only_marker() {
        assert_eq!(StackCapture::new(0).capture(0), vec![TRUNCATION_MARKER]);
    }
}
