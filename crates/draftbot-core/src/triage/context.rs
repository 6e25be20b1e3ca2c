//! Brand/grounding context loading.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

/// Character budget for the grounding context; keeps the prompt inside a
/// sane token budget.
pub const MAX_CONTEXT_CHARS: usize = 18_000;
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

/// Instructional fallback when no context file is present.
pub const DEFAULT_CONTEXT: &str = "No detailed brand info available. Use brief, factual tone.";

/// Load the brand context file, truncating oversized content.
///
/// A missing or unreadable file yields the default instructional string
/// rather than an error; the pipeline must keep working without it.
pub fn load_brand_context(path: &Path) -> String {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Brand context not readable, using default");
            return DEFAULT_CONTEXT.to_string();
        }
    };
    let raw = raw.trim();

    match raw.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((byte_idx, _)) => {
            info!(
                path = %path.display(),
                cap = MAX_CONTEXT_CHARS,
                "Brand context too long, truncating"
            );
            format!("{}{}", &raw[..byte_idx], TRUNCATION_MARKER)
        }
        None => raw.to_string(),
    }
}

/// Shared, read-mostly brand context.
///
/// Readers take a whole-`Arc` snapshot; `refresh` swaps in a new one
/// atomically, so a reader always sees either the old or the new complete
/// value.
pub struct BrandContext {
    path: PathBuf,
    current: RwLock<Arc<String>>,
}

impl BrandContext {
    /// Load the context from `path` and keep the path for later refreshes.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = Arc::new(load_brand_context(&path));
        Self {
            path,
            current: RwLock::new(initial),
        }
    }

    /// Current context snapshot.
    pub fn snapshot(&self) -> Arc<String> {
        self.current.read().clone()
    }

    /// Re-read the context file and replace the shared value.
    pub fn refresh(&self) {
        let fresh = Arc::new(load_brand_context(&self.path));
        *self.current.write() = fresh;
    }
}
