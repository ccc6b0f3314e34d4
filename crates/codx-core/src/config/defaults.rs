//! Default values for Codx configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Knowledge Defaults
// ============================================================================

/// Minimum relevance score (0..=1) a document must reach to survive filtering.
pub const DEFAULT_RELEVANCE_CUTOFF: f32 = 0.7;

/// Number of documents requested from the vector store per query.
pub const DEFAULT_RESULT_COUNT: usize = 8;

/// Fixed-size fallback chunk size, in estimated tokens (no overlap).
pub const DEFAULT_CHUNK_SIZE_TOKENS: usize = 500;

/// Maximum characters per structural code chunk before it is cut.
pub const MAX_CODE_CHUNK_CHARS: usize = 1500;

/// Data directory created under the project root.
pub const DEFAULT_DATA_DIR: &str = ".codx";

/// Status cache file name inside the data directory.
pub const STATUS_CACHE_FILE: &str = "file_list";

/// Default path substrings excluded from indexing.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Dependencies
    "node_modules",
    "vendor",
    ".venv",
    "venv",
    "__pycache__",
    // Build outputs
    "target/",
    "dist/",
    "build/",
    // Codx's own data
    ".codx",
    // Noise
    ".lock",
    ".min.js",
    ".map",
];

// ============================================================================
// Concurrency Defaults
// ============================================================================

/// Concurrent workers for relevance scoring.
pub const DEFAULT_SCORING_CONCURRENCY: usize = 8;

/// Concurrent workers for document enrichment.
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 8;

/// Background poll interval for watched projects, in seconds.
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 3;

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "openai";

/// Default max tokens for LLM responses.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// OpenAI defaults
/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

// Anthropic defaults
/// Default Anthropic API URL.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Anthropic API version.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Ollama defaults
/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
