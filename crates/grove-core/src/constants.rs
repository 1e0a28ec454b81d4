//! Common constants used throughout grove-core.
//!
//! This module centralizes directory names, filter defaults, and limits so the
//! config layer and the import pipeline agree on them.

// ============================================================================
// Directory Names
// ============================================================================

/// The name of the global Grove configuration directory.
///
/// Located at `~/.grove/` on Unix-like systems.
pub const GROVE_HOME_DIR: &str = ".grove";

/// Subdirectory of the Grove home holding the record store.
pub const DATA_DIR: &str = "data";

/// The name of the global configuration file.
pub const GLOBAL_CONFIG_FILENAME: &str = "config.yaml";

// ============================================================================
// Tree Shape
// ============================================================================

/// Name of the root folder of every template tree.
pub const ROOT_FOLDER_NAME: &str = "Root";

/// File name used when a path ends with a trailing slash.
pub const FALLBACK_FILE_NAME: &str = "file";

// ============================================================================
// Excluded Directories
// ============================================================================

/// Directory names whose contents are never imported.
///
/// Any path with a segment equal to one of these is dropped:
/// - `node_modules`, `bower_components` - JavaScript dependencies
/// - `__pycache__` - Python bytecode cache
/// - `.venv`, `venv` - Python virtual environments
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "bower_components",
    "__pycache__",
    ".venv",
    "venv",
];

// ============================================================================
// Binary File Extensions
// ============================================================================

/// File extensions that indicate binary (non-text) content.
///
/// Matching is case-insensitive and based on the extension only; the payload
/// is never sniffed.
pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    // Images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "tiff", "tif",
    // Audio/Video
    "mp3", "mp4", "wav", "avi", "mov", "mkv", "flac", "ogg", "webm", // Archives
    "zip", "tar", "gz", "rar", "7z", "bz2", "xz", // Binaries/Executables
    "exe", "dll", "so", "dylib", "bin", "o", "a", "lib", "obj", // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", // Fonts
    "ttf", "otf", "woff", "woff2", "eot", // Database
    "db", "sqlite", "sqlite3", // Other binary/generated formats
    "pyc", "pyo", "class", "jar", "war",
];

// ============================================================================
// Import Limits
// ============================================================================

/// Default number of content-fetch workers.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Upper bound on content-fetch workers.
pub const MAX_CONCURRENCY: usize = 64;

/// Default number of retries for rate-limited or failed transport requests.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default cap on any single backoff or rate-limit wait, in seconds.
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 60;

/// Base delay of the exponential backoff, in milliseconds.
pub const BACKOFF_BASE_MILLIS: u64 = 250;

/// Environment variable read by the default credential provider.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Provider key of GitHub linked accounts in the record store.
pub const GITHUB_PROVIDER: &str = "github";

/// Default local user id.
pub const DEFAULT_USER_ID: &str = "local";

// ============================================================================
// Tests
// ============================================================================
