//! Constants for board geometry, record tags, and tutor defaults.
//!
//! Record coordinates are lowercase letters, `a` being the first line. Only the
//! first `board_size` letters are legal on a given board.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size. Joseki collections are recorded on the full 19x19 board.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Smallest board accepted by the configuration.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board whose lines can be written with record letters `a`..`y`.
pub const MAX_BOARD_SIZE: usize = 25;

/// Largest board on which the old `tt` value still means "pass".
pub const TT_PASS_MAX_SIZE: usize = 19;

// =============================================================================
// Record Tags
// =============================================================================

/// Black move.
pub const TAG_BLACK: &str = "B";

/// White move.
pub const TAG_WHITE: &str = "W";

/// Tags that make a node a playable move.
pub const MOVE_TAGS: [&str; 2] = [TAG_BLACK, TAG_WHITE];

/// Setup: add black stones.
pub const TAG_ADD_BLACK: &str = "AB";

/// Setup: add white stones.
pub const TAG_ADD_WHITE: &str = "AW";

/// Setup: clear points.
pub const TAG_ADD_EMPTY: &str = "AE";

/// Tags whose values must be board coordinates.
pub const COORD_TAGS: [&str; 5] = [TAG_BLACK, TAG_WHITE, TAG_ADD_BLACK, TAG_ADD_WHITE, TAG_ADD_EMPTY];

/// Node comment.
pub const TAG_COMMENT: &str = "C";

/// Longest line of nodes, root to leaf, a record may hold.
pub const MAX_RECORD_DEPTH: usize = 1000;

// =============================================================================
// Tutor Defaults
// =============================================================================

/// Record file read when no persisted state exists.
pub const DEFAULT_RECORD_PATH: &str = "joseki.sgf";

/// File holding the learning statistics between sessions.
pub const DEFAULT_STATE_PATH: &str = "joseki.json";

/// Pause before the automated reply is shown, in milliseconds.
pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;

/// Version written into persisted state files.
pub const STATE_FORMAT_VERSION: u32 = 1;
