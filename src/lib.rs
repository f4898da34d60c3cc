//! Joseki tutor: drill recorded Go opening variations.
//!
//! A record of joseki variations is parsed into a tree. The learner plays
//! moves against it; wrong moves count as mistakes on the node where they were
//! tried, and the automated reply favours lines that were never seen or that
//! the learner keeps getting wrong. Statistics persist between sessions.
//!
//! ## Modules
//!
//! - [`sgf`] - Record parser (SGF text into a variation tree)
//! - [`tree`] - Variation tree, learning counters, navigation
//! - [`board`] - Board position, groups, liberties, captures
//! - [`selector`] - Weighted choice of the automated reply
//! - [`session`] - Training session state machine
//! - [`console`] - Line-oriented text front end
//! - [`source`] - Reading `.sgf` files and single-entry `.zip` archives
//! - [`store`] - Atomic persistence of the learning state
//! - [`config`] - Tutor settings
//! - [`constants`] - Board geometry, record tags, defaults
//!
//! ## Example
//!
//! ```
//! use joseki_tutor::board::Coordinate;
//! use joseki_tutor::selector::TrainingSelector;
//! use joseki_tutor::session::{MoveOutcome, Session};
//! use joseki_tutor::sgf::parse;
//!
//! let tree = parse("(;B[dd];W[pd](;B[dp];W[pp])(;B[pp];W[dp]))").unwrap();
//! let mut session = Session::new(tree, TrainingSelector::with_seed(1)).unwrap();
//!
//! // Black opens at 4-4; the recorded white reply follows.
//! let outcome = session.human_move(Coordinate::new(4, 4));
//! assert!(matches!(outcome, MoveOutcome::Played { reply: Some(_), .. }));
//! assert_eq!(session.candidates().len(), 2);
//! ```

pub mod board;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod logging;
pub mod selector;
pub mod session;
pub mod sgf;
pub mod source;
pub mod store;
pub mod tree;

pub use error::{Result, TutorError};
