//! Persisted learning state.
//!
//! The whole tree, counters included, is written as versioned JSON. Saving
//! writes a sibling temporary file and renames it over the target, so a crash
//! mid-write leaves the previous state intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::TutorConfig;
use crate::constants::STATE_FORMAT_VERSION;
use crate::error::{Result, TutorError};
use crate::sgf::parse_with_size;
use crate::source::read_record;
use crate::tree::VariationTree;

#[derive(Serialize)]
struct SavedStateRef<'a> {
    version: u32,
    tree: &'a VariationTree,
}

#[derive(Deserialize)]
struct SavedState {
    version: u32,
    tree: VariationTree,
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `tree` to `path`, replacing any previous state atomically.
///
/// On failure the temporary file is removed and the previous state is left
/// untouched.
pub fn save(tree: &VariationTree, path: &Path) -> Result<()> {
    let tmp = temp_path(path);
    if let Err(err) = write_replacing(tree, &tmp, path) {
        if tmp.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::warn!("could not remove {}: {cleanup}", tmp.display());
            }
        }
        return Err(err);
    }
    log::info!(
        "saved {} nodes, {} total mistakes to {}",
        tree.node_count(),
        tree.total_mistake_count(),
        path.display()
    );
    Ok(())
}

fn write_replacing(tree: &VariationTree, tmp: &Path, path: &Path) -> Result<()> {
    let file = File::create(tmp)
        .map_err(|source| TutorError::io(format!("create {}", tmp.display()), source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(
        &mut writer,
        &SavedStateRef {
            version: STATE_FORMAT_VERSION,
            tree,
        },
    )?;
    writer
        .flush()
        .map_err(|source| TutorError::io(format!("write {}", tmp.display()), source))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|source| TutorError::io(format!("sync {}", tmp.display()), source))?;
    fs::rename(tmp, path).map_err(|source| {
        TutorError::io(format!("replace {} with {}", path.display(), tmp.display()), source)
    })
}

/// Load a tree saved by [`save`].
pub fn load(path: &Path) -> Result<VariationTree> {
    let file = File::open(path)
        .map_err(|source| TutorError::io(format!("open {}", path.display()), source))?;
    let state: SavedState = serde_json::from_reader(BufReader::new(file))?;
    if state.version != STATE_FORMAT_VERSION {
        return Err(TutorError::IncompatibleState {
            found: state.version,
            expected: STATE_FORMAT_VERSION,
        });
    }
    state.tree.check_consistency()?;
    log::info!(
        "loaded {} nodes, {} total mistakes from {}",
        state.tree.node_count(),
        state.tree.total_mistake_count(),
        path.display()
    );
    Ok(state.tree)
}

/// Restore the saved tree if there is one, else parse the record afresh.
pub fn load_or_parse(config: &TutorConfig) -> Result<VariationTree> {
    if config.state_path.exists() {
        let tree = load(&config.state_path)?;
        if tree.board_size() != config.board_size {
            log::warn!(
                "saved state uses board size {}, ignoring configured {}",
                tree.board_size(),
                config.board_size
            );
        }
        return Ok(tree);
    }
    let text = read_record(&config.record_path)?;
    let tree = parse_with_size(&text, config.board_size)?;
    log::info!(
        "parsed {} nodes from {}",
        tree.node_count(),
        config.record_path.display()
    );
    Ok(tree)
}
