//! Picks the script a run applies.
//!
//! Names are compared ordinally (byte-wise, which for UTF-8 is code point order),
//! newest first. There is no version parsing, so callers must give scripts a
//! fixed-width, zero-padded prefix: `0010_add_index.sql` sorts after
//! `0002_add_price.sql`, but `10_x.sql` sorts before `2_x.sql`.

use std::path::{Path, PathBuf};

use super::repository::ScriptFile;

/// Scripts discovered in one directory, ordered newest first.
#[derive(Debug, Clone)]
pub struct MigrationBatch {
    pub directory: PathBuf,
    pub candidates: Vec<ScriptFile>,
}

impl MigrationBatch {
    /// Order `candidates` by name, descending. Equal names keep listing order.
    pub fn new(directory: impl Into<PathBuf>, mut candidates: Vec<ScriptFile>) -> Self {
        order_newest_first(&mut candidates);
        Self {
            directory: directory.into(),
            candidates,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The one script a run applies.
    pub fn selected(&self) -> Option<&ScriptFile> {
        select_latest(&self.candidates)
    }
}

/// Stable descending sort by name.
fn order_newest_first(scripts: &mut [ScriptFile]) {
    scripts.sort_by(|a, b| b.name.cmp(&a.name));
}

/// The ordinal-greatest name; the first one listed wins a tie.
pub fn select_latest(scripts: &[ScriptFile]) -> Option<&ScriptFile> {
    scripts
        .iter()
        .reduce(|best, next| if next.name > best.name { next } else { best })
}
