//! CLI command implementations.

pub mod chart;
pub mod insight;
pub mod inspect;
pub mod key;
pub mod kpis;

use std::path::{Path, PathBuf};

use pulseboard::{FileCredentialStore, ImportDraft, Pulseboard};
use tracing::debug;

use crate::cli::TypeOverride;

type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Import a file and apply `--type` overrides to the draft.
fn draft_with_overrides(
    board: &Pulseboard,
    file: &Path,
    overrides: &[TypeOverride],
) -> CommandResult<ImportDraft> {
    let mut draft = board.import_file(file)?;
    for o in overrides {
        debug!(column = %o.column, column_type = %o.column_type, "applying type override");
        draft.set_column_type(&o.column, o.column_type)?;
    }
    Ok(draft)
}

/// Import, apply overrides, and commit. Returns the dataset id.
fn commit_with_overrides(
    board: &mut Pulseboard,
    file: &Path,
    overrides: &[TypeOverride],
) -> CommandResult<String> {
    let draft = draft_with_overrides(board, file, overrides)?;
    Ok(board.commit(draft))
}

fn credential_store(path: Option<PathBuf>) -> CommandResult<FileCredentialStore> {
    let path = match path {
        Some(p) => p,
        None => FileCredentialStore::default_path()
            .ok_or("Cannot locate a home directory; pass --credentials")?,
    };
    Ok(FileCredentialStore::new(path))
}
