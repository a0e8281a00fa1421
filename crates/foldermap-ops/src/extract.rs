//! Move a folder's media files into a newly created subfolder.

use tracing::{error, info, warn};

use foldermap_core::{FolderProvider, FsError, PathRecord, PersistedStore, Rejection, ReplaceScope, relpath};

use crate::conflict::{ensure_exists, ensure_known};
use crate::engine::MutationEngine;
use crate::operation::{OperationError, OperationKind, OperationOutcome};

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Create a new subfolder in `source` and move its media files into it.
    ///
    /// Files are moved one at a time. If one fails the rest stay where they
    /// are and the files already moved are left in the new folder; the
    /// catalog and the records are updated for what did move and
    /// [`OperationError::PartialMigration`] is returned.
    pub fn extract_files(&mut self, source: &str) -> Result<OperationOutcome, OperationError> {
        let source = self.resolve(source);
        ensure_known(&self.records, &source)?;
        ensure_exists(&self.folders, &source)?;
        if !self.records.get(&source).is_some_and(|r| r.has_data) {
            return Err(Rejection::NoData { path: source }.into());
        }

        let files = self
            .folders
            .enumerate_media_files(&source)
            .map_err(|e| OperationError::filesystem(OperationKind::ExtractFiles, &source, e))?;
        if files.is_empty() {
            return Err(Rejection::NothingToExtract { path: source }.into());
        }

        let destination = self.create_new_folder(&source)?;

        let (moved, failure) = self.move_files(&source, &destination, &files);
        let total = files.len();

        let Some(cause) = failure else {
            self.finish_extract(&source, &destination, &moved, true)?;
            info!(from = %source, to = %destination, files = total, "Extracted files");
            return Ok(OperationOutcome::Extracted {
                source,
                destination,
                files_moved: total,
            });
        };

        warn!(
            from = %source,
            to = %destination,
            moved = moved.len(),
            total,
            error = %cause,
            "Moving files into new folder was interrupted"
        );
        if !moved.is_empty() {
            self.finish_extract(&source, &destination, &moved, false)?;
        }
        Err(OperationError::PartialMigration {
            from: source,
            destination,
            moved: moved.len(),
            total,
            cause,
        })
    }

    /// Move files until one fails. Returns the names moved and the failure, if any.
    fn move_files(
        &mut self,
        source: &str,
        destination: &str,
        files: &[String],
    ) -> (Vec<String>, Option<FsError>) {
        let mut moved = Vec::with_capacity(files.len());
        for file in files {
            let from = relpath::join(source, file);
            let to = relpath::join(destination, file);
            if let Err(err) = self.folders.move_file(&from, &to) {
                return (moved, Some(err));
            }
            self.edits_made = true;
            moved.push(file.clone());
        }
        (moved, None)
    }

    /// Re-file the moved files in the catalog and update the data flags.
    fn finish_extract(
        &mut self,
        source: &str,
        destination: &str,
        moved: &[String],
        all_moved: bool,
    ) -> Result<(), OperationError> {
        // The new folder has no children, so only exact matches move.
        let result = if all_moved {
            self.catalog
                .replace_path_prefix(source, destination, ReplaceScope::Leaf)
        } else {
            self.catalog.relocate_files(source, destination, moved)
        };

        if let Err(err) = result {
            error!(
                from = %source,
                to = %destination,
                error = %err,
                "Catalog update failed after files were moved"
            );
            self.rebuild();
            return Err(OperationError::PersistedStore {
                old_prefix: source.to_string(),
                new_prefix: destination.to_string(),
                source: err,
            });
        }

        self.records.add_or_replace(PathRecord::with_data(destination));
        if all_moved {
            self.records.add_or_replace(PathRecord::empty(source));
        }
        self.rebuild();
        Ok(())
    }
}
