//! Workspace management for in-place file rewrites.
//!
//! A [`Workspace`] provides a scratch directory for the rewritten output and
//! swaps it onto the original path only when finalized. Until then the
//! original is never touched; dropping the workspace discards the scratch
//! directory and everything in it.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix of scratch directories, so directory walks can skip them.
pub const SCRATCH_PREFIX: &str = ".reeltag-";

/// Scratch workspace for rewriting one file.
///
/// # Example
///
/// ```no_run
/// use reeltag_av::Workspace;
///
/// let workspace = Workspace::new(std::path::Path::new("/path/to/input.mkv")).unwrap();
/// // ... write the rewritten file to workspace.output() ...
/// workspace.finalize().unwrap();
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
}

impl Workspace {
    /// Create a workspace next to the input file.
    ///
    /// Staging in the input's own directory keeps the final rename on one
    /// filesystem.
    pub fn new(input: &Path) -> reeltag_core::Result<Self> {
        let parent = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new_in(input, parent)
    }

    /// Create a workspace whose scratch directory lives under `scratch`.
    pub fn new_in(input: &Path, scratch: &Path) -> reeltag_core::Result<Self> {
        if input.file_name().is_none() {
            return Err(reeltag_core::Error::tool(
                "workspace",
                format!("invalid input file path: {}", input.display()),
            ));
        }

        let temp_dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(scratch)
            .map_err(|e| {
                reeltag_core::Error::tool(
                    "workspace",
                    format!("failed to create scratch dir in {}: {e}", scratch.display()),
                )
            })?;

        Ok(Self {
            temp_dir,
            input_path: input.to_path_buf(),
        })
    }

    /// The original input file path.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// The output file path (same filename as input, inside the scratch dir).
    pub fn output(&self) -> PathBuf {
        let file_name = self
            .input_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("output"));
        self.temp_dir.path().join(file_name)
    }

    /// Path to the scratch directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Replace the original file with the output.
    ///
    /// The swap is a single rename. When the scratch directory sits on a
    /// different filesystem the output is first copied into a hidden sibling
    /// of the original, which is then renamed into place, so the original
    /// path never shows a partially written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file does not exist or the swap fails;
    /// the original is left untouched in both cases.
    pub fn finalize(self) -> reeltag_core::Result<PathBuf> {
        let output = self.output();
        let dest = &self.input_path;

        if !output.is_file() {
            return Err(reeltag_core::Error::tool(
                "workspace",
                format!("output file does not exist: {}", output.display()),
            ));
        }

        if std::fs::rename(&output, dest).is_err() {
            let dest_dir = dest
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut staged = tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .tempfile_in(dest_dir)
                .map_err(|e| {
                    reeltag_core::Error::tool("workspace", format!("failed to stage output: {e}"))
                })?;
            let mut src = std::fs::File::open(&output)?;
            std::io::copy(&mut src, staged.as_file_mut())?;
            staged.as_file().sync_all()?;
            staged.persist(dest).map_err(|e| {
                reeltag_core::Error::tool(
                    "workspace",
                    format!("failed to move output to destination: {}", e.error),
                )
            })?;
        }

        Ok(dest.clone())
    }
}
