//! Metadata tagging via an ffmpeg stream-copy remux.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::command::ToolCommand;
use crate::tools::ToolConfig;
use crate::workspace::Workspace;

/// Metadata fields and optional cover image to write into a container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    /// Ordered `key=value` metadata pairs.
    pub fields: Vec<(String, String)>,
    /// Image attached as cover art when present.
    pub cover_art: Option<PathBuf>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a metadata field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn cover_art(mut self, path: impl Into<PathBuf>) -> Self {
        self.cover_art = Some(path.into());
        self
    }

    /// Value of the first field named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Build the ffmpeg argument list that copies every stream of `input` into
/// `output`, optionally attaching `tags.cover_art` as an image stream.
pub fn tag_args(input: &Path, output: &Path, tags: &TagSet) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];

    match &tags.cover_art {
        Some(cover) => {
            args.extend(["-i".into(), cover.into()]);
            args.extend(["-map", "0", "-map", "1", "-c", "copy"].map(OsString::from));
            args.extend(["-disposition:v:1", "attached_pic"].map(OsString::from));
        }
        None => args.extend(["-c", "copy"].map(OsString::from)),
    }

    for (key, value) in &tags.fields {
        args.push("-metadata".into());
        args.push(format!("{key}={value}").into());
    }

    args.push(output.into());
    args
}

/// Write `tags` into the workspace input, producing the workspace output.
///
/// The original is not touched; the caller decides whether to
/// [`Workspace::finalize`] based on the result.
pub async fn write_tags(
    workspace: &Workspace,
    ffmpeg: &ToolConfig,
    tags: &TagSet,
) -> reeltag_core::Result<()> {
    let input = workspace.input();
    let output = workspace.output();

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.args(tag_args(input, &output, tags));
    cmd.timeout(ffmpeg.timeout);

    tracing::debug!(command = %cmd.display(), "tagging {}", input.display());
    cmd.execute().await?;

    if !output.is_file() {
        return Err(reeltag_core::Error::tool(
            &ffmpeg.name,
            format!("no output written for {}", input.display()),
        ));
    }

    Ok(())
}
