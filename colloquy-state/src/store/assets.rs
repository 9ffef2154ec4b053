//! Image extraction next to exported documents

use crate::attachment;
use crate::error::StateResult;
use colloquy_core::Image;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Writes the images of one document into its `<stem>.assets` directory
///
/// Images are numbered from 0 in document order. The directory is only
/// created once the first image is written.
pub(crate) struct AssetWriter {
    dir: PathBuf,
    dir_name: String,
    count: usize,
}

impl AssetWriter {
    pub(crate) fn for_document(document: &Path) -> Self {
        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "conversation".to_string());
        let dir_name = format!("{}.assets", stem);
        let dir = document
            .parent()
            .map(|p| p.join(&dir_name))
            .unwrap_or_else(|| PathBuf::from(&dir_name));
        Self {
            dir,
            dir_name,
            count: 0,
        }
    }

    /// Save `image` and return its path relative to the document
    pub(crate) async fn write(&mut self, image: &Image) -> StateResult<(usize, String)> {
        let bytes = attachment::decode_image(image)?;
        let index = self.count;
        let file_name = format!("image_{}.{}", index, image.extension());

        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&file_name), bytes).await?;
        self.count += 1;
        debug!("Extracted {} into {:?}", file_name, self.dir);

        Ok((index, format!("{}/{}", self.dir_name, file_name)))
    }
}
