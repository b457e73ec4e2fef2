//! Upload-directory fixtures.

use bytes::Bytes;
use expunge_storage::{ArtifactStore, FileLayout};

/// Keys written for one file by [`populate_file`].
#[allow(dead_code)]
pub struct FileFixture {
    pub current: String,
    pub archived: Vec<String>,
    pub thumbs: Vec<String>,
}

/// Write a current version, two archived versions and two thumbnails.
#[allow(dead_code)]
pub async fn populate_file(
    store: &dyn ArtifactStore,
    layout: &FileLayout,
    name: &str,
) -> FileFixture {
    let current = layout.current_key(name);
    let archived: Vec<String> = ["20240101000000", "20240201000000"]
        .iter()
        .map(|ts| layout.archive_key(name, &format!("{ts}!{name}")))
        .collect();
    let thumb_prefix = layout.thumb_prefix(name);
    let thumbs: Vec<String> = [120, 240]
        .iter()
        .map(|px| format!("{thumb_prefix}/{px}px-{name}"))
        .collect();

    for key in std::iter::once(&current)
        .chain(archived.iter())
        .chain(thumbs.iter())
    {
        store
            .put(key, Bytes::from(format!("artifact:{key}")))
            .await
            .expect("Failed to write fixture artifact");
    }

    FileFixture {
        current,
        archived,
        thumbs,
    }
}
