//! Local filesystem document store
//!
//! Writes rendered research reports as markdown files under a configured
//! output directory and returns `file://` handles. When a work-item tracker
//! is wired in, published documents are linked back to their story as a
//! comment; otherwise the link step is a logged no-op.

use crate::work_items::AdoWorkItems;
use async_trait::async_trait;
use chrono::Utc;
use delve_application::ports::documents::{
    DocumentError, DocumentHandle, DocumentSink, RenderedDocument,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub struct LocalDocumentStore {
    output_dir: PathBuf,
    tracker: Option<Arc<AdoWorkItems>>,
}

impl LocalDocumentStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tracker: None,
        }
    }

    /// Link published documents back to stories through this tracker
    pub fn with_tracker(mut self, tracker: Arc<AdoWorkItems>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    fn file_name(title: &str) -> String {
        let slug: String = title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let slug = slug.trim_matches('-').replace("--", "-");
        format!("{}-{}.md", slug, Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl DocumentSink for LocalDocumentStore {
    async fn publish(&self, document: &RenderedDocument) -> Result<DocumentHandle, DocumentError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let path = self.output_dir.join(Self::file_name(&document.title));
        let content = format!("# {}\n\n{}\n", document.title, document.markdown);
        tokio::fs::write(&path, content).await?;

        let url = format!("file://{}", path.display());
        debug!(%url, "document published");
        Ok(DocumentHandle { url })
    }

    async fn attach(&self, handle: &DocumentHandle, story_id: &str) -> Result<(), DocumentError> {
        match &self.tracker {
            Some(tracker) => tracker
                .add_comment(
                    story_id,
                    &format!("Research document published: {}", handle.url),
                )
                .await
                .map_err(|e| DocumentError::Attach(e.to_string())),
            None => {
                info!(story = story_id, url = %handle.url, "no tracker configured, skipping link");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_writes_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        let handle = store
            .publish(&RenderedDocument {
                title: "Technical Research: Partner Portal".to_string(),
                markdown: "## Findings\n\nDetails.".to_string(),
            })
            .await
            .unwrap();

        assert!(handle.url.starts_with("file://"));
        let path = handle.url.strip_prefix("file://").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Technical Research: Partner Portal"));
        assert!(content.contains("## Findings"));
    }

    #[tokio::test]
    async fn test_attach_without_tracker_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDocumentStore::new(dir.path());
        let handle = DocumentHandle {
            url: "file:///tmp/report.md".to_string(),
        };
        store.attach(&handle, "42").await.unwrap();
    }

    #[test]
    fn test_file_name_slugifies_title() {
        let name = LocalDocumentStore::file_name("Fast Research: Portal (v2)");
        assert!(name.starts_with("fast-research-portal-v2-"));
        assert!(name.ends_with(".md"));
    }
}
