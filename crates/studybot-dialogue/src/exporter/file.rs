//! Local JSON fallback: one file per session under the transcripts directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use studybot_core::utils::{file_timestamp, safe_filename};

use super::{ExportError, TranscriptExporter, TranscriptPayload};

pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `transcript_<YYYYMMDD_HHMMSS>_<session_id>.json`
    fn file_name(payload: &TranscriptPayload) -> String {
        format!(
            "transcript_{}_{}.json",
            file_timestamp(Utc::now()),
            safe_filename(&payload.session_id)
        )
    }
}

#[async_trait]
impl TranscriptExporter for FileExporter {
    async fn export(&self, payload: &TranscriptPayload) -> Result<(), ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(Self::file_name(payload));
        let json = serde_json::to_vec_pretty(payload)?;
        tokio::fs::write(&path, json).await?;

        info!(
            session_id = %payload.session_id,
            path = %path.display(),
            "transcript written"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_core::Session;

    fn closed_session() -> Session {
        let mut session = Session::new("script");
        session.push_assistant("hi");
        session.push_user("ABCDEF123456").unwrap();
        session.capture_prolific_id("ABCDEF123456");
        session.close();
        session
    }

    #[tokio::test]
    async fn test_writes_one_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let transcripts = dir.path().join("transcripts");
        let exporter = FileExporter::new(&transcripts);

        let session = closed_session();
        exporter
            .export(&TranscriptPayload::from(&session))
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(&transcripts)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("transcript_"));
        assert!(name.ends_with(&format!("_{}.json", session.id())));

        let written: TranscriptPayload =
            serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
        assert_eq!(written, TranscriptPayload::from(&session));
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let exporter = FileExporter::new(blocker.join("transcripts"));
        let result = exporter
            .export(&TranscriptPayload::from(&closed_session()))
            .await;
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
