use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of a repository's two tracked files an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileKind {
    Srs,
    SourceCode,
}

impl FileKind {
    /// Parses the wire value carried in the upload form's `fileType` field.
    pub fn parse(value: &str) -> Option<FileKind> {
        match value {
            "srs" => Some(FileKind::Srs),
            "sourceCode" => Some(FileKind::SourceCode),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Srs => "srs",
            FileKind::SourceCode => "sourceCode",
        }
    }

    /// Human-readable name used in history labels and stored file names.
    pub fn display_name(self) -> &'static str {
        match self {
            FileKind::Srs => "SRS",
            FileKind::SourceCode => "Source Code",
        }
    }

    /// Base name (without extension) the uploaded file is stored under.
    pub fn file_stem(self) -> &'static str {
        match self {
            FileKind::Srs => "SRS",
            FileKind::SourceCode => "SourceCode",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to a tracked file. History rows currently only record
/// uploads; the other variants keep the label vocabulary complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadAction {
    Uploaded,
    Modified,
    Deleted,
}

impl UploadAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadAction::Uploaded => "Uploaded",
            UploadAction::Modified => "Modified",
            UploadAction::Deleted => "Deleted",
        }
    }

    /// The label recorded on a history row, e.g. "Uploaded SRS".
    pub fn label(self, kind: FileKind) -> String {
        format!("{} {}", self.as_str(), kind.display_name())
    }
}

/// Outcome of the most recent extraction run for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Completed,
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionStatus::Pending => "pending",
            ExtractionStatus::Completed => "completed",
            ExtractionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<ExtractionStatus> {
        match value {
            "pending" => Some(ExtractionStatus::Pending),
            "completed" => Some(ExtractionStatus::Completed),
            "failed" => Some(ExtractionStatus::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_file_kinds() {
        assert_eq!(FileKind::parse("srs"), Some(FileKind::Srs));
        assert_eq!(FileKind::parse("sourceCode"), Some(FileKind::SourceCode));
        assert_eq!(FileKind::parse("binary"), None);
        assert_eq!(FileKind::parse("SRS"), None);
    }

    #[test]
    fn history_labels_match_recorded_vocabulary() {
        assert_eq!(UploadAction::Uploaded.label(FileKind::Srs), "Uploaded SRS");
        assert_eq!(
            UploadAction::Uploaded.label(FileKind::SourceCode),
            "Uploaded Source Code"
        );
        assert_eq!(UploadAction::Deleted.label(FileKind::Srs), "Deleted SRS");
    }

    #[test]
    fn extraction_status_round_trips_through_text() {
        for status in [
            ExtractionStatus::Pending,
            ExtractionStatus::Completed,
            ExtractionStatus::Failed,
        ] {
            assert_eq!(ExtractionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExtractionStatus::parse("done"), None);
    }
}
