use qbank_core::model::{ExportFormat, GeneratedPaper, PaperCriteria, default_paper_filename};

use crate::Clock;
use crate::api::BackendClient;
use crate::error::PaperServiceError;

/// Where the backend wrote a saved paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaper {
    pub filename: String,
    pub format: ExportFormat,
    pub file_path: String,
}

/// Generates papers from criteria and saves them on the backend.
#[derive(Clone)]
pub struct PaperService {
    clock: Clock,
    client: BackendClient,
}

impl PaperService {
    #[must_use]
    pub fn new(clock: Clock, client: BackendClient) -> Self {
        Self { clock, client }
    }

    /// Filename suggested before the user types one.
    #[must_use]
    pub fn default_filename(&self) -> String {
        default_paper_filename(self.clock.now())
    }

    /// Validate the criteria and ask the backend for a paper.
    ///
    /// # Errors
    ///
    /// Returns `PaperServiceError::Criteria` for invalid quotas.
    /// Returns `PaperServiceError::Api` if the backend request fails.
    pub async fn generate(
        &self,
        criteria: &PaperCriteria,
    ) -> Result<GeneratedPaper, PaperServiceError> {
        criteria.validate()?;
        let paper = self.client.generate_paper(criteria).await?;
        if paper.is_partial() {
            tracing::info!(
                requested = criteria.total_questions,
                found = paper.questions.len(),
                "partial paper generated"
            );
        } else {
            tracing::info!(questions = paper.questions.len(), "paper generated");
        }
        Ok(paper)
    }

    /// Save `paper` under `filename` (blank falls back to the default name).
    ///
    /// # Errors
    ///
    /// Returns `PaperServiceError::EmptyPaper` when there is nothing to save.
    /// Returns `PaperServiceError::InvalidFilename` for names containing a path.
    /// Returns `PaperServiceError::Api` if the backend request fails.
    pub async fn save(
        &self,
        paper: &GeneratedPaper,
        filename: &str,
        format: ExportFormat,
    ) -> Result<SavedPaper, PaperServiceError> {
        if paper.questions.is_empty() {
            return Err(PaperServiceError::EmptyPaper);
        }
        let filename = resolve_filename(filename, || self.default_filename())?;
        let file_path = self.client.save_paper(paper, &filename, format).await?;
        tracing::info!(%file_path, format = format.label(), "paper saved");
        Ok(SavedPaper {
            filename,
            format,
            file_path,
        })
    }
}

/// Trims the user's filename and drops a typed extension; the backend adds
/// its own for the chosen format.
fn resolve_filename(
    raw: &str,
    fallback: impl FnOnce() -> String,
) -> Result<String, PaperServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(fallback());
    }
    let stem = ExportFormat::ALL
        .iter()
        .find_map(|format| trimmed.strip_suffix(&format!(".{}", format.extension())))
        .unwrap_or(trimmed)
        .trim();
    if stem.is_empty() {
        return Err(PaperServiceError::EmptyFilename);
    }
    if stem.contains(['/', '\\']) {
        return Err(PaperServiceError::InvalidFilename(stem.to_string()));
    }
    Ok(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use qbank_core::model::{PaperMetadata, PaperOutcome};
    use qbank_core::time::fixed_now;

    use crate::config::BackendConfig;

    fn service() -> PaperService {
        let config = BackendConfig::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        PaperService::new(Clock::fixed(fixed_now()), BackendClient::new(config).unwrap())
    }

    #[test]
    fn blank_filename_uses_timestamp() {
        let name = resolve_filename("  ", || "paper_20231114_221320".into()).unwrap();
        assert_eq!(name, "paper_20231114_221320");
        assert_eq!(service().default_filename(), "paper_20231114_221320");
    }

    #[test]
    fn typed_extension_is_dropped() {
        assert_eq!(resolve_filename("midterm.md", String::new).unwrap(), "midterm");
        assert_eq!(resolve_filename(" final.html ", String::new).unwrap(), "final");
        assert_eq!(resolve_filename("notes.txt", String::new).unwrap(), "notes.txt");
    }

    #[test]
    fn path_separators_are_rejected() {
        assert!(matches!(
            resolve_filename("../etc/passwd", String::new),
            Err(PaperServiceError::InvalidFilename(_))
        ));
        assert!(matches!(
            resolve_filename(".md", String::new),
            Err(PaperServiceError::EmptyFilename)
        ));
    }

    #[tokio::test]
    async fn invalid_criteria_never_reach_the_backend() {
        let err = service().generate(&PaperCriteria::new(0)).await.unwrap_err();
        assert!(matches!(err, PaperServiceError::Criteria(_)));
    }

    #[tokio::test]
    async fn empty_paper_is_not_saved() {
        let paper = GeneratedPaper {
            outcome: PaperOutcome::Complete,
            message: String::new(),
            questions: Vec::new(),
            metadata: PaperMetadata::default(),
        };
        let err = service()
            .save(&paper, "x", ExportFormat::Markdown)
            .await
            .unwrap_err();
        assert!(matches!(err, PaperServiceError::EmptyPaper));
    }
}
