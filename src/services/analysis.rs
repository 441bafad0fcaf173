//! Analysis orchestration.
//!
//! Fans one prompt out to every configured provider, tolerating partial
//! failure: each provider call is independently guarded, so one timeout
//! or bad credential never hides the other provider's answer. Only the
//! initial parse can fail the whole operation.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::models::{
    AnalysisRequest, FileAnalysis, ProviderOutcome, ProviderResult, Table, TableAnalysis,
};
use crate::parsers::{self, ParseError};
use crate::providers::{
    prompts, AnalysisProvider, GigaChatClient, GigaChatConfig, ProxyApiClient, ProxyApiConfig,
};
use crate::services::report::ReportWriter;

/// One provider's seat in the fan-out.
///
/// A slot with no client represents a provider that could not be
/// constructed (missing or disabled configuration); it still produces a
/// labelled outcome so reports and error maps stay complete.
pub struct ProviderSlot {
    pub name: String,
    pub client: Option<Arc<dyn AnalysisProvider>>,
}

impl ProviderSlot {
    pub fn available(client: Arc<dyn AnalysisProvider>) -> Self {
        Self {
            name: client.name().to_string(),
            client: Some(client),
        }
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client: None,
        }
    }
}

pub struct AnalysisService {
    slots: Vec<ProviderSlot>,
    reports: ReportWriter,
}

impl AnalysisService {
    /// Build the standard two-provider service from configuration.
    pub fn from_configs(
        gigachat: GigaChatConfig,
        proxy: ProxyApiConfig,
        reports_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        let giga_slot = if gigachat.has_credentials() {
            ProviderSlot::available(Arc::new(GigaChatClient::new(gigachat)))
        } else {
            warn!("GigaChat credentials missing, provider unavailable");
            ProviderSlot::unavailable("GigaChat")
        };

        let proxy_slot = if proxy.is_configured() {
            ProviderSlot::available(Arc::new(ProxyApiClient::new(proxy)))
        } else {
            warn!("ProxyAPI disabled or missing API key, provider unavailable");
            ProviderSlot::unavailable("ProxyAPI")
        };

        Self {
            slots: vec![giga_slot, proxy_slot],
            reports: ReportWriter::new(reports_dir),
        }
    }

    /// Build a service over arbitrary providers. Used by tests and by
    /// anything that wants a different provider lineup.
    pub fn with_slots(slots: Vec<ProviderSlot>, reports: ReportWriter) -> Self {
        Self { slots, reports }
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    /// Send one request to every slot concurrently.
    async fn dispatch(&self, request: &AnalysisRequest) -> Vec<ProviderOutcome> {
        let attempts = self.slots.iter().map(|slot| async move {
            let result = match &slot.client {
                None => ProviderResult::Unavailable,
                Some(client) => match client.send_analysis_request(request).await {
                    Ok(text) => ProviderResult::Success { text },
                    Err(err) => {
                        warn!("{} request failed: {}", slot.name, err);
                        ProviderResult::Failure {
                            kind: err.kind(),
                            message: err.to_string(),
                        }
                    }
                },
            };
            ProviderOutcome {
                provider: slot.name.clone(),
                result,
            }
        });

        join_all(attempts).await
    }

    /// Parse a file, fan its rendered contents out to the providers, and
    /// write a report.
    ///
    /// Parse failures abort the operation; provider failures are captured
    /// per provider; a report-write failure only costs the report path.
    pub async fn analyze_file(
        &self,
        path: &Path,
        session_id: Option<String>,
    ) -> Result<FileAnalysis, ParseError> {
        let dataset = parsers::parse_file(path)?;
        info!(
            "analyzing {} ({} dataset)",
            path.display(),
            dataset.kind().as_str()
        );

        let request = AnalysisRequest::new(dataset.render_text()).with_session(session_id);
        let outcomes = self.dispatch(&request).await;

        let report_path = match self.reports.write(&outcomes) {
            Ok(path) => Some(path),
            Err(err) => {
                error!("failed to write report: {}", err);
                None
            }
        };

        Ok(FileAnalysis {
            dataset,
            outcomes,
            report_path,
        })
    }

    /// Analyze a strict prefix of a table's rows. No report is written;
    /// failures land in the error map with a null result for that
    /// provider.
    pub async fn analyze_table_rows(
        &self,
        table: &Table,
        rows_count: usize,
        session_id: Option<String>,
    ) -> TableAnalysis {
        let sample = table.head(rows_count);
        info!(
            "analyzing first {} rows ({} available)",
            rows_count,
            table.row_count()
        );

        let prompt = prompts::first_rows_prompt(rows_count, &sample.render_text());
        let request = AnalysisRequest::new(prompt).with_session(session_id);
        let outcomes = self.dispatch(&request).await;

        let mut analysis = TableAnalysis::default();
        for outcome in outcomes {
            match outcome.result {
                ProviderResult::Success { text } => {
                    analysis.results.insert(outcome.provider, Some(text));
                }
                ProviderResult::Failure { message, .. } => {
                    analysis.results.insert(outcome.provider.clone(), None);
                    analysis.errors.insert(outcome.provider, message);
                }
                ProviderResult::Unavailable => {
                    let message = format!("{} not available", outcome.provider);
                    analysis.results.insert(outcome.provider.clone(), None);
                    analysis.errors.insert(outcome.provider, message);
                }
            }
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, FailureKind};
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use std::io::Write;
    use tokio::sync::Mutex;

    /// Provider stub with a canned reply.
    struct StubProvider {
        name: String,
        reply: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn ok(name: &str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(name: &str, message: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AnalysisProvider for StubProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn send_analysis_request(
            &self,
            request: &AnalysisRequest,
        ) -> Result<String, ProviderError> {
            self.seen.lock().await.push(request.prompt.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(ProviderError::Remote(message.clone())),
            }
        }
    }

    fn service_with(
        slots: Vec<ProviderSlot>,
        dir: &tempfile::TempDir,
    ) -> AnalysisService {
        AnalysisService::with_slots(slots, ReportWriter::new(dir.path()))
    }

    fn csv_fixture(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["id".to_string()]);
        table.push_row(vec![CellValue::Int(1)]);
        table.push_row(vec![CellValue::Int(2)]);
        table
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_both_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            vec![
                ProviderSlot::available(StubProvider::ok("GigaChat", "fine")),
                ProviderSlot::available(StubProvider::failing("ProxyAPI", "HTTP 500: boom")),
            ],
            &dir,
        );
        let path = csv_fixture(&dir, "a,b\n1,2\n");

        let analysis = service.analyze_file(&path, None).await.unwrap();
        assert_eq!(analysis.outcomes.len(), 2);
        assert_eq!(
            analysis.outcome("GigaChat").unwrap(),
            &ProviderResult::Success {
                text: "fine".to_string()
            }
        );
        match analysis.outcome("ProxyAPI").unwrap() {
            ProviderResult::Failure { kind, message } => {
                assert_eq!(*kind, FailureKind::Remote);
                assert!(message.contains("HTTP 500"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(analysis.report_path.is_some());
    }

    #[tokio::test]
    async fn test_unavailable_slot_still_reported() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            vec![
                ProviderSlot::unavailable("GigaChat"),
                ProviderSlot::available(StubProvider::ok("ProxyAPI", "ok")),
            ],
            &dir,
        );
        let path = csv_fixture(&dir, "a\n1\n");

        let analysis = service.analyze_file(&path, None).await.unwrap();
        assert_eq!(
            analysis.outcome("GigaChat").unwrap(),
            &ProviderResult::Unavailable
        );

        let report = std::fs::read_to_string(analysis.report_path.unwrap()).unwrap();
        assert!(report.contains("GigaChat:\nGigaChat not available"));
        assert!(report.contains("ProxyAPI:\nok"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            vec![ProviderSlot::available(StubProvider::ok("GigaChat", "ok"))],
            &dir,
        );

        let err = service
            .analyze_file(Path::new("notes.docx"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat(_)));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("report_"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_report_write_failure_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let service = AnalysisService::with_slots(
            vec![ProviderSlot::available(StubProvider::ok("GigaChat", "ok"))],
            ReportWriter::new("/proc/nonexistent/reports"),
        );
        let path = csv_fixture(&dir, "a\n1\n");

        let analysis = service.analyze_file(&path, None).await.unwrap();
        assert!(analysis.report_path.is_none());
        assert!(analysis.outcome("GigaChat").unwrap().is_success());
    }

    #[tokio::test]
    async fn test_table_rows_maps_failures_to_null_results() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            vec![
                ProviderSlot::available(StubProvider::ok("GigaChat", "looks linear")),
                ProviderSlot::available(StubProvider::failing("ProxyAPI", "HTTP 429: slow down")),
            ],
            &dir,
        );

        let analysis = service.analyze_table_rows(&sample_table(), 15, None).await;
        assert_eq!(
            analysis.results["GigaChat"],
            Some("looks linear".to_string())
        );
        assert_eq!(analysis.results["ProxyAPI"], None);
        assert!(analysis.errors["ProxyAPI"].contains("HTTP 429"));
        assert!(!analysis.errors.contains_key("GigaChat"));

        // no report for row-sample analysis
        let reports: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("report_"))
            .collect();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_provider_gets_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(vec![ProviderSlot::unavailable("ProxyAPI")], &dir);

        let analysis = service.analyze_table_rows(&sample_table(), 5, None).await;
        assert_eq!(analysis.results["ProxyAPI"], None);
        assert_eq!(analysis.errors["ProxyAPI"], "ProxyAPI not available");
    }

    #[tokio::test]
    async fn test_rows_prompt_uses_requested_count_and_strict_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubProvider::ok("GigaChat", "ok");
        let service = service_with(vec![ProviderSlot::available(stub.clone())], &dir);

        // requested more rows than exist
        service.analyze_table_rows(&sample_table(), 15, None).await;

        let seen = stub.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("Analyze the first 15 rows"));
        // only the two real rows are rendered
        assert!(seen[0].contains("| 1 "));
        assert!(seen[0].contains("| 2 "));
    }

    #[tokio::test]
    async fn test_session_id_reaches_providers() {
        struct SessionCheck {
            seen: Mutex<Option<Option<String>>>,
        }

        #[async_trait]
        impl AnalysisProvider for SessionCheck {
            fn name(&self) -> &str {
                "GigaChat"
            }
            async fn send_analysis_request(
                &self,
                request: &AnalysisRequest,
            ) -> Result<String, ProviderError> {
                *self.seen.lock().await = Some(request.session_id.clone());
                Ok("ok".to_string())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let check = Arc::new(SessionCheck {
            seen: Mutex::new(None),
        });
        let service = service_with(vec![ProviderSlot::available(check.clone())], &dir);
        let path = csv_fixture(&dir, "a\n1\n");

        service
            .analyze_file(&path, Some("sess-42".to_string()))
            .await
            .unwrap();

        assert_eq!(
            check.seen.lock().await.clone().unwrap(),
            Some("sess-42".to_string())
        );
    }
}
