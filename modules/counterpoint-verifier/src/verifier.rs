//! Verification orchestrator.
//!
//! evidence → (synthesis ∥ social signal) → normalize → render → persist.
//! A run is refused up front when the search or synthesis key is missing, and
//! stops early when search finds nothing. Every other provider failure is
//! carried through as a displayable state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use counterpoint_common::{
    Config, Confidence, ConfidenceLevel, CounterpointError, EvidenceItem, SocialSignal, Topic,
    VerificationReport,
};

use crate::evidence::EvidenceFetcher;
use crate::history::HistoryStore;
use crate::normalizer::normalize;
use crate::render::render_report_html;
use crate::social::SocialSignalFetcher;
use crate::synthesizer::Synthesizer;

#[derive(Clone, TypedBuilder)]
pub struct Verifier {
    pub evidence: Arc<EvidenceFetcher>,
    pub synthesizer: Arc<Synthesizer>,
    pub social: Arc<SocialSignalFetcher>,
    pub history: Arc<HistoryStore>,
}

/// Everything one completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRun {
    pub run_id: Uuid,
    pub topic: Topic,
    pub report: VerificationReport,
    pub confidence: Confidence,
    pub level: ConfidenceLevel,
    pub report_html: String,
    pub sources: Vec<EvidenceItem>,
    pub social: SocialSignal,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Search or synthesis provider not configured; nothing was attempted.
    Unavailable { reason: String },
    /// Search returned nothing; nothing else was attempted.
    NoEvidence,
    Completed(Box<VerificationRun>),
}

impl Verifier {
    pub fn from_config(config: &Config) -> Self {
        Self::builder()
            .evidence(Arc::new(EvidenceFetcher::from_config(config)))
            .synthesizer(Arc::new(Synthesizer::from_config(config)))
            .social(Arc::new(SocialSignalFetcher::from_config(config)))
            .history(Arc::new(HistoryStore::new(&config.history_path)))
            .build()
    }

    pub async fn run(&self, topic: &Topic) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("verification", %run_id, topic = topic.as_str());
        self.run_inner(run_id, topic).instrument(span).await
    }

    fn missing_provider(&self) -> Option<CounterpointError> {
        if !self.evidence.is_configured() {
            Some(CounterpointError::ConfigurationMissing("TAVILY_API_KEY"))
        } else if !self.synthesizer.is_configured() {
            Some(CounterpointError::ConfigurationMissing("GEMINI_API_KEY"))
        } else {
            None
        }
    }

    async fn run_inner(&self, run_id: Uuid, topic: &Topic) -> RunOutcome {
        info!("Verification run started");

        if let Some(missing) = self.missing_provider() {
            warn!(error = %missing, "Required provider unavailable, skipping run");
            return RunOutcome::Unavailable {
                reason: missing.to_string(),
            };
        }

        let sources = match self.evidence.fetch(topic).await {
            Ok(items) => items,
            Err(e @ CounterpointError::ConfigurationMissing(_)) => {
                warn!(error = %e, "Evidence provider unavailable, skipping run");
                return RunOutcome::Unavailable {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                warn!(error = %e, "Evidence fetch failed, skipping run");
                return RunOutcome::NoEvidence;
            }
        };

        if sources.is_empty() {
            info!("No evidence found, skipping synthesis");
            return RunOutcome::NoEvidence;
        }

        let (raw_report, social) = tokio::join!(
            self.synthesizer.synthesize(topic, &sources),
            self.social.fetch(topic),
        );

        let report = normalize(&raw_report);
        let confidence = report.confidence_score();
        let report_html = render_report_html(&report);

        let (persisted, persist_error) =
            match self
                .history
                .append(topic.as_str(), confidence.clone(), &report_html, Some(&social))
            {
                Ok(_) => (true, None),
                Err(e) => {
                    error!(error = %e, path = %self.history.path().display(), "Failed to save history entry");
                    (false, Some(e.to_string()))
                }
            };

        info!(
            confidence = %confidence,
            findings = report.key_findings.len(),
            unverified = report.unverified_claims.len(),
            sources = sources.len(),
            social_error = social.is_error(),
            persisted,
            "Verification run complete"
        );

        RunOutcome::Completed(Box::new(VerificationRun {
            run_id,
            topic: topic.clone(),
            level: confidence.level(),
            confidence,
            report,
            report_html,
            sources,
            social,
            persisted,
            persist_error,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{evidence, report_text, MockModel, MockSearcher};
    use crate::traits::WebSearcher;
    use ai_client::CompletionModel;
    use counterpoint_common::file_config::SearchConfig;
    use tempfile::TempDir;

    struct Harness {
        verifier: Verifier,
        synth_model: Arc<MockModel>,
        social_model: Arc<MockModel>,
        _dir: TempDir,
    }

    fn harness(searcher: MockSearcher, synth_reply: &str, social_reply: &str) -> Harness {
        let dir = TempDir::new().unwrap();
        let synth_model = Arc::new(MockModel::replying(synth_reply));
        let social_model = Arc::new(MockModel::replying(social_reply));

        let verifier = Verifier::builder()
            .evidence(Arc::new(EvidenceFetcher::new(
                Some(Arc::new(searcher) as Arc<dyn WebSearcher>),
                SearchConfig::default(),
            )))
            .synthesizer(Arc::new(Synthesizer::new(Some(
                synth_model.clone() as Arc<dyn CompletionModel>
            ))))
            .social(Arc::new(SocialSignalFetcher::new(Some(
                social_model.clone() as Arc<dyn CompletionModel>
            ))))
            .history(Arc::new(HistoryStore::new(dir.path().join("history.json"))))
            .build();

        Harness {
            verifier,
            synth_model,
            social_model,
            _dir: dir,
        }
    }

    fn topic() -> Topic {
        Topic::new("Dubai storm").unwrap()
    }

    #[tokio::test]
    async fn completed_run_is_persisted() {
        let reply = report_text("85%", &["Fact one", "Fact two"], &["Rumor one"], "All good.");
        let h = harness(
            MockSearcher::new().on_recent(evidence(4)),
            &reply,
            r#"{"x_summary":"Videos trend.","viral_rumors":[],"sources":[]}"#,
        );

        let RunOutcome::Completed(run) = h.verifier.run(&topic()).await else {
            panic!("expected completed run");
        };

        assert_eq!(run.confidence, Confidence::Score(85));
        assert_eq!(run.level, ConfidenceLevel::High);
        assert_eq!(run.report.key_findings, vec!["Fact one", "Fact two"]);
        assert_eq!(run.sources.len(), 4);
        assert!(!run.social.is_error());
        assert!(run.persisted);

        let saved = h.verifier.history.load_all();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].topic, "Dubai storm");
        assert_eq!(saved[0].confidence_score, Confidence::Score(85));
        assert_eq!(saved[0].report_html, run.report_html);
        assert_eq!(saved[0].x_intel_data.as_ref(), Some(&run.social));

        assert_eq!(h.synth_model.calls().len(), 1);
        assert_eq!(h.social_model.calls().len(), 1);
    }

    #[tokio::test]
    async fn no_evidence_skips_everything_else() {
        let h = harness(MockSearcher::new(), "unused", "unused");

        assert!(matches!(h.verifier.run(&topic()).await, RunOutcome::NoEvidence));
        assert!(h.synth_model.calls().is_empty());
        assert!(h.social_model.calls().is_empty());
        assert!(h.verifier.history.load_all().is_empty());
    }

    #[tokio::test]
    async fn search_failure_is_no_evidence() {
        let h = harness(MockSearcher::new().failing(), "unused", "unused");
        assert!(matches!(h.verifier.run(&topic()).await, RunOutcome::NoEvidence));
    }

    #[tokio::test]
    async fn missing_search_key_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let verifier = Verifier::from_config(&Config::offline(dir.path().join("h.json")));

        match verifier.run(&topic()).await {
            RunOutcome::Unavailable { reason } => {
                assert_eq!(reason, "TAVILY_API_KEY not configured")
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert!(verifier.history.load_all().is_empty());
    }

    #[tokio::test]
    async fn missing_synthesis_key_is_unavailable() {
        let mut h = harness(MockSearcher::new().on_recent(evidence(3)), "unused", "unused");
        h.verifier.synthesizer = Arc::new(Synthesizer::new(None));

        match h.verifier.run(&topic()).await {
            RunOutcome::Unavailable { reason } => {
                assert_eq!(reason, "GEMINI_API_KEY not configured")
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert!(h.social_model.calls().is_empty());
        assert!(h.verifier.history.load_all().is_empty());
    }

    #[tokio::test]
    async fn missing_social_key_still_completes() {
        let mut h = harness(
            MockSearcher::new().on_recent(evidence(3)),
            &report_text("80", &["f"], &[], "s"),
            "unused",
        );
        h.verifier.social = Arc::new(SocialSignalFetcher::new(None));

        let RunOutcome::Completed(run) = h.verifier.run(&topic()).await else {
            panic!("expected completed run");
        };
        assert_eq!(run.social, SocialSignal::error("XAI_API_KEY not configured"));
        assert!(run.persisted);
    }

    #[tokio::test]
    async fn malformed_outputs_still_complete() {
        let h = harness(
            MockSearcher::new().on_recent(evidence(3)),
            "I could not produce a report.",
            "no json here",
        );

        let RunOutcome::Completed(run) = h.verifier.run(&topic()).await else {
            panic!("expected completed run");
        };
        assert_eq!(run.confidence, Confidence::default());
        assert_eq!(run.level, ConfidenceLevel::Low);
        assert!(run.social.is_error());
        assert!(run.persisted);
        assert_eq!(
            h.verifier.history.load_all()[0].confidence_score,
            Confidence::Unscored("N/A".into())
        );
    }

    #[tokio::test]
    async fn persist_failure_does_not_fail_run() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let mut h = harness(
            MockSearcher::new().on_recent(evidence(3)),
            &report_text("50", &["f"], &[], "s"),
            r#"{"x_summary":"s"}"#,
        );
        h.verifier.history = Arc::new(HistoryStore::new(blocker.join("history.json")));

        let RunOutcome::Completed(run) = h.verifier.run(&topic()).await else {
            panic!("expected completed run");
        };
        assert!(!run.persisted);
        assert!(run.persist_error.is_some());
        assert_eq!(run.confidence, Confidence::Score(50));
    }

    #[tokio::test]
    async fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(RunOutcome::NoEvidence).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_evidence"}));

        let h = harness(
            MockSearcher::new().on_recent(evidence(3)),
            &report_text("70", &["f"], &[], "s"),
            r#"{"x_summary":"s"}"#,
        );
        let json = serde_json::to_value(h.verifier.run(&topic()).await).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["confidence"], 70);
        assert_eq!(json["level"], "high");
        assert_eq!(json["persisted"], true);
        assert!(json.get("persist_error").is_none());
    }
}
