use chrono::Utc;

use super::{FlightKey, Orchestrator, Outcome};
use crate::error::{Precondition, SyncError};
use crate::model::{CollectionCounts, Freshness};
use crate::service_api::{CollectionReport, SyncBackend};

impl<B: SyncBackend> Orchestrator<B> {
    /// Have the remote service collect all orders of the import range and
    /// aggregate them into daily totals.
    ///
    /// Safe to repeat: the service recomputes from scratch and the counts
    /// here are replaced, never added up.
    pub async fn run_collection(&self) -> Outcome {
        let range = self.import.borrow().status.range;
        let action = format!(
            "Collecting orders {}..{}",
            range.first_day, range.last_day
        );
        let Some(_token) = self.in_flight.begin(FlightKey::HistoricalImport) else {
            return self.failed(&action, SyncError::InFlight(FlightKey::HistoricalImport));
        };

        log::info!("{action}...");
        self.import.borrow_mut().freshness = Freshness::InFlight;
        let result = self
            .call(self.backend().run_collection())
            .await
            .and_then(|report| validate_report(report, range.num_days()));

        let mut import = self.import.borrow_mut();
        match result {
            Ok(report) => {
                let counts = CollectionCounts {
                    days_total: report.days_total,
                    days_with_revenue: report.days_with_revenue,
                    days_without_revenue: report.days_without_revenue,
                };
                let run_at = report.last_run.unwrap_or_else(Utc::now);
                import.status = import.status.with_collection(counts, run_at);
                import.freshness = Freshness::Fresh;
                log::info!(
                    "{action}...done, {} days with revenue, {} without",
                    counts.days_with_revenue,
                    counts.days_without_revenue
                );
                Outcome::Applied
            }
            Err(err) => {
                import.freshness = Freshness::StaleAfterError(err.clone());
                drop(import);
                self.failed(&action, err)
            }
        }
    }

    /// Post the collected daily totals to the ledger. Refused until a
    /// collection has run in this session.
    pub async fn send_to_ledger(&self) -> Outcome {
        let action = "Sending historical postings to the ledger";
        if !self.import.borrow().status.has_run {
            return self.failed(action, Precondition::CollectionNotRun.into());
        }
        let Some(_token) = self.in_flight.begin(FlightKey::HistoricalImport) else {
            return self.failed(action, SyncError::InFlight(FlightKey::HistoricalImport));
        };

        log::info!("{action}...");
        self.import.borrow_mut().freshness = Freshness::InFlight;
        let result = self
            .call_acknowledged(self.backend().send_postings())
            .await;

        let mut import = self.import.borrow_mut();
        match result {
            Ok(()) => {
                import.status = import.status.with_sent(Utc::now());
                import.freshness = Freshness::Fresh;
                log::info!("{action}...done");
                Outcome::Applied
            }
            Err(err) => {
                import.freshness = Freshness::StaleAfterError(err.clone());
                drop(import);
                self.failed(action, err)
            }
        }
    }
}

fn validate_report(
    report: CollectionReport,
    expected_days: u32,
) -> Result<CollectionReport, SyncError> {
    if report.days_total != expected_days {
        return Err(SyncError::Rejected(format!(
            "Collection covered {} days, expected {expected_days}",
            report.days_total
        )));
    }
    let counts = CollectionCounts {
        days_total: report.days_total,
        days_with_revenue: report.days_with_revenue,
        days_without_revenue: report.days_without_revenue,
    };
    if !counts.is_consistent() {
        return Err(SyncError::Rejected(format!(
            "Collection reported {} days with and {} days without revenue out of {}",
            report.days_with_revenue, report.days_without_revenue, report.days_total
        )));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::{Precondition, SyncError};
    use crate::service_api::{Ack, CollectionReport, ServiceError};
    use crate::sync::testutils::{FakeBackend, RemoteCall};
    use crate::sync::{FlightKey, Orchestrator, Outcome};

    fn orchestrator(backend: FakeBackend) -> Orchestrator<FakeBackend> {
        Orchestrator::new(backend, Duration::from_secs(30), true)
    }

    fn report(total: u32, with: u32, without: u32) -> CollectionReport {
        CollectionReport {
            days_total: total,
            days_with_revenue: with,
            days_without_revenue: without,
            last_run: None,
        }
    }

    #[tokio::test]
    async fn collection_fills_in_counts() {
        let orchestrator = orchestrator(FakeBackend::new());
        assert!(!orchestrator.import_status().has_run);

        assert_eq!(Outcome::Applied, orchestrator.run_collection().await);

        let status = orchestrator.import_status();
        assert!(status.has_run);
        assert_eq!(365, status.counts.days_total);
        assert_eq!(241, status.counts.days_with_revenue);
        assert_eq!(124, status.counts.days_without_revenue);
        assert!(status.counts.is_complete());
        assert!(status.last_run_at.is_some());
        assert_eq!(None, status.last_sent_at);
    }

    #[tokio::test]
    async fn repeated_collection_replaces_counts() {
        let orchestrator = orchestrator(FakeBackend::new());
        for (with, without) in [(241, 124), (200, 100), (241, 124), (0, 365)] {
            orchestrator
                .backend()
                .set_collection_reply(Ok(report(365, with, without)));
            assert!(orchestrator.run_collection().await.is_applied());

            let counts = orchestrator.import_status().counts;
            assert_eq!(365, counts.days_total);
            assert_eq!(with, counts.days_with_revenue);
            assert_eq!(without, counts.days_without_revenue);
            assert!(counts.is_consistent());
        }
        assert_eq!(
            4,
            orchestrator
                .backend()
                .count(|call| *call == RemoteCall::RunCollection)
        );
    }

    #[tokio::test]
    async fn inconsistent_report_is_rejected() {
        let orchestrator = orchestrator(FakeBackend::new());
        let _ = orchestrator.run_collection().await;
        let before = orchestrator.import_status();

        for bad in [report(365, 300, 124), report(366, 241, 125)] {
            orchestrator.backend().set_collection_reply(Ok(bad));
            let outcome = orchestrator.run_collection().await;
            assert!(matches!(outcome, Outcome::Failed(SyncError::Rejected(_))));
            assert_eq!(before, orchestrator.import_status());
        }
    }

    #[tokio::test]
    async fn failed_collection_keeps_prior_state() {
        let backend = FakeBackend::new();
        backend.set_collection_reply(Err(ServiceError::Transport("offline".to_string())));
        let orchestrator = orchestrator(backend);

        let outcome = orchestrator.run_collection().await;
        assert!(outcome.error().is_some());
        let status = orchestrator.import_status();
        assert!(!status.has_run);
        assert_eq!(0, status.counts.days_with_revenue);
        assert!(orchestrator.snapshot().import_freshness.error().is_some());
    }

    #[tokio::test]
    async fn sending_before_collection_is_refused() {
        let orchestrator = orchestrator(FakeBackend::new());
        assert_eq!(
            Outcome::Failed(Precondition::CollectionNotRun.into()),
            orchestrator.send_to_ledger().await
        );
        assert!(orchestrator.backend().calls().is_empty());
        assert_eq!(None, orchestrator.import_status().last_sent_at);
    }

    #[tokio::test]
    async fn sending_after_collection() {
        let orchestrator = orchestrator(FakeBackend::new());
        let _ = orchestrator.run_collection().await;
        let collected = orchestrator.import_status();

        assert_eq!(Outcome::Applied, orchestrator.send_to_ledger().await);

        let status = orchestrator.import_status();
        assert!(status.last_sent_at.is_some());
        assert_eq!(collected.counts, status.counts);
        assert_eq!(collected.last_run_at, status.last_run_at);
    }

    #[tokio::test]
    async fn rerun_keeps_last_sent() {
        let orchestrator = orchestrator(FakeBackend::new());
        let _ = orchestrator.run_collection().await;
        let _ = orchestrator.send_to_ledger().await;
        let sent_at = orchestrator.import_status().last_sent_at;

        assert!(orchestrator.run_collection().await.is_applied());
        assert_eq!(sent_at, orchestrator.import_status().last_sent_at);
    }

    #[tokio::test]
    async fn refused_sending_keeps_prior_state() {
        let orchestrator = orchestrator(FakeBackend::new());
        let _ = orchestrator.run_collection().await;
        orchestrator.backend().set_postings_reply(Ok(Ack::refused()));

        let outcome = orchestrator.send_to_ledger().await;
        assert!(matches!(outcome, Outcome::Failed(SyncError::Rejected(_))));
        assert_eq!(None, orchestrator.import_status().last_sent_at);
    }

    #[tokio::test(start_paused = true)]
    async fn sending_while_collecting_is_suppressed() {
        let orchestrator = orchestrator(FakeBackend::new());
        let _ = orchestrator.run_collection().await;
        orchestrator
            .backend()
            .set_collection_delay(Duration::from_millis(100));

        let send_soon = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            orchestrator.send_to_ledger().await
        };
        let (collected, sent) = futures::join!(orchestrator.run_collection(), send_soon);
        assert_eq!(Outcome::Applied, collected);
        assert_eq!(
            Outcome::Failed(SyncError::InFlight(FlightKey::HistoricalImport)),
            sent
        );
    }
}
