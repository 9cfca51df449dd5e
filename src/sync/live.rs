use super::{FlightKey, Orchestrator, Outcome};
use crate::error::SyncError;
use crate::model::Freshness;
use crate::service_api::SyncBackend;

impl<B: SyncBackend> Orchestrator<B> {
    /// Flip live mode. The new value shows right away, and is rolled back if
    /// the remote service doesn't acknowledge it.
    pub async fn toggle_live_mode(&self) -> Outcome {
        let action = "Switching live mode";
        let Some(_token) = self.in_flight.begin(FlightKey::LiveMode) else {
            return self.failed(action, SyncError::InFlight(FlightKey::LiveMode));
        };

        let requested = {
            let mut live = self.live.borrow_mut();
            live.enabled = !live.enabled;
            live.freshness = Freshness::InFlight;
            live.enabled
        };
        log::info!("{action} {}...", if requested { "on" } else { "off" });

        let result = self
            .call_acknowledged(self.backend().set_live_mode(requested))
            .await;

        let mut live = self.live.borrow_mut();
        match result {
            Ok(()) => {
                live.freshness = Freshness::Fresh;
                log::info!("{action}...done");
                Outcome::Applied
            }
            Err(err) => {
                live.enabled = !requested;
                live.freshness = Freshness::StaleAfterError(err.clone());
                drop(live);
                self.failed(action, err)
            }
        }
    }
}
