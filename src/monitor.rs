use futures::{Stream, StreamExt as _};
use log::{debug, error, info, warn};

use crate::config::Settings;
use crate::observation::{MalformedObservation, SignalObservation};
use crate::source::Packet;
use crate::triggers::{self, Action};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub processed: u64,
    pub dropped: u64,
    pub alerts: u64,
    pub activity: u64,
    pub suppressed: u64,
    pub ignored: u64,
}

pub struct Monitor {
    settings: Settings,
    stats: RunStats,
}

impl Monitor {
    pub fn new(settings: Settings) -> Self {
        Monitor {
            settings,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Runs one packet through parse, classify and evaluate, logging the
    /// outcome. A malformed packet is logged and counted as dropped here, so
    /// callers may ignore the returned error.
    pub fn process(&mut self, packet: Packet) -> Result<Action, MalformedObservation> {
        self.stats.processed += 1;

        let observation = match packet.and_then(|record| SignalObservation::from_record(&record)) {
            Ok(observation) => observation,
            Err(err) => {
                error!("Packet parsing error: {}", err);
                self.stats.dropped += 1;
                return Err(err);
            }
        };

        let category = self.settings.thresholds.classify(observation.signal_strength);
        let action = triggers::evaluate(&self.settings.watch_list, &observation, category);

        match &action {
            Action::Alert(report) => {
                self.stats.alerts += 1;
                warn!("TARGET DETECTED! {}", report);
            }
            Action::Activity {
                report,
                probed_network_name,
            } => {
                self.stats.activity += 1;
                info!("Active User: {} | Probing: {}", report, probed_network_name);
            }
            Action::Suppressed => {
                self.stats.suppressed += 1;
                debug!(
                    "Suppressed {} at {}dBm",
                    observation.device_id, observation.signal_strength
                );
            }
            Action::None => {
                self.stats.ignored += 1;
                debug!("No action for {} ({})", observation.device_id, category);
            }
        }

        Ok(action)
    }

    /// Drains `packets` one at a time until the stream ends.
    pub async fn run<S>(mut self, packets: S) -> RunStats
    where
        S: Stream<Item = Packet>,
    {
        let mut packets = std::pin::pin!(packets);
        while let Some(packet) = packets.next().await {
            // Errors were already logged and counted.
            let _ = self.process(packet);
        }

        let stats = self.stats();
        info!(
            "Processed {} packets: {} alerts, {} activity, {} suppressed, {} ignored, {} dropped",
            stats.processed,
            stats.alerts,
            stats.activity,
            stats.suppressed,
            stats.ignored,
            stats.dropped
        );
        stats
    }
}
