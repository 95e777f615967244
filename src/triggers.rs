use std::collections::HashSet;
use std::fmt;

use crate::classifier::ProximityCategory;
use crate::observation::SignalObservation;

/// Device identifiers that raise an alert whenever they are heard above the
/// noise floor. Matching is exact, case-sensitive string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    devices: HashSet<String>,
}

impl WatchList {
    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for WatchList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        WatchList {
            devices: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// The fields shared by every actionable outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    pub device_id: String,
    pub signal_strength: i32,
    pub category: ProximityCategory,
    pub detecting_node_id: String,
}

impl DetectionReport {
    fn new(observation: &SignalObservation, category: ProximityCategory) -> Self {
        DetectionReport {
            device_id: observation.device_id.clone(),
            signal_strength: observation.signal_strength,
            category,
            detecting_node_id: observation.detecting_node_id.clone(),
        }
    }
}

impl fmt::Display for DetectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device: {} | Signal: {}dBm | Status: {} | AP: {}",
            self.device_id, self.signal_strength, self.category, self.detecting_node_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Below the noise floor; dropped before any other rule runs.
    Suppressed,
    /// A watch-listed device was heard.
    Alert(DetectionReport),
    /// An unlisted device is right next to the AP.
    Activity {
        report: DetectionReport,
        probed_network_name: String,
    },
    /// Classified, but nothing to act on.
    None,
}

/// Decides what, if anything, an observation should trigger.
///
/// Rules apply in order: noise is suppressed, then watch-list members alert,
/// then unlisted devices at `Immediate` range are logged as activity. A
/// watch-listed device at noise level is suppressed like any other.
pub fn evaluate(
    watch_list: &WatchList,
    observation: &SignalObservation,
    category: ProximityCategory,
) -> Action {
    if category == ProximityCategory::Noise {
        return Action::Suppressed;
    }

    if watch_list.contains(&observation.device_id) {
        Action::Alert(DetectionReport::new(observation, category))
    } else if category == ProximityCategory::Immediate {
        Action::Activity {
            report: DetectionReport::new(observation, category),
            probed_network_name: observation.probed_network_name.clone(),
        }
    } else {
        Action::None
    }
}
