use std::fmt;

/// Distance from the detecting AP, derived from RSSI alone.
///
/// Variants are declared weakest first, so `Ord` follows signal strength:
/// `Noise < Far < Near < Immediate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProximityCategory {
    Noise,
    Far,
    Near,
    Immediate,
}

impl fmt::Display for ProximityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProximityCategory::Immediate => "IMMEDIATE (< 2m)",
            ProximityCategory::Near => "NEAR (2m - 10m)",
            ProximityCategory::Far => "FAR (> 10m)",
            ProximityCategory::Noise => "NOISE (Weak signal - Ignore)",
        };
        f.write_str(label)
    }
}

/// Lower bounds (inclusive, dBm) of each category above `Noise`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub immediate: i32,
    pub near: i32,
    pub far: i32,
}

impl Thresholds {
    pub const DEFAULT_IMMEDIATE: i32 = -45;
    pub const DEFAULT_NEAR: i32 = -65;
    pub const DEFAULT_FAR: i32 = -75;

    pub fn classify(&self, signal_strength: i32) -> ProximityCategory {
        // Checked strongest first; the first bound met wins.
        if signal_strength >= self.immediate {
            ProximityCategory::Immediate
        } else if signal_strength >= self.near {
            ProximityCategory::Near
        } else if signal_strength >= self.far {
            ProximityCategory::Far
        } else {
            ProximityCategory::Noise
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            immediate: Self::DEFAULT_IMMEDIATE,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }
}
