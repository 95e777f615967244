use serde_json::Value;

/// Reported when a record carries no usable `rssi`.
pub const MISSING_RSSI_DBM: i32 = -100;

pub const MISSING_SSID: &str = "N/A";

#[derive(Debug, thiserror::Error)]
pub enum MalformedObservation {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },
}

/// One packet's worth of telemetry, validated at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalObservation {
    pub device_id: String,
    pub signal_strength: i32,
    pub detecting_node_id: String,
    pub probed_network_name: String,
}

impl SignalObservation {
    /// Builds an observation from a raw `{deviceMac, rssi, apMac, ssid}` record.
    ///
    /// `rssi` falls back to [`MISSING_RSSI_DBM`] and `ssid` to [`MISSING_SSID`]
    /// when absent. Both MAC fields are required. `ssid` is informational and
    /// never fails the record; non-string values are kept in their JSON form.
    pub fn from_record(record: &Value) -> Result<Self, MalformedObservation> {
        let fields = record
            .as_object()
            .ok_or(MalformedObservation::NotAnObject)?;

        let device_id = required_string(fields.get("deviceMac"), "deviceMac")?;
        let detecting_node_id = required_string(fields.get("apMac"), "apMac")?;

        let signal_strength = match fields.get("rssi") {
            None => MISSING_RSSI_DBM,
            Some(value) => coerce_rssi(value)?,
        };

        let probed_network_name = match fields.get("ssid") {
            None | Some(Value::Null) => MISSING_SSID.to_string(),
            Some(Value::String(ssid)) => ssid.clone(),
            Some(other) => other.to_string(),
        };

        Ok(SignalObservation {
            device_id,
            signal_strength,
            detecting_node_id,
            probed_network_name,
        })
    }
}

fn required_string(
    value: Option<&Value>,
    field: &'static str,
) -> Result<String, MalformedObservation> {
    match value {
        None | Some(Value::Null) => Err(MalformedObservation::MissingField { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(MalformedObservation::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

/// Integers pass through, floats truncate toward zero and numeric strings are
/// parsed. Anything else, or anything outside `i32`, is rejected.
fn coerce_rssi(value: &Value) -> Result<i32, MalformedObservation> {
    let invalid = |reason: String| MalformedObservation::InvalidField {
        field: "rssi",
        reason,
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map_err(|_| invalid(format!("{i} is out of range")))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                let truncated = f.trunc();
                if truncated.is_finite()
                    && truncated >= f64::from(i32::MIN)
                    && truncated <= f64::from(i32::MAX)
                {
                    Ok(truncated as i32)
                } else {
                    Err(invalid(format!("{n} is out of range")))
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|e| invalid(format!("{s:?} is not an integer: {e}"))),
        other => Err(invalid(format!("expected an integer, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let record = json!({
            "deviceMac": "AA:BB:CC:DD:EE:FF",
            "rssi": -60,
            "apMac": "AP_Lobby_01",
            "ssid": "CorpNet"
        });
        let obs = SignalObservation::from_record(&record).unwrap();
        assert_eq!(obs.device_id, "AA:BB:CC:DD:EE:FF");
        assert_eq!(obs.signal_strength, -60);
        assert_eq!(obs.detecting_node_id, "AP_Lobby_01");
        assert_eq!(obs.probed_network_name, "CorpNet");
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let record = json!({"deviceMac": "11:22:33:44:55:66", "apMac": "AP_1"});
        let obs = SignalObservation::from_record(&record).unwrap();
        assert_eq!(obs.signal_strength, MISSING_RSSI_DBM);
        assert_eq!(obs.probed_network_name, MISSING_SSID);

        let record = json!({"deviceMac": "11:22:33:44:55:66", "apMac": "AP_1", "ssid": null});
        let obs = SignalObservation::from_record(&record).unwrap();
        assert_eq!(obs.probed_network_name, "N/A");
    }

    #[test]
    fn test_rssi_coercion() {
        let parse = |rssi: Value| {
            SignalObservation::from_record(&json!({
                "deviceMac": "m", "apMac": "a", "rssi": rssi
            }))
        };
        assert_eq!(parse(json!("-72")).unwrap().signal_strength, -72);
        assert_eq!(parse(json!(" -5 ")).unwrap().signal_strength, -5);
        assert_eq!(parse(json!(-60.9)).unwrap().signal_strength, -60);
        assert_eq!(parse(json!(12)).unwrap().signal_strength, 12);

        for bad in [
            json!(null),
            json!(true),
            json!("strong"),
            json!("-60.5"),
            json!([-60]),
            json!(1e12),
            json!(i64::MAX),
            json!(u64::MAX),
        ] {
            assert!(
                matches!(
                    parse(bad.clone()),
                    Err(MalformedObservation::InvalidField { field: "rssi", .. })
                ),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_required_fields() {
        let err = SignalObservation::from_record(&json!({"rssi": -40, "apMac": "a"})).unwrap_err();
        assert!(matches!(
            err,
            MalformedObservation::MissingField { field: "deviceMac" }
        ));

        let err = SignalObservation::from_record(&json!({"deviceMac": "m", "apMac": null}))
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedObservation::MissingField { field: "apMac" }
        ));

        let err = SignalObservation::from_record(&json!({"deviceMac": 42, "apMac": "a"}))
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedObservation::InvalidField { field: "deviceMac", .. }
        ));
    }

    #[test]
    fn test_non_string_ssid_is_kept() {
        let obs = SignalObservation::from_record(
            &json!({"deviceMac": "m", "apMac": "a", "rssi": -40, "ssid": 7}),
        )
        .unwrap();
        assert_eq!(obs.signal_strength, -40);
        assert_eq!(obs.probed_network_name, "7");

        let obs = SignalObservation::from_record(
            &json!({"deviceMac": "m", "apMac": "a", "ssid": ["Guest", "CorpNet"]}),
        )
        .unwrap();
        assert_eq!(obs.probed_network_name, r#"["Guest","CorpNet"]"#);
    }

    #[test]
    fn test_non_object() {
        for record in [json!([1, 2, 3]), json!("AA:BB"), json!(null)] {
            assert!(matches!(
                SignalObservation::from_record(&record),
                Err(MalformedObservation::NotAnObject)
            ));
        }
    }
}
