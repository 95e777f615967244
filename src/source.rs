//! Packet sources feeding the monitor: a synthetic generator standing in for a
//! live location feed, and an NDJSON reader for captured or piped telemetry.

use std::time::Duration;

use futures::{Stream, StreamExt as _, stream};
use log::{debug, error};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom as _;
use rand::{Rng as _, SeedableRng as _};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _};

use crate::observation::MalformedObservation;

/// A raw record as received, or the reason it could not be decoded.
pub type Packet = Result<Value, MalformedObservation>;

/// The three devices of the demo floor: a passer-by, a watch-listed phone
/// walking closer, and a watch-listed tag sitting under the library AP.
pub fn default_templates() -> Vec<Value> {
    vec![
        json!({"deviceMac": "11:22:33:44:55:66", "rssi": -85, "apMac": "AP_Lobby_01", "ssid": "FreeWiFi"}),
        json!({"deviceMac": "AA:BB:CC:DD:EE:FF", "rssi": -60, "apMac": "AP_Lobby_01", "ssid": "CorpNet"}),
        json!({"deviceMac": "00:11:22:33:44:55", "rssi": -40, "apMac": "AP_Library_Desk", "ssid": "Library_Guest"}),
    ]
}

/// Endless draw of template records with uniform RSSI jitter.
///
/// Jitter is applied to a fresh copy on every draw, so readings never drift.
pub struct MockFeed {
    templates: Vec<Value>,
    jitter_db: i64,
    rng: StdRng,
}

impl MockFeed {
    pub fn new(templates: Vec<Value>, jitter_db: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        MockFeed {
            templates,
            jitter_db: i64::from(jitter_db),
            rng,
        }
    }
}

impl Iterator for MockFeed {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let mut packet = self.templates.choose(&mut self.rng)?.clone();
        let jitter = self.rng.random_range(-self.jitter_db..=self.jitter_db);
        if let Some(rssi) = packet.get_mut("rssi") {
            if let Some(base) = rssi.as_i64() {
                *rssi = Value::from(base + jitter);
            }
        }
        Some(packet)
    }
}

/// Reads one JSON record per line until EOF. Blank lines are skipped; lines
/// that are not JSON come through as [`MalformedObservation::InvalidJson`].
pub fn ndjson<R>(reader: R) -> impl Stream<Item = Packet>
where
    R: AsyncBufRead + Unpin,
{
    stream::unfold(reader.lines(), |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    let packet = serde_json::from_str(&line).map_err(MalformedObservation::from);
                    return Some((packet, lines));
                }
                Ok(None) => {
                    debug!("Input stream closed");
                    return None;
                }
                Err(err) => {
                    error!("Error reading input: {:?}", err);
                    return None;
                }
            }
        }
    })
}

/// Spaces items `period` apart. The first item is yielded immediately and
/// the stream ends as soon as the inner one does.
pub fn paced<S>(packets: S, period: Duration) -> impl Stream<Item = S::Item>
where
    S: Stream,
{
    stream::unfold((Box::pin(packets), true), move |(mut packets, first)| async move {
        let item = packets.next().await?;
        if !first && !period.is_zero() {
            tokio::time::sleep(period).await;
        }
        Some((item, (packets, false)))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use futures::StreamExt as _;

    use super::*;

    #[test]
    fn test_mock_feed_jitter_stays_in_bounds() {
        let templates = default_templates();
        let feed = MockFeed::new(templates.clone(), 3, Some(42));
        let mut seen = HashSet::new();
        for packet in feed.take(500) {
            let template = templates
                .iter()
                .find(|t| t["deviceMac"] == packet["deviceMac"])
                .unwrap();
            let delta = packet["rssi"].as_i64().unwrap() - template["rssi"].as_i64().unwrap();
            assert!((-3..=3).contains(&delta), "jitter {delta} out of range");
            assert_eq!(packet["apMac"], template["apMac"]);
            seen.insert(packet["deviceMac"].as_str().unwrap().to_string());
        }
        assert_eq!(seen.len(), templates.len());
    }

    #[test]
    fn test_mock_feed_is_reproducible_with_seed() {
        let a: Vec<Value> = MockFeed::new(default_templates(), 3, Some(9)).take(20).collect();
        let b: Vec<Value> = MockFeed::new(default_templates(), 3, Some(9)).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_mock_feed_without_jitter_or_templates() {
        let templates = default_templates();
        for packet in MockFeed::new(templates.clone(), 0, Some(1)).take(30) {
            assert!(templates.contains(&packet));
        }
        assert!(MockFeed::new(Vec::new(), 3, Some(1)).next().is_none());
    }

    #[tokio::test]
    async fn test_ndjson_lines() {
        let input: &[u8] = b"{\"deviceMac\": \"a\", \"rssi\": -40}\n\n   \nnot json\n{\"apMac\": \"b\"}";
        let packets: Vec<Packet> = ndjson(input).collect().await;
        assert_eq!(packets.len(), 3);
        assert_eq!(packets[0].as_ref().unwrap()["rssi"], -40);
        assert!(matches!(
            packets[1],
            Err(MalformedObservation::InvalidJson { .. })
        ));
        assert_eq!(packets[2].as_ref().unwrap()["apMac"], "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_spacing() {
        let start = tokio::time::Instant::now();
        let items: Vec<i32> = paced(stream::iter(vec![1, 2, 3]), Duration::from_millis(1500))
            .collect()
            .await;
        assert_eq!(items, vec![1, 2, 3]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(3100), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_ends_without_trailing_delay() {
        let start = tokio::time::Instant::now();
        let items: Vec<i32> = paced(stream::iter(vec![1]), Duration::from_millis(1500))
            .collect()
            .await;
        assert_eq!(items, vec![1]);
        assert!(start.elapsed() < Duration::from_millis(100), "{:?}", start.elapsed());

        let empty: Vec<i32> = paced(stream::iter(Vec::<i32>::new()), Duration::from_millis(1500))
            .collect()
            .await;
        assert!(empty.is_empty());
        assert!(start.elapsed() < Duration::from_millis(100), "{:?}", start.elapsed());
    }
}
