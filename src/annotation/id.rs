use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique annotation identifier (`annotation_<millis>_<suffix>`).
///
/// The suffix starts with a per-process sequence number, so two ids minted in
/// the same millisecond still differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn generate(timestamp_ms: i64) -> Self {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let mut rng = rand::thread_rng();
        let random: String = (0..6)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!(
            "annotation_{}_{}{}",
            timestamp_ms,
            to_base36(sequence),
            random
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_within_same_millisecond() {
        let ids: HashSet<AnnotationId> = (0..1000).map(|_| AnnotationId::generate(42)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_id_format() {
        let id = AnnotationId::generate(1_700_000_000_000);
        assert!(id.as_str().starts_with("annotation_1700000000000_"));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
