/// Biometric context shown on the dashboard and fed into workout prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub sleep_quality: String,
    pub heart_rate: String,
    pub stress_level: String,
}

/// Simulated readings, constant for the session
#[derive(Debug, Clone)]
pub struct MetricStore {
    snapshot: MetricSnapshot,
}

impl MetricStore {
    pub fn new() -> Self {
        Self {
            snapshot: MetricSnapshot {
                sleep_quality: "Poor (4.5h)".to_string(),
                heart_rate: "78 BPM (Elevated)".to_string(),
                stress_level: "High".to_string(),
            },
        }
    }

    pub fn get(&self) -> MetricSnapshot {
        self.snapshot.clone()
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_stable() {
        let store = MetricStore::new();
        assert_eq!(store.get(), store.get());
        assert_eq!(store.get().stress_level, "High");
    }
}
