use serde::{Deserialize, Serialize};

/// Sampling temperature presets offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
    Low,
    Medium,
    High,
}

impl Temperature {
    pub const ALL: [Temperature; 3] = [Temperature::Low, Temperature::Medium, Temperature::High];

    pub fn value(self) -> f64 {
        match self {
            Temperature::Low => 0.2,
            Temperature::Medium => 0.7,
            Temperature::High => 1.0,
        }
    }

    /// Preset values in ascending order
    pub fn values() -> Vec<f64> {
        Self::ALL.iter().map(|t| t.value()).collect()
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Temperature::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_medium() {
        assert_eq!(Temperature::default().value(), 0.7);
    }

    #[test]
    fn test_values_ascending() {
        let values = Temperature::values();
        assert_eq!(values, vec![0.2, 0.7, 1.0]);
    }
}
