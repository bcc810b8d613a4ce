use serde::Serialize;
use std::time::Duration;

/// Per-operation evaluation metrics, recorded after the operation finished
/// successfully.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationProfile {
    pub leaf_evaluations: u64,
    pub bindings_evaluated: u64,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
}

/// Receives one [`EvaluationProfile`] per successful operation.
pub trait ProfileSink: Send + Sync {
    fn record(&self, profile: EvaluationProfile);
}

fn serialize_elapsed<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u128(elapsed.as_micros())
}
