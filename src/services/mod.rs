pub mod anomalies;
pub mod indicators;
pub mod normalize;
pub mod pipeline;

pub use anomalies::{add_anomalies, AnomalyConfig};
pub use indicators::{add_indicators, IndicatorConfig};
pub use normalize::normalize;
pub use pipeline::{run_table, PipelineService};
