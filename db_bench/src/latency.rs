// Serializable latency summary
// 可序列化的延迟摘要

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Histogram;

/// Latency stats snapshot in microseconds
/// 延迟统计快照（微秒）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
  pub count: u64,
  pub avg: f64,
  pub std_dev: f64,
  pub min: f64,
  pub max: f64,
  pub p50: f64,
  pub p90: f64,
  pub p99: f64,
  pub p999: f64,
}

impl From<&Histogram> for LatencyStats {
  fn from(h: &Histogram) -> Self {
    Self {
      count: h.count(),
      avg: h.average(),
      std_dev: h.std_dev(),
      min: h.min(),
      max: h.max(),
      p50: h.median(),
      p90: h.percentile(90.),
      p99: h.percentile(99.),
      p999: h.percentile(99.9),
    }
  }
}

impl fmt::Display for LatencyStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "Count: {} Average: {:.4} StdDev: {:.2}",
      self.count, self.avg, self.std_dev
    )?;
    writeln!(
      f,
      "Min: {:.4} Max: {:.4} P50: {:.4} P90: {:.4} P99: {:.4} P99.9: {:.4}",
      self.min, self.max, self.p50, self.p90, self.p99, self.p999
    )
  }
}
