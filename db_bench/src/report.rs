// Per-workload benchmark report
// 单个工作负载的基准测试报告

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LatencyStats;

/// Merged result of one workload
/// 单个工作负载合并后的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
  /// Workload name / 工作负载名称
  pub name: String,
  /// Summed worker time per op (micros) / 每操作的累计工作线程耗时（微秒）
  pub micros_per_op: f64,
  /// Wall-clock throughput, present when bytes were touched / 吞吐量，有字节数时存在
  pub mb_per_sec: Option<f64>,
  pub ops: u64,
  pub bytes: i64,
  pub msg: String,
  /// Present when latency tracking is enabled / 开启延迟统计时存在
  pub latency: Option<LatencyStats>,
}

impl Report {
  /// Text after "micros/op;" / "micros/op;" 之后的文本
  pub fn extra(&self) -> String {
    let mut extra = String::new();
    if let Some(mb) = self.mb_per_sec {
      extra = format!("{mb:6.1} MB/s");
    }
    append_with_space(&mut extra, &self.msg);
    extra
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let extra = self.extra();
    writeln!(
      f,
      "{:<12} : {:11.3} micros/op;{}{}",
      self.name,
      self.micros_per_op,
      if extra.is_empty() { "" } else { " " },
      extra
    )?;
    if let Some(latency) = &self.latency {
      writeln!(f, "Microseconds per op:")?;
      write!(f, "{latency}")?;
    }
    Ok(())
  }
}

/// Append `msg` separated by one space, no-op on empty input
/// 以单个空格分隔追加 `msg`，输入为空时不做任何事
pub fn append_with_space(s: &mut String, msg: &str) {
  if msg.is_empty() {
    return;
  }
  if !s.is_empty() {
    s.push(' ');
  }
  s.push_str(msg);
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report(mb_per_sec: Option<f64>, msg: &str) -> Report {
    Report {
      name: "fillseq".into(),
      micros_per_op: 1.5,
      mb_per_sec,
      ops: 10,
      bytes: 0,
      msg: msg.into(),
      latency: None,
    }
  }

  #[test]
  fn test_line() {
    assert_eq!(
      report(None, "").to_string(),
      "fillseq      :       1.500 micros/op;\n"
    );
    assert_eq!(
      report(Some(12.34), "(10 ops)").to_string(),
      "fillseq      :       1.500 micros/op;   12.3 MB/s (10 ops)\n"
    );
    assert_eq!(
      report(None, "(0 of 10 found)").to_string(),
      "fillseq      :       1.500 micros/op; (0 of 10 found)\n"
    );
  }

  #[test]
  fn test_append_with_space() {
    let mut s = String::new();
    append_with_space(&mut s, "");
    assert_eq!(s, "");
    append_with_space(&mut s, "a");
    append_with_space(&mut s, "b");
    assert_eq!(s, "a b");
  }
}
