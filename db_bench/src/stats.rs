// Per-worker run statistics
// 单个工作线程的运行统计

use std::{
  io::Write,
  time::{SystemTime, UNIX_EPOCH},
};

use crate::{Histogram, LatencyStats, Report, report::append_with_space};

/// First progress report threshold / 首个进度报告阈值
pub const FIRST_REPORT: u64 = 100;

/// Wall clock in microseconds since the unix epoch
/// 自 unix 纪元起的微秒数
pub fn now_micros() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_micros() as u64)
    .unwrap_or(0)
}

/// Next progress threshold after `cur` was reached
/// 到达 `cur` 后的下一个进度阈值
pub fn next_report(cur: u64) -> u64 {
  let step = if cur < 1_000 {
    100
  } else if cur < 5_000 {
    500
  } else if cur < 10_000 {
    1_000
  } else if cur < 50_000 {
    5_000
  } else if cur < 100_000 {
    10_000
  } else if cur < 500_000 {
    50_000
  } else {
    100_000
  };
  cur + step
}

/// Run accumulator owned by exactly one worker
/// 由单个工作线程独占的运行累加器
#[derive(Debug, Clone)]
pub struct Stats {
  start: u64,
  finish: u64,
  seconds: f64,
  done: u64,
  next_report: u64,
  bytes: i64,
  last_op_finish: u64,
  msg: String,
  hist: Option<Histogram>,
  progress: bool,
}

impl Stats {
  /// `hist` enables per-op latency, `progress` enables the stderr indicator
  /// `hist` 开启单操作延迟统计，`progress` 开启 stderr 进度提示
  pub fn new(hist: bool, progress: bool) -> Self {
    let mut s = Self {
      start: 0,
      finish: 0,
      seconds: 0.,
      done: 0,
      next_report: FIRST_REPORT,
      bytes: 0,
      last_op_finish: 0,
      msg: String::new(),
      hist: hist.then(Histogram::new),
      progress,
    };
    s.start();
    s
  }

  /// Reset and mark the window start / 重置并标记窗口起点
  pub fn start(&mut self) {
    self.next_report = FIRST_REPORT;
    self.done = 0;
    self.bytes = 0;
    self.seconds = 0.;
    self.msg.clear();
    if let Some(h) = &mut self.hist {
      h.clear();
    }
    let now = now_micros();
    self.start = now;
    self.finish = now;
    self.last_op_finish = now;
  }

  /// Mark the window end / 标记窗口终点
  pub fn stop(&mut self) {
    self.finish = now_micros();
    self.seconds = self.finish.saturating_sub(self.start) as f64 * 1e-6;
  }

  pub fn finished_single_op(&mut self) {
    if let Some(h) = &mut self.hist {
      let now = now_micros();
      h.add(now.saturating_sub(self.last_op_finish) as f64);
      self.last_op_finish = now;
    }

    self.done += 1;
    if self.done >= self.next_report {
      self.next_report = next_report(self.next_report);
      if self.progress {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "... finished {} ops{:30}\r", self.done, "");
        let _ = err.flush();
      }
    }
  }

  /// Add touched payload bytes, no validation
  /// 累加处理的字节数，不做校验
  pub fn add_bytes(&mut self, n: i64) {
    self.bytes += n;
  }

  pub fn add_msg(&mut self, msg: &str) {
    append_with_space(&mut self.msg, msg);
  }

  /// Fold another worker's stats into self
  /// 将另一个工作线程的统计合并到自身
  pub fn merge(&mut self, other: &Stats) {
    self.done += other.done;
    self.bytes += other.bytes;
    self.seconds += other.seconds;
    if let (Some(h), Some(o)) = (&mut self.hist, &other.hist) {
      h.merge(o);
    }
    self.start = self.start.min(other.start);
    self.finish = self.finish.max(other.finish);
    if self.msg.is_empty() {
      self.msg.clone_from(&other.msg);
    }
  }

  /// Build the report line for `name` / 为 `name` 生成报告
  pub fn report(&self, name: &str) -> Report {
    let done = self.done.max(1);
    let mb_per_sec = if self.bytes > 0 {
      let elapsed = self.finish.saturating_sub(self.start) as f64 * 1e-6;
      (elapsed > 0.).then(|| self.bytes as f64 / 1_048_576. / elapsed)
    } else {
      None
    };
    Report {
      name: name.to_owned(),
      micros_per_op: self.seconds * 1e6 / done as f64,
      mb_per_sec,
      ops: self.done,
      bytes: self.bytes,
      msg: self.msg.clone(),
      latency: self.hist.as_ref().map(LatencyStats::from),
    }
  }

  pub fn done(&self) -> u64 {
    self.done
  }

  pub fn bytes(&self) -> i64 {
    self.bytes
  }

  pub fn seconds(&self) -> f64 {
    self.seconds
  }

  pub fn start_micros(&self) -> u64 {
    self.start
  }

  pub fn finish_micros(&self) -> u64 {
    self.finish
  }

  pub fn next_report_at(&self) -> u64 {
    self.next_report
  }

  pub fn msg(&self) -> &str {
    &self.msg
  }

  pub fn hist(&self) -> Option<&Histogram> {
    self.hist.as_ref()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_next_report_schedule() {
    let mut s = Stats::new(false, false);
    let mut expect = FIRST_REPORT;
    for _ in 0..600_000u64 {
      s.finished_single_op();
      if s.done() >= expect {
        expect = next_report(expect);
      }
      assert_eq!(s.next_report_at(), expect);
    }

    let mut seen = vec![];
    let mut t = FIRST_REPORT;
    while t <= 1_500 {
      seen.push(t);
      t = next_report(t);
    }
    assert_eq!(
      seen,
      [100, 200, 300, 400, 500, 600, 700, 800, 900, 1000, 1500]
    );
    assert_eq!(next_report(4_500), 5_000);
    assert_eq!(next_report(5_000), 6_000);
    assert_eq!(next_report(10_000), 15_000);
    assert_eq!(next_report(50_000), 60_000);
    assert_eq!(next_report(100_000), 150_000);
    assert_eq!(next_report(500_000), 600_000);
  }

  #[test]
  fn test_msg_first_non_empty_wins() {
    let mut a = Stats::new(false, false);
    let mut b = Stats::new(false, false);
    b.add_msg("(10 ops)");
    a.merge(&b);
    assert_eq!(a.msg(), "(10 ops)");

    let mut c = Stats::new(false, false);
    c.add_msg("(other)");
    a.merge(&c);
    assert_eq!(a.msg(), "(10 ops)");

    a.add_msg("");
    assert_eq!(a.msg(), "(10 ops)");
    a.add_msg("x");
    assert_eq!(a.msg(), "(10 ops) x");
  }

  #[test]
  fn test_merge_sums() {
    let mut a = Stats::new(true, false);
    let mut b = Stats::new(true, false);
    for _ in 0..3 {
      a.finished_single_op();
    }
    for _ in 0..5 {
      b.finished_single_op();
    }
    a.add_bytes(10);
    b.add_bytes(-4);
    a.stop();
    b.stop();
    let (sa, sb) = (a.seconds(), b.seconds());
    let start = a.start_micros().min(b.start_micros());
    let finish = a.finish_micros().max(b.finish_micros());

    a.merge(&b);
    assert_eq!(a.done(), 8);
    assert_eq!(a.bytes(), 6);
    assert!((a.seconds() - (sa + sb)).abs() < 1e-12);
    assert_eq!(a.start_micros(), start);
    assert_eq!(a.finish_micros(), finish);
    assert_eq!(a.hist().map(Histogram::count), Some(8));
  }

  #[test]
  fn test_start_resets() {
    let mut s = Stats::new(true, false);
    s.finished_single_op();
    s.add_bytes(5);
    s.add_msg("m");
    s.start();
    assert_eq!(s.done(), 0);
    assert_eq!(s.bytes(), 0);
    assert_eq!(s.msg(), "");
    assert_eq!(s.next_report_at(), FIRST_REPORT);
    assert_eq!(s.hist().map(Histogram::count), Some(0));
  }

  #[test]
  fn test_report_without_ops() {
    let s = Stats::new(false, false);
    let r = s.report("readseq");
    assert_eq!(r.ops, 0);
    assert_eq!(r.mb_per_sec, None);
    assert!(r.latency.is_none());
    assert!(r.micros_per_op >= 0.);
  }
}
