// Per-thread state of one workload run
// 单次工作负载运行的线程状态

use crate::Stats;

/// State owned by one worker / 单个工作线程拥有的状态
#[derive(Debug)]
pub struct ThreadState {
  /// 0..n-1 when running in n threads / n 个线程时取值 0..n-1
  pub tid: usize,
  /// Seeded differently for every thread ever created / 每个线程种子各不相同
  pub rng: fastrand::Rng,
  pub seed: u64,
  pub stats: Stats,
}

impl ThreadState {
  pub fn new(tid: usize, seed: u64, hist: bool, progress: bool) -> Self {
    Self {
      tid,
      rng: fastrand::Rng::with_seed(seed),
      seed,
      stats: Stats::new(hist, progress),
    }
  }
}
