// Rendezvous barrier for benchmark workers
// 基准测试工作线程的汇合屏障

use parking_lot::{Condvar, Mutex};

use crate::{Error, Result};

/// Barrier phase / 屏障阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Workers are still checking in / 工作线程仍在登记
  Filling,
  /// Start signal given, nobody finished yet / 已发出开始信号，尚无线程完成
  Released,
  /// Some workers finished / 部分线程已完成
  Draining,
  /// All workers finished / 所有线程已完成
  Done,
}

#[derive(Debug, Default)]
struct Count {
  init: usize,
  done: usize,
  start: bool,
}

/// Shared state coordinating `total` workers and one orchestrator
/// 协调 `total` 个工作线程与一个编排线程的共享状态
///
/// All counters live under one mutex; every transition wakes all waiters.
/// 所有计数器由同一把锁保护，每次状态变化都唤醒全部等待者。
#[derive(Debug)]
pub struct Shared {
  total: usize,
  count: Mutex<Count>,
  cv: Condvar,
}

impl Shared {
  pub fn new(total: usize) -> Result<Self> {
    if total == 0 {
      return Err(Error::NoThreads);
    }
    Ok(Self {
      total,
      count: Mutex::new(Count::default()),
      cv: Condvar::new(),
    })
  }

  pub fn total(&self) -> usize {
    self.total
  }

  /// Worker check-in, blocks until released
  /// 工作线程登记，阻塞直到被释放
  pub fn enter(&self) {
    let mut c = self.count.lock();
    c.init += 1;
    if c.init >= self.total {
      self.cv.notify_all();
    }
    while !c.start {
      self.cv.wait(&mut c);
    }
  }

  /// Worker check-out / 工作线程完成登记
  pub fn exit(&self) {
    let mut c = self.count.lock();
    c.done += 1;
    if c.done >= self.total {
      self.cv.notify_all();
    }
  }

  /// Orchestrator: wait for every worker to check in, then start them all
  /// 编排线程：等待所有线程登记后统一放行
  pub fn release(&self) {
    let mut c = self.count.lock();
    while c.init < self.total {
      self.cv.wait(&mut c);
    }
    c.start = true;
    self.cv.notify_all();
  }

  /// Orchestrator: wait for every worker to check out
  /// 编排线程：等待所有线程完成
  pub fn join(&self) {
    let mut c = self.count.lock();
    while c.done < self.total {
      self.cv.wait(&mut c);
    }
  }

  pub fn initialized(&self) -> usize {
    self.count.lock().init
  }

  pub fn completed(&self) -> usize {
    self.count.lock().done
  }

  pub fn started(&self) -> bool {
    self.count.lock().start
  }

  pub fn phase(&self) -> Phase {
    let c = self.count.lock();
    if !c.start {
      Phase::Filling
    } else if c.done == 0 {
      Phase::Released
    } else if c.done < self.total {
      Phase::Draining
    } else {
      Phase::Done
    }
  }
}
