// Storage engine interface driven by the benchmark
// 基准测试驱动的存储引擎接口

use std::path::Path;

use crate::{Result, StoreConf};

pub mod mem;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

/// Owned key-value pair / 键值对
pub type Kv = (Vec<u8>, Vec<u8>);

/// Calculate directory size iteratively / 迭代计算目录大小
pub fn dir_size(path: &Path) -> u64 {
  if !path.exists() {
    return 0;
  }
  let mut total = 0u64;
  let mut stack = vec![path.to_path_buf()];

  while let Some(current_path) = stack.pop() {
    if let Ok(entries) = std::fs::read_dir(&current_path) {
      for entry in entries.flatten() {
        let p = entry.path();
        if p.is_dir() {
          stack.push(p);
        } else {
          total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
      }
    }
  }
  total
}

/// Iteration options / 迭代选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterOpt {
  pub reverse: bool,
  pub prefetch: bool,
  pub prefetch_size: usize,
}

impl IterOpt {
  pub fn new(conf: &StoreConf, reverse: bool) -> Self {
    Self {
      reverse,
      prefetch: conf.prefetch,
      prefetch_size: conf.prefetch_size,
    }
  }
}

/// Pending writes applied together on `flush`
/// 在 `flush` 时一并提交的待写入集合
pub trait WriteBatch {
  fn set_entry(&mut self, key: &[u8], val: &[u8]) -> Result<()>;

  /// Apply all entries / 提交所有条目
  fn flush(self) -> Result<()>;

  /// Discard all entries / 丢弃所有条目
  fn cancel(self);
}

/// Storage engine handle shared by all workers
/// 所有工作线程共享的存储引擎句柄
pub trait Store: Send + Sync + Sized {
  type Batch<'a>: WriteBatch
  where
    Self: 'a;

  /// Finite, restartable per call / 有限序列，每次调用重新开始
  type Iter<'a>: Iterator<Item = Result<Kv>>
  where
    Self: 'a;

  /// Engine name / 引擎名称
  fn name(&self) -> &str;

  fn open(conf: &StoreConf) -> Result<Self>;

  fn put(&self, key: &[u8], val: &[u8]) -> Result<()>;

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

  fn delete(&self, key: &[u8]) -> Result<()>;

  fn batch(&self) -> Self::Batch<'_>;

  fn iter(&self, opt: IterOpt) -> Result<Self::Iter<'_>>;

  /// Remove all persisted data, irreversible / 删除所有持久化数据，不可恢复
  fn drop_all(&self) -> Result<()>;

  /// One garbage collection round, returns whether anything was reclaimed
  /// 一轮垃圾回收，返回是否回收了空间
  fn compact_garbage(&self, _discard_ratio: f64) -> Result<bool> {
    Ok(false)
  }

  /// Get disk usage in bytes / 获取磁盘使用量（字节）
  fn disk_usage(&self) -> u64 {
    0
  }

  fn close(self) -> Result<()> {
    Ok(())
  }
}
