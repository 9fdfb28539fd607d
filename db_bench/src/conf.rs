// Benchmark and store configuration
// 基准测试与存储配置

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default workload sequence / 默认工作负载序列
pub const DEFAULT_BENCHMARKS: &[&str] = &[
  "fillseq",
  "fillsync",
  "fillrandom",
  "overwrite",
  "readrandom",
  "readrandom",
  "readseq",
  "readreverse",
  "fill100k",
];

/// Seed of the first worker thread is `SEED_BASE + 1`
/// 第一个工作线程的种子为 `SEED_BASE + 1`
pub const SEED_BASE: u64 = 1000;

/// Storage engine options / 存储引擎选项
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConf {
  /// Data directory / 数据目录
  pub path: PathBuf,
  /// Bytes buffered in a memtable before flushing / 刷盘前内存表缓冲字节数
  pub write_buffer_size: u64,
  /// Number of memtables / 内存表数量
  pub memtable_num: u32,
  /// Flush every write durably / 每次写入都持久化
  pub sync: bool,
  /// Values at least this large are stored apart from keys, 0 disables
  /// 不小于此大小的值与键分离存储，0 表示关闭
  pub value_threshold: u64,
  /// Value log file rollover size / 值日志文件滚动大小
  pub vlog_file_size: u64,
  /// Level-zero table count triggering compaction / 触发压缩的 L0 表数量
  pub level0_tables: u32,
  /// Level-zero table count stalling writes / 阻塞写入的 L0 表数量
  pub level0_stall: u32,
  /// Prefetch values while iterating / 迭代时预取值
  pub prefetch: bool,
  pub prefetch_size: usize,
}

impl Default for StoreConf {
  fn default() -> Self {
    Self {
      path: PathBuf::from("/tmp/db_bench"),
      write_buffer_size: 64 << 20,
      memtable_num: 5,
      sync: false,
      value_threshold: 32,
      vlog_file_size: 1 << 30,
      level0_tables: 5,
      level0_stall: 10,
      prefetch: true,
      prefetch_size: 100,
    }
  }
}

impl StoreConf {
  /// Copy with `sync` overridden / 覆盖 `sync` 后的副本
  pub fn with_sync(&self, sync: bool) -> Self {
    Self {
      sync,
      ..self.clone()
    }
  }
}

/// Immutable benchmark configuration / 不可变的基准测试配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Conf {
  /// Workload names run left to right / 从左到右依次运行的工作负载
  pub benchmarks: Vec<String>,
  /// Number of key/values to place in database / 写入数据库的键值数量
  pub num: u64,
  /// Read operations, `None` means `num` / 读操作数，`None` 表示等于 `num`
  pub reads: Option<u64>,
  /// Concurrent workers per workload / 每个工作负载的并发线程数
  pub threads: usize,
  pub value_size: usize,
  /// Entries per write batch, 1 writes one key at a time / 每批写入条数
  pub entries_per_batch: usize,
  /// Record per-op latency histogram / 记录单操作延迟直方图
  pub histogram: bool,
  /// Print transient progress to stderr / 向 stderr 输出进度
  pub progress: bool,
  /// Keep data left by a previous process / 保留之前进程留下的数据
  pub use_existing_db: bool,
  pub seed_base: u64,
  /// Discard ratio passed to garbage compaction / 垃圾压缩的丢弃比例
  pub discard_ratio: f64,
  pub store: StoreConf,
}

impl Default for Conf {
  fn default() -> Self {
    Self {
      benchmarks: DEFAULT_BENCHMARKS.iter().map(|s| s.to_string()).collect(),
      num: 1000,
      reads: None,
      threads: 1,
      value_size: 100,
      entries_per_batch: 1,
      histogram: false,
      progress: true,
      use_existing_db: false,
      seed_base: SEED_BASE,
      discard_ratio: 0.5,
      store: StoreConf::default(),
    }
  }
}

impl Conf {
  /// Load from a JSON file, missing fields take defaults
  /// 从 JSON 文件加载，缺失字段取默认值
  pub fn load(path: &Path) -> Result<Self> {
    let s = std::fs::read_to_string(path)?;
    Ok(sonic_rs::from_str(&s)?)
  }

  /// Effective read count / 实际读操作数
  pub fn reads(&self) -> u64 {
    self.reads.unwrap_or(self.num)
  }

  /// Split a comma separated workload list / 拆分逗号分隔的工作负载列表
  pub fn parse_benchmarks(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_owned()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reads_default_to_num() {
    let mut conf = Conf {
      num: 42,
      ..Conf::default()
    };
    assert_eq!(conf.reads(), 42);
    conf.reads = Some(7);
    assert_eq!(conf.reads(), 7);
  }

  #[test]
  fn test_parse_benchmarks_keeps_empty() {
    assert_eq!(
      Conf::parse_benchmarks("fillseq,,readseq"),
      ["fillseq", "", "readseq"]
    );
  }

  #[test]
  fn test_json_partial() {
    let conf: Conf =
      sonic_rs::from_str(r#"{"num": 10, "threads": 4, "store": {"sync": true}}"#).unwrap();
    assert_eq!(conf.num, 10);
    assert_eq!(conf.threads, 4);
    assert!(conf.store.sync);
    assert_eq!(conf.value_size, 100);
    assert_eq!(conf.store.memtable_num, 5);
  }

  #[test]
  fn test_with_sync() {
    let s = StoreConf::default();
    let t = s.with_sync(true);
    assert!(t.sync);
    assert_eq!(t.path, s.path);
  }
}
