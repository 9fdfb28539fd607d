use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] sonic_rs::Error),

  #[cfg(feature = "rocksdb")]
  #[error("RocksDB error: {0}")]
  Rocksdb(#[from] rocksdb::Error),

  /// Thread count must be positive / 线程数必须大于 0
  #[error("thread count must be > 0")]
  NoThreads,

  /// Engine not compiled in / 引擎未编译进来
  #[error("engine '{0}' is not enabled, rebuild with --features {0}")]
  EngineMissing(&'static str),

  #[error("store is closed / 存储已关闭")]
  Closed,

  #[error("{name}: {source}")]
  Workload {
    name: String,
    #[source]
    source: Box<Error>,
  },

  #[error("{name}: worker thread panicked")]
  WorkerPanic { name: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
