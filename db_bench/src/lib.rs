// Concurrent micro-benchmark driver for key-value stores
// 键值存储并发微基准测试驱动

#![cfg_attr(docsrs, feature(doc_cfg))]

mod conf;
mod driver;
mod error;
pub mod header;
mod histogram;
pub mod keygen;
mod latency;
mod report;
mod shared;
mod stats;
pub mod store;
mod thread_state;
pub mod workload;

pub use conf::{Conf, DEFAULT_BENCHMARKS, SEED_BASE, StoreConf};
pub use driver::{Driver, dispatch};
pub use error::{Error, Result};
pub use histogram::{BUCKET_LIMIT, Histogram, NUM_BUCKET};
pub use latency::LatencyStats;
pub use report::{Report, append_with_space};
pub use shared::{Phase, Shared};
pub use stats::{FIRST_REPORT, Stats, next_report, now_micros};
pub use store::mem::MemStore;
#[cfg(feature = "rocksdb")]
pub use store::rocksdb::RocksStore;
pub use thread_state::ThreadState;
pub use workload::{Ctx, Method, Plan, Workload};
