// Named workloads and their worker functions
// 命名工作负载及其工作函数

use std::fmt;

use log::debug;

use crate::{
  Result, ThreadState,
  keygen::{VALUE_SEED, gen_key, gen_missing_key, rand_index, random_value},
  store::{IterOpt, Store, WriteBatch},
};

/// Value size of `fill100k` / `fill100k` 的值大小
pub const LARGE_VALUE_SIZE: usize = 100_000;

/// Entries per batch of `fillbatch` / `fillbatch` 每批条数
pub const FILL_BATCH: usize = 1000;

/// Context shared by the workers of one run
/// 单次运行中所有工作线程共享的上下文
pub struct Ctx<'a, S> {
  pub db: &'a S,
  /// Operations per worker / 每个工作线程的操作数
  pub num: u64,
  /// Configured key space `[0, key_space)` / 配置的键空间
  pub key_space: u64,
  pub reads: u64,
  pub value_size: usize,
  pub entries_per_batch: usize,
  pub iter: IterOpt,
  pub discard_ratio: f64,
}

/// Worker entry point / 工作线程入口
pub type Method<S> = fn(&Ctx<'_, S>, &mut ThreadState) -> Result<()>;

/// How the driver prepares and runs a workload
/// 驱动如何准备与运行一个工作负载
pub struct Plan<S> {
  /// Reopen on an empty database first / 先在空数据库上重新打开
  pub fresh: bool,
  /// Reopen with synchronous writes / 以同步写模式重新打开
  pub sync: bool,
  /// Configured op count is divided by this / 配置的操作数除以此值
  pub num_div: u64,
  pub value_size: Option<usize>,
  pub entries_per_batch: Option<usize>,
  /// Forced worker count / 强制的工作线程数
  pub threads: Option<usize>,
  pub method: Method<S>,
}

impl<S: Store> Plan<S> {
  fn new(method: Method<S>) -> Self {
    Self {
      fresh: false,
      sync: false,
      num_div: 1,
      value_size: None,
      entries_per_batch: None,
      threads: None,
      method,
    }
  }

  fn fresh(self) -> Self {
    Self {
      fresh: true,
      ..self
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
  FillSeq,
  FillRandom,
  Overwrite,
  FillSync,
  Fill100K,
  FillBatch,
  ReadSeq,
  ReadReverse,
  ReadRandom,
  ReadMissing,
  ReadHot,
  DeleteSeq,
  DeleteRandom,
  Compact,
}

impl Workload {
  pub const ALL: [Workload; 14] = [
    Self::FillSeq,
    Self::FillRandom,
    Self::Overwrite,
    Self::FillSync,
    Self::Fill100K,
    Self::FillBatch,
    Self::ReadSeq,
    Self::ReadReverse,
    Self::ReadRandom,
    Self::ReadMissing,
    Self::ReadHot,
    Self::DeleteSeq,
    Self::DeleteRandom,
    Self::Compact,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Self::FillSeq => "fillseq",
      Self::FillRandom => "fillrandom",
      Self::Overwrite => "overwrite",
      Self::FillSync => "fillsync",
      Self::Fill100K => "fill100k",
      Self::FillBatch => "fillbatch",
      Self::ReadSeq => "readseq",
      Self::ReadReverse => "readreverse",
      Self::ReadRandom => "readrandom",
      Self::ReadMissing => "readmissing",
      Self::ReadHot => "readhot",
      Self::DeleteSeq => "deleteseq",
      Self::DeleteRandom => "deleterandom",
      Self::Compact => "compact",
    }
  }

  /// Look up by name, case sensitive / 按名称查找，区分大小写
  pub fn parse(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|w| w.name() == name)
  }

  pub fn plan<S: Store>(self) -> Plan<S> {
    match self {
      Self::FillSeq => Plan::new(write_seq::<S> as Method<S>).fresh(),
      Self::FillRandom => Plan::new(write_random::<S> as Method<S>).fresh(),
      Self::Overwrite => Plan::new(write_random::<S> as Method<S>),
      Self::FillSync => Plan {
        sync: true,
        num_div: 1000,
        ..Plan::new(write_random::<S> as Method<S>).fresh()
      },
      Self::Fill100K => Plan {
        num_div: 1000,
        value_size: Some(LARGE_VALUE_SIZE),
        ..Plan::new(write_random::<S> as Method<S>).fresh()
      },
      Self::FillBatch => Plan {
        entries_per_batch: Some(FILL_BATCH),
        ..Plan::new(write_seq::<S> as Method<S>).fresh()
      },
      Self::ReadSeq => Plan::new(read_seq::<S> as Method<S>),
      Self::ReadReverse => Plan::new(read_reverse::<S> as Method<S>),
      Self::ReadRandom => Plan::new(read_random::<S> as Method<S>),
      Self::ReadMissing => Plan::new(read_missing::<S> as Method<S>),
      Self::ReadHot => Plan::new(read_hot::<S> as Method<S>),
      Self::DeleteSeq => Plan::new(delete_seq::<S> as Method<S>),
      Self::DeleteRandom => Plan::new(delete_random::<S> as Method<S>),
      Self::Compact => Plan {
        threads: Some(1),
        ..Plan::new(compact::<S> as Method<S>)
      },
    }
  }
}

impl fmt::Display for Workload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

fn write_key(key_space: u64, ts: &mut ThreadState, seq: bool, i: u64) -> Vec<u8> {
  let k = if seq {
    i
  } else {
    rand_index(&mut ts.rng, key_space)
  };
  gen_key(k)
}

fn do_write<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState, seq: bool) -> Result<()> {
  if ctx.num == ctx.key_space {
    ts.stats.add_msg(&format!("({} ops)", ctx.num));
  }

  // Same payload for every key of this worker
  // 本线程所有键使用相同的值
  let val = random_value(&mut fastrand::Rng::with_seed(VALUE_SEED), ctx.value_size);
  let per_batch = ctx.entries_per_batch.max(1) as u64;
  let mut bytes = 0i64;
  let mut i = 0;

  while i < ctx.num {
    let n = per_batch.min(ctx.num - i);
    if per_batch == 1 {
      let key = write_key(ctx.key_space, ts, seq, i);
      ctx.db.put(&key, &val)?;
      bytes += (val.len() + key.len()) as i64;
      ts.stats.finished_single_op();
    } else {
      let mut batch = ctx.db.batch();
      for j in 0..n {
        let key = write_key(ctx.key_space, ts, seq, i + j);
        if let Err(e) = batch.set_entry(&key, &val) {
          batch.cancel();
          return Err(e);
        }
        bytes += (val.len() + key.len()) as i64;
      }
      batch.flush()?;
      for _ in 0..n {
        ts.stats.finished_single_op();
      }
    }
    i += n;
  }
  ts.stats.add_bytes(bytes);
  Ok(())
}

pub fn write_seq<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_write(ctx, ts, true)
}

pub fn write_random<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_write(ctx, ts, false)
}

fn do_read_iter<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState, reverse: bool) -> Result<()> {
  let opt = IterOpt { reverse, ..ctx.iter };
  let mut bytes = 0i64;
  for kv in ctx.db.iter(opt)?.take(ctx.reads as usize) {
    let (k, v) = kv?;
    bytes += (k.len() + v.len()) as i64;
    ts.stats.finished_single_op();
  }
  ts.stats.add_bytes(bytes);
  Ok(())
}

pub fn read_seq<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_read_iter(ctx, ts, false)
}

pub fn read_reverse<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_read_iter(ctx, ts, true)
}

/// `reads` point lookups, keys drawn by `key` / `reads` 次点查，键由 `key` 生成
fn do_read_point<S: Store>(
  ctx: &Ctx<'_, S>,
  ts: &mut ThreadState,
  key: impl Fn(&mut fastrand::Rng) -> Vec<u8>,
) -> Result<()> {
  let mut found = 0u64;
  for _ in 0..ctx.reads {
    let k = key(&mut ts.rng);
    if ctx.db.get(&k)?.is_some() {
      found += 1;
    }
    ts.stats.finished_single_op();
  }
  ts.stats.add_msg(&format!("({found} of {} found)", ctx.reads));
  Ok(())
}

pub fn read_random<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  let n = ctx.key_space;
  do_read_point(ctx, ts, |rng| gen_key(rand_index(rng, n)))
}

pub fn read_missing<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  let n = ctx.key_space;
  do_read_point(ctx, ts, |rng| gen_missing_key(rand_index(rng, n)))
}

/// Lookups within the first 1% of the key space / 仅查找键空间的前 1%
pub fn read_hot<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  let range = (ctx.key_space / 100).max(1);
  do_read_point(ctx, ts, |rng| gen_key(rand_index(rng, range)))
}

fn do_delete<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState, seq: bool) -> Result<()> {
  for i in 0..ctx.num {
    let key = write_key(ctx.key_space, ts, seq, i);
    ctx.db.delete(&key)?;
    ts.stats.finished_single_op();
  }
  Ok(())
}

pub fn delete_seq<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_delete(ctx, ts, true)
}

pub fn delete_random<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  do_delete(ctx, ts, false)
}

/// Garbage collect until a round reclaims nothing
/// 反复垃圾回收直到某轮未回收任何空间
pub fn compact<S: Store>(ctx: &Ctx<'_, S>, ts: &mut ThreadState) -> Result<()> {
  let mut rounds = 0u64;
  loop {
    let reclaimed = ctx.db.compact_garbage(ctx.discard_ratio)?;
    rounds += 1;
    ts.stats.finished_single_op();
    debug!("compact round {rounds}: reclaimed={reclaimed}");
    if !reclaimed {
      break;
    }
  }
  ts.stats.add_msg(&format!("({rounds} rounds)"));
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::mem::MemStore;

  #[test]
  fn test_parse_roundtrip_names() {
    for w in Workload::ALL {
      assert_eq!(Workload::parse(w.name()), Some(w));
      assert_eq!(w.to_string(), w.name());
    }
    assert_eq!(Workload::parse("FillSeq"), None);
    assert_eq!(Workload::parse(""), None);
  }

  #[test]
  fn test_plans() {
    let p = Workload::FillSync.plan::<MemStore>();
    assert!(p.fresh && p.sync);
    assert_eq!(p.num_div, 1000);

    let p = Workload::Fill100K.plan::<MemStore>();
    assert!(p.fresh && !p.sync);
    assert_eq!(p.value_size, Some(LARGE_VALUE_SIZE));

    let p = Workload::Overwrite.plan::<MemStore>();
    assert!(!p.fresh);

    assert!(Workload::FillSeq.plan::<MemStore>().fresh);
    assert!(Workload::FillRandom.plan::<MemStore>().fresh);
    assert!(!Workload::ReadRandom.plan::<MemStore>().fresh);
    assert_eq!(Workload::Compact.plan::<MemStore>().threads, Some(1));
    assert_eq!(
      Workload::FillBatch.plan::<MemStore>().entries_per_batch,
      Some(FILL_BATCH)
    );
  }
}
