// RocksDB adapter / RocksDB 适配器

use std::path::PathBuf;

use rocksdb::{DB, DBIteratorWithThreadMode, IteratorMode, Options, ReadOptions, WriteOptions};

use super::{IterOpt, Kv, Store, WriteBatch, dir_size};
use crate::{Result, StoreConf};

const ENGINE_NAME: &str = "rocksdb";

/// RocksDB adapter / RocksDB 适配器
pub struct RocksStore {
  db: DB,
  /// Data directory / 数据目录
  path: PathBuf,
  sync: bool,
}

impl RocksStore {
  fn write_opt(&self) -> WriteOptions {
    let mut wo = WriteOptions::default();
    wo.set_sync(self.sync);
    wo
  }
}

fn options(conf: &StoreConf) -> Options {
  let mut opts = Options::default();
  opts.create_if_missing(true);
  opts.set_write_buffer_size(conf.write_buffer_size as usize);
  opts.set_max_write_buffer_number(conf.memtable_num as i32);
  opts.set_level_zero_file_num_compaction_trigger(conf.level0_tables as i32);
  opts.set_level_zero_stop_writes_trigger(conf.level0_stall as i32);
  // Key-value separation through blob files / 通过 blob 文件实现键值分离
  if conf.value_threshold > 0 {
    opts.set_enable_blob_files(true);
    opts.set_min_blob_size(conf.value_threshold);
    opts.set_blob_file_size(conf.vlog_file_size);
    opts.set_enable_blob_gc(true);
  }
  opts
}

pub struct RocksBatch<'a> {
  store: &'a RocksStore,
  batch: rocksdb::WriteBatch,
}

impl WriteBatch for RocksBatch<'_> {
  fn set_entry(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
    self.batch.put(key, val);
    Ok(())
  }

  fn flush(self) -> Result<()> {
    self.store.db.write_opt(self.batch, &self.store.write_opt())?;
    Ok(())
  }

  fn cancel(self) {}
}

pub struct RocksIter<'a> {
  inner: DBIteratorWithThreadMode<'a, DB>,
}

impl Iterator for RocksIter<'_> {
  type Item = Result<Kv>;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.next().map(|r| {
      let (k, v) = r?;
      Ok((k.into_vec(), v.into_vec()))
    })
  }
}

impl Store for RocksStore {
  type Batch<'a> = RocksBatch<'a>;
  type Iter<'a> = RocksIter<'a>;

  fn name(&self) -> &str {
    ENGINE_NAME
  }

  fn open(conf: &StoreConf) -> Result<Self> {
    let db = DB::open(&options(conf), &conf.path)?;
    Ok(Self {
      db,
      path: conf.path.clone(),
      sync: conf.sync,
    })
  }

  fn put(&self, key: &[u8], val: &[u8]) -> Result<()> {
    self.db.put_opt(key, val, &self.write_opt())?;
    Ok(())
  }

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(self.db.get(key)?)
  }

  fn delete(&self, key: &[u8]) -> Result<()> {
    self.db.delete_opt(key, &self.write_opt())?;
    Ok(())
  }

  fn batch(&self) -> Self::Batch<'_> {
    RocksBatch {
      store: self,
      batch: rocksdb::WriteBatch::default(),
    }
  }

  fn iter(&self, opt: IterOpt) -> Result<Self::Iter<'_>> {
    let mut ro = ReadOptions::default();
    if opt.prefetch {
      ro.set_readahead_size(opt.prefetch_size);
    }
    let mode = if opt.reverse {
      IteratorMode::End
    } else {
      IteratorMode::Start
    };
    Ok(RocksIter {
      inner: self.db.iterator_opt(mode, ro),
    })
  }

  fn drop_all(&self) -> Result<()> {
    let mut batch = rocksdb::WriteBatch::default();
    for r in self.db.iterator(IteratorMode::Start) {
      let (k, _) = r?;
      batch.delete(k);
    }
    self.db.write_opt(batch, &self.write_opt())?;
    self.db.compact_range(None::<&[u8]>, None::<&[u8]>);
    Ok(())
  }

  fn compact_garbage(&self, discard_ratio: f64) -> Result<bool> {
    let before = dir_size(&self.path);
    self.db.compact_range(None::<&[u8]>, None::<&[u8]>);
    let after = dir_size(&self.path);
    let reclaimed = before.saturating_sub(after);
    Ok(reclaimed > 0 && reclaimed as f64 >= before as f64 * discard_ratio)
  }

  fn disk_usage(&self) -> u64 {
    dir_size(&self.path)
  }

  fn close(self) -> Result<()> {
    self.db.flush()?;
    Ok(())
  }
}
