// In-memory ordered store / 内存有序存储

use std::{collections::BTreeMap, collections::VecDeque, ops::Bound};

use parking_lot::RwLock;

use super::{IterOpt, Kv, Store, WriteBatch};
use crate::{Result, StoreConf};

const ENGINE_NAME: &str = "mem";

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// Ordered map behind a read-write lock, data is gone after `close`
/// 读写锁保护的有序映射，`close` 后数据消失
#[derive(Debug, Default)]
pub struct MemStore {
  map: RwLock<Map>,
}

impl MemStore {
  pub fn len(&self) -> usize {
    self.map.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.read().is_empty()
  }
}

/// Buffered writes / 缓冲写入
pub struct MemBatch<'a> {
  map: &'a RwLock<Map>,
  entries: Vec<Kv>,
}

impl WriteBatch for MemBatch<'_> {
  fn set_entry(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
    self.entries.push((key.to_vec(), val.to_vec()));
    Ok(())
  }

  fn flush(self) -> Result<()> {
    let mut map = self.map.write();
    map.extend(self.entries);
    Ok(())
  }

  fn cancel(self) {}
}

/// Lazy iterator copying `chunk` entries per lock acquisition
/// 惰性迭代器，每次加锁复制 `chunk` 个条目
pub struct MemIter<'a> {
  map: &'a RwLock<Map>,
  reverse: bool,
  chunk: usize,
  buf: VecDeque<Kv>,
  /// Last key handed to `buf` / 最后放入 `buf` 的键
  cursor: Option<Vec<u8>>,
  end: bool,
}

impl MemIter<'_> {
  fn fill(&mut self) {
    let map = self.map.read();
    let after = match &self.cursor {
      Some(k) => Bound::Excluded(k.as_slice()),
      None => Bound::Unbounded,
    };
    let range = if self.reverse {
      (Bound::Unbounded, after)
    } else {
      (after, Bound::Unbounded)
    };
    let it = map.range::<[u8], _>(range);
    let copy = |(k, v): (&Vec<u8>, &Vec<u8>)| (k.clone(), v.clone());
    let before = self.buf.len();
    if self.reverse {
      self.buf.extend(it.rev().take(self.chunk).map(copy));
    } else {
      self.buf.extend(it.take(self.chunk).map(copy));
    }
    if self.buf.len() - before < self.chunk {
      self.end = true;
    }
    if let Some((k, _)) = self.buf.back() {
      self.cursor = Some(k.clone());
    }
  }
}

impl Iterator for MemIter<'_> {
  type Item = Result<Kv>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.buf.is_empty() && !self.end {
      self.fill();
    }
    self.buf.pop_front().map(Ok)
  }
}

impl Store for MemStore {
  type Batch<'a> = MemBatch<'a>;
  type Iter<'a> = MemIter<'a>;

  fn name(&self) -> &str {
    ENGINE_NAME
  }

  fn open(_conf: &StoreConf) -> Result<Self> {
    Ok(Self::default())
  }

  fn put(&self, key: &[u8], val: &[u8]) -> Result<()> {
    self.map.write().insert(key.to_vec(), val.to_vec());
    Ok(())
  }

  fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(self.map.read().get(key).cloned())
  }

  fn delete(&self, key: &[u8]) -> Result<()> {
    self.map.write().remove(key);
    Ok(())
  }

  fn batch(&self) -> Self::Batch<'_> {
    MemBatch {
      map: &self.map,
      entries: Vec::new(),
    }
  }

  fn iter(&self, opt: IterOpt) -> Result<Self::Iter<'_>> {
    let chunk = if opt.prefetch {
      opt.prefetch_size.max(1)
    } else {
      1
    };
    Ok(MemIter {
      map: &self.map,
      reverse: opt.reverse,
      chunk,
      buf: VecDeque::with_capacity(chunk),
      cursor: None,
      end: false,
    })
  }

  fn drop_all(&self) -> Result<()> {
    self.map.write().clear();
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn opt(reverse: bool, prefetch: bool, prefetch_size: usize) -> IterOpt {
    IterOpt {
      reverse,
      prefetch,
      prefetch_size,
    }
  }

  fn store(n: u8) -> MemStore {
    let s = MemStore::open(&StoreConf::default()).unwrap();
    for i in 0..n {
      s.put(&[i], &[i, i]).unwrap();
    }
    s
  }

  #[test]
  fn test_iter_orders() {
    let s = store(10);
    for (prefetch, size) in [(false, 0), (true, 1), (true, 3), (true, 10), (true, 100)] {
      let fwd: Vec<u8> = s
        .iter(opt(false, prefetch, size))
        .unwrap()
        .map(|kv| kv.unwrap().0[0])
        .collect();
      assert_eq!(fwd, (0..10).collect::<Vec<_>>());

      let rev: Vec<u8> = s
        .iter(opt(true, prefetch, size))
        .unwrap()
        .map(|kv| kv.unwrap().0[0])
        .collect();
      assert_eq!(rev, (0..10).rev().collect::<Vec<_>>());
    }
  }

  #[test]
  fn test_iter_empty() {
    let s = store(0);
    assert_eq!(s.iter(opt(false, true, 4)).unwrap().count(), 0);
    assert_eq!(s.iter(opt(true, false, 4)).unwrap().count(), 0);
  }

  #[test]
  fn test_batch() {
    let s = store(0);
    let mut b = s.batch();
    b.set_entry(b"a", b"1").unwrap();
    b.set_entry(b"b", b"2").unwrap();
    assert!(s.is_empty());
    b.flush().unwrap();
    assert_eq!(s.len(), 2);

    let mut b = s.batch();
    b.set_entry(b"c", b"3").unwrap();
    b.cancel();
    assert_eq!(s.get(b"c").unwrap(), None);
  }

  #[test]
  fn test_put_get_delete_drop() {
    let s = store(3);
    assert_eq!(s.get(&[1]).unwrap(), Some(vec![1, 1]));
    s.delete(&[1]).unwrap();
    assert_eq!(s.get(&[1]).unwrap(), None);
    s.drop_all().unwrap();
    assert!(s.is_empty());
    assert!(!s.compact_garbage(0.5).unwrap());
  }
}
