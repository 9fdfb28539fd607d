// Key and value generation
// 键与值生成

use std::io::Write;

/// Fixed key width in bytes / 固定键宽度（字节）
pub const KEY_SIZE: usize = 16;

/// Seed of the per-worker value payload / 每个工作线程值内容的种子
pub const VALUE_SEED: u64 = 301;

/// Zero padded 16 digit decimal key / 16 位补零十进制键
pub fn gen_key(k: u64) -> Vec<u8> {
  let mut buf = Vec::with_capacity(KEY_SIZE);
  let _ = write!(&mut buf, "{k:016}");
  buf
}

/// Key that no `gen_key` output equals / 不会与任何 `gen_key` 结果相同的键
pub fn gen_missing_key(k: u64) -> Vec<u8> {
  let mut key = gen_key(k);
  key.push(b'.');
  key
}

/// Uniform key index in `[0, n)`, 0 when `n == 0`
/// `[0, n)` 内的均匀键下标，`n == 0` 时返回 0
#[inline]
pub fn rand_index(rng: &mut fastrand::Rng, n: u64) -> u64 {
  if n == 0 { 0 } else { rng.u64(..n) }
}

/// Printable ASCII payload of `len` bytes / `len` 字节的可打印 ASCII 内容
pub fn random_value(rng: &mut fastrand::Rng, len: usize) -> Vec<u8> {
  (0..len).map(|_| b' ' + rng.u8(..95)).collect()
}
