// Fixed-bucket latency histogram
// 固定分桶延迟直方图

use std::fmt;

use crate::LatencyStats;

/// Number of buckets / 桶数量
pub const NUM_BUCKET: usize = 154;

/// Upper bound (exclusive) of each bucket, last one is the sentinel
/// 每个桶的上界（不含），最后一个为哨兵
pub const BUCKET_LIMIT: [f64; NUM_BUCKET] = [
  1.,
  2.,
  3.,
  4.,
  5.,
  6.,
  7.,
  8.,
  9.,
  10.,
  12.,
  14.,
  16.,
  18.,
  20.,
  25.,
  30.,
  35.,
  40.,
  45.,
  50.,
  60.,
  70.,
  80.,
  90.,
  100.,
  120.,
  140.,
  160.,
  180.,
  200.,
  250.,
  300.,
  350.,
  400.,
  450.,
  500.,
  600.,
  700.,
  800.,
  900.,
  1_000.,
  1_200.,
  1_400.,
  1_600.,
  1_800.,
  2_000.,
  2_500.,
  3_000.,
  3_500.,
  4_000.,
  4_500.,
  5_000.,
  6_000.,
  7_000.,
  8_000.,
  9_000.,
  10_000.,
  12_000.,
  14_000.,
  16_000.,
  18_000.,
  20_000.,
  25_000.,
  30_000.,
  35_000.,
  40_000.,
  45_000.,
  50_000.,
  60_000.,
  70_000.,
  80_000.,
  90_000.,
  100_000.,
  120_000.,
  140_000.,
  160_000.,
  180_000.,
  200_000.,
  250_000.,
  300_000.,
  350_000.,
  400_000.,
  450_000.,
  500_000.,
  600_000.,
  700_000.,
  800_000.,
  900_000.,
  1_000_000.,
  1_200_000.,
  1_400_000.,
  1_600_000.,
  1_800_000.,
  2_000_000.,
  2_500_000.,
  3_000_000.,
  3_500_000.,
  4_000_000.,
  4_500_000.,
  5_000_000.,
  6_000_000.,
  7_000_000.,
  8_000_000.,
  9_000_000.,
  10_000_000.,
  12_000_000.,
  14_000_000.,
  16_000_000.,
  18_000_000.,
  20_000_000.,
  25_000_000.,
  30_000_000.,
  35_000_000.,
  40_000_000.,
  45_000_000.,
  50_000_000.,
  60_000_000.,
  70_000_000.,
  80_000_000.,
  90_000_000.,
  100_000_000.,
  120_000_000.,
  140_000_000.,
  160_000_000.,
  180_000_000.,
  200_000_000.,
  250_000_000.,
  300_000_000.,
  350_000_000.,
  400_000_000.,
  450_000_000.,
  500_000_000.,
  600_000_000.,
  700_000_000.,
  800_000_000.,
  900_000_000.,
  1_000_000_000.,
  1_200_000_000.,
  1_400_000_000.,
  1_600_000_000.,
  1_800_000_000.,
  2_000_000_000.,
  2_500_000_000.,
  3_000_000_000.,
  3_500_000_000.,
  4_000_000_000.,
  4_500_000_000.,
  5_000_000_000.,
  6_000_000_000.,
  7_000_000_000.,
  8_000_000_000.,
  9_000_000_000.,
  1e200,
];

/// Latency histogram over [`BUCKET_LIMIT`]
/// 基于 [`BUCKET_LIMIT`] 的延迟直方图
///
/// Bucket `b` covers `[BUCKET_LIMIT[b - 1], BUCKET_LIMIT[b])`, bucket 0 starts at 0.
/// 桶 `b` 覆盖 `[BUCKET_LIMIT[b - 1], BUCKET_LIMIT[b])`，桶 0 从 0 开始。
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
  min: f64,
  max: f64,
  count: u64,
  sum: f64,
  sum_sq: f64,
  buckets: [u64; NUM_BUCKET],
}

impl Default for Histogram {
  fn default() -> Self {
    Self::new()
  }
}

impl Histogram {
  /// Create empty histogram / 创建空直方图
  pub const fn new() -> Self {
    Self {
      min: BUCKET_LIMIT[NUM_BUCKET - 1],
      max: 0.,
      count: 0,
      sum: 0.,
      sum_sq: 0.,
      buckets: [0; NUM_BUCKET],
    }
  }

  /// Index of the bucket holding `value` / `value` 所在桶的下标
  #[inline]
  pub fn bucket_of(value: f64) -> usize {
    // Linear scan, the table is small
    // 线性扫描，表很小
    let mut b = 0;
    while b < NUM_BUCKET - 1 && BUCKET_LIMIT[b] <= value {
      b += 1;
    }
    b
  }

  /// Record one value / 记录一个值
  pub fn add(&mut self, value: f64) {
    self.buckets[Self::bucket_of(value)] += 1;
    if self.min > value {
      self.min = value;
    }
    if self.max < value {
      self.max = value;
    }
    self.count += 1;
    self.sum += value;
    self.sum_sq += value * value;
  }

  /// Fold `other` into self, `other` is left untouched
  /// 将 `other` 合并到自身，不修改 `other`
  pub fn merge(&mut self, other: &Histogram) {
    // Empty sentinels (min = top limit, max = 0) are neutral here
    // 空直方图的哨兵值（min = 最大上界, max = 0）在此不影响结果
    self.min = self.min.min(other.min);
    self.max = self.max.max(other.max);
    self.count += other.count;
    self.sum += other.sum;
    self.sum_sq += other.sum_sq;
    for (a, b) in self.buckets.iter_mut().zip(other.buckets.iter()) {
      *a += *b;
    }
  }

  /// Reset to empty / 重置为空
  pub fn clear(&mut self) {
    *self = Self::new();
  }

  /// Interpolated value at percentile `p` in `[0, 100]`
  /// 百分位 `p`（`[0, 100]`）处的插值结果
  pub fn percentile(&self, p: f64) -> f64 {
    if self.count == 0 {
      return 0.;
    }
    let threshold = self.count as f64 * (p / 100.);
    let mut sum = 0u64;
    for (b, &n) in self.buckets.iter().enumerate() {
      sum += n;
      if sum as f64 >= threshold {
        let left_point = if b == 0 { 0. } else { BUCKET_LIMIT[b - 1] };
        let right_point = BUCKET_LIMIT[b];
        let left_sum = (sum - n) as f64;
        let pos = if n == 0 {
          0.
        } else {
          (threshold - left_sum) / n as f64
        };
        let r = left_point + (right_point - left_point) * pos;
        return r.clamp(self.min, self.max);
      }
    }
    self.max
  }

  #[inline]
  pub fn median(&self) -> f64 {
    self.percentile(50.)
  }

  pub fn average(&self) -> f64 {
    if self.count == 0 {
      return 0.;
    }
    self.sum / self.count as f64
  }

  /// Population standard deviation / 总体标准差
  pub fn std_dev(&self) -> f64 {
    if self.count == 0 {
      return 0.;
    }
    let n = self.count as f64;
    let variance = (self.sum_sq * n - self.sum * self.sum) / (n * n);
    // Rounding can push a zero variance slightly negative
    // 舍入误差可能使零方差略小于 0
    variance.max(0.).sqrt()
  }

  /// Smallest value, 0 when empty / 最小值，为空时返回 0
  pub fn min(&self) -> f64 {
    if self.count == 0 { 0. } else { self.min }
  }

  pub fn max(&self) -> f64 {
    self.max
  }

  pub fn count(&self) -> u64 {
    self.count
  }

  pub fn sum(&self) -> f64 {
    self.sum
  }

  pub fn sum_sq(&self) -> f64 {
    self.sum_sq
  }

  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  /// Per-bucket counts / 各桶计数
  pub fn buckets(&self) -> &[u64; NUM_BUCKET] {
    &self.buckets
  }
}

impl fmt::Display for Histogram {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    LatencyStats::from(self).fmt(f)
  }
}
