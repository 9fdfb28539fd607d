#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

mod histogram_prop {
  use db_bench::Histogram;
  use proptest::prelude::*;

  fn build(values: &[f64]) -> Histogram {
    let mut h = Histogram::new();
    for &v in values {
      h.add(v);
    }
    h
  }

  fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0f64..1e7, 0..300)
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// count equals number of adds and the bucket total
    /// count 等于 add 次数，也等于各桶之和
    #[test]
    fn prop_count_matches_buckets(vals in values()) {
      let h = build(&vals);
      prop_assert_eq!(h.count(), vals.len() as u64);
      prop_assert_eq!(h.buckets().iter().sum::<u64>(), vals.len() as u64);
    }

    /// Percentile(0) is min, Percentile(100) is max, results stay in range and ordered
    /// P0 为最小值，P100 为最大值，结果在范围内且有序
    #[test]
    fn prop_percentile_bounds(vals in prop::collection::vec(0f64..1e7, 1..300)) {
      let h = build(&vals);
      let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
      let max = vals.iter().copied().fold(0., f64::max);
      prop_assert_eq!(h.min(), min);
      prop_assert_eq!(h.max(), max);
      prop_assert_eq!(h.percentile(0.), min);
      prop_assert!((h.percentile(100.) - max).abs() <= 1e-9 * max.max(1.));

      let mut last = min;
      for p in [10., 25., 50., 75., 90., 99., 99.9] {
        let v = h.percentile(p);
        prop_assert!(v >= min && v <= max, "p{p}={v} not in [{min}, {max}]");
        prop_assert!(v >= last, "p{p}={v} < {last}");
        last = v;
      }
    }

    /// Additive fields of merge are associative and commutative
    /// merge 的可加字段满足结合律与交换律
    #[test]
    fn prop_merge_assoc_commut(a in values(), b in values(), c in values()) {
      let (ha, hb, hc) = (build(&a), build(&b), build(&c));

      let mut left = ha.clone();
      left.merge(&hb);
      left.merge(&hc);

      let mut bc = hb.clone();
      bc.merge(&hc);
      let mut right = ha.clone();
      right.merge(&bc);

      let mut rev = hc.clone();
      rev.merge(&hb);
      rev.merge(&ha);

      for other in [&right, &rev] {
        prop_assert_eq!(left.count(), other.count());
        prop_assert_eq!(left.buckets(), other.buckets());
        prop_assert_eq!(left.min(), other.min());
        prop_assert_eq!(left.max(), other.max());
        let tol = 1e-9 * left.sum_sq().max(1.);
        prop_assert!((left.sum() - other.sum()).abs() <= tol);
        prop_assert!((left.sum_sq() - other.sum_sq()).abs() <= tol);
      }

      // Merging equals adding everything into one histogram
      // 合并等价于将所有值加入同一直方图
      let all: Vec<f64> = a.iter().chain(&b).chain(&c).copied().collect();
      let whole = build(&all);
      prop_assert_eq!(whole.count(), left.count());
      prop_assert_eq!(whole.buckets(), left.buckets());
      prop_assert_eq!(whole.min(), left.min());
      prop_assert_eq!(whole.max(), left.max());
    }

    /// std_dev never NaN and average stays within [min, max]
    /// 标准差不为 NaN，平均值位于 [min, max]
    #[test]
    fn prop_moments(vals in values()) {
      let h = build(&vals);
      prop_assert!(!h.std_dev().is_nan());
      prop_assert!(h.std_dev() >= 0.);
      if !vals.is_empty() {
        let avg = h.average();
        prop_assert!(avg >= h.min() - 1e-6 && avg <= h.max() + 1e-6);
      } else {
        prop_assert_eq!(h.average(), 0.);
        prop_assert_eq!(h.std_dev(), 0.);
      }
    }
  }
}

mod stats_prop {
  use db_bench::Stats;
  use proptest::prelude::*;

  fn stats(ops: u64, bytes: i64, msg: &str) -> Stats {
    let mut s = Stats::new(false, false);
    for _ in 0..ops {
      s.finished_single_op();
    }
    s.add_bytes(bytes);
    s.add_msg(msg);
    s.stop();
    s
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Merge order does not change ops, bytes or elapsed sums
    /// 合并顺序不影响操作数、字节数与耗时之和
    #[test]
    fn prop_merge_order_independent(
      parts in prop::collection::vec((0u64..2000, -1000i64..1_000_000), 1..8),
      rotate in 0usize..8,
    ) {
      let all: Vec<Stats> = parts.iter().map(|&(o, b)| stats(o, b, "")).collect();

      let mut fwd = all[0].clone();
      for s in &all[1..] {
        fwd.merge(s);
      }

      let mut order: Vec<&Stats> = all.iter().rev().collect();
      let k = rotate % order.len();
      order.rotate_left(k);
      let mut other = order[0].clone();
      for s in &order[1..] {
        other.merge(s);
      }

      let ops: u64 = parts.iter().map(|p| p.0).sum();
      let bytes: i64 = parts.iter().map(|p| p.1).sum();
      prop_assert_eq!(fwd.done(), ops);
      prop_assert_eq!(other.done(), ops);
      prop_assert_eq!(fwd.bytes(), bytes);
      prop_assert_eq!(other.bytes(), bytes);
      prop_assert!((fwd.seconds() - other.seconds()).abs() < 1e-9);
      prop_assert_eq!(fwd.start_micros(), other.start_micros());
      prop_assert_eq!(fwd.finish_micros(), other.finish_micros());
    }
  }

  #[test]
  fn merge_keeps_first_message() {
    let mut a = stats(1, 0, "");
    a.merge(&stats(1, 0, "(first)"));
    a.merge(&stats(1, 0, "(second)"));
    assert_eq!(a.msg(), "(first)");
  }
}
