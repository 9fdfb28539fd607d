// Benchmark driver: sequences workloads over a worker pool
// 基准测试驱动：在工作线程池上依次运行工作负载

use std::{io::Write, thread};

use defer_lite::defer;
use log::{debug, info, warn};

use crate::{
  Conf, Error, Report, Result, Shared, Stats, ThreadState,
  store::{IterOpt, Store},
  workload::{Ctx, Method, Workload},
};

/// Run one worker: check in, execute, check out
/// 运行一个工作线程：登记、执行、完成登记
fn thread_body<S: Store>(
  ctx: &Ctx<'_, S>,
  shared: &Shared,
  mut ts: ThreadState,
  method: Method<S>,
) -> (ThreadState, Result<()>) {
  shared.enter();
  // Check out even if the workload panics, or the orchestrator waits forever
  // 即使工作负载 panic 也要完成登记，否则编排线程会永远等待
  defer! { shared.exit(); }

  ts.stats.start();
  let r = method(ctx, &mut ts);
  ts.stats.stop();
  (ts, r)
}

/// Spawn one worker per seed, release them together, merge their stats
/// 为每个种子启动一个工作线程，统一放行并合并统计
pub fn dispatch<S: Store>(
  name: &str,
  ctx: &Ctx<'_, S>,
  seeds: &[u64],
  method: Method<S>,
  hist: bool,
  progress: bool,
) -> Result<Stats> {
  let shared = Shared::new(seeds.len())?;
  let shared = &shared;

  let joined = thread::scope(|s| {
    let handles: Vec<_> = seeds
      .iter()
      .enumerate()
      .map(|(tid, &seed)| {
        let ts = ThreadState::new(tid, seed, hist, progress);
        s.spawn(move || thread_body(ctx, shared, ts, method))
      })
      .collect();

    shared.release();
    shared.join();
    handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
  });

  let mut merged: Option<Stats> = None;
  for r in joined {
    let (ts, r) = r.map_err(|_| Error::WorkerPanic {
      name: name.to_owned(),
    })?;
    r?;
    match &mut merged {
      Some(m) => m.merge(&ts.stats),
      None => merged = Some(ts.stats),
    }
  }
  merged.ok_or(Error::NoThreads)
}

/// Runs the configured workloads against one store
/// 在一个存储上运行配置的工作负载
pub struct Driver<S: Store> {
  conf: Conf,
  db: Option<S>,
  /// Threads created over the whole run, source of worker seeds
  /// 整个运行中创建的线程总数，作为工作线程种子来源
  threads_created: u64,
}

impl<S: Store> Driver<S> {
  /// Open the store, emptying it unless `use_existing_db`
  /// 打开存储，除非 `use_existing_db` 否则清空
  pub fn open(conf: Conf) -> Result<Self> {
    let db = S::open(&conf.store)?;
    if !conf.use_existing_db {
      db.drop_all()?;
    }
    info!("open {} at {}", db.name(), conf.store.path.display());
    Ok(Self {
      conf,
      db: Some(db),
      threads_created: 0,
    })
  }

  pub fn conf(&self) -> &Conf {
    &self.conf
  }

  pub fn db(&self) -> Result<&S> {
    self.db.as_ref().ok_or(Error::Closed)
  }

  pub fn threads_created(&self) -> u64 {
    self.threads_created
  }

  /// Run every configured workload in order / 按顺序运行所有配置的工作负载
  pub fn run(&mut self, out: &mut impl Write) -> Result<Vec<Report>> {
    let names = self.conf.benchmarks.clone();
    let mut reports = Vec::with_capacity(names.len());
    for name in &names {
      if let Some(r) = self.run_named(name, out)? {
        reports.push(r);
      }
    }
    Ok(reports)
  }

  /// Run one workload by name, `None` when skipped
  /// 按名称运行一个工作负载，跳过时返回 `None`
  pub fn run_named(&mut self, name: &str, out: &mut impl Write) -> Result<Option<Report>> {
    if name.is_empty() {
      return Ok(None);
    }
    let Some(workload) = Workload::parse(name) else {
      warn!("unknown benchmark '{name}'");
      return Ok(None);
    };
    let report = self
      .run_workload(workload)
      .map_err(|e| Error::Workload {
        name: name.to_owned(),
        source: Box::new(e),
      })?;
    write!(out, "{report}")?;
    out.flush()?;
    Ok(Some(report))
  }

  pub fn run_workload(&mut self, workload: Workload) -> Result<Report> {
    let plan = workload.plan::<S>();
    if plan.fresh {
      self.reopen(plan.sync)?;
    }

    let threads = plan.threads.unwrap_or(self.conf.threads);
    if threads == 0 {
      return Err(Error::NoThreads);
    }
    // Seeds never repeat within one process run
    // 同一进程运行内种子不会重复
    let seeds: Vec<u64> = (0..threads)
      .map(|_| {
        self.threads_created += 1;
        self.conf.seed_base + self.threads_created
      })
      .collect();

    let conf = &self.conf;
    let db = self.db.as_ref().ok_or(Error::Closed)?;
    let ctx = Ctx {
      db,
      num: conf.num / plan.num_div,
      key_space: conf.num,
      reads: conf.reads(),
      value_size: plan.value_size.unwrap_or(conf.value_size),
      entries_per_batch: plan.entries_per_batch.unwrap_or(conf.entries_per_batch),
      iter: IterOpt::new(&conf.store, false),
      discard_ratio: conf.discard_ratio,
    };
    debug!("{workload}: {threads} threads, seeds {seeds:?}");

    let stats = dispatch(
      workload.name(),
      &ctx,
      &seeds,
      plan.method,
      conf.histogram,
      conf.progress,
    )?;
    debug!("{workload}: disk usage {} bytes", db.disk_usage());
    Ok(stats.report(workload.name()))
  }

  /// Close, optionally wipe, and reopen with `sync` overridden
  /// 关闭、可选清空，并以覆盖的 `sync` 重新打开
  fn reopen(&mut self, sync: bool) -> Result<()> {
    if let Some(db) = self.db.take() {
      if !self.conf.use_existing_db {
        db.drop_all()?;
      }
      db.close()?;
    }
    let store = self.conf.store.with_sync(sync || self.conf.store.sync);
    info!("reopen fresh db, sync={}", store.sync);
    self.db = Some(S::open(&store)?);
    Ok(())
  }

  pub fn close(mut self) -> Result<()> {
    if let Some(db) = self.db.take() {
      db.close()?;
    }
    Ok(())
  }
}
