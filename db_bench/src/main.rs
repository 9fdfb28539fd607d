// db_bench command line
// db_bench 命令行

use std::{
  io::{self, Write},
  path::PathBuf,
  process::ExitCode,
};

use clap::{Parser, ValueEnum};
use db_bench::{Conf, Driver, MemStore, Report, Result, header, store::Store};
use log::error;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
  Mem,
  Rocksdb,
}

/// Concurrent micro-benchmark for key-value stores
#[derive(Parser, Debug)]
#[command(name = "db_bench", version, about)]
struct Args {
  /// JSON config file, flags below override it
  #[arg(long)]
  conf: Option<PathBuf>,

  /// Comma separated workloads, run in order
  #[arg(long)]
  benchmarks: Option<String>,

  /// Number of key/values to place in database
  #[arg(long)]
  num: Option<u64>,

  /// Number of read operations, defaults to --num
  #[arg(long)]
  reads: Option<u64>,

  /// Number of concurrent threads to run
  #[arg(long)]
  threads: Option<usize>,

  /// Size of each value
  #[arg(long = "value_size")]
  value_size: Option<usize>,

  /// Entries per write batch
  #[arg(long)]
  batch: Option<usize>,

  /// Number of bytes to buffer in memtable before compacting
  #[arg(long = "write_buffer_size")]
  write_buffer_size: Option<u64>,

  /// Number of memtables
  #[arg(long = "mem_table_num")]
  mem_table_num: Option<u32>,

  /// Value size threshold for key/value separation
  #[arg(long = "value_threshold")]
  value_threshold: Option<u64>,

  /// Database path
  #[arg(long)]
  db: Option<PathBuf>,

  /// Do not destroy the existing database
  #[arg(long = "use_existing_db")]
  use_existing_db: bool,

  /// Print latency histograms
  #[arg(long)]
  histogram: bool,

  /// Hide the progress indicator
  #[arg(long)]
  quiet: bool,

  /// Write reports as JSON to this file
  #[arg(long)]
  json: Option<PathBuf>,

  #[arg(long, value_enum, default_value_t = Engine::Mem)]
  engine: Engine,
}

impl Args {
  fn conf(&self) -> Result<Conf> {
    let mut conf = match &self.conf {
      Some(path) => Conf::load(path)?,
      None => Conf::default(),
    };
    if let Some(list) = &self.benchmarks {
      conf.benchmarks = Conf::parse_benchmarks(list);
    }
    if let Some(v) = self.num {
      conf.num = v;
    }
    if self.reads.is_some() {
      conf.reads = self.reads;
    }
    if let Some(v) = self.threads {
      conf.threads = v;
    }
    if let Some(v) = self.value_size {
      conf.value_size = v;
    }
    if let Some(v) = self.batch {
      conf.entries_per_batch = v;
    }
    if let Some(v) = self.write_buffer_size {
      conf.store.write_buffer_size = v;
    }
    if let Some(v) = self.mem_table_num {
      conf.store.memtable_num = v;
    }
    if let Some(v) = self.value_threshold {
      conf.store.value_threshold = v;
    }
    if let Some(v) = &self.db {
      conf.store.path.clone_from(v);
    }
    conf.use_existing_db |= self.use_existing_db;
    conf.histogram |= self.histogram;
    if self.quiet {
      conf.progress = false;
    }
    Ok(conf)
  }
}

fn bench<S: Store>(conf: Conf, json: Option<&PathBuf>) -> Result<()> {
  let mut out = io::stdout().lock();
  out.write_all(header::data(&conf).as_bytes())?;

  let mut driver = Driver::<S>::open(conf)?;
  eprint!("{}", header::env(driver.db()?.name()));
  let reports: Vec<Report> = driver.run(&mut out)?;
  driver.close()?;

  if let Some(path) = json {
    std::fs::write(path, sonic_rs::to_string_pretty(&reports)?)?;
  }
  Ok(())
}

fn main() -> ExitCode {
  log_init::init();
  let args = Args::parse();

  let r = args.conf().and_then(|conf| {
    if conf.threads == 0 {
      return Err(db_bench::Error::NoThreads);
    }
    match args.engine {
      Engine::Mem => bench::<MemStore>(conf, args.json.as_ref()),
      #[cfg(feature = "rocksdb")]
      Engine::Rocksdb => bench::<db_bench::RocksStore>(conf, args.json.as_ref()),
      #[cfg(not(feature = "rocksdb"))]
      Engine::Rocksdb => Err(db_bench::Error::EngineMissing("rocksdb")),
    }
  });

  match r {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    }
  }
}
