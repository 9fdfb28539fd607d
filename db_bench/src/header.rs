// Report header: environment and data shape
// 报告头：运行环境与数据规模

use humansize::{BINARY, format_size};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::{Conf, keygen::KEY_SIZE};

/// CPU description for the diagnostic stream / 用于诊断输出的 CPU 描述
pub fn env(engine: &str) -> String {
  let sys =
    System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()));
  let cpus = sys.cpus();
  let brand = cpus.first().map(|c| c.brand().trim()).unwrap_or("unknown");
  format!(
    "Engine:      {engine}\nCPU:         {} * {brand}\n",
    cpus.len()
  )
}

/// Key/value shape for the report stream / 用于报告输出的键值规模
pub fn data(conf: &Conf) -> String {
  let raw = (KEY_SIZE + conf.value_size) as u64 * conf.num;
  format!(
    "Keys:        {KEY_SIZE} bytes each\n\
     Values:      {} bytes each\n\
     Entries:     {}\n\
     Threads:     {}\n\
     RawSize:     {} (estimated)\n\
     ------------------------------------------------\n",
    conf.value_size,
    conf.num,
    conf.threads,
    format_size(raw, BINARY)
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_data() {
    let conf = Conf {
      num: 1024,
      value_size: 1008,
      ..Conf::default()
    };
    let s = data(&conf);
    assert!(s.contains("Keys:        16 bytes each\n"), "{s}");
    assert!(s.contains("Entries:     1024\n"), "{s}");
    assert!(s.contains("RawSize:     1 MiB"), "{s}");
  }

  #[test]
  fn test_env() {
    assert!(env("mem").starts_with("Engine:      mem\nCPU:"));
  }
}
