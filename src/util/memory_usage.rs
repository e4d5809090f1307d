use log::{info, warn};
use psutil::process::os::linux::ProcessExt;
use std::fmt::Arguments;

const BYTES_IN_GB: f64 = 1024_f64 * 1024_f64 * 1024_f64;

/// Logs the resident memory of the process. The O(N) structures of the PageRank engine are the
/// dominant cost, so this is called once they are built.
#[allow(clippy::cast_precision_loss)]
pub fn print_memory_usage(msg: Arguments) {
    let statm = psutil::process::Process::new(std::process::id())
        .and_then(|process| process.procfs_statm());
    match statm {
        Ok(mem) => info!(
            "Memory usage: total = {:.6} GB, rss = {:.6} GB [{}]",
            mem.size as f64 / BYTES_IN_GB,
            mem.resident as f64 / BYTES_IN_GB,
            msg
        ),
        Err(e) => warn!("Could not read memory usage [{}]: {}", msg, e),
    }
}
