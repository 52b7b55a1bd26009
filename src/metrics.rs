//! Host metrics for the dashboard's system page
//!
//! Everything is read from procfs except the root filesystem usage, which
//! comes from `df`. Network throughput needs the previous sample, which is
//! owned by [`NetSampler`] rather than kept in process-wide state.

use crate::command::CommandRunner;
use crate::config::MetricsConfig;
use crate::error::MetricsError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemStats {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub network: NetworkStats,
    pub filesystem: FsStats,
}

/// CPU load split, in percent of elapsed jiffies
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuStats {
    pub usage: f64,
    pub sys: f64,
    pub user: f64,
    pub iowait: f64,
    pub steal: f64,
    pub cores: usize,
    pub idle: f64,
    /// Human-readable, e.g. `6d2h10m`
    pub uptime: String,
    /// 1, 5 and 15 minute load averages
    pub load: [f64; 3],
}

/// Memory figures in MB
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub free: u64,
    pub used: u64,
    pub page_cache: u64,
    /// Percent of total
    pub usage: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub rx_speed: String,
    pub tx_speed: String,
    pub rx_total: String,
    pub tx_total: String,
    pub retrans: u64,
    pub active: u64,
    pub passive: u64,
    pub fails: u64,
    pub interfaces: usize,
}

/// Root filesystem usage in MB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FsStats {
    pub name: String,
    pub used: u64,
    pub total: u64,
}

/// Cumulative jiffies from the aggregate `cpu` line of /proc/stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
}

impl CpuTimes {
    /// Parse `cpu  22573 54 9812 129876 140 0 37 0 12`
    pub fn parse(stat: &str) -> Option<Self> {
        let line = stat.lines().find(|line| line.starts_with("cpu "))?;
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|f| f.parse().unwrap_or(0))
            .collect();
        if fields.len() < 7 {
            return None;
        }
        Some(Self {
            user: fields[0],
            nice: fields[1],
            system: fields[2],
            idle: fields[3],
            iowait: fields[4],
            irq: fields[5],
            softirq: fields[6],
            steal: fields.get(7).copied().unwrap_or(0),
        })
    }

    fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Fill the percentage fields of `cpu` from two samples.
///
/// Leaves them at zero when no time has passed between the samples.
pub fn apply_cpu_delta(cpu: &mut CpuStats, before: &CpuTimes, after: &CpuTimes) {
    let total = after.total().saturating_sub(before.total());
    if total == 0 {
        return;
    }
    let delta = |a: u64, b: u64| a.saturating_sub(b) as f64;
    let pct = |v: f64| 100.0 * v / total as f64;

    let idle = delta(after.idle, before.idle) + delta(after.iowait, before.iowait);
    cpu.usage = pct(total as f64 - idle);
    cpu.user = pct(delta(after.user, before.user) + delta(after.nice, before.nice));
    cpu.sys = pct(
        delta(after.system, before.system)
            + delta(after.irq, before.irq)
            + delta(after.softirq, before.softirq),
    );
    cpu.iowait = pct(delta(after.iowait, before.iowait));
    cpu.steal = pct(delta(after.steal, before.steal));
    cpu.idle = pct(idle);
}

pub fn count_cores(cpuinfo: &str) -> usize {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count()
        .max(1)
}

pub fn parse_meminfo(meminfo: &str) -> MemoryStats {
    let mut total = 0;
    let mut free = 0;
    let mut buffers = 0;
    let mut cached = 0;

    for line in meminfo.lines() {
        let mut fields = line.split_whitespace();
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        let kb: u64 = value.parse().unwrap_or(0);
        match key {
            "MemTotal:" => total = kb,
            "MemFree:" => free = kb,
            "Buffers:" => buffers = kb,
            "Cached:" => cached = kb,
            _ => {}
        }
    }

    let used = total.saturating_sub(free + buffers + cached);
    MemoryStats {
        free: free / 1024,
        used: used / 1024,
        page_cache: (buffers + cached) / 1024,
        usage: if total > 0 { used * 100 / total } else { 0 },
    }
}

pub fn parse_loadavg(loadavg: &str) -> Option<[f64; 3]> {
    let fields: Vec<f64> = loadavg
        .split_whitespace()
        .take(3)
        .map(|f| f.parse().unwrap_or(0.0))
        .collect();
    match fields.as_slice() {
        [one, five, fifteen] => Some([*one, *five, *fifteen]),
        _ => None,
    }
}

/// Whole seconds from /proc/uptime
pub fn parse_uptime(uptime: &str) -> Option<u64> {
    let seconds: f64 = uptime.split_whitespace().next()?.parse().ok()?;
    Some(seconds as u64)
}

/// Render seconds as `1d2h30m`, dropping zero units
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if mins > 0 {
        out.push_str(&format!("{}m", mins));
    }
    if out.is_empty() {
        out.push_str("0m");
    }
    out
}

/// First data row of `df -m`
pub fn parse_df(output: &str) -> Option<FsStats> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("Filesystem"))
        .find_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            Some(FsStats {
                name: fields[0].to_string(),
                total: fields[1].parse().unwrap_or(0),
                used: fields[2].parse().unwrap_or(0),
            })
        })
}

/// Byte counters summed over all interfaces in /proc/net/dev
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetTotals {
    pub rx: u64,
    pub tx: u64,
    pub interfaces: usize,
}

impl NetTotals {
    pub fn parse(net_dev: &str) -> Self {
        let mut totals = Self::default();
        for line in net_dev.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("Inter-") || line.starts_with("face") {
                continue;
            }
            totals.interfaces += 1;

            let Some((_, counters)) = line.split_once(':') else {
                continue;
            };
            let fields: Vec<&str> = counters.split_whitespace().collect();
            if fields.len() < 9 {
                continue;
            }
            totals.rx += fields[0].parse::<u64>().unwrap_or(0);
            totals.tx += fields[8].parse::<u64>().unwrap_or(0);
        }
        totals
    }
}

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// `12.3 M`, `1.2 G`, `512 B`
pub fn format_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    if b >= GB {
        format!("{:.1} G", b / GB)
    } else if b >= MB {
        format!("{:.1} M", b / MB)
    } else if b >= KB {
        format!("{:.1} K", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// `123.0 K/s`, `1.2 M/s`, `0 B/s`
pub fn format_speed(bps: f64) -> String {
    if bps >= GB {
        format!("{:.1} G/s", bps / GB)
    } else if bps >= MB {
        format!("{:.1} M/s", bps / MB)
    } else if bps >= KB {
        format!("{:.1} K/s", bps / KB)
    } else {
        format!("{:.0} B/s", bps)
    }
}

#[derive(Debug, Clone, Copy)]
struct NetSample {
    rx: u64,
    tx: u64,
    at: Instant,
}

/// Previous network counters, shared by concurrent `/system-stats` requests
#[derive(Debug, Default)]
pub struct NetSampler {
    previous: Mutex<Option<NetSample>>,
}

impl NetSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `totals` taken at `now` and return (rx, tx) bytes per second
    /// since the previous sample. The first sample yields zero rates.
    pub fn rates(&self, totals: &NetTotals, now: Instant) -> (f64, f64) {
        let mut previous = self.previous.lock().unwrap_or_else(|e| e.into_inner());

        let rates = match *previous {
            Some(prev) => {
                let dt = now.saturating_duration_since(prev.at).as_secs_f64();
                if dt > 0.0 {
                    (
                        totals.rx.saturating_sub(prev.rx) as f64 / dt,
                        totals.tx.saturating_sub(prev.tx) as f64 / dt,
                    )
                } else {
                    (0.0, 0.0)
                }
            }
            None => (0.0, 0.0),
        };

        *previous = Some(NetSample {
            rx: totals.rx,
            tx: totals.tx,
            at: now,
        });
        rates
    }
}

/// Collects [`SystemStats`] from a procfs root
pub struct HostMetrics {
    proc_root: PathBuf,
    cpu_sample: Duration,
    sampler: NetSampler,
}

impl HostMetrics {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            proc_root: config.proc_root.clone(),
            cpu_sample: Duration::from_millis(config.cpu_sample_ms),
            sampler: NetSampler::new(),
        }
    }

    async fn read(&self, name: &str) -> Result<String, MetricsError> {
        let path = self.proc_root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| MetricsError::Read { path, source })
    }

    fn format_error(&self, name: &str) -> MetricsError {
        MetricsError::Format {
            path: self.proc_root.join(name),
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    pub async fn collect(&self, runner: &dyn CommandRunner) -> Result<SystemStats, MetricsError> {
        let mut stats = SystemStats::default();

        let before = CpuTimes::parse(&self.read("stat").await?)
            .ok_or_else(|| self.format_error("stat"))?;
        tokio::time::sleep(self.cpu_sample).await;
        let after = CpuTimes::parse(&self.read("stat").await?)
            .ok_or_else(|| self.format_error("stat"))?;
        apply_cpu_delta(&mut stats.cpu, &before, &after);

        stats.cpu.cores = match self.read("cpuinfo").await {
            Ok(cpuinfo) => count_cores(&cpuinfo),
            Err(e) => {
                tracing::debug!("{}", e);
                1
            }
        };

        stats.memory = parse_meminfo(&self.read("meminfo").await?);

        stats.cpu.load = parse_loadavg(&self.read("loadavg").await?)
            .ok_or_else(|| self.format_error("loadavg"))?;

        let uptime = parse_uptime(&self.read("uptime").await?)
            .ok_or_else(|| self.format_error("uptime"))?;
        stats.cpu.uptime = format_uptime(uptime);

        match runner.run("df -m /").await {
            Ok(output) => stats.filesystem = parse_df(&output.text).unwrap_or_default(),
            Err(e) => tracing::warn!("Filesystem stats unavailable: {}", e),
        }

        let totals = NetTotals::parse(&self.read("net/dev").await?);
        let (rx_rate, tx_rate) = self.sampler.rates(&totals, Instant::now());
        stats.network.interfaces = totals.interfaces;
        stats.network.rx_total = format_bytes(totals.rx);
        stats.network.tx_total = format_bytes(totals.tx);
        stats.network.rx_speed = format_speed(rx_rate);
        stats.network.tx_speed = format_speed(tx_rate);

        Ok(stats)
    }
}
