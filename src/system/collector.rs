use std::fs;
use std::path::PathBuf;

use sysinfo::Networks;

use crate::error::{Error, Result};
use crate::system::network::CounterSnapshot;

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Something that can report the current cumulative network counters,
/// summed across all interfaces.
pub trait CounterSource: Send {
    fn sample(&mut self) -> Result<CounterSnapshot>;
}

/// Pick the most complete counter source for this platform
pub fn default_source() -> Box<dyn CounterSource> {
    if cfg!(target_os = "linux") {
        Box::new(ProcNetDev::new())
    } else {
        Box::new(SysinfoNetworks::new())
    }
}

/// Linux counter source backed by `/proc/net/dev`.
///
/// This is the only source that exposes drop and FIFO counters.
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    pub fn new() -> Self {
        Self::with_path(PROC_NET_DEV)
    }

    /// Read from an alternative file with the same layout (used by tests)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for ProcNetDev {
    fn sample(&mut self) -> Result<CounterSnapshot> {
        let content = fs::read_to_string(&self.path).map_err(Error::CounterSource)?;
        parse_net_dev(&content)
    }
}

/// Sum every interface listed in `/proc/net/dev` text.
///
/// Layout after the two header lines, one interface per line:
/// `name: rx_bytes rx_packets rx_errs rx_drop rx_fifo rx_frame rx_compressed rx_multicast
///        tx_bytes tx_packets tx_errs tx_drop tx_fifo tx_colls tx_carrier tx_compressed`
pub fn parse_net_dev(content: &str) -> Result<CounterSnapshot> {
    let mut total = CounterSnapshot::default();
    let mut interfaces = 0usize;

    for (idx, line) in content.lines().enumerate().skip(2) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Old kernels print "eth0:1234" with no space once the counter gets wide
        let (_name, counters) = line.split_once(':').ok_or_else(|| Error::MalformedNetDev {
            line: idx + 1,
            reason: "missing ':' after interface name".into(),
        })?;

        let values = counters
            .split_whitespace()
            .map(|v| v.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::MalformedNetDev {
                line: idx + 1,
                reason: e.to_string(),
            })?;
        if values.len() < 16 {
            return Err(Error::MalformedNetDev {
                line: idx + 1,
                reason: format!("expected 16 counters, found {}", values.len()),
            });
        }

        total.accumulate(&CounterSnapshot {
            bytes_recv: values[0],
            packets_recv: values[1],
            err_in: values[2],
            drop_in: values[3],
            fifo_in: values[4],
            bytes_sent: values[8],
            packets_sent: values[9],
            err_out: values[10],
            drop_out: values[11],
            fifo_out: values[12],
        });
        interfaces += 1;
    }

    if interfaces == 0 {
        return Err(Error::NoInterfaces);
    }
    Ok(total)
}

/// Portable counter source using the `sysinfo` crate.
///
/// sysinfo has no drop or FIFO counters, so those columns stay at zero.
pub struct SysinfoNetworks {
    networks: Networks,
}

impl SysinfoNetworks {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoNetworks {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoNetworks {
    fn sample(&mut self) -> Result<CounterSnapshot> {
        // true = forget interfaces that disappeared
        self.networks.refresh(true);

        let mut total = CounterSnapshot::default();
        let mut interfaces = 0usize;
        for (_name, data) in self.networks.iter() {
            total.accumulate(&CounterSnapshot {
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
                err_in: data.total_errors_on_received(),
                err_out: data.total_errors_on_transmitted(),
                ..Default::default()
            });
            interfaces += 1;
        }

        if interfaces == 0 {
            return Err(Error::NoInterfaces);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:    1000      10    0    0    0     0          0         0     1000      10    0    0    0     0       0          0
  eth0: 5000000    4000    1    2    3     0          0         7  2000000    3000    4    5    6     0       0          0
";

    #[test]
    fn sums_all_interfaces() {
        let snap = parse_net_dev(NET_DEV).unwrap();
        assert_eq!(snap.bytes_recv, 5_001_000);
        assert_eq!(snap.bytes_sent, 2_001_000);
        assert_eq!(snap.packets_recv, 4010);
        assert_eq!(snap.packets_sent, 3010);
        assert_eq!((snap.err_in, snap.err_out), (1, 4));
        assert_eq!((snap.drop_in, snap.drop_out), (2, 5));
        assert_eq!((snap.fifo_in, snap.fifo_out), (3, 6));
    }

    #[test]
    fn handles_name_glued_to_counter() {
        let text = "h1\nh2\neth0:10 1 0 0 0 0 0 0 20 2 0 0 0 0 0 0\n";
        let snap = parse_net_dev(text).unwrap();
        assert_eq!(snap.bytes_recv, 10);
        assert_eq!(snap.bytes_sent, 20);
    }

    #[test]
    fn header_only_is_no_interfaces() {
        let header: String = NET_DEV.lines().take(2).map(|l| format!("{l}\n")).collect();
        assert!(matches!(parse_net_dev(&header), Err(Error::NoInterfaces)));
    }

    #[test]
    fn short_line_is_malformed() {
        let text = "h1\nh2\neth0: 1 2 3\n";
        match parse_net_dev(text) {
            Err(Error::MalformedNetDev { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn proc_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NET_DEV.as_bytes()).unwrap();
        let mut source = ProcNetDev::with_path(file.path());
        assert_eq!(source.sample().unwrap().packets_sent, 3010);
    }

    #[test]
    fn proc_source_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ProcNetDev::with_path(dir.path().join("nope"));
        assert!(matches!(source.sample(), Err(Error::CounterSource(_))));
    }
}
