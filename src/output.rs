//! Output file bootstrap: naming, header and tick timestamps.

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::error::{Error, Result};

/// First line of every file produced
pub const CSV_HEADER: &str = "Timestamp,Total bytes,Sent bytes,Recv bytes,Total packets,Sent packets,Recv packets,Err in,Err out,Drop in,Drop out,Fifo in,Fifo out\n";

/// `netstats20240131T235959.csv`
pub fn output_file_name<Tz: TimeZone>(created: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("netstats{}.csv", created.format("%Y%m%dT%H%M%S"))
}

/// `20240131T23:59:59.123+0100`
pub fn format_tick_timestamp<Tz: TimeZone>(tick: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    tick.format("%Y%m%dT%H:%M:%S%.3f%z").to_string()
}

/// Create a fresh output file in `dir`, write the header and sync it to disk
/// before handing the file back.
pub fn create_output<Tz: TimeZone>(dir: &Path, created: &DateTime<Tz>) -> Result<(PathBuf, File)>
where
    Tz::Offset: Display,
{
    let path = dir.join(output_file_name(created));
    let wrap = |source| Error::Output {
        path: path.clone(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(wrap)?;
    file.write_all(CSV_HEADER.as_bytes()).map_err(wrap)?;
    file.sync_all().map_err(wrap)?;

    tracing::info!(path = %path.display(), "created output file");
    Ok((path, file))
}
