//! Writes a search stream to output, one path per line.

use std::io::{self, Write};

use crate::entry::Volume;
use crate::results::SearchEvent;

/// What the sink wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSummary {
    pub written: usize,
    pub failed_volumes: usize,
}

/// Stream every event: matched paths to `out`, volume failures to `diag` as
/// `searchfs: <mountPath>: <error>`.
///
/// Each path is written as soon as it arrives.
///
/// # Errors
///
/// The first write error on `out`. Callers treat
/// [`io::ErrorKind::BrokenPipe`] as a reader that has seen enough.
pub fn write_results<W, D>(
    events: impl IntoIterator<Item = SearchEvent>,
    out: &mut W,
    diag: &mut D,
) -> io::Result<SinkSummary>
where
    W: Write,
    D: Write,
{
    let mut summary = SinkSummary::default();
    for event in events {
        match event {
            SearchEvent::Match(path) => {
                writeln!(out, "{}", path.display())?;
                summary.written += 1;
            }
            SearchEvent::VolumeFailed { volume, error } => {
                summary.failed_volumes += 1;
                // Diagnostics are best-effort; a closed stderr must not stop results.
                let _ = writeln!(diag, "searchfs: {}: {error}", volume.mount_path.display());
            }
        }
    }
    out.flush()?;
    Ok(summary)
}

/// Write the `--list` output: one `<deviceId>: <mountPath>` line per volume.
pub fn write_volume_list<W: Write>(volumes: &[Volume], out: &mut W) -> io::Result<()> {
    for volume in volumes {
        writeln!(out, "{volume}")?;
    }
    out.flush()
}
