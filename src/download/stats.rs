//! Per-run download statistics

use std::fmt;

/// Counters collected while a download run pages through results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Result pages requested
    pub pages_fetched: u32,

    /// Pages that decoded to no records
    pub empty_pages: u32,

    /// Pages whose body could not be decoded
    pub malformed_pages: u32,

    /// Records looked at
    pub records_seen: u64,

    /// Records skipped because the image could not be fetched
    pub fetch_failures: u64,

    /// Records skipped because the file could not be written
    pub write_failures: u64,

    /// Files written
    pub downloaded: u64,
}

impl DownloadStats {
    /// Total number of records that were skipped
    pub fn skipped(&self) -> u64 {
        self.fetch_failures + self.write_failures
    }
}

impl fmt::Display for DownloadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded from {} records on {} pages ({} fetch failures, {} write failures, {} empty pages, {} malformed pages)",
            self.downloaded,
            self.records_seen,
            self.pages_fetched,
            self.fetch_failures,
            self.write_failures,
            self.empty_pages,
            self.malformed_pages
        )
    }
}
