//! Plain-text rendering of reports
//!
//! Results go to the writer passed in, which the binary points at stdout.
//! Diagnostics are never written here.

use crate::crawler::SearchHit;
use crate::output::Report;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Writes one `<url>\t<bytes>` line per captured page, then the total
pub fn write_pages<W: Write>(out: &mut W, report: &Report<BTreeMap<String, String>>) -> io::Result<()> {
    for (url, markup) in &report.result {
        writeln!(out, "{}\t{}", url, markup.len())?;
    }
    writeln!(out, "Total: {}", report.result.len())
}

/// Writes one collected item per line, then the total
pub fn write_items<W: Write>(out: &mut W, report: &Report<Vec<String>>) -> io::Result<()> {
    for item in &report.result {
        writeln!(out, "{}", item)?;
    }
    writeln!(out, "Total: {}", report.result.len())
}

/// Writes search hits grouped by term, one snippet per line
pub fn write_search_hits<W: Write>(out: &mut W, hits: &[SearchHit]) -> io::Result<()> {
    for hit in hits {
        writeln!(out, "[{}] {}", hit.term, hit.url)?;
        for snippet in &hit.snippets {
            writeln!(out, "  ...{}...", snippet)?;
        }
    }
    Ok(())
}
