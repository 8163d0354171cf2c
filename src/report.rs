//! Match report written to stdout

use anyhow::Result;
use chrono::{DateTime, Local};
use matchdex_core::timecode::hms;
use matchdex_core::{IndexSummary, MatchRecord, Reporter, Roster};
use std::io::Write;

const USAGE_HEADER: &str = "Character Appearance in Video";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Csv,
}

pub struct ReportWriter<W: Write> {
    out: W,
    format: ReportFormat,
    numbered: bool,
    started: DateTime<Local>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, format: ReportFormat, numbered: bool) -> Self {
        Self {
            out,
            format,
            numbered,
            started: Local::now(),
        }
    }

    fn write_text(&mut self, record: &MatchRecord, roster: &Roster) -> Result<()> {
        let (p1, p2) = record.names(roster);
        let start = record.start_timestamp();
        let duration = record.duration_timestamp();

        if self.numbered {
            write!(self.out, "{}. ", record.number)?;
        }
        writeln!(self.out, "{start} - {p1} vs {p2} ({duration})")?;
        Ok(())
    }

    /// One row per match, no header. Names are quoted when they contain
    /// separators.
    fn write_csv(&mut self, record: &MatchRecord, roster: &Roster) -> Result<()> {
        let (p1, p2) = record.names(roster);
        let number = record.number.to_string();
        let start = record.start_timestamp();
        let duration = record.duration_timestamp();

        let mut row = Vec::with_capacity(5);
        if self.numbered {
            row.push(number.as_str());
        }
        row.extend([start.as_str(), p1, p2, duration.as_str()]);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut self.out);
        writer.write_record(&row)?;
        writer.flush()?;
        Ok(())
    }

    fn write_usage(&mut self, summary: &IndexSummary, roster: &Roster) -> Result<()> {
        writeln!(self.out, "{USAGE_HEADER}")?;
        writeln!(self.out, "{}", "-".repeat(USAGE_HEADER.len()))?;
        for row in summary.usage.rows(roster) {
            writeln!(self.out, "{}: {}", row.name, row.count)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ReportWriter<W> {
    fn match_completed(&mut self, record: &MatchRecord, roster: &Roster) -> Result<()> {
        match self.format {
            ReportFormat::Text => self.write_text(record, roster)?,
            ReportFormat::Csv => self.write_csv(record, roster)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn finish(&mut self, summary: &IndexSummary, roster: &Roster) -> Result<()> {
        let ended = Local::now();
        let elapsed = (ended - self.started).num_milliseconds().max(0) as f64 / 1000.0;

        writeln!(self.out, "--")?;
        writeln!(self.out, "Total matches: {}", summary.matches.len())?;
        writeln!(self.out, "Processing started: {}", self.started.format(TIME_FORMAT))?;
        writeln!(self.out, "Processing ended:   {}", ended.format(TIME_FORMAT))?;
        writeln!(self.out, "Elapsed: {}", hms(elapsed))?;
        writeln!(self.out)?;
        self.write_usage(summary, roster)?;
        self.out.flush()?;
        Ok(())
    }
}
