//! The Trace collaborator (spec.md §6): structured begin/end events per
//! tick and per worker burn. Out of core scope per spec.md §1, but wired
//! through so the Scheduler and Harness have somewhere real to report to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::timing::RawTimespec;

/// A trace channel: either a Task's id (`0..task_count`) or an algorithm
/// id (`>= task_count`), per spec.md's "channel encodes either a Task id
/// or an algorithm id".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Task(u32),
    Algo(u32),
}

impl Channel {
    fn raw(self, task_count: u32) -> u32 {
        match self {
            Channel::Task(id) => id,
            Channel::Algo(id) => task_count + id,
        }
    }
}

/// Minimum API a Trace collaborator must provide.
pub trait TraceSink: Send + Sync {
    fn trace_begin(&self, channel: Channel);
    fn trace_end(&self, channel: Channel);
}

/// Discards every event. The default sink for test scenarios that don't
/// care about tracing output.
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn trace_begin(&self, _channel: Channel) {}
    fn trace_end(&self, _channel: Channel) {}
}

/// Emits `tracing` events — this crate's logging path (SPEC_FULL.md §6).
/// Enable with `RUST_LOG=qnx_rtsched=trace`.
#[derive(Debug, Default)]
pub struct TracingSink {
    task_count: u32,
}

impl TracingSink {
    pub fn new(task_count: u32) -> Self {
        Self { task_count }
    }
}

impl TraceSink for TracingSink {
    fn trace_begin(&self, channel: Channel) {
        tracing::trace!(channel = channel.raw(self.task_count), "begin");
    }

    fn trace_end(&self, channel: Channel) {
        tracing::trace!(channel = channel.raw(self.task_count), "end");
    }
}

/// One CSV-ready trace record: `(seq, channel, sec, nsec)`.
#[derive(Debug, Clone, Copy)]
pub struct TraceRecord {
    pub seq: u64,
    pub channel: u32,
    pub sec: i64,
    pub nsec: i64,
}

/// Buffers records for later export, matching spec.md's "CSV mode...
/// each event records (seq, channel, sec, nsec)".
#[derive(Debug, Default)]
pub struct CsvSink {
    task_count: u32,
    seq: AtomicU64,
    records: Mutex<Vec<TraceRecord>>,
}

impl CsvSink {
    pub fn new(task_count: u32) -> Self {
        Self {
            task_count,
            seq: AtomicU64::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, channel: Channel) {
        let ts = RawTimespec::now();
        let record = TraceRecord {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            channel: channel.raw(self.task_count),
            sec: ts.sec,
            nsec: ts.nsec,
        };
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    /// Render buffered records as CSV lines (`seq,channel,sec,nsec`).
    pub fn to_csv(&self) -> String {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = String::from("seq,channel,sec,nsec\n");
        for r in records.iter() {
            out.push_str(&format!("{},{},{},{}\n", r.seq, r.channel, r.sec, r.nsec));
        }
        out
    }
}

impl TraceSink for CsvSink {
    fn trace_begin(&self, channel: Channel) {
        self.push(channel);
    }

    fn trace_end(&self, channel: Channel) {
        self.push(channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_raw_encodes_algo_above_task_range() {
        assert_eq!(Channel::Task(2).raw(5), 2);
        assert_eq!(Channel::Algo(0).raw(5), 5);
        assert_eq!(Channel::Algo(1).raw(5), 6);
    }

    #[test]
    fn csv_sink_accumulates_in_order() {
        let sink = CsvSink::new(3);
        sink.trace_begin(Channel::Task(0));
        sink.trace_end(Channel::Task(0));
        sink.trace_begin(Channel::Algo(0));
        let csv = sink.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4); // header + 3 records
        assert!(lines[1].starts_with("0,0,"));
        assert!(lines[2].starts_with("1,0,"));
        assert!(lines[3].starts_with("2,3,"));
    }
}
