use std::io::Write;

use crate::domain::SignalGroup;
use crate::ports::signals::{SignalSink, SinkError};

/// Writes each signal group as one JSON line
pub struct JsonLinesSink<W> {
    writer: W,
    written: u64,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> SignalSink for JsonLinesSink<W> {
    fn on_signal_group(&mut self, group: &SignalGroup) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, group)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_writes_one_line_per_group() {
        let at = Utc.with_ymd_and_hms(2019, 6, 3, 14, 0, 0).unwrap();
        let group = SignalGroup::pair("XOM".into(), "BP".into(), Direction::Up, at, Duration::hours(2));

        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_signal_group(&group).unwrap();
        sink.on_signal_group(&group).unwrap();
        assert_eq!(sink.written(), 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["signals"][0]["instrument"], "XOM");
        assert_eq!(value["signals"][0]["direction"], "up");
        assert_eq!(value["signals"][1]["direction"], "down");
        assert_eq!(value["signals"][1]["expires_at"], "2019-06-03T16:00:00Z");
    }
}
