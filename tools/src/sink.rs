//! Per-family output files with size-based rollover.
//!
//! Each family is buffered in memory and written out once its buffer
//! passes the configured limit, rolling over to `<stem>(N+1).<ext>`.

use anyhow::{Context, Result};
use homesim_core::{EmittedEvent, EventPayload, SensorFamily};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const MAX_JSONL_BYTES: usize = 100_000_000;
pub const MAX_STRING_BYTES: usize = 10_000_000;
pub const MAX_ARRAY_BYTES: usize = 10_000_000;

/// In-memory size limits before a buffer is flushed to disk.
#[derive(Debug, Clone, Copy)]
pub struct DataLimits {
    /// Temperature and door/motion JSON lines.
    pub max_jsonl_bytes:  usize,
    /// Humidity/CO2 fixed-width text stream.
    pub max_string_bytes: usize,
    /// Smoke detector struct bytes.
    pub max_array_bytes:  usize,
}

impl Default for DataLimits {
    fn default() -> Self {
        Self {
            max_jsonl_bytes:  MAX_JSONL_BYTES,
            max_string_bytes: MAX_STRING_BYTES,
            max_array_bytes:  MAX_ARRAY_BYTES,
        }
    }
}

struct RollingFile {
    dir:    PathBuf,
    stem:   String,
    ext:    &'static str,
    limit:  usize,
    index:  u32,
    buffer: Vec<u8>,
}

impl RollingFile {
    fn new(dir: &Path, stem: String, ext: &'static str, limit: usize) -> Self {
        Self {
            dir: dir.to_path_buf(),
            stem,
            ext,
            limit: limit.max(1),
            index: 1,
            buffer: Vec::new(),
        }
    }

    fn push(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        if self.buffer.len() >= self.limit {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let path = self.dir.join(format!("{}({}).{}", self.stem, self.index, self.ext));
        std::fs::write(&path, &self.buffer)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        log::debug!("wrote {} bytes to {}", self.buffer.len(), path.display());
        self.buffer.clear();
        self.index += 1;
        Ok(())
    }

    fn files_written(&self) -> u32 {
        self.index - 1
    }
}

pub struct OutputSink {
    temperature: RollingFile,
    door_motion: RollingFile,
    humidity:    RollingFile,
    smoke:       RollingFile,
    pub counts:  HashMap<SensorFamily, u64>,
}

impl OutputSink {
    pub fn create(dir: &Path, name: &str, limits: DataLimits) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
        Ok(Self {
            temperature: RollingFile::new(dir, format!("{name}_temp_data"), "jsonl", limits.max_jsonl_bytes),
            door_motion: RollingFile::new(dir, format!("{name}_door_motion"), "jsonl", limits.max_jsonl_bytes),
            humidity:    RollingFile::new(dir, format!("{name}_co2_humidity_data"), "txt", limits.max_string_bytes),
            smoke:       RollingFile::new(dir, format!("{name}_smoke_detector_data"), "byte", limits.max_array_bytes),
            counts:      HashMap::new(),
        })
    }

    pub fn route(&mut self, event: &EmittedEvent) -> Result<()> {
        *self.counts.entry(event.family).or_default() += 1;
        match &event.payload {
            EventPayload::Temperature(r) => {
                let mut line = serde_json::to_vec(r)?;
                line.push(b'\n');
                self.temperature.push(&line)
            }
            EventPayload::DoorMotion(r) => {
                let mut line = serde_json::to_vec(r)?;
                line.push(b'\n');
                self.door_motion.push(&line)
            }
            EventPayload::HumidityCo2(r) => self.humidity.push(r.text.as_bytes()),
            EventPayload::Smoke(r) => self.smoke.push(&r.bytes),
        }
    }

    /// Flush every partially filled buffer. Returns the number of files written.
    pub fn finish(mut self) -> Result<u32> {
        let mut total = 0;
        for file in [
            &mut self.temperature,
            &mut self.door_motion,
            &mut self.humidity,
            &mut self.smoke,
        ] {
            file.flush()?;
            total += file.files_written();
        }
        Ok(total)
    }
}
