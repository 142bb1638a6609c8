//! FilePublisher - appends events as JSON lines to a file

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::Utc;
use contracts::{BusEvent, ComponentError, EventPublisher};
use serde_json::json;
use tracing::{debug, instrument};

/// Configuration for FilePublisher
#[derive(Debug, Clone)]
pub struct FilePublisherConfig {
    /// Output file path (JSON lines, appended)
    pub path: PathBuf,
}

impl FilePublisherConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./events.jsonl"));

        Self { path }
    }
}

/// Publisher that appends each event as one JSON line
pub struct FilePublisher {
    name: String,
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FilePublisher {
    /// Create a new FilePublisher
    pub fn new(name: impl Into<String>, config: FilePublisherConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            writer: BufWriter::new(file),
            path: config.path,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FilePublisherConfig::from_params(params);
        Self::new(name, config)
    }

    fn write_line(&mut self, event: &BusEvent) -> std::io::Result<()> {
        let line = json!({
            "ts": Utc::now(),
            "topic": event.topic,
            "retain": event.retain,
            "payload": event.payload,
        });
        serde_json::to_writer(&mut self.writer, &line)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")
    }
}

impl EventPublisher for FilePublisher {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_publisher_publish",
        skip(self, event),
        fields(publisher = %self.name, topic = %event.topic)
    )]
    async fn publish(&mut self, event: &BusEvent) -> Result<(), ComponentError> {
        self.write_line(event)
            .map_err(|e| ComponentError::publish(&event.topic, e.to_string()))
    }

    #[instrument(name = "file_publisher_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ComponentError> {
        self.writer.flush()?;
        Ok(())
    }

    #[instrument(name = "file_publisher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ComponentError> {
        self.writer.flush()?;
        debug!(publisher = %self.name, path = %self.path.display(), "FilePublisher closed");
        Ok(())
    }
}
