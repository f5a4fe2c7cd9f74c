//! FileSink - appends records to one JSON-lines file per topic

use bytes::Bytes;
use chrono::Utc;
use contracts::{Compression, ContractError, DeliveryReceipt, RecordSink, RecordUnit};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

use super::DEFAULT_PARTITION;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory, one `<topic>.jsonl` per topic
    pub dir: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let dir = params
            .get("dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { dir }
    }
}

/// Record payload as written to disk: text when valid UTF-8, raw bytes otherwise
#[derive(Serialize)]
#[serde(untagged)]
enum Payload<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
}

impl<'a> Payload<'a> {
    fn new(bytes: &'a Bytes) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Binary(bytes),
        }
    }
}

/// One line of a topic file
#[derive(Serialize)]
struct FileRecord<'a> {
    offset: i64,
    timestamp: String,
    compression: Compression,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<Payload<'a>>,
    value: Payload<'a>,
}

struct TopicFile {
    file: File,
    next_offset: i64,
}

/// Sink that appends records to disk
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    compression: Compression,
    topics: HashMap<String, TopicFile>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(
        name: impl Into<String>,
        config: FileSinkConfig,
        compression: Compression,
    ) -> io::Result<Self> {
        // Create output directory if it doesn't exist
        fs::create_dir_all(&config.dir)?;

        Ok(Self {
            name: name.into(),
            config,
            compression,
            topics: HashMap::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        compression: Compression,
    ) -> io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config, compression)
    }

    /// Path of the file holding `topic`
    pub fn topic_path(&self, topic: &str) -> PathBuf {
        self.config.dir.join(format!("{topic}.jsonl"))
    }

    fn topic_file(&mut self, topic: &str) -> io::Result<&mut TopicFile> {
        if !self.topics.contains_key(topic) {
            validate_topic_name(topic)?;
            let path = self.topic_path(topic);
            let next_offset = count_lines(&path)?;
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            debug!(sink = %self.name, path = %path.display(), next_offset, "Opened topic file");
            self.topics
                .insert(topic.to_string(), TopicFile { file, next_offset });
        }

        self.topics
            .get_mut(topic)
            .ok_or_else(|| io::Error::other("topic file missing after open"))
    }

    fn append_record(&mut self, unit: &RecordUnit) -> io::Result<i64> {
        let compression = self.compression;
        let topic_file = self.topic_file(&unit.topic)?;
        let offset = topic_file.next_offset;

        let record = FileRecord {
            offset,
            timestamp: Utc::now().to_rfc3339(),
            compression,
            key: unit.key.as_ref().map(Payload::new),
            value: Payload::new(&unit.value),
        };
        let mut line = serde_json::to_vec(&record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        line.push(b'\n');

        // One write per record keeps each line whole
        topic_file.file.write_all(&line)?;
        topic_file.next_offset += 1;
        Ok(offset)
    }

    fn persist_record(&mut self, unit: &RecordUnit) -> Result<i64, ContractError> {
        self.append_record(unit).map_err(|e| {
            error!(sink = %self.name, topic = %unit.topic, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

/// Topics become file names, so path separators and dot-names are refused
fn validate_topic_name(topic: &str) -> io::Result<()> {
    let invalid = topic.is_empty()
        || topic == "."
        || topic == ".."
        || topic.contains(['/', '\\', '\0']);
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("topic {topic:?} cannot be used as a file name"),
        ));
    }
    Ok(())
}

/// Existing record count of a topic file (0 if absent)
fn count_lines(path: &Path) -> io::Result<i64> {
    match File::open(path) {
        Ok(file) => {
            let mut count = 0;
            for line in BufReader::new(file).split(b'\n') {
                line?;
                count += 1;
            }
            Ok(count)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

impl RecordSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, unit),
        fields(sink = %self.name, topic = %unit.topic)
    )]
    async fn write(&mut self, unit: &RecordUnit) -> Result<DeliveryReceipt, ContractError> {
        let offset = self.persist_record(unit)?;
        Ok(DeliveryReceipt {
            topic: unit.topic.clone(),
            partition: DEFAULT_PARTITION,
            offset,
        })
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        for (topic, topic_file) in &mut self.topics {
            topic_file.file.sync_data().map_err(|e| {
                ContractError::sink_write(&self.name, format!("sync of topic '{topic}' failed: {e}"))
            })?;
        }
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.topics.clear();
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sink_in(dir: &Path) -> FileSink {
        let config = FileSinkConfig {
            dir: dir.to_path_buf(),
        };
        FileSink::new("test_file", config, Compression::Gzip).unwrap()
    }

    #[tokio::test]
    async fn test_file_sink_write() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());

        let keyed = RecordUnit::keyed("events", Bytes::from_static(b"k"), Bytes::from_static(b"v1"));
        let binary = RecordUnit::value_only("events", Bytes::from_static(&[0xff, 0x00]));

        assert_eq!(sink.write(&keyed).await.unwrap().offset, 0);
        assert_eq!(sink.write(&binary).await.unwrap().offset, 1);
        sink.flush().await.unwrap();

        let content = fs::read_to_string(dir.path().join("events.jsonl")).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["key"], "k");
        assert_eq!(lines[0]["value"], "v1");
        assert_eq!(lines[0]["compression"], "gzip");
        assert_eq!(lines[1]["value"], serde_json::json!([255, 0]));
        assert!(lines[1].get("key").is_none());
    }

    #[tokio::test]
    async fn test_file_sink_resumes_offsets() {
        let dir = tempdir().unwrap();
        let unit = RecordUnit::value_only("events", Bytes::from_static(b"v"));

        let mut first = sink_in(dir.path());
        first.write(&unit).await.unwrap();
        first.write(&unit).await.unwrap();
        first.close().await.unwrap();

        let mut second = sink_in(dir.path());
        assert_eq!(second.write(&unit).await.unwrap().offset, 2);
    }

    #[tokio::test]
    async fn test_file_sink_rejects_path_like_topics() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path());

        for topic in ["../escape", "a/b", ".."] {
            let unit = RecordUnit::value_only(topic, Bytes::from_static(b"v"));
            let err = sink.write(&unit).await.unwrap_err();
            assert!(matches!(err, ContractError::SinkWrite { .. }), "topic {topic}");
        }
    }

    #[test]
    fn test_config_from_params_default_dir() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.dir, PathBuf::from("./output"));
    }
}
