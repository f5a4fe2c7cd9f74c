//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 端到端测试：字节流 → 分词 → 配对 → 投递客户端

#[cfg(test)]
mod contract_tests {
    use contracts::{ClientKind, Compression, ProducerConfig};

    #[test]
    fn test_default_producer_config_snapshot() {
        let config = ProducerConfig::default();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["version"], "V1");
        assert_eq!(json["client"]["kind"], "log");
        assert_eq!(json["client"]["queue_capacity"], 1024);
        assert_eq!(config.client.kind, ClientKind::Log);
        assert_eq!(Compression::default().as_str(), "snappy");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ClientConfig, ClientKind, Compression};
    use dispatcher::{
        create_client, CoordinatorConfig, DispatchCoordinator, DispatcherError, PairingMode,
        ProduceSummary,
    };
    use ingestion::{compile, IngestionError, StreamTokenizer, TokenizerConfig};
    use tokio::net::UdpSocket;

    /// Run bytes through tokenizer, coordinator and a configured client
    async fn produce(
        input: &'static [u8],
        delim: &str,
        mode: PairingMode,
        client_config: &ClientConfig,
        max_token_size: usize,
        out: &mut Vec<u8>,
    ) -> Result<ProduceSummary, DispatcherError> {
        let delimiter = compile(delim).unwrap();
        // Tiny reads so tokens and delimiters straddle read boundaries
        let config = TokenizerConfig::new(max_token_size).with_read_chunk_size(3);
        let mut tokenizer = StreamTokenizer::new(input, delimiter, config).unwrap();

        let client = create_client(client_config, Compression::Snappy).await?;
        let coordinator_config = CoordinatorConfig::new("events", mode).with_verbose(true);
        let result = DispatchCoordinator::new(&client, coordinator_config)
            .run(&mut tokenizer, out)
            .await;
        client.shutdown().await;
        result
    }

    fn file_client(dir: &Path) -> ClientConfig {
        let mut config = ClientConfig {
            name: "archive".into(),
            kind: ClientKind::File,
            ..ClientConfig::default()
        };
        config
            .params
            .insert("dir".into(), dir.display().to_string());
        config
    }

    fn read_records(dir: &Path, topic: &str) -> Vec<serde_json::Value> {
        let content = std::fs::read_to_string(dir.join(format!("{topic}.jsonl"))).unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// End-to-end test: bytes -> StreamTokenizer -> DispatchCoordinator -> FileSink
    ///
    /// 验证完整的数据流：
    /// 1. 多字节分隔符跨读边界被识别
    /// 2. key/value 配对
    /// 3. 每条记录写入并被确认
    #[tokio::test]
    async fn test_e2e_keyed_records_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        let summary = produce(
            b"user-1||login||user-2||logout||user-1||logout",
            "||",
            PairingMode::KeyValue,
            &file_client(dir.path()),
            64,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.tokens, 6);
        assert_eq!(summary.units_submitted, 3);
        assert_eq!(summary.units_acknowledged, 3);

        let records = read_records(dir.path(), "events");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["key"], "user-1");
        assert_eq!(records[0]["value"], "login");
        assert_eq!(records[2]["key"], "user-1");
        assert_eq!(records[2]["value"], "logout");
        assert_eq!(records[2]["offset"], 2);
        assert_eq!(records[0]["compression"], "snappy");

        // The file client delivers in order, so reports follow offsets
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Successful send to topic events partition 0 offset 0");
    }

    #[tokio::test]
    async fn test_e2e_split_semantics() {
        let cases: [(&'static [u8], usize); 3] = [(b"a,b,,c", 4), (b"a,b,", 3), (b"abc", 1)];

        for (input, expected) in cases {
            let dir = tempfile::tempdir().unwrap();
            let mut out = Vec::new();
            let summary = produce(
                input,
                ",",
                PairingMode::ValueOnly,
                &file_client(dir.path()),
                64,
                &mut out,
            )
            .await
            .unwrap();

            assert_eq!(summary.units_acknowledged, expected as u64);
            assert_eq!(read_records(dir.path(), "events").len(), expected);
        }
    }

    #[tokio::test]
    async fn test_e2e_empty_input_produces_nothing() {
        let mut out = Vec::new();
        let summary = produce(
            b"",
            "\\n",
            PairingMode::ValueOnly,
            &ClientConfig::default(),
            64,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.tokens, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_e2e_oversized_token_is_fatal() {
        let mut out = Vec::new();
        let err = produce(
            b"short\nthis token is far too long\n",
            "\\n",
            PairingMode::ValueOnly,
            &ClientConfig::default(),
            8,
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            DispatcherError::Source(IngestionError::TokenTooLarge { limit: 8 })
        ));
    }

    #[tokio::test]
    async fn test_e2e_truncated_pair() {
        let mut out = Vec::new();
        let err = produce(
            b"k1\tv1\tk2",
            "\\t",
            PairingMode::KeyValue,
            &ClientConfig::default(),
            64,
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DispatcherError::TruncatedPair { sequence: 2 }));
    }

    #[tokio::test]
    async fn test_e2e_network_client_bincode() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let toml = format!(
            r#"
[client]
name = "udp"
kind = "network"

[client.params]
addr = "{}"
format = "bincode"
"#,
            receiver.local_addr().unwrap()
        );
        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let mut out = Vec::new();
        let summary = produce(
            b"one\ntwo\nthree",
            "\\n",
            PairingMode::ValueOnly,
            &config.client,
            64,
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(summary.units_acknowledged, 3);

        let mut buf = vec![0u8; 2048];
        for _ in 0..3 {
            let received = tokio::time::timeout(Duration::from_secs(2), receiver.recv(&mut buf))
                .await
                .expect("datagram not received")
                .unwrap();
            assert!(received > 0);
        }
    }

    #[tokio::test]
    async fn test_e2e_client_opts_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ConfigLoader::load_from_str(
            "[client]\nkind = \"file\"\n[client.params]\ndir = \"/unused\"\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        let dir_opt = format!("dir={}", dir.path().display());
        ConfigLoader::apply_client_opts(&mut config, &[dir_opt]).unwrap();

        let mut out = Vec::new();
        produce(b"x", "\\n", PairingMode::ValueOnly, &config.client, 64, &mut out)
            .await
            .unwrap();

        assert_eq!(read_records(dir.path(), "events").len(), 1);
    }

    #[tokio::test]
    async fn test_e2e_delivery_failure_is_fatal() {
        // A topic the file sink refuses turns every delivery into a failure
        let dir = tempfile::tempdir().unwrap();
        let client = create_client(&file_client(dir.path()), Compression::None)
            .await
            .unwrap();
        let mut tokens = ingestion::VecTokenSource::new(vec!["a", "b"]);
        let mut out = Vec::new();

        let err = DispatchCoordinator::new(
            &client,
            CoordinatorConfig::new("../escape", PairingMode::ValueOnly),
        )
        .run(&mut tokens, &mut out)
        .await
        .unwrap_err();
        client.shutdown().await;

        match err {
            DispatcherError::Delivery { topic, .. } => assert_eq!(topic, "../escape"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
