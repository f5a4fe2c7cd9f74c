//! 配置校验模块
//!
//! 校验规则：
//! - client name 非空
//! - queue_capacity > 0
//! - file client: dir 非空
//! - network client: addr 合法, format / max_packet_size 合法

use std::net::SocketAddr;

use contracts::{ClientConfig, ClientKind, ContractError, ProducerConfig};

/// 校验 ProducerConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ProducerConfig) -> Result<(), ContractError> {
    validate_client(&config.client)
}

/// 校验投递客户端配置
pub fn validate_client(client: &ClientConfig) -> Result<(), ContractError> {
    if client.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "client.name",
            "client name cannot be empty",
        ));
    }

    if client.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "client.queue_capacity",
            "queue_capacity must be > 0",
        ));
    }

    match client.kind {
        ClientKind::Log => Ok(()),
        ClientKind::File => validate_file_params(client),
        ClientKind::Network => validate_network_params(client),
    }
}

/// 校验 file client 参数
fn validate_file_params(client: &ClientConfig) -> Result<(), ContractError> {
    if let Some(dir) = client.params.get("dir") {
        if dir.trim().is_empty() {
            return Err(ContractError::config_validation(
                "client.params.dir",
                "dir cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验 network client 参数
fn validate_network_params(client: &ClientConfig) -> Result<(), ContractError> {
    let addr = client.params.get("addr").ok_or_else(|| {
        ContractError::config_validation(
            "client.params.addr",
            "network client requires an 'addr' parameter",
        )
    })?;

    addr.parse::<SocketAddr>().map_err(|e| {
        ContractError::config_validation(
            "client.params.addr",
            format!("invalid address '{addr}': {e}"),
        )
    })?;

    if let Some(format) = client.params.get("format") {
        if !matches!(format.as_str(), "json" | "bincode") {
            return Err(ContractError::config_validation(
                "client.params.format",
                format!("unknown format '{format}' (expected json or bincode)"),
            ));
        }
    }

    if let Some(size) = client.params.get("max_packet_size") {
        match size.parse::<usize>() {
            Ok(n) if n > 0 => {}
            _ => {
                return Err(ContractError::config_validation(
                    "client.params.max_packet_size",
                    format!("max_packet_size must be a positive integer, got '{size}'"),
                ))
            }
        }
    }

    Ok(())
}
