use std::sync::Arc;

use crate::interface::{GatewayClient, GatewayProviderError};
use crate::providers::in_process::InProcessGatewayClient;

const SUPPORTED_PROVIDER_KEYS: [&str; 1] = [GatewayProviderKind::InProcess.as_key()];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayProviderKind {
    InProcess,
}

impl GatewayProviderKind {
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::InProcess => "gateway.in_process",
        }
    }

    pub fn from_key(provider_key: &str) -> Option<Self> {
        match provider_key {
            "gateway.in_process" => Some(Self::InProcess),
            _ => None,
        }
    }
}

pub fn supported_provider_keys() -> &'static [&'static str] {
    &SUPPORTED_PROVIDER_KEYS
}

pub fn build_gateway_client(
    provider_key: &str,
) -> Result<Arc<dyn GatewayClient>, GatewayProviderError> {
    let kind = GatewayProviderKind::from_key(provider_key)
        .ok_or_else(|| GatewayProviderError::UnknownProviderKey(provider_key.to_owned()))?;
    let client: Arc<dyn GatewayClient> = match kind {
        GatewayProviderKind::InProcess => Arc::new(InProcessGatewayClient::default()),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_provider_keys_roundtrip_through_kind_resolution() {
        for key in supported_provider_keys() {
            let kind = GatewayProviderKind::from_key(key).expect("resolve key");
            assert_eq!(kind.as_key(), *key);
        }
    }

    #[test]
    fn build_gateway_client_rejects_unknown_keys() {
        let error = build_gateway_client("in_process").err().expect("reject bare key");
        assert_eq!(
            error.to_string(),
            "unknown gateway provider key: in_process"
        );
    }

    #[test]
    fn build_gateway_client_accepts_in_process_key() {
        assert!(build_gateway_client("gateway.in_process").is_ok());
    }
}
