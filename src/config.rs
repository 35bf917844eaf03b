use derive_new::new;
use url::Url;

use crate::msg::{BroadcastMode, DefaultFees};

/// Connection configuration for one chain: the LCD REST endpoint, chain
/// id, bech32 account prefix, and default broadcast/fee settings.
#[derive(Debug, Clone)]
pub struct ConnectionConf {
    lcd_url: String,
    chain_id: String,
    prefix: String,
    broadcast_mode: BroadcastMode,
    fees: DefaultFees,
}

/// An error parsing a [`ConnectionConf`].
#[derive(thiserror::Error, Debug)]
pub enum ConnectionConfError {
    /// Missing `lcd_url` for connection configuration
    #[error("Missing `lcd_url` for connection configuration")]
    MissingLcdUrl,
    /// Missing `chainId` for connection configuration
    #[error("Missing `chainId` for connection configuration")]
    MissingChainId,
    /// Missing `prefix` for connection configuration
    #[error("Missing `prefix` for connection configuration")]
    MissingPrefix,
    /// Invalid `url` for connection configuration
    #[error("Invalid `url` for connection configuration: `{0}` ({1})")]
    InvalidConnectionUrl(String, url::ParseError),
}

impl ConnectionConf {
    /// Validate and construct a connection configuration.
    pub fn new(
        lcd_url: impl Into<String>,
        chain_id: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self, ConnectionConfError> {
        let lcd_url = lcd_url.into();
        let chain_id = chain_id.into();
        let prefix = prefix.into();

        if lcd_url.is_empty() {
            return Err(ConnectionConfError::MissingLcdUrl);
        }
        Url::parse(&lcd_url).map_err(|e| ConnectionConfError::InvalidConnectionUrl(lcd_url.clone(), e))?;
        if chain_id.is_empty() {
            return Err(ConnectionConfError::MissingChainId);
        }
        if prefix.is_empty() {
            return Err(ConnectionConfError::MissingPrefix);
        }

        Ok(Self {
            lcd_url,
            chain_id,
            prefix,
            broadcast_mode: BroadcastMode::default(),
            fees: DefaultFees::default(),
        })
    }

    /// Override the default broadcast mode (default: `block`).
    pub fn with_broadcast_mode(mut self, mode: BroadcastMode) -> Self {
        self.broadcast_mode = mode;
        self
    }

    /// Override the default gas/fee table.
    pub fn with_fees(mut self, fees: DefaultFees) -> Self {
        self.fees = fees;
        self
    }

    pub fn lcd_url(&self) -> &str {
        &self.lcd_url
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn broadcast_mode(&self) -> BroadcastMode {
        self.broadcast_mode
    }

    pub fn fees(&self) -> DefaultFees {
        self.fees
    }
}

/// A user-supplied fee override, bundled with the operation it applies to.
/// Mirrors [`crate::msg::FeeOverride`] but is the shape callers actually
/// construct from config.
#[derive(Debug, Clone, Copy, Default, new)]
pub struct GasFeeOverrides {
    pub upload: Option<crate::msg::FeeOverride>,
    pub init: Option<crate::msg::FeeOverride>,
    pub exec: Option<crate::msg::FeeOverride>,
    pub send: Option<crate::msg::FeeOverride>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_lcd_url() {
        assert!(matches!(
            ConnectionConf::new("", "secret-4", "secret"),
            Err(ConnectionConfError::MissingLcdUrl)
        ));
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(matches!(
            ConnectionConf::new("not a url", "secret-4", "secret"),
            Err(ConnectionConfError::InvalidConnectionUrl(_, _))
        ));
    }

    #[test]
    fn defaults_to_block_broadcast_mode() {
        let conf = ConnectionConf::new("https://lcd.example.com", "secret-4", "secret").unwrap();
        assert_eq!(conf.broadcast_mode(), BroadcastMode::Block);
    }
}
