//! Runtime configuration read from the `config` flash partition.
//!
//! The partition starts with a text block of `key = value` lines terminated
//! by the first `0x00` or `0xFF` byte (erased flash reads as `0xFF`). When
//! server verification is on, the DER trust root follows at
//! [`TRUST_ROOT_OFFSET`].

use core::fmt;

use log::{debug, info};

use crate::endpoint::{Endpoint, EndpointError};

/// Size of the text block at the start of the partition.
pub const TEXT_LEN: usize = 0x1000;
/// Offset of the DER trust root inside the partition.
pub const TRUST_ROOT_OFFSET: usize = TEXT_LEN;
pub const MAX_TRUST_ROOT_LEN: usize = 2048;

pub const DEFAULT_HOSTNAME: &str = "esp-heartrate";
pub const MAX_HOSTNAME_LEN: usize = 32;
const MAX_SSID_LEN: usize = 32;
const MAX_PASSWORD_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Flash was never written.
    Empty,
    NotUtf8,
    /// Line without `=`, 1-based.
    MalformedLine(usize),
    UnknownKey(usize),
    DuplicateKey(&'static str),
    InvalidValue(&'static str),
    Missing(&'static str),
    Url(EndpointError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "configuration partition is empty"),
            Self::NotUtf8 => write!(f, "configuration is not valid UTF-8"),
            Self::MalformedLine(line) => write!(f, "line {line}: expected `key = value`"),
            Self::UnknownKey(line) => write!(f, "line {line}: unknown key"),
            Self::DuplicateKey(key) => write!(f, "`{key}` given more than once"),
            Self::InvalidValue(key) => write!(f, "invalid value for `{key}`"),
            Self::Missing(key) => write!(f, "missing required key `{key}`"),
            Self::Url(e) => write!(f, "invalid url: {e:?}"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Everything the firmware needs that must not be compiled in.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Config<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub endpoint: Endpoint<'a>,
    pub token: &'a str,
    pub verify_server: bool,
    pub hostname: &'a str,
    /// Length of the DER trust root; zero when verification is off.
    pub ca_len: usize,
}

// Hand-written so secrets never reach a log line.
impl fmt::Debug for Config<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("verify_server", &self.verify_server)
            .field("hostname", &self.hostname)
            .field("ca_len", &self.ca_len)
            .finish()
    }
}

fn set<'a>(
    slot: &mut Option<&'a str>,
    key: &'static str,
    value: &'a str,
) -> Result<(), ConfigError> {
    if slot.replace(value).is_some() {
        return Err(ConfigError::DuplicateKey(key));
    }
    Ok(())
}

impl<'a> Config<'a> {
    /// Parse the text block as read from flash.
    pub fn from_bytes(raw: &'a [u8]) -> Result<Self, ConfigError> {
        let raw = &raw[..raw.len().min(TEXT_LEN)];
        let end = raw
            .iter()
            .position(|&b| b == 0x00 || b == 0xFF)
            .unwrap_or(raw.len());
        let text = core::str::from_utf8(&raw[..end]).map_err(|_| ConfigError::NotUtf8)?;
        if text.trim().is_empty() {
            return Err(ConfigError::Empty);
        }
        Self::parse(text)
    }

    pub fn parse(text: &'a str) -> Result<Self, ConfigError> {
        let mut ssid = None;
        let mut password = None;
        let mut url = None;
        let mut token = None;
        let mut verify_server = None;
        let mut hostname = None;
        let mut ca_len = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(ConfigError::MalformedLine(line_no))?;
            let value = value.trim();
            match key.trim() {
                "ssid" => set(&mut ssid, "ssid", value)?,
                "password" => set(&mut password, "password", value)?,
                "url" => set(&mut url, "url", value)?,
                "token" => set(&mut token, "token", value)?,
                "verify_server" => set(&mut verify_server, "verify_server", value)?,
                "hostname" => set(&mut hostname, "hostname", value)?,
                "ca_len" => set(&mut ca_len, "ca_len", value)?,
                other => {
                    debug!("Unknown config key `{}` on line {}", other, line_no);
                    return Err(ConfigError::UnknownKey(line_no));
                }
            }
        }

        let ssid = ssid.ok_or(ConfigError::Missing("ssid"))?;
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(ConfigError::InvalidValue("ssid"));
        }
        let password = password.unwrap_or("");
        if password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::InvalidValue("password"));
        }

        let endpoint = Endpoint::parse(url.ok_or(ConfigError::Missing("url"))?)
            .map_err(ConfigError::Url)?;

        let token = token.ok_or(ConfigError::Missing("token"))?;
        if token.is_empty() {
            return Err(ConfigError::InvalidValue("token"));
        }

        let verify_server = match verify_server {
            None | Some("true") => true,
            Some("false") => false,
            Some(_) => return Err(ConfigError::InvalidValue("verify_server")),
        };

        let hostname = hostname.unwrap_or(DEFAULT_HOSTNAME);
        if hostname.is_empty()
            || hostname.len() > MAX_HOSTNAME_LEN
            || !hostname.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(ConfigError::InvalidValue("hostname"));
        }

        let ca_len = match (verify_server, ca_len) {
            (true, None) => return Err(ConfigError::Missing("ca_len")),
            (true, Some(len)) => {
                let len: usize = len.parse().map_err(|_| ConfigError::InvalidValue("ca_len"))?;
                if len == 0 || len > MAX_TRUST_ROOT_LEN {
                    return Err(ConfigError::InvalidValue("ca_len"));
                }
                len
            }
            (false, _) => 0,
        };

        info!(
            "Config: ssid={} password={}B token={}B url=https://{}:{}{} verify_server={}",
            ssid,
            password.len(),
            token.len(),
            endpoint.host,
            endpoint.port,
            endpoint.path,
            verify_server
        );

        Ok(Config {
            ssid,
            password,
            endpoint,
            token,
            verify_server,
            hostname,
            ca_len,
        })
    }
}
