// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::defs;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// A mandatory setting (fingerprint or secret) was found neither in the environment
    /// nor in the config file.
    NotConfigured(&'static str),
    InvalidAddr(String),
    InvalidFingerprint,
    InvalidLogLevel(String),
    InvalidTimeout,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(Error::InvalidLogLevel(s.to_string())),
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(src: LogLevel) -> Self {
        match src {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// The on-disk (JSON) client config. Every key is optional; the environment takes
/// precedence over anything found here.
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    addr: Option<String>,
    fingerprint: Option<String>,
    secret: Option<String>,
    log: Option<LogLevel>,
    timeout_ms: Option<u64>,
}

/// A resolved and validated client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Server address, as `host:port`.
    pub addr: String,
    /// Fingerprint of the server certificate.
    pub fingerprint: String,
    /// Secret shared with the server, used to authenticate every request.
    pub secret: String,
    pub log_level: log::Level,
    pub timeout_ms: u64,
}

/// Source of the client configuration.
pub trait ConfigProvider {
    /// Resolve the configuration. `Error::NotConfigured` means the provider must not start.
    fn resolve(&self) -> Result<Config, Error>;
}

/// Resolve the config from environment variables first, then from the JSON config file.
///
/// The environment lookup is injectable, so that resolution can be exercised without
/// touching the process environment.
pub struct EnvConfig<F>
where
    F: Fn(&str) -> Option<String>,
{
    env: F,
}

impl EnvConfig<fn(&str) -> Option<String>> {
    /// Build a provider backed by the process environment.
    pub fn from_process_env() -> Self {
        fn lookup(key: &str) -> Option<String> {
            std::env::var(key).ok()
        }
        Self { env: lookup }
    }
}

impl<F> EnvConfig<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(env: F) -> Self {
        Self { env }
    }

    fn config_path(&self) -> PathBuf {
        let path = (self.env)(defs::ENV_CONFIG_PATH)
            .unwrap_or_else(|| defs::DEFAULT_CONFIG_PATH.to_string());
        match (path.strip_prefix("~/"), (self.env)("HOME")) {
            (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
            _ => PathBuf::from(path),
        }
    }

    /// Read the config file, if any. A missing or unparsable file counts as empty.
    fn read_file(&self) -> FileConfig {
        let path = self.config_path();
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(_) => return FileConfig::default(),
        };
        serde_json::from_reader(std::io::BufReader::new(file)).unwrap_or_else(|e| {
            log::warn!("Ignoring config file {}: {}", path.display(), e);
            FileConfig::default()
        })
    }
}

impl<F> ConfigProvider for EnvConfig<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self) -> Result<Config, Error> {
        let file = self.read_file();

        let addr = (self.env)(defs::ENV_ADDR)
            .or(file.addr)
            .unwrap_or_else(|| defs::DEFAULT_ADDR.to_string());
        let fingerprint = (self.env)(defs::ENV_FINGERPRINT)
            .or(file.fingerprint)
            .ok_or(Error::NotConfigured("fingerprint"))?;
        let secret = (self.env)(defs::ENV_SECRET)
            .or(file.secret)
            .ok_or(Error::NotConfigured("secret"))?;
        let log_level = match (self.env)(defs::ENV_LOG) {
            Some(level) => level.parse::<LogLevel>()?.into(),
            None => file
                .log
                .map(log::Level::from)
                .unwrap_or(defs::DEFAULT_LOG_LEVEL),
        };

        let timeout_ms = file.timeout_ms.unwrap_or(defs::RPC_STREAM_TIMEOUT_MS);

        validate_addr(addr.as_str())?;
        validate_fingerprint(fingerprint.as_str())?;
        // A zero socket timeout is rejected by the OS layer.
        if timeout_ms == 0 {
            return Err(Error::InvalidTimeout);
        }

        Ok(Config {
            addr,
            fingerprint,
            secret,
            log_level,
            timeout_ms,
        })
    }
}

fn validate_addr(addr: &str) -> Result<(), Error> {
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
        _ => Err(Error::InvalidAddr(addr.to_string())),
    }
}

/// Fingerprints are hex strings, optionally using `:` as a byte separator.
fn validate_fingerprint(fp: &str) -> Result<(), Error> {
    let digits: Vec<char> = fp.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.iter().all(|c| c.is_ascii_hexdigit())
    {
        return Err(Error::InvalidFingerprint);
    }
    Ok(())
}
