// Copyright 2020-2022 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod config;

pub mod defs {
    /// Environment variable holding the path of the client config file.
    pub const ENV_CONFIG_PATH: &str = "REMOTESC_CONFIG";
    /// Environment variable overriding the server address.
    pub const ENV_ADDR: &str = "REMOTESC_ADDR";
    /// Environment variable overriding the server certificate fingerprint.
    pub const ENV_FINGERPRINT: &str = "REMOTESC_FINGERPRINT";
    /// Environment variable overriding the shared secret.
    pub const ENV_SECRET: &str = "REMOTESC_SECRET";
    /// Environment variable overriding the log level.
    pub const ENV_LOG: &str = "REMOTESC_LOG";

    /// Client config file location, used when `REMOTESC_CONFIG` is not set.
    pub const DEFAULT_CONFIG_PATH: &str = "~/.config/remotesc.json";
    /// Server address used when neither the environment nor the config file provide one.
    pub const DEFAULT_ADDR: &str = "127.0.0.1:44555";
    pub const DEFAULT_LOG_LEVEL: log::Level = log::Level::Error;

    /// I/O timeout (in milliseconds) set for the RPC client-server communication.
    pub const RPC_STREAM_TIMEOUT_MS: u64 = 10_000;
    /// The HTTP URL all RPC requests are posted to.
    pub const RPC_URL: &str = "/rpc/v1";

    /// Maximum size (in bytes) of a single crypto object payload (attribute value, signature,
    /// mechanism parameter) carried over the wire.
    pub const MAX_CRYPTO_OBJ_SIZE: usize = 16 * 1024;
}
