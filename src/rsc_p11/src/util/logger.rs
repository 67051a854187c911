// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use log::{Level, Log, Metadata, Record};

/// Stderr logger, installed once per process by C_Initialize.
pub struct Logger;

impl Logger {
    /// Install the logger. A later call only adjusts the level.
    pub fn init(level: Level) {
        let boxed_logger = Box::new(Self {});
        if log::set_boxed_logger(boxed_logger).is_err() {
            trace!("Logger already initialized");
        }
        log::set_max_level(level.to_level_filter());
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn flush(&self) {}

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "{:8} {}:{} {}",
                record.metadata().level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.args()
            );
        }
    }
}
