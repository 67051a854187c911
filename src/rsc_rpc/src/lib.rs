// Copyright 2020 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod transport;

pub use api::{ApiRequest, ApiResponse, ResponseBody};
pub use transport::{connect, HttpTransport, Transport};
pub use transport::Error as TransportError;
