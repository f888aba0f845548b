// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Protocol adapters shipped with the binary

pub mod http_basic;

pub use http_basic::{HttpBasicOptions, HttpBasicProtocol};
