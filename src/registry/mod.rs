// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Registry Module
 * Protocol registry and metadata
 * © 2026 Bountyy Oy
 */

pub mod protocol_registry;

pub use protocol_registry::{ProtocolFactory, ProtocolMetadata, ProtocolRegistry};
