// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transports translating between PDUs and framed byte sequences.

pub mod rtu;

pub use self::rtu::Rtu;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{
    error::Result,
    frame::{FrameType, Pdu},
    slave::SlaveId,
};

/// The framing variant a transport speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    /// Serial RTU framing: address, function code, data, CRC-16.
    Rtu,
}

/// The capability set shared by all Modbus transports.
///
/// A transport owns one byte device and translates between PDUs and
/// complete wire frames. A TCP/MBAP variant would substitute a
/// different concrete type behind this same interface.
#[async_trait]
pub trait Transport {
    /// Frames a PDU addressed to `slave` as a complete wire packet.
    fn encode(&self, slave: SlaveId, pdu: &Pdu) -> Result<Bytes>;

    /// Splits a received wire packet into slave address and PDU after
    /// verifying its integrity.
    fn decode(&self, frame: &[u8]) -> Result<(SlaveId, Pdu)>;

    /// Configures whether subsequent reads expect request or response
    /// frames.
    fn set_incoming_frame_type(&mut self, frame_type: FrameType);

    /// The framing variant of this transport.
    fn transport_type(&self) -> TransportType;

    /// Reads exactly one complete frame from the device.
    async fn read_frame(&mut self) -> Result<Bytes>;

    /// Passes a framed packet through to the device.
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Closes the underlying device.
    async fn close(&mut self) -> Result<()>;
}
