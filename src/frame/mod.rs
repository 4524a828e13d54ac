// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol data units and the codes they carry.

use std::fmt;

use bytes::Bytes;

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// This *protocol address* uses 0-based indexing, while the *coil address* or
/// *register address* is often specified as a number with 1-based indexing.
/// Please consult the specification of your devices if 1-based coil/register
/// addresses need to be converted to 0-based protocol addresses by subtracting 1.
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items (big-endian representation).
pub type Word = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// On-wire value of a coil switched on in a `WriteSingleCoil` request.
pub const COIL_ON: u16 = 0xFF00;

/// On-wire value of a coil switched off in a `WriteSingleCoil` request.
pub const COIL_OFF: u16 = 0x0000;

/// A Modbus function code.
///
/// The high bit (`0x80`) is reserved: a server sets it in a reply to
/// signal that an exception code follows. The bit is preserved when a
/// received frame is decoded so that clients can recognize faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionCode(pub u8);

impl FunctionCode {
    pub const READ_COILS: Self = Self(0x01);
    pub const READ_DISCRETE_INPUTS: Self = Self(0x02);
    pub const READ_HOLDING_REGISTERS: Self = Self(0x03);
    pub const READ_INPUT_REGISTERS: Self = Self(0x04);
    pub const WRITE_SINGLE_COIL: Self = Self(0x05);
    pub const WRITE_SINGLE_REGISTER: Self = Self(0x06);
    pub const WRITE_MULTIPLE_COILS: Self = Self(0x0F);
    pub const WRITE_MULTIPLE_REGISTERS: Self = Self(0x10);
    pub const MASK_WRITE_REGISTER: Self = Self(0x16);
    pub const READ_WRITE_MULTIPLE_REGISTERS: Self = Self(0x17);
    pub const READ_FIFO_QUEUE: Self = Self(0x18);

    /// Bit set by servers to mark an exception reply.
    pub const FAULT_BIT: u8 = 0x80;

    /// Returns `true` if the fault bit is set.
    #[must_use]
    pub const fn is_fault(self) -> bool {
        self.0 & Self::FAULT_BIT != 0
    }

    /// Returns the function code with the fault bit cleared.
    #[must_use]
    pub const fn without_fault(self) -> Self {
        Self(self.0 & !Self::FAULT_BIT)
    }

    /// Raw 8-bit value, fault bit included.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for FunctionCode {
    fn from(from: u8) -> Self {
        Self(from)
    }
}

impl From<FunctionCode> for u8 {
    fn from(from: FunctionCode) -> Self {
        from.0
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.without_fault() {
            Self::READ_COILS => "ReadCoils",
            Self::READ_DISCRETE_INPUTS => "ReadDiscreteInputs",
            Self::READ_HOLDING_REGISTERS => "ReadHoldingRegisters",
            Self::READ_INPUT_REGISTERS => "ReadInputRegisters",
            Self::WRITE_SINGLE_COIL => "WriteSingleCoil",
            Self::WRITE_SINGLE_REGISTER => "WriteSingleRegister",
            Self::WRITE_MULTIPLE_COILS => "WriteMultipleCoils",
            Self::WRITE_MULTIPLE_REGISTERS => "WriteMultipleRegisters",
            Self::MASK_WRITE_REGISTER => "MaskWriteRegister",
            Self::READ_WRITE_MULTIPLE_REGISTERS => "ReadWriteMultipleRegisters",
            Self::READ_FIFO_QUEUE => "ReadFIFOQueue",
            _ => "Unknown",
        };
        let suffix = if self.is_fault() { "Fault" } else { "" };
        write!(f, "{name}{suffix}")
    }
}

/// The exception code carried as the single payload byte of a fault
/// reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionCode(pub u8);

impl ExceptionCode {
    pub const ILLEGAL_FUNCTION: Self = Self(0x01);
    pub const ILLEGAL_DATA_ADDRESS: Self = Self(0x02);
    pub const ILLEGAL_DATA_VALUE: Self = Self(0x03);
    pub const SERVER_DEVICE_FAILURE: Self = Self(0x04);
    pub const ACKNOWLEDGE: Self = Self(0x05);
    pub const SERVER_DEVICE_BUSY: Self = Self(0x06);
    pub const MEMORY_PARITY_ERROR: Self = Self(0x08);
    pub const GATEWAY_PATH_UNAVAILABLE: Self = Self(0x0A);
    pub const GATEWAY_TARGET_FAILED_TO_RESPOND: Self = Self(0x0B);

    /// Raw 8-bit value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for ExceptionCode {
    fn from(from: u8) -> Self {
        Self(from)
    }
}

impl From<ExceptionCode> for u8 {
    fn from(from: ExceptionCode) -> Self {
        from.0
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ILLEGAL_FUNCTION => f.write_str("ILLEGAL FUNCTION"),
            Self::ILLEGAL_DATA_ADDRESS => f.write_str("ILLEGAL DATA ADDRESS"),
            Self::ILLEGAL_DATA_VALUE => f.write_str("ILLEGAL DATA VALUE"),
            Self::SERVER_DEVICE_FAILURE => f.write_str("SERVER DEVICE FAILURE"),
            Self::ACKNOWLEDGE => f.write_str("ACKNOWLEDGE"),
            Self::SERVER_DEVICE_BUSY => f.write_str("SERVER DEVICE BUSY"),
            Self::MEMORY_PARITY_ERROR => f.write_str("MEMORY PARITY ERROR"),
            Self::GATEWAY_PATH_UNAVAILABLE => f.write_str("GATEWAY PATH UNAVAILABLE"),
            Self::GATEWAY_TARGET_FAILED_TO_RESPOND => {
                f.write_str("GATEWAY TARGET DEVICE FAILED TO RESPOND")
            }
            Self(code) => write!(f, "unknown exception code {code:x}"),
        }
    }
}

/// A Modbus [PDU](https://en.wikipedia.org/wiki/Protocol_data_unit):
/// function code plus payload, independent of transport framing.
///
/// For well-formed requests `data` matches the request shape of the
/// function code; for well-formed responses it matches the response
/// shape, or is a single exception code byte when `function` carries
/// the fault bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// The function code, fault bit included for received faults.
    pub function: FunctionCode,
    /// The payload following the function code on the wire.
    pub data: Bytes,
}

/// Which side of a transaction the RTU framer expects next.
///
/// Several function codes have asymmetric request/response shapes, so
/// incoming bytes can only be framed when the direction is known. A
/// client sets [`Response`](Self::Response) before each transaction;
/// diagnostic tooling parsing captured master traffic uses
/// [`Request`](Self::Request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    /// The next incoming frame is a request (master to server).
    Request,
    /// The next incoming frame is a response (server to master).
    #[default]
    Response,
}
