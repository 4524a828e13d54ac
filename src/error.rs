// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Library Error type

use thiserror::Error;

use crate::frame::{ExceptionCode, FunctionCode};

/// A specialized [`Result`] type for Modbus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Modbus errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying byte device failed while reading, writing or
    /// closing.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A decoded frame was too short to carry address, function code
    /// and CRC.
    #[error("short frame, got {len} bytes")]
    ShortFrame {
        /// Number of bytes actually received.
        len: usize,
    },

    /// The CRC trailing a received frame does not match the CRC
    /// computed over its contents.
    #[error("CRC mismatch: expected = 0x{expected:04X}, actual = 0x{actual:04X}")]
    CrcMismatch {
        /// CRC carried by the frame.
        expected: u16,
        /// CRC computed over the frame contents.
        actual: u16,
    },

    /// The framer cannot determine the frame length for this function
    /// code.
    #[error("unsupported function code: 0x{0:02X}")]
    UnsupportedFunctionCode(u8),

    /// The reply carries a different function code than the request.
    #[error("wrong function code in response: request = {request}, response = {response}")]
    WrongFunctionCode {
        /// Function code of the in-flight request.
        request: FunctionCode,
        /// Cleared-bit function code of the reply.
        response: FunctionCode,
    },

    /// A write reply did not echo the request data.
    #[error("write response does not echo the request data")]
    EchoMismatch,

    /// The server answered with an exception reply.
    #[error("server exception: {0}")]
    Exception(ExceptionCode),

    /// A response payload is internally inconsistent.
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
}
