// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types

///////////////////////////////////////////////////////////////////
/// Modules
///////////////////////////////////////////////////////////////////
pub use crate::client;

#[allow(missing_docs)]
#[cfg(feature = "sync")]
pub mod sync {
    pub use crate::client::sync::*;
}

///////////////////////////////////////////////////////////////////
/// Structs
///////////////////////////////////////////////////////////////////
pub use crate::client::Client;
pub use crate::error::{Error, Result};
pub use crate::frame::{
    Address, Coil, ExceptionCode, FrameType, FunctionCode, Pdu, Quantity, Word,
};
pub use crate::slave::{Slave, SlaveId};
pub use crate::transport::{Rtu, Transport, TransportType};
