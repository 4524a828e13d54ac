// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking facade around the asynchronous client.

use std::io;

use tokio::runtime::{self, Runtime};
use tokio_serial::{SerialPortBuilder, SerialStream};

use crate::{
    error::Result,
    frame::{Address, Coil, Quantity, Word},
    slave::Slave,
    transport::{Rtu, Transport},
};

/// A blocking Modbus client.
///
/// Each operation drives the asynchronous client to completion on an
/// internal current-thread runtime.
#[derive(Debug)]
pub struct Client<T> {
    core: Runtime,
    inner: super::Client<T>,
}

/// Opens a serial port and speaks RTU framing over it.
///
/// The port's timeout settings provide liveness for reads; configure
/// them on the [`SerialPortBuilder`] before connecting.
pub fn connect(builder: &SerialPortBuilder) -> Result<Client<Rtu<SerialStream>>> {
    let core = runtime::Builder::new_current_thread().enable_io().build()?;
    // SerialStream::open requires a runtime at least on cfg(unix).
    let serial = core
        .block_on(async { SerialStream::open(builder) })
        .map_err(io::Error::from)?;
    let inner = super::Client::new(Rtu::new(serial));
    Ok(Client { core, inner })
}

impl<T> Client<T>
where
    T: Transport + Send,
{
    /// Wraps an asynchronous client for blocking use.
    pub fn new(inner: super::Client<T>) -> Result<Self> {
        let core = runtime::Builder::new_current_thread().enable_io().build()?;
        Ok(Self { core, inner })
    }

    /// See [`Client::set_debug_level`](super::Client::set_debug_level).
    pub fn set_debug_level(&mut self, debug: u8) {
        self.inner.set_debug_level(debug);
    }

    /// Closes the client transport.
    pub fn close(&mut self) -> Result<()> {
        let Self { core, inner } = self;
        core.block_on(inner.close())
    }

    /// Reads `quantity` coils starting at `address`.
    pub fn read_coils(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Coil>> {
        let Self { core, inner } = self;
        core.block_on(inner.read_coils(slave, address, quantity))
    }

    /// Reads `quantity` discrete inputs starting at `address`.
    pub fn read_discrete_inputs(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Coil>> {
        let Self { core, inner } = self;
        core.block_on(inner.read_discrete_inputs(slave, address, quantity))
    }

    /// Reads `quantity` holding registers starting at `address`.
    pub fn read_holding_registers(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Word>> {
        let Self { core, inner } = self;
        core.block_on(inner.read_holding_registers(slave, address, quantity))
    }

    /// Reads `quantity` input registers starting at `address`.
    pub fn read_input_registers(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Word>> {
        let Self { core, inner } = self;
        core.block_on(inner.read_input_registers(slave, address, quantity))
    }

    /// Switches a single coil on or off.
    pub fn write_single_coil(&mut self, slave: Slave, address: Address, state: Coil) -> Result<()> {
        let Self { core, inner } = self;
        core.block_on(inner.write_single_coil(slave, address, state))
    }

    /// Writes a single holding register.
    pub fn write_single_register(
        &mut self,
        slave: Slave,
        address: Address,
        word: Word,
    ) -> Result<()> {
        let Self { core, inner } = self;
        core.block_on(inner.write_single_register(slave, address, word))
    }
}
