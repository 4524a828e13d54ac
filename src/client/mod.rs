// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus client (master).

#[cfg(feature = "sync")]
pub mod sync;

use crate::{
    error::{Error, Result},
    frame::{Address, Coil, ExceptionCode, FrameType, Pdu, Quantity, Word},
    slave::Slave,
    transport::Transport,
};

/// A Modbus client executing one transaction at a time.
///
/// The client owns its transport; a transaction occupies the transport
/// from encoding the request until the response frame is decoded.
/// Concurrent requests on the same client must be serialized by the
/// caller. Clients with distinct transports are independent.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    debug: u8,
}

impl<T> Client<T>
where
    T: Transport + Send,
{
    /// Creates a new client on top of a transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            debug: 0,
        }
    }

    /// Creates a new client with an initial debug level, see
    /// [`set_debug_level`](Self::set_debug_level).
    pub fn with_debug_level(transport: T, debug: u8) -> Self {
        Self { transport, debug }
    }

    /// Changes the debug level on the fly.
    ///
    /// Level 1 and up logs one line per sent request and received
    /// response, level 9 and up additionally logs hex dumps of the raw
    /// packets. Debug output never affects protocol behavior.
    pub fn set_debug_level(&mut self, debug: u8) {
        self.debug = debug;
    }

    /// Closes the client transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Reads `quantity` coils starting at `address`.
    pub async fn read_coils(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Coil>> {
        let request = Pdu::read_coils(address, quantity);
        let response = self.execute(slave, &request).await?;
        unpacked_bits(&response, quantity)
    }

    /// Reads `quantity` discrete inputs starting at `address`.
    pub async fn read_discrete_inputs(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Coil>> {
        let request = Pdu::read_discrete_inputs(address, quantity);
        let response = self.execute(slave, &request).await?;
        unpacked_bits(&response, quantity)
    }

    /// Reads `quantity` holding registers starting at `address`.
    pub async fn read_holding_registers(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Word>> {
        let request = Pdu::read_holding_registers(address, quantity);
        let response = self.execute(slave, &request).await?;
        counted_words(&response, quantity)
    }

    /// Reads `quantity` input registers starting at `address`.
    pub async fn read_input_registers(
        &mut self,
        slave: Slave,
        address: Address,
        quantity: Quantity,
    ) -> Result<Vec<Word>> {
        let request = Pdu::read_input_registers(address, quantity);
        let response = self.execute(slave, &request).await?;
        counted_words(&response, quantity)
    }

    /// Switches a single coil on or off.
    pub async fn write_single_coil(
        &mut self,
        slave: Slave,
        address: Address,
        state: Coil,
    ) -> Result<()> {
        let request = Pdu::write_single_coil(address, state);
        let response = self.execute(slave, &request).await?;
        if response.data != request.data {
            return Err(Error::EchoMismatch);
        }
        Ok(())
    }

    /// Writes a single holding register.
    pub async fn write_single_register(
        &mut self,
        slave: Slave,
        address: Address,
        word: Word,
    ) -> Result<()> {
        let request = Pdu::write_single_register(address, word);
        let response = self.execute(slave, &request).await?;
        if response.data != request.data {
            return Err(Error::EchoMismatch);
        }
        Ok(())
    }

    /// Sends one request and reads back the validated response PDU.
    ///
    /// Wrong function codes and in-band exception replies are turned
    /// into errors here; payload checks are left to the caller.
    async fn execute(&mut self, slave: Slave, request: &Pdu) -> Result<Pdu> {
        if self.debug >= 1 {
            log::debug!(
                "{} slave {}: request data {:02X?}",
                request.function,
                slave,
                &request.data[..]
            );
        }

        let packet = self.transport.encode(slave.into(), request)?;
        if self.debug >= 9 {
            log::trace!("{} tx: {:02X?}", request.function, &packet[..]);
        }

        self.transport.set_incoming_frame_type(FrameType::Response);
        self.transport.write_frame(&packet).await?;
        let frame = self.transport.read_frame().await?;

        if self.debug >= 9 {
            log::trace!("{} rx: {:02X?}", request.function, &frame[..]);
        }
        let (_, response) = self.transport.decode(&frame)?;
        if self.debug >= 1 {
            log::debug!(
                "{} slave {}: response data {:02X?}",
                response.function,
                slave,
                &response.data[..]
            );
        }

        if response.function.is_fault() {
            if response.function.without_fault() != request.function {
                return Err(Error::WrongFunctionCode {
                    request: request.function,
                    response: response.function.without_fault(),
                });
            }
            let code = response
                .data
                .first()
                .copied()
                .ok_or(Error::MalformedResponse("missing exception code"))?;
            return Err(Error::Exception(ExceptionCode(code)));
        }

        if response.function != request.function {
            return Err(Error::WrongFunctionCode {
                request: request.function,
                response: response.function,
            });
        }

        Ok(response)
    }
}

/// The server always answers a bit read with whole bytes; only the
/// first `quantity` bits are defined.
fn unpacked_bits(response: &Pdu, quantity: Quantity) -> Result<Vec<Coil>> {
    let mut coils = response.decode_bits()?;
    if coils.len() < usize::from(quantity) {
        return Err(Error::MalformedResponse("fewer coils than requested"));
    }
    coils.truncate(quantity.into());
    Ok(coils)
}

fn counted_words(response: &Pdu, quantity: Quantity) -> Result<Vec<Word>> {
    let words = response.decode_words()?;
    if words.len() != usize::from(quantity) {
        return Err(Error::MalformedResponse(
            "register count disagrees with request",
        ));
    }
    Ok(words)
}
