// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous RTU client example

use tokio_modbus_rtu::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let tty_path = "/dev/ttyUSB0";
    let slave = Slave(0x17);

    let builder = tokio_serial::new(tty_path, 19200);
    let port = tokio_serial::SerialStream::open(&builder)?;

    let mut client = Client::with_debug_level(Rtu::new(port), 1);
    println!("Reading a sensor value");
    let rsp = client.read_holding_registers(slave, 0x082B, 2).await?;
    println!("Sensor value is: {rsp:?}");

    client.close().await?;

    Ok(())
}
