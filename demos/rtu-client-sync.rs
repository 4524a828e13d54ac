// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous RTU client example

fn main() -> anyhow::Result<()> {
    use tokio_modbus_rtu::prelude::*;

    env_logger::init();

    let tty_path = "/dev/ttyUSB0";
    let slave = Slave(0x17);

    let builder = tokio_serial::new(tty_path, 19200);

    let mut client = sync::connect(&builder)?;
    println!("Reading a sensor value");
    let rsp = client.read_holding_registers(slave, 0x082B, 2)?;
    println!("Sensor value is: {rsp:?}");

    Ok(())
}
