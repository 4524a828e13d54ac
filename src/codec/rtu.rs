// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RTU framing: CRC-16 and incremental ADU reassembly.
//!
//! RTU frames carry no delimiter; the total frame length is inferred
//! from the function code and, for the variable-length codes, from an
//! embedded byte-count field.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::{
    error::{Error, Result},
    frame::{FrameType, FunctionCode, Pdu},
    slave::SlaveId,
};

// [Modbus over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a Modbus RTU frame is 256 bytes."
pub(crate) const MAX_FRAME_LEN: usize = 256;

// Slave address, function code and CRC-16.
const MIN_ADU_LEN: usize = 4;

const CRC_LEN: usize = 2;

// Exception replies are always address, fc | 0x80, exception code, CRC.
const EXCEPTION_ADU_LEN: usize = 5;

/// Standard Modbus CRC-16: polynomial 0xA001, initial value 0xFFFF,
/// reflected, no final XOR. Stored little-endian on the wire.
pub(crate) fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            let crc_odd = (crc & 0x0001) != 0;
            crc >>= 1;
            if crc_odd {
                crc ^= 0xA001;
            }
        }
    }
    crc
}

fn check_crc(adu: &[u8]) -> Result<()> {
    let (contents, trailer) = adu.split_at(adu.len() - CRC_LEN);
    let expected = LittleEndian::read_u16(trailer);
    let actual = crc16(contents);
    if expected != actual {
        return Err(Error::CrcMismatch { expected, actual });
    }
    Ok(())
}

/// Frames a PDU as a complete RTU ADU.
pub(crate) fn encode_adu(slave: SlaveId, pdu: &Pdu) -> Bytes {
    let mut adu = BytesMut::with_capacity(pdu.data.len() + MIN_ADU_LEN);
    adu.put_u8(slave);
    adu.put_u8(pdu.function.value());
    adu.put_slice(&pdu.data);
    let crc = crc16(&adu);
    adu.put_u16_le(crc);
    adu.freeze()
}

/// Splits a complete RTU ADU into slave address and PDU after
/// verifying its CRC.
///
/// The fault bit of the function code is preserved so that callers can
/// recognize exception replies.
pub(crate) fn decode_adu(adu: &[u8]) -> Result<(SlaveId, Pdu)> {
    if adu.len() < MIN_ADU_LEN {
        return Err(Error::ShortFrame { len: adu.len() });
    }
    check_crc(adu)?;
    let slave = adu[0];
    let function = FunctionCode(adu[1]);
    let data = Bytes::copy_from_slice(&adu[2..adu.len() - CRC_LEN]);
    Ok((slave, Pdu { function, data }))
}

fn request_adu_len(adu_buf: &BytesMut) -> Result<Option<usize>> {
    let Some(&fn_code) = adu_buf.get(1) else {
        return Ok(None);
    };
    let len = match fn_code {
        0x01..=0x06 => 8,
        0x0F | 0x10 => {
            return Ok(adu_buf
                .get(6)
                .map(|&byte_count| 9 + usize::from(byte_count)));
        }
        0x16 => 10,
        0x17 => {
            return Ok(adu_buf
                .get(10)
                .map(|&byte_count| 13 + usize::from(byte_count)));
        }
        0x18 => 6,
        _ => return Err(Error::UnsupportedFunctionCode(fn_code)),
    };
    Ok(Some(len))
}

fn response_adu_len(adu_buf: &BytesMut) -> Result<Option<usize>> {
    let Some(&fn_code) = adu_buf.get(1) else {
        return Ok(None);
    };
    let len = match fn_code {
        0x01..=0x04 | 0x17 => {
            return Ok(adu_buf
                .get(2)
                .map(|&byte_count| 5 + usize::from(byte_count)));
        }
        0x05 | 0x06 | 0x0F | 0x10 => 8,
        0x16 => 10,
        0x18 => {
            if adu_buf.len() > 3 {
                6 + usize::from(BigEndian::read_u16(&adu_buf[2..4]))
            } else {
                // incomplete frame
                return Ok(None);
            }
        }
        _ => return Err(Error::UnsupportedFunctionCode(fn_code)),
    };
    Ok(Some(len))
}

/// Incremental RTU frame reassembly.
///
/// Yields one raw, complete ADU per decoded item. The CRC is *not*
/// verified here; [`decode_adu`] checks it when the frame is taken
/// apart.
#[derive(Debug, Default, Eq, PartialEq)]
pub(crate) struct FrameCodec {
    frame_type: FrameType,
}

impl FrameCodec {
    pub(crate) fn set_frame_type(&mut self, frame_type: FrameType) {
        self.frame_type = frame_type;
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>> {
        // The slave address and the function code must be buffered
        // before anything can be said about the frame length.
        let Some(&fn_code) = buf.get(1) else {
            return Ok(None);
        };

        let adu_len = if fn_code & FunctionCode::FAULT_BIT != 0 {
            Some(EXCEPTION_ADU_LEN)
        } else {
            match self.frame_type {
                FrameType::Request => request_adu_len(buf)?,
                FrameType::Response => response_adu_len(buf)?,
            }
        };

        let Some(adu_len) = adu_len else {
            return Ok(None);
        };
        if buf.len() < adu_len {
            buf.reserve(adu_len - buf.len());
            return Ok(None);
        }
        Ok(Some(buf.split_to(adu_len).freeze()))
    }
}
