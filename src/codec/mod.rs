// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialization of request PDUs and parsing of response PDUs.

pub(crate) mod rtu;

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, BytesMut};

use crate::{
    error::{Error, Result},
    frame::{Address, Coil, FunctionCode, Pdu, Quantity, Word, COIL_OFF, COIL_ON},
};

impl Pdu {
    /// Request to read `quantity` coils starting at `address`.
    #[must_use]
    pub fn read_coils(address: Address, quantity: Quantity) -> Self {
        read_request(FunctionCode::READ_COILS, address, quantity)
    }

    /// Request to read `quantity` discrete inputs starting at `address`.
    #[must_use]
    pub fn read_discrete_inputs(address: Address, quantity: Quantity) -> Self {
        read_request(FunctionCode::READ_DISCRETE_INPUTS, address, quantity)
    }

    /// Request to read `quantity` holding registers starting at `address`.
    #[must_use]
    pub fn read_holding_registers(address: Address, quantity: Quantity) -> Self {
        read_request(FunctionCode::READ_HOLDING_REGISTERS, address, quantity)
    }

    /// Request to read `quantity` input registers starting at `address`.
    #[must_use]
    pub fn read_input_registers(address: Address, quantity: Quantity) -> Self {
        read_request(FunctionCode::READ_INPUT_REGISTERS, address, quantity)
    }

    /// Request to switch a single coil on or off.
    #[must_use]
    pub fn write_single_coil(address: Address, state: Coil) -> Self {
        let mut data = BytesMut::with_capacity(4);
        data.put_u16(address);
        data.put_u16(bool_to_coil(state));
        Self {
            function: FunctionCode::WRITE_SINGLE_COIL,
            data: data.freeze(),
        }
    }

    /// Request to write a single holding register.
    #[must_use]
    pub fn write_single_register(address: Address, word: Word) -> Self {
        let mut data = BytesMut::with_capacity(4);
        data.put_u16(address);
        data.put_u16(word);
        Self {
            function: FunctionCode::WRITE_SINGLE_REGISTER,
            data: data.freeze(),
        }
    }

    /// Request to write multiple coils, packed LSB-first into bytes.
    #[must_use]
    pub fn write_multiple_coils(address: Address, coils: &[Coil]) -> Self {
        let packed_coils = pack_coils(coils);
        let mut data = BytesMut::with_capacity(5 + packed_coils.len());
        data.put_u16(address);
        data.put_u16(coils.len() as u16);
        data.put_u8(packed_coils.len() as u8);
        data.put_slice(&packed_coils);
        Self {
            function: FunctionCode::WRITE_MULTIPLE_COILS,
            data: data.freeze(),
        }
    }

    /// Request to write multiple holding registers.
    #[must_use]
    pub fn write_multiple_registers(address: Address, words: &[Word]) -> Self {
        let mut data = BytesMut::with_capacity(5 + words.len() * 2);
        data.put_u16(address);
        data.put_u16(words.len() as u16);
        data.put_u8((words.len() * 2) as u8);
        for word in words {
            data.put_u16(*word);
        }
        Self {
            function: FunctionCode::WRITE_MULTIPLE_REGISTERS,
            data: data.freeze(),
        }
    }

    /// Parses a read-bits response payload, `byte_count` followed by
    /// the packed bits, LSB-first within each byte.
    pub fn decode_bits(&self) -> Result<Vec<Coil>> {
        let Some((&byte_count, packed)) = self.data.split_first() else {
            return Err(Error::MalformedResponse("missing byte count"));
        };
        if packed.len() != usize::from(byte_count) {
            return Err(Error::MalformedResponse(
                "byte count disagrees with payload length",
            ));
        }
        Ok(unpack_coils(packed, u16::from(byte_count) * 8))
    }

    /// Parses a read-registers response payload, `byte_count` followed
    /// by big-endian 16-bit words.
    pub fn decode_words(&self) -> Result<Vec<Word>> {
        let Some((&byte_count, payload)) = self.data.split_first() else {
            return Err(Error::MalformedResponse("missing byte count"));
        };
        if byte_count % 2 != 0 {
            return Err(Error::MalformedResponse("odd register byte count"));
        }
        if payload.len() != usize::from(byte_count) {
            return Err(Error::MalformedResponse(
                "byte count disagrees with payload length",
            ));
        }
        Ok(payload
            .chunks_exact(2)
            .map(|chunk| BigEndian::read_u16(chunk))
            .collect())
    }
}

fn read_request(function: FunctionCode, address: Address, quantity: Quantity) -> Pdu {
    let mut data = BytesMut::with_capacity(4);
    data.put_u16(address);
    data.put_u16(quantity);
    Pdu {
        function,
        data: data.freeze(),
    }
}

fn bool_to_coil(state: Coil) -> u16 {
    if state {
        COIL_ON
    } else {
        COIL_OFF
    }
}

fn packed_coils_len(bitcount: usize) -> usize {
    (bitcount + 7) / 8
}

fn pack_coils(coils: &[Coil]) -> Vec<u8> {
    let packed_size = packed_coils_len(coils.len());
    let mut res = vec![0; packed_size];
    for (i, b) in coils.iter().enumerate() {
        let v = u8::from(*b);
        res[i / 8] |= v << (i % 8);
    }
    res
}

fn unpack_coils(bytes: &[u8], count: u16) -> Vec<Coil> {
    let mut res = Vec::with_capacity(count.into());
    for i in 0..count {
        res.push((bytes[usize::from(i / 8)] >> (i % 8)) & 0b1 > 0);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_bool_to_coil() {
        assert_eq!(bool_to_coil(true), 0xFF00);
        assert_eq!(bool_to_coil(false), 0x0000);
    }

    #[test]
    fn convert_booleans_to_bytes() {
        assert_eq!(pack_coils(&[]), &[]);
        assert_eq!(pack_coils(&[true]), &[0b_1]);
        assert_eq!(pack_coils(&[false]), &[0b_0]);
        assert_eq!(pack_coils(&[true, false]), &[0b_01]);
        assert_eq!(pack_coils(&[false, true]), &[0b_10]);
        assert_eq!(pack_coils(&[true, true]), &[0b_11]);
        assert_eq!(pack_coils(&[true; 8]), &[0b_1111_1111]);
        assert_eq!(pack_coils(&[true; 9]), &[255, 1]);
        assert_eq!(pack_coils(&[false; 8]), &[0]);
        assert_eq!(pack_coils(&[false; 9]), &[0, 0]);
    }

    #[test]
    fn convert_bytes_to_booleans() {
        assert_eq!(unpack_coils(&[], 0), &[]);
        assert_eq!(unpack_coils(&[0, 0], 0), &[]);
        assert_eq!(unpack_coils(&[0b1], 1), &[true]);
        assert_eq!(unpack_coils(&[0b01], 2), &[true, false]);
        assert_eq!(unpack_coils(&[0b10], 2), &[false, true]);
        assert_eq!(unpack_coils(&[0b101], 3), &[true, false, true]);
        assert_eq!(unpack_coils(&[0xff, 0b11], 10), &[true; 10]);
    }

    #[test]
    fn pack_then_unpack_roundtrip() {
        let coils = [
            true, false, true, true, false, false, true, true, true, true, false, true, false,
            true, true, false, true, false, true,
        ];
        let packed = pack_coils(&coils);
        assert_eq!(packed, &[0xCD, 0x6B, 0x05]);
        assert_eq!(&unpack_coils(&packed, 19)[..], &coils[..]);
    }

    mod serialize_requests {
        use super::*;

        #[test]
        fn read_coils() {
            let pdu = Pdu::read_coils(0x0012, 4);
            assert_eq!(pdu.function, FunctionCode::READ_COILS);
            assert_eq!(&pdu.data[..], &[0x00, 0x12, 0x00, 0x04]);
        }

        #[test]
        fn read_discrete_inputs() {
            let pdu = Pdu::read_discrete_inputs(0x0003, 19);
            assert_eq!(pdu.function, FunctionCode::READ_DISCRETE_INPUTS);
            assert_eq!(&pdu.data[..], &[0x00, 0x03, 0x00, 19]);
        }

        #[test]
        fn read_holding_registers() {
            let pdu = Pdu::read_holding_registers(0x006B, 3);
            assert_eq!(pdu.function, FunctionCode::READ_HOLDING_REGISTERS);
            assert_eq!(&pdu.data[..], &[0x00, 0x6B, 0x00, 0x03]);
        }

        #[test]
        fn read_input_registers() {
            let pdu = Pdu::read_input_registers(0x0009, 77);
            assert_eq!(pdu.function, FunctionCode::READ_INPUT_REGISTERS);
            assert_eq!(&pdu.data[..], &[0x00, 0x09, 0x00, 0x4D]);
        }

        #[test]
        fn write_single_coil() {
            let pdu = Pdu::write_single_coil(0x00AC, true);
            assert_eq!(pdu.function, FunctionCode::WRITE_SINGLE_COIL);
            assert_eq!(&pdu.data[..], &[0x00, 0xAC, 0xFF, 0x00]);

            let pdu = Pdu::write_single_coil(0x00AC, false);
            assert_eq!(&pdu.data[..], &[0x00, 0xAC, 0x00, 0x00]);
        }

        #[test]
        fn write_single_register() {
            let pdu = Pdu::write_single_register(0x0007, 0xABCD);
            assert_eq!(pdu.function, FunctionCode::WRITE_SINGLE_REGISTER);
            assert_eq!(&pdu.data[..], &[0x00, 0x07, 0xAB, 0xCD]);
        }

        #[test]
        fn write_multiple_coils() {
            let pdu = Pdu::write_multiple_coils(0x3311, &[true, false, true, true]);
            assert_eq!(pdu.function, FunctionCode::WRITE_MULTIPLE_COILS);
            assert_eq!(&pdu.data[..], &[0x33, 0x11, 0x00, 0x04, 0x01, 0b_0000_1101]);
        }

        #[test]
        fn write_multiple_registers() {
            let pdu = Pdu::write_multiple_registers(0x0006, &[0xABCD, 0xEF12]);
            assert_eq!(pdu.function, FunctionCode::WRITE_MULTIPLE_REGISTERS);
            assert_eq!(
                &pdu.data[..],
                &[0x00, 0x06, 0x00, 0x02, 0x04, 0xAB, 0xCD, 0xEF, 0x12]
            );
        }
    }

    mod parse_responses {
        use super::*;
        use bytes::Bytes;

        fn response(function: FunctionCode, data: &'static [u8]) -> Pdu {
            Pdu {
                function,
                data: Bytes::from_static(data),
            }
        }

        #[test]
        fn read_bits() {
            let pdu = response(FunctionCode::READ_COILS, &[0x03, 0xCD, 0x6B, 0x05]);
            let bits = pdu.decode_bits().unwrap();
            #[rustfmt::skip]
            let expected = [
                true, false, true, true, false, false, true, true,
                true, true, false, true, false, true, true, false,
                true, false, true, false, false, false, false, false,
            ];
            assert_eq!(&bits[..], &expected[..]);
        }

        #[test]
        fn read_bits_then_repack() {
            static PAYLOAD: [u8; 2] = [0x01, 0b_0000_1001];
            let pdu = response(FunctionCode::READ_DISCRETE_INPUTS, &PAYLOAD);
            let bits = pdu.decode_bits().unwrap();
            assert_eq!(pack_coils(&bits), &PAYLOAD[1..]);
        }

        #[test]
        fn read_bits_rejects_wrong_byte_count() {
            let pdu = response(FunctionCode::READ_COILS, &[0x02, 0xCD]);
            assert!(matches!(
                pdu.decode_bits(),
                Err(Error::MalformedResponse(_))
            ));
        }

        #[test]
        fn read_bits_rejects_empty_payload() {
            let pdu = response(FunctionCode::READ_COILS, &[]);
            assert!(matches!(
                pdu.decode_bits(),
                Err(Error::MalformedResponse(_))
            ));
        }

        #[test]
        fn read_words() {
            let pdu = response(
                FunctionCode::READ_HOLDING_REGISTERS,
                &[0x06, 0xAE, 0x41, 0x56, 0x52, 0x43, 0x40],
            );
            assert_eq!(pdu.decode_words().unwrap(), vec![0xAE41, 0x5652, 0x4340]);
        }

        #[test]
        fn read_words_rejects_odd_byte_count() {
            let pdu = response(FunctionCode::READ_INPUT_REGISTERS, &[0x03, 0xAE, 0x41, 0x56]);
            assert!(matches!(
                pdu.decode_words(),
                Err(Error::MalformedResponse(_))
            ));
        }

        #[test]
        fn read_words_rejects_wrong_byte_count() {
            let pdu = response(FunctionCode::READ_INPUT_REGISTERS, &[0x04, 0xAE, 0x41]);
            assert!(matches!(
                pdu.decode_words(),
                Err(Error::MalformedResponse(_))
            ));
        }
    }
}
