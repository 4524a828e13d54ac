// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RTU transport over serial byte devices.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::StreamExt as _;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt as _};
use tokio_util::codec::Framed;

use super::{Transport, TransportType};
use crate::{
    codec::rtu::{decode_adu, encode_adu, FrameCodec, MAX_FRAME_LEN},
    error::Result,
    frame::{FrameType, Pdu},
    slave::SlaveId,
};

/// RTU framing over any full-duplex byte device.
///
/// The device is expected to return from a read as soon as at least
/// one byte is available; its inter-character timeout bounds how long
/// an incomplete frame can stall a reader.
#[derive(Debug)]
pub struct Rtu<T> {
    framed: Framed<T, FrameCodec>,
}

impl<T> Rtu<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Attaches to a byte device, e.g. a serial port.
    pub fn new(device: T) -> Self {
        let framed = Framed::with_capacity(device, FrameCodec::default(), MAX_FRAME_LEN);
        Self { framed }
    }
}

#[async_trait]
impl<T> Transport for Rtu<T>
where
    T: AsyncRead + AsyncWrite + Send + Unpin,
{
    fn encode(&self, slave: SlaveId, pdu: &Pdu) -> Result<Bytes> {
        Ok(encode_adu(slave, pdu))
    }

    fn decode(&self, frame: &[u8]) -> Result<(SlaveId, Pdu)> {
        decode_adu(frame)
    }

    fn set_incoming_frame_type(&mut self, frame_type: FrameType) {
        self.framed.codec_mut().set_frame_type(frame_type);
    }

    fn transport_type(&self) -> TransportType {
        TransportType::Rtu
    }

    async fn read_frame(&mut self) -> Result<Bytes> {
        self.framed
            .next()
            .await
            .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::BrokenPipe).into()))
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        // Every read hands back one full frame; bytes left over from an
        // earlier transaction must not leak into the next one.
        self.framed.read_buffer_mut().clear();
        let device = self.framed.get_mut();
        device.write_all(frame).await?;
        device.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::{
        pin::Pin,
        task::{Context, Poll},
    };

    use tokio::io::{duplex, AsyncReadExt as _, AsyncWriteExt as _, ReadBuf};

    use super::*;
    use crate::error::Error;

    /// A device that hands out its scripted bytes one at a time, then
    /// signals end-of-stream.
    #[derive(Debug)]
    struct TrickleDevice {
        data: Vec<u8>,
        pos: usize,
    }

    impl TrickleDevice {
        fn new(data: &[u8]) -> Self {
            Self {
                data: data.to_vec(),
                pos: 0,
            }
        }
    }

    impl AsyncRead for TrickleDevice {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.pos < self.data.len() {
                let byte = self.data[self.pos];
                self.pos += 1;
                buf.put_slice(&[byte]);
            }
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for TrickleDevice {
        fn poll_write(
            self: Pin<&mut Self>,
            _: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn reassemble_frame_from_single_bytes() {
        let response = [
            0x11, 0x03, 0x06, 0xAE, 0x41, 0x56, 0x52, 0x43, 0x40, 0x49, 0xAD,
        ];
        let mut rtu = Rtu::new(TrickleDevice::new(&response));
        rtu.set_incoming_frame_type(FrameType::Response);

        let frame = rtu.read_frame().await.unwrap();
        assert_eq!(&frame[..], &response[..]);

        // The stream is exhausted, a second read must not block.
        let err = rtu.read_frame().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn write_frame_is_a_passthrough() {
        let (device, mut peer) = duplex(64);
        let mut rtu = Rtu::new(device);
        let pdu = Pdu::read_holding_registers(0x006B, 3);
        let packet = rtu.encode(0x11, &pdu).unwrap();
        rtu.write_frame(&packet).await.unwrap();

        let mut written = vec![0u8; packet.len()];
        peer.read_exact(&mut written).await.unwrap();
        assert_eq!(written, [0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87]);
    }

    #[tokio::test]
    async fn stale_bytes_are_dropped_before_writing() {
        let (device, mut peer) = duplex(64);
        let mut rtu = Rtu::new(device);

        // Garbage from a previous, aborted transaction.
        rtu.framed.read_buffer_mut().extend_from_slice(&[0xFF, 0xEE]);

        let echo = [0x11, 0x05, 0x00, 0xAC, 0xFF, 0x00, 0x4E, 0x8B];
        let request = Pdu::write_single_coil(0x00AC, true);
        let packet = rtu.encode(0x11, &request).unwrap();
        rtu.write_frame(&packet).await.unwrap();
        peer.write_all(&echo).await.unwrap();

        let frame = rtu.read_frame().await.unwrap();
        assert_eq!(&frame[..], &echo[..]);
    }

    #[test]
    fn transport_type_is_rtu() {
        let (device, _peer) = duplex(64);
        let rtu = Rtu::new(device);
        assert_eq!(rtu.transport_type(), TransportType::Rtu);
    }
}
