//! Byte-level session over one TCP connection: bounded connect, full
//! writes and exact-length reads. Protocol framing lives in [`crate::packet`].

use std::io::ErrorKind;
use std::time::Duration;

use log::trace;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

use crate::error::RconError;

pub(crate) struct Connection {
    stream: TcpStream,
}

impl Connection {
    /// Opens a TCP connection within `timeout`. Nothing is written yet;
    /// failure leaves no socket behind.
    pub async fn open(host: &str, port: u16, timeout: Duration) -> Result<Self, RconError> {
        let stream = match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Err(_) => return Err(RconError::ConnectTimeout),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(RconError::ConnectionRefused(e))
            }
            Ok(Err(e)) => return Err(RconError::ConnectFailed(e)),
            Ok(Ok(stream)) => stream,
        };

        trace!("opened tcp stream to {}:{}", host, port);

        Ok(Connection { stream })
    }

    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<(), RconError> {
        self.stream
            .write_all(bytes)
            .await
            .map_err(RconError::WriteFailed)
    }

    /// Fills `buf` completely, looping over short reads. The length header
    /// states exactly how many bytes belong to a packet, so a partial read
    /// is never useful to us.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), RconError> {
        match self.stream.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(RconError::ConnectionClosed),
            Err(e) => Err(RconError::ReadFailed(e)),
        }
    }

    /// Shuts the stream down. Errors are ignored; the peer may already be
    /// gone and dropping the connection releases the socket either way.
    pub async fn close(mut self) {
        let _ = self.stream.shutdown().await;
        trace!("tcp stream closed");
    }
}
