use thiserror::Error;
use tokio::time::error::Elapsed;

/// Possible errors for the package.
#[derive(Error, Debug)]
pub enum RconError {
    /// Returned if the connection could not be established before the
    /// deadline, either during the TCP handshake or the login exchange.
    #[error("timed out connecting to host")]
    ConnectTimeout,
    /// Returned if the host actively refused the connection, usually
    /// because nothing is listening on the rcon port.
    #[error("host refused the connection")]
    ConnectionRefused(#[source] std::io::Error),
    /// Returned if the connection failed for any other reason (DNS
    /// resolution, unreachable network and friends).
    #[error("host cannot be reached")]
    ConnectFailed(#[source] std::io::Error),
    /// Returned if you can't remember the password.
    #[error("bad password")]
    AuthenticationFailed,
    /// Returned if a command was issued before `connect()`, or after the
    /// client was closed.
    #[error("client is not connected")]
    NotConnected,
    /// Returned if a packet violates the protocol framing (bad length,
    /// missing terminator).
    #[error("malformed packet: {0}")]
    MalformedPacket(&'static str),
    /// Returned if the header is mangled in some way (bad offsets, incomplete
    /// response)
    #[error("packet header malformed (can't parse size, id or type)")]
    MalformedPacketHeader(#[from] std::array::TryFromSliceError),
    /// Returned if we received a packet that does not have a type known to us.
    #[error("unknown rcon packet type: {0}")]
    UnknownPacketType(i32),
    /// Returned if the packet body is mangled in some way.
    #[error("packet body is not valid utf-8")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    /// Internal error used if the stream was successfully established, but
    /// there was a problem writing to the socket.
    #[error("cannot send message to host")]
    WriteFailed(#[source] std::io::Error),
    /// Internal error used if the stream was successfully established, but
    /// there was a problem reading from the socket.
    #[error("cannot receive response from host")]
    ReadFailed(#[source] std::io::Error),
    /// Returned if the host closed the connection in the middle of a packet.
    #[error("connection closed by host")]
    ConnectionClosed,
    /// Returned if the server did not respond to a command in time.
    #[error("timeout")]
    Timeout(#[from] Elapsed),
}
