use std::time::Duration;

use crate::{
    error::RconError,
    packet::{Packet, PacketType},
    transport::Connection,
};
use log::trace;
use tokio::time;

/// Timeout applied by [`Client::connect`] and [`Client::command`] when the
/// caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Simple asynchronous rcon client. Create one with `new()`, then call
/// `connect()` to establish the connection and authenticate. The client
/// should be `mut` as it keeps a counter used for [Packet] IDs.
///
/// The protocol allows one packet in flight at a time, which the `&mut self`
/// receivers enforce: there is no way to overlap two commands on the same
/// client. After an I/O or decode error the connection may hold a partial
/// frame and the client should not be trusted; `close()` and `connect()`
/// again before issuing further commands.
///
/// ## Example
/// ```no_run
/// use craftcon::client::Client;
/// use std::error::Error;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn Error>> {
///     // client must be mutable so we can increment packet IDs
///     let mut client = Client::new("localhost", 25575, "<put rcon password here>");
///     client.connect().await?;
///
///     let response = client.command("list").await?;
///     println!("{}", response.body());
///
///     client.close().await;
///     Ok(())
/// }
/// ```
pub struct Client {
    host: String,
    port: u16,
    password: String,
    next_packet_id: i32,
    conn: Option<Connection>,
}

/// A single decoded reply from the server.
#[derive(Debug)]
pub struct Response {
    body: String,
    packet_type: PacketType,
}

impl Response {
    /// The response text exactly as the server sent it.
    pub fn body(&self) -> &str {
        self.body.as_ref()
    }

    /// The response text with `§`-style colour codes removed. Minecraft
    /// servers decorate console output with a `§` marker followed by one
    /// formatting character; this strips each pair.
    pub fn body_clean(&self) -> String {
        let mut clean = String::with_capacity(self.body.len());
        let mut chars = self.body.chars();
        while let Some(c) = chars.next() {
            if c == '§' {
                chars.next();
            } else {
                clean.push(c);
            }
        }
        clean
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }
}

impl Client {
    /// Creates a client in the disconnected state. No I/O happens until
    /// [`Client::connect`] is called.
    pub fn new(host: &str, port: u16, password: &str) -> Self {
        Client {
            host: host.to_owned(),
            port,
            password: password.to_owned(),
            next_packet_id: 0,
            conn: None,
        }
    }

    /// Connects and authenticates with [`DEFAULT_TIMEOUT`].
    pub async fn connect(&mut self) -> Result<(), RconError> {
        self.connect_timeout(DEFAULT_TIMEOUT).await
    }

    /// Connects to the server and performs the login exchange. The whole
    /// sequence, TCP handshake included, must finish within `timeout` or
    /// the attempt fails with [`RconError::ConnectTimeout`].
    ///
    /// Calling this on an already connected client is a no-op.
    pub async fn connect_timeout(&mut self, timeout: Duration) -> Result<(), RconError> {
        if self.conn.is_some() {
            return Ok(());
        }

        match time::timeout(timeout, self.establish(timeout)).await {
            Ok(result) => result,
            Err(_) => Err(RconError::ConnectTimeout),
        }
    }

    /// Runs a command with [`DEFAULT_TIMEOUT`].
    pub async fn command(&mut self, command: &str) -> Result<Response, RconError> {
        self.command_timeout(command, DEFAULT_TIMEOUT).await
    }

    /// Runs a command and reads the single reply packet the server sends
    /// back. Fails with [`RconError::NotConnected`], before anything is put
    /// on the wire, unless the client is connected and authenticated.
    pub async fn command_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<Response, RconError> {
        if self.conn.is_none() {
            return Err(RconError::NotConnected);
        }

        let packet = self.create_packet(PacketType::Command, command);
        let response = time::timeout(timeout, self.roundtrip(packet)).await??;

        Ok(Response {
            packet_type: response.packet_type(),
            body: response.into_body(),
        })
    }

    /// Closes the connection. Safe to call at any time, any number of
    /// times; closing a disconnected client does nothing.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close().await;
        }
    }

    async fn establish(&mut self, timeout: Duration) -> Result<(), RconError> {
        let mut conn = Connection::open(&self.host, self.port, timeout).await?;

        trace!("authenticating with {}:{}", self.host, self.port);

        let password = self.password.clone();
        let login = self.create_packet(PacketType::Login, &password);
        conn.write_all(&login.pack()).await?;

        // any reply other than an invalid-auth marker means we are in; the
        // body of the login response carries nothing of interest
        match Self::read_packet(&mut conn).await {
            Ok(_) => {
                trace!("auth complete");
                self.conn = Some(conn);
                Ok(())
            }
            Err(e) => {
                conn.close().await;
                Err(e)
            }
        }
    }

    async fn roundtrip(&mut self, packet: Packet) -> Result<Packet, RconError> {
        let conn = self.conn.as_mut().ok_or(RconError::NotConnected)?;

        trace!("sending packet id {}", packet.id());
        conn.write_all(&packet.pack()).await?;

        let response = Self::read_packet(conn).await?;
        trace!("received response for packet id {}", response.id());

        Ok(response)
    }

    async fn read_packet(conn: &mut Connection) -> Result<Packet, RconError> {
        let mut length_bytes = [0u8; 4];
        conn.read_exact(&mut length_bytes).await?;

        let length = i32::from_le_bytes(length_bytes);
        if !(Packet::BASE_PACKET_SIZE..=Packet::MAX_PACKET_SIZE).contains(&length) {
            return Err(RconError::MalformedPacket("payload length out of bounds"));
        }

        let mut payload = vec![0u8; length as usize];
        conn.read_exact(&mut payload).await?;

        let packet = Packet::unpack(&payload)?;
        if packet.packet_type() == PacketType::InvalidAuth {
            return Err(RconError::AuthenticationFailed);
        }

        Ok(packet)
    }

    fn create_packet(&mut self, packet_type: PacketType, body: &str) -> Packet {
        // ids only correlate replies for debugging, so wrapping back to zero
        // at i32::MAX is fine; the protocol wants them non-negative
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(0);

        Packet::new(self.next_packet_id, packet_type, body)
    }
}
