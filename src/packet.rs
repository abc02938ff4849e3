use crate::error::RconError;

/// Packet types defined by the protocol. On the wire these are plain
/// little-endian integers; `InvalidAuth` only ever travels server to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Login,
    Command,
    Response,
    InvalidAuth,
}

impl PacketType {
    pub fn to_le_bytes(self) -> [u8; 4] {
        let type_value: i32 = match self {
            PacketType::Login => 3,
            PacketType::Command => 2,
            PacketType::Response => 0,
            PacketType::InvalidAuth => -1,
        };
        type_value.to_le_bytes()
    }
}

impl TryFrom<i32> for PacketType {
    type Error = RconError;

    fn try_from(value: i32) -> Result<PacketType, Self::Error> {
        match value {
            3 => Ok(PacketType::Login),
            2 => Ok(PacketType::Command),
            0 => Ok(PacketType::Response),
            -1 => Ok(PacketType::InvalidAuth),
            other => Err(RconError::UnknownPacketType(other)),
        }
    }
}

/// One protocol frame. The body holds UTF-8 text and must not contain NUL
/// bytes; the terminator is appended by `pack()` and stripped by `unpack()`,
/// it is never part of the logical body.
#[derive(Debug)]
pub struct Packet {
    id: i32,
    packet_type: PacketType,
    body: String,
}

impl Packet {
    // Since the only one of these values that can change in length is the
    // body, the payload size of a packet is the byte-length of the body
    // plus 10 (id, type, two NUL terminator bytes).
    pub const BASE_PACKET_SIZE: i32 = 10;

    // Minecraft servers cap a single response payload at 4 KiB. Anything
    // larger is a spoofed length field and we refuse to allocate for it.
    pub const MAX_PACKET_SIZE: i32 = 4096;

    pub fn new(id: i32, packet_type: PacketType, body: &str) -> Self {
        Packet {
            id,
            packet_type,
            body: body.to_owned(),
        }
    }

    pub fn size(&self) -> i32 {
        self.body.len() as i32 + Self::BASE_PACKET_SIZE
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn body(&self) -> &str {
        self.body.as_ref()
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn pack(&self) -> Vec<u8> {
        // Size, ID, Type, Body, Terminator
        let mut payload = Vec::with_capacity(self.size() as usize + 4);
        payload.extend_from_slice(&self.size().to_le_bytes());
        payload.extend_from_slice(&self.id().to_le_bytes());
        payload.extend_from_slice(&self.packet_type().to_le_bytes());
        payload.extend_from_slice(self.body().as_bytes());
        // null terminate the body (C++ interop 🤢), then null terminate the entire packet
        payload.extend_from_slice(&[0, 0]);
        payload
    }

    /// Parses a server reply from `payload`, the bytes following the length
    /// prefix. Replies carry the type field ahead of the id, the reverse of
    /// the request layout; servers in the wild all agree on this, so we
    /// match it rather than the request order.
    pub fn unpack(payload: &[u8]) -> Result<Self, RconError> {
        if (payload.len() as i32) < Self::BASE_PACKET_SIZE {
            return Err(RconError::MalformedPacket("payload too short"));
        }

        if payload[payload.len() - 2..] != [0, 0] {
            return Err(RconError::MalformedPacket("missing packet terminator"));
        }

        let type_value = i32::from_le_bytes(payload[0..4].try_into()?);
        let id = i32::from_le_bytes(payload[4..8].try_into()?);

        let packet_type = type_value.try_into()?;
        let body = std::str::from_utf8(&payload[8..payload.len() - 2])?;

        Ok(Packet {
            id,
            packet_type,
            body: body.to_owned(),
        })
    }
}
