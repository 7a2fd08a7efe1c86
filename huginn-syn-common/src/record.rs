use core::net::Ipv4Addr;

use crate::frame::TCPOPT_MAXLEN;

/// Size in bytes of the exported [`SynRecord`] image.
pub const SYN_RECORD_LEN: usize = 64;

/// Identity of a candidate connection: `(source_address << 16) | source_port`.
///
/// Both halves are wire-native: the integer a CPU reads from the packet bytes
/// without byte swapping. Not unique over time, since clients reuse ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey(u64);

impl FlowKey {
    /// Key from wire-native source address and port, as read from the headers.
    #[inline(always)]
    pub const fn from_wire(source_address: u32, source_port: u16) -> Self {
        Self(((source_address as u64) << 16) | source_port as u64)
    }

    /// Key from a client address and a host-order port, as seen by `accept()`.
    pub fn from_flow(source_ip: Ipv4Addr, source_port: u16) -> Self {
        Self::from_wire(
            u32::from_ne_bytes(source_ip.octets()),
            u16::from_ne_bytes(source_port.to_be_bytes()),
        )
    }

    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Fingerprint captured from a single TCP SYN.
///
/// The in-memory layout is the record format read by the collector:
///
/// ```text
/// offset  0: source_address    u32  (wire-native)
/// offset  4: source_port       u16  (wire-native)
/// offset  6: window            u16  (wire-native)
/// offset  8: option_length     u16  (declared TCP options length, host order)
/// offset 10: ip_ttl            u8
/// offset 11: ip_option_length  u8   (ihl*4 - 20)
/// offset 12: options           [u8; 40]
/// offset 52: quirks            u32  (quirk_bits bitmask, host order)
/// offset 56: sequence_tick     u64  (global SYN counter at capture time, host order)
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynRecord {
    pub source_address: u32,
    pub source_port: u16,
    pub window: u16,
    /// Declared option length; may exceed the bytes actually captured.
    pub option_length: u16,
    pub ip_ttl: u8,
    pub ip_option_length: u8,
    /// Raw TCP option bytes, zero-padded past what the frame carried.
    pub options: [u8; TCPOPT_MAXLEN],
    pub quirks: u32,
    pub sequence_tick: u64,
}

const _: () = {
    use core::mem::{offset_of, size_of};
    assert!(size_of::<SynRecord>() == SYN_RECORD_LEN);
    assert!(offset_of!(SynRecord, source_address) == 0);
    assert!(offset_of!(SynRecord, source_port) == 4);
    assert!(offset_of!(SynRecord, window) == 6);
    assert!(offset_of!(SynRecord, option_length) == 8);
    assert!(offset_of!(SynRecord, ip_ttl) == 10);
    assert!(offset_of!(SynRecord, ip_option_length) == 11);
    assert!(offset_of!(SynRecord, options) == 12);
    assert!(offset_of!(SynRecord, quirks) == 52);
    assert!(offset_of!(SynRecord, sequence_tick) == 56);
};

impl SynRecord {
    pub const EMPTY: Self = Self {
        source_address: 0,
        source_port: 0,
        window: 0,
        option_length: 0,
        ip_ttl: 0,
        ip_option_length: 0,
        options: [0u8; TCPOPT_MAXLEN],
        quirks: 0,
        sequence_tick: 0,
    };

    pub const fn flow_key(&self) -> FlowKey {
        FlowKey::from_wire(self.source_address, self.source_port)
    }

    pub fn source_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.source_address.to_ne_bytes())
    }

    pub fn source_port_host(&self) -> u16 {
        u16::from_be_bytes(self.source_port.to_ne_bytes())
    }

    pub fn window_host(&self) -> u16 {
        u16::from_be_bytes(self.window.to_ne_bytes())
    }

    /// The option bytes that fit the capture buffer, at most [`TCPOPT_MAXLEN`].
    ///
    /// Bytes past the end of a truncated frame read back as zero.
    pub fn captured_options(&self) -> &[u8] {
        let len = usize::from(self.option_length).min(TCPOPT_MAXLEN);
        self.options.get(..len).unwrap_or(&self.options)
    }

    /// True when the header declared more option bytes than the buffer holds.
    pub fn options_truncated(&self) -> bool {
        usize::from(self.option_length) > TCPOPT_MAXLEN
    }

    /// Native memory image of the record, byte-identical to the `#[repr(C)]` layout.
    pub fn to_bytes(&self) -> [u8; SYN_RECORD_LEN] {
        let mut out = [0u8; SYN_RECORD_LEN];
        out[0..4].copy_from_slice(&self.source_address.to_ne_bytes());
        out[4..6].copy_from_slice(&self.source_port.to_ne_bytes());
        out[6..8].copy_from_slice(&self.window.to_ne_bytes());
        out[8..10].copy_from_slice(&self.option_length.to_ne_bytes());
        out[10] = self.ip_ttl;
        out[11] = self.ip_option_length;
        out[12..52].copy_from_slice(&self.options);
        out[52..56].copy_from_slice(&self.quirks.to_ne_bytes());
        out[56..64].copy_from_slice(&self.sequence_tick.to_ne_bytes());
        out
    }

    pub fn from_bytes(b: &[u8; SYN_RECORD_LEN]) -> Self {
        let mut options = [0u8; TCPOPT_MAXLEN];
        options.copy_from_slice(&b[12..52]);
        Self {
            source_address: u32::from_ne_bytes([b[0], b[1], b[2], b[3]]),
            source_port: u16::from_ne_bytes([b[4], b[5]]),
            window: u16::from_ne_bytes([b[6], b[7]]),
            option_length: u16::from_ne_bytes([b[8], b[9]]),
            ip_ttl: b[10],
            ip_option_length: b[11],
            options,
            quirks: u32::from_ne_bytes([b[52], b[53], b[54], b[55]]),
            sequence_tick: u64::from_ne_bytes([
                b[56], b[57], b[58], b[59], b[60], b[61], b[62], b[63],
            ]),
        }
    }

    /// Decode from an arbitrary slice; `None` unless it is exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let image: &[u8; SYN_RECORD_LEN] = bytes.try_into().ok()?;
        Some(Self::from_bytes(image))
    }
}

impl Default for SynRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Implement `aya::Pod` so the collector can read `SynRecord` straight out of a BPF map.
/// Only compiled when the `aya` feature is enabled (i.e. in the userspace crate).
///
/// SAFETY: `SynRecord` is `#[repr(C)]`, `Copy`, and the offset assertions above
/// prove it has no implicit padding.
#[cfg(feature = "aya")]
#[allow(unsafe_code)]
unsafe impl aya::Pod for SynRecord {}
