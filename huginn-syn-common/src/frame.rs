//! Bounded, length-checked walk of Ethernet → VLAN → IPv4 → TCP.
//!
//! Every header is obtained through [`header_at`], which checks that the whole
//! fixed-size header lies inside the frame before handing out a reference, so
//! no field is ever read past the end of the buffer. Rejections are ordinary
//! values ([`PassReason`]): the frame is simply not of interest.

use core::net::Ipv4Addr;

use crate::filter::FilterConfig;

// ── Sizes and bounds ─────────────────────────────────────────────────────────

pub const ETH_HDR_LEN: usize = 14;
pub const VLAN_HDR_LEN: usize = 4;
/// Maximum stacked VLAN tags (802.1Q / 802.1ad QinQ).
pub const MAX_VLAN_DEPTH: usize = 2;
/// Ethernet header plus room for the maximum VLAN stack.
pub const MIN_FRAME_LEN: usize = ETH_HDR_LEN + MAX_VLAN_DEPTH * VLAN_HDR_LEN;
pub const IPV4_HDR_LEN: usize = 20;
pub const TCP_HDR_LEN: usize = 20;
/// TCP options field is at most 40 bytes (header max 60 bytes - 20 fixed).
pub const TCPOPT_MAXLEN: usize = 40;

// ── Protocol constants (host order, compared after decoding) ─────────────────

pub const ETH_P_IP: u16 = 0x0800;
pub const ETH_P_8021Q: u16 = 0x8100;
pub const ETH_P_8021AD: u16 = 0x88A8;
pub const IPPROTO_TCP: u8 = 6;

pub const IP_RF: u16 = 0x8000; // reserved / must-be-zero
pub const IP_DF: u16 = 0x4000; // don't fragment
pub const IP_MF: u16 = 0x2000; // more fragments
pub const IP_OFFSET: u16 = 0x1FFF; // fragment offset mask

pub const TCP_FIN: u8 = 0x01;
pub const TCP_SYN: u8 = 0x02;
pub const TCP_RST: u8 = 0x04;
pub const TCP_PSH: u8 = 0x08;
pub const TCP_ACK: u8 = 0x10;
pub const TCP_URG: u8 = 0x20;
pub const TCP_ECE: u8 = 0x40;
pub const TCP_CWR: u8 = 0x80;

/// Why a frame was passed through without capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassReason {
    /// Shorter than an Ethernet header plus the maximum VLAN stack.
    TooShort,
    /// More than [`MAX_VLAN_DEPTH`] stacked VLAN tags.
    VlanTooDeep,
    /// Encapsulated protocol is not IPv4 (IPv6 included).
    NotIpv4,
    /// Frame ends inside the fixed IPv4 header.
    TruncatedIp,
    /// More-fragments flag or a non-zero fragment offset.
    Fragmented,
    NotTcp,
    /// Destination address differs from the configured filter.
    DstIpMismatch,
    /// IPv4 header length field below 20 bytes.
    BadIpHeaderLen,
    /// Frame ends inside the fixed TCP header.
    TruncatedTcp,
    /// Destination port differs from the configured filter.
    DstPortMismatch,
    /// TCP data offset below 20 bytes.
    BadTcpHeaderLen,
    /// Not a bare SYN (SYN unset, or SYN+ACK).
    NotSyn,
}

impl PassReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::VlanTooDeep => "vlan_too_deep",
            Self::NotIpv4 => "not_ipv4",
            Self::TruncatedIp => "truncated_ip",
            Self::Fragmented => "fragmented",
            Self::NotTcp => "not_tcp",
            Self::DstIpMismatch => "dst_ip_mismatch",
            Self::BadIpHeaderLen => "bad_ip_header_len",
            Self::TruncatedTcp => "truncated_tcp",
            Self::DstPortMismatch => "dst_port_mismatch",
            Self::BadTcpHeaderLen => "bad_tcp_header_len",
            Self::NotSyn => "not_syn",
        }
    }
}

/// View over the fixed 20 bytes of an IPv4 header.
#[derive(Clone, Copy, Debug)]
pub struct Ipv4Header<'a> {
    bytes: &'a [u8; IPV4_HDR_LEN],
}

impl<'a> Ipv4Header<'a> {
    pub const fn new(bytes: &'a [u8; IPV4_HDR_LEN]) -> Self {
        Self { bytes }
    }

    /// Declared header length in bytes (`ihl * 4`), options included.
    #[inline(always)]
    pub fn header_len(&self) -> usize {
        usize::from(self.bytes[0] & 0x0F).saturating_mul(4)
    }

    #[inline(always)]
    pub fn identification(&self) -> u16 {
        u16::from_be_bytes([self.bytes[4], self.bytes[5]])
    }

    /// Flags and fragment offset word, host order.
    #[inline(always)]
    pub fn frag_off(&self) -> u16 {
        u16::from_be_bytes([self.bytes[6], self.bytes[7]])
    }

    #[inline(always)]
    pub fn dont_fragment(&self) -> bool {
        self.frag_off() & IP_DF != 0
    }

    #[inline(always)]
    pub fn reserved_flag(&self) -> bool {
        self.frag_off() & IP_RF != 0
    }

    #[inline(always)]
    pub fn is_fragment(&self) -> bool {
        self.frag_off() & (IP_MF | IP_OFFSET) != 0
    }

    #[inline(always)]
    pub fn ttl(&self) -> u8 {
        self.bytes[8]
    }

    #[inline(always)]
    pub fn protocol(&self) -> u8 {
        self.bytes[9]
    }

    #[inline(always)]
    pub fn saddr_wire(&self) -> u32 {
        u32::from_ne_bytes([self.bytes[12], self.bytes[13], self.bytes[14], self.bytes[15]])
    }

    #[inline(always)]
    pub fn daddr_wire(&self) -> u32 {
        u32::from_ne_bytes([self.bytes[16], self.bytes[17], self.bytes[18], self.bytes[19]])
    }

    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.saddr_wire().to_ne_bytes())
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.daddr_wire().to_ne_bytes())
    }
}

/// View over the fixed 20 bytes of a TCP header.
#[derive(Clone, Copy, Debug)]
pub struct TcpHeader<'a> {
    bytes: &'a [u8; TCP_HDR_LEN],
}

impl<'a> TcpHeader<'a> {
    pub const fn new(bytes: &'a [u8; TCP_HDR_LEN]) -> Self {
        Self { bytes }
    }

    #[inline(always)]
    pub fn source_wire(&self) -> u16 {
        u16::from_ne_bytes([self.bytes[0], self.bytes[1]])
    }

    #[inline(always)]
    pub fn dest_wire(&self) -> u16 {
        u16::from_ne_bytes([self.bytes[2], self.bytes[3]])
    }

    #[inline(always)]
    pub fn seq(&self) -> u32 {
        u32::from_be_bytes([self.bytes[4], self.bytes[5], self.bytes[6], self.bytes[7]])
    }

    #[inline(always)]
    pub fn ack_seq(&self) -> u32 {
        u32::from_be_bytes([self.bytes[8], self.bytes[9], self.bytes[10], self.bytes[11]])
    }

    /// Declared header length in bytes (`doff * 4`), options included.
    #[inline(always)]
    pub fn header_len(&self) -> usize {
        usize::from(self.bytes[12] >> 4).saturating_mul(4)
    }

    #[inline(always)]
    pub fn flags(&self) -> u8 {
        self.bytes[13]
    }

    #[inline(always)]
    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags() & flag != 0
    }

    #[inline(always)]
    pub fn window_wire(&self) -> u16 {
        u16::from_ne_bytes([self.bytes[14], self.bytes[15]])
    }

    #[inline(always)]
    pub fn urg_ptr(&self) -> u16 {
        u16::from_be_bytes([self.bytes[18], self.bytes[19]])
    }

    /// Pure SYN: SYN set, ACK clear.
    #[inline(always)]
    pub fn is_bare_syn(&self) -> bool {
        self.has_flag(TCP_SYN) && !self.has_flag(TCP_ACK)
    }
}

/// Headers of an accepted SYN.
#[derive(Clone, Copy, Debug)]
pub struct ParsedSyn<'a> {
    pub ip: Ipv4Header<'a>,
    pub tcp: TcpHeader<'a>,
    /// Offset of the first byte after the fixed TCP header, where options start.
    pub header_end: usize,
}

/// Returns the `N` bytes at `offset`, or `None` if they do not all lie inside `frame`.
#[inline(always)]
fn header_at<const N: usize>(frame: &[u8], offset: usize) -> Option<&[u8; N]> {
    let end = offset.checked_add(N)?;
    frame.get(offset..end)?.try_into().ok()
}

#[inline(always)]
fn is_vlan(proto: u16) -> bool {
    proto == ETH_P_8021Q || proto == ETH_P_8021AD
}

/// Decide whether `frame` is a bare IPv4 TCP SYN matching `filter`.
pub fn parse_frame<'a>(frame: &'a [u8], filter: &FilterConfig) -> Result<ParsedSyn<'a>, PassReason> {
    // ── Ethernet ─────────────────────────────────────────────────────────────
    if frame.len() < MIN_FRAME_LEN {
        return Err(PassReason::TooShort);
    }
    let eth: &[u8; ETH_HDR_LEN] = header_at(frame, 0).ok_or(PassReason::TooShort)?;
    let mut offset = ETH_HDR_LEN;
    let mut eth_type = u16::from_be_bytes([eth[12], eth[13]]);

    // Up to two VLAN tags (QinQ / 802.1ad)
    for _ in 0..MAX_VLAN_DEPTH {
        if !is_vlan(eth_type) {
            break;
        }
        let vlan: &[u8; VLAN_HDR_LEN] = header_at(frame, offset).ok_or(PassReason::TooShort)?;
        eth_type = u16::from_be_bytes([vlan[2], vlan[3]]);
        offset = offset.saturating_add(VLAN_HDR_LEN);
    }
    if is_vlan(eth_type) {
        return Err(PassReason::VlanTooDeep);
    }
    if eth_type != ETH_P_IP {
        return Err(PassReason::NotIpv4);
    }

    // ── IPv4 ─────────────────────────────────────────────────────────────────
    let ip = Ipv4Header::new(header_at(frame, offset).ok_or(PassReason::TruncatedIp)?);

    if ip.is_fragment() {
        return Err(PassReason::Fragmented);
    }
    if ip.protocol() != IPPROTO_TCP {
        return Err(PassReason::NotTcp);
    }
    if !filter.matches_ip(ip.daddr_wire()) {
        return Err(PassReason::DstIpMismatch);
    }

    let ip_hdr_len = ip.header_len();
    if ip_hdr_len < IPV4_HDR_LEN {
        return Err(PassReason::BadIpHeaderLen);
    }
    // Skips IP options along with the fixed header
    offset = offset.saturating_add(ip_hdr_len);

    // ── TCP ──────────────────────────────────────────────────────────────────
    let tcp = TcpHeader::new(header_at(frame, offset).ok_or(PassReason::TruncatedTcp)?);

    if !filter.matches_port(tcp.dest_wire()) {
        return Err(PassReason::DstPortMismatch);
    }
    if tcp.header_len() < TCP_HDR_LEN {
        return Err(PassReason::BadTcpHeaderLen);
    }
    if !tcp.is_bare_syn() {
        return Err(PassReason::NotSyn);
    }

    Ok(ParsedSyn { ip, tcp, header_end: offset.saturating_add(TCP_HDR_LEN) })
}
