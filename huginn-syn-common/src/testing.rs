//! Synthetic Ethernet/IPv4/TCP frames for tests and benchmarks.
//!
//! Frames are written into a fixed buffer so the builder stays usable from
//! `no_std` code. Checksums are left at zero; the parser never looks at them.

use core::net::Ipv4Addr;

use crate::frame::{ETH_P_8021Q, ETH_P_IP, IPPROTO_TCP, IP_DF, IP_MF, IP_OFFSET, IP_RF, TCP_SYN};

/// Enough for three VLAN tags plus maximal IPv4 and TCP headers.
pub const MAX_FRAME_LEN: usize = 192;

/// A built frame; `as_bytes()` yields exactly the bytes written.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    buf: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.get(..self.len).unwrap_or(&self.buf)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cut the frame down to its first `len` bytes.
    pub fn truncated(mut self, len: usize) -> Self {
        self.len = self.len.min(len);
        self
    }
}

#[derive(Clone, Copy, Debug)]
struct Bytes40 {
    data: [u8; 40],
    len: usize,
}

impl Bytes40 {
    const EMPTY: Self = Self { data: [0u8; 40], len: 0 };

    fn from_slice(bytes: &[u8]) -> Self {
        let mut out = Self::EMPTY;
        for (slot, byte) in out.data.iter_mut().zip(bytes) {
            *slot = *byte;
            out.len = out.len.saturating_add(1);
        }
        out
    }

    /// Bytes rounded up to a 4-byte boundary with zero padding.
    fn padded(&self) -> &[u8] {
        let len = self.len.saturating_add(3) & !3;
        self.data.get(..len).unwrap_or(&self.data)
    }
}

struct Writer<'a> {
    buf: &'a mut [u8; MAX_FRAME_LEN],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos.saturating_add(bytes.len());
        if let Some(dst) = self.buf.get_mut(self.pos..end) {
            dst.copy_from_slice(bytes);
            self.pos = end;
        }
    }

    fn put_u16(&mut self, value: u16) {
        self.put(&value.to_be_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.put(&value.to_be_bytes());
    }
}

/// Builder for a TCP SYN frame.
///
/// Defaults: `10.0.0.5:51000 → 198.51.100.1:443`, TTL 64, DF set, IP ID
/// `0x1c46`, sequence 1, window 65535, SYN only, no options, no VLAN tags.
#[derive(Clone, Copy, Debug)]
pub struct SynFrameBuilder {
    vlan_tags: usize,
    vlan_proto: u16,
    ethertype: u16,
    src: Ipv4Addr,
    dst: Ipv4Addr,
    ttl: u8,
    ip_id: u16,
    df: bool,
    mf: bool,
    reserved: bool,
    frag_offset: u16,
    protocol: u8,
    ihl: Option<u8>,
    ip_options: Bytes40,
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack_seq: u32,
    flags: u8,
    window: u16,
    urg_ptr: u16,
    data_offset: Option<u8>,
    tcp_options: Bytes40,
}

impl Default for SynFrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SynFrameBuilder {
    pub fn new() -> Self {
        Self {
            vlan_tags: 0,
            vlan_proto: ETH_P_8021Q,
            ethertype: ETH_P_IP,
            src: Ipv4Addr::new(10, 0, 0, 5),
            dst: Ipv4Addr::new(198, 51, 100, 1),
            ttl: 64,
            ip_id: 0x1c46,
            df: true,
            mf: false,
            reserved: false,
            frag_offset: 0,
            protocol: IPPROTO_TCP,
            ihl: None,
            ip_options: Bytes40::EMPTY,
            src_port: 51000,
            dst_port: 443,
            seq: 1,
            ack_seq: 0,
            flags: TCP_SYN,
            window: 65535,
            urg_ptr: 0,
            data_offset: None,
            tcp_options: Bytes40::EMPTY,
        }
    }

    /// Number of stacked VLAN tags, up to three.
    pub fn vlan_tags(mut self, tags: usize) -> Self {
        self.vlan_tags = tags.min(3);
        self
    }

    /// TPID used for every VLAN tag (802.1Q by default).
    pub fn vlan_proto(mut self, proto: u16) -> Self {
        self.vlan_proto = proto;
        self
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn source(mut self, ip: Ipv4Addr, port: u16) -> Self {
        self.src = ip;
        self.src_port = port;
        self
    }

    pub fn destination(mut self, ip: Ipv4Addr, port: u16) -> Self {
        self.dst = ip;
        self.dst_port = port;
        self
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ip_id(mut self, id: u16) -> Self {
        self.ip_id = id;
        self
    }

    pub fn dont_fragment(mut self, df: bool) -> Self {
        self.df = df;
        self
    }

    pub fn more_fragments(mut self, mf: bool) -> Self {
        self.mf = mf;
        self
    }

    pub fn fragment_offset(mut self, offset: u16) -> Self {
        self.frag_offset = offset & IP_OFFSET;
        self
    }

    pub fn reserved_bit(mut self, reserved: bool) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    /// Override the IHL nibble instead of deriving it from the options.
    pub fn ihl(mut self, ihl: u8) -> Self {
        self.ihl = Some(ihl & 0x0F);
        self
    }

    pub fn ip_options(mut self, options: &[u8]) -> Self {
        self.ip_options = Bytes40::from_slice(options);
        self
    }

    pub fn seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    pub fn ack_seq(mut self, ack: u32) -> Self {
        self.ack_seq = ack;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn window(mut self, window: u16) -> Self {
        self.window = window;
        self
    }

    pub fn urg_ptr(mut self, urg_ptr: u16) -> Self {
        self.urg_ptr = urg_ptr;
        self
    }

    /// Override the data offset nibble instead of deriving it from the options.
    pub fn data_offset(mut self, doff: u8) -> Self {
        self.data_offset = Some(doff & 0x0F);
        self
    }

    pub fn tcp_options(mut self, options: &[u8]) -> Self {
        self.tcp_options = Bytes40::from_slice(options);
        self
    }

    pub fn build(&self) -> Frame {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let mut w = Writer { buf: &mut buf, pos: 0 };

        // Ethernet: locally administered MACs
        w.put(&[0x02, 0, 0, 0, 0, 0x01]);
        w.put(&[0x02, 0, 0, 0, 0, 0x02]);
        if self.vlan_tags == 0 {
            w.put_u16(self.ethertype);
        } else {
            w.put_u16(self.vlan_proto);
            for tag in 1..=self.vlan_tags {
                w.put_u16(100u16.saturating_add(tag as u16)); // TCI: VLAN id
                w.put_u16(if tag == self.vlan_tags { self.ethertype } else { self.vlan_proto });
            }
        }

        let ip_opts = self.ip_options.padded();
        let tcp_opts = self.tcp_options.padded();
        let ip_len = 20usize.saturating_add(ip_opts.len());
        let tcp_len = 20usize.saturating_add(tcp_opts.len());
        let ihl = self.ihl.unwrap_or((ip_len / 4) as u8);
        let doff = self.data_offset.unwrap_or((tcp_len / 4) as u8);

        let mut frag = self.frag_offset;
        if self.reserved {
            frag |= IP_RF;
        }
        if self.df {
            frag |= IP_DF;
        }
        if self.mf {
            frag |= IP_MF;
        }

        // IPv4
        w.put(&[0x40 | ihl, 0]);
        w.put_u16(ip_len.saturating_add(tcp_len) as u16);
        w.put_u16(self.ip_id);
        w.put_u16(frag);
        w.put(&[self.ttl, self.protocol]);
        w.put_u16(0);
        w.put(&self.src.octets());
        w.put(&self.dst.octets());
        w.put(ip_opts);

        // TCP
        w.put_u16(self.src_port);
        w.put_u16(self.dst_port);
        w.put_u32(self.seq);
        w.put_u32(self.ack_seq);
        w.put(&[doff << 4, self.flags]);
        w.put_u16(self.window);
        w.put_u16(0);
        w.put_u16(self.urg_ptr);
        w.put(tcp_opts);

        let len = w.pos;
        Frame { buf, len }
    }
}
