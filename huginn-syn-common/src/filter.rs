use core::net::Ipv4Addr;

/// Destination filter applied before any capture, set once before the hook runs.
///
/// Both values are wire-native so they compare directly against header fields.
/// A zero value disables the corresponding check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FilterConfig {
    dst_ip: u32,
    dst_port: u16,
}

impl FilterConfig {
    /// Capture SYNs to every destination.
    pub const ANY: Self = Self { dst_ip: 0, dst_port: 0 };

    /// Build from a listen address and host-order port.
    ///
    /// `0.0.0.0` disables the IP check and port `0` disables the port check.
    pub fn new(dst_ip: Ipv4Addr, dst_port: u16) -> Self {
        let dst_ip = if dst_ip.is_unspecified() {
            0
        } else {
            u32::from_ne_bytes(dst_ip.octets())
        };
        Self { dst_ip, dst_port: u16::from_ne_bytes(dst_port.to_be_bytes()) }
    }

    /// Configured destination, `None` when the IP check is disabled.
    pub fn dst_ip(&self) -> Option<Ipv4Addr> {
        (self.dst_ip != 0).then(|| Ipv4Addr::from(self.dst_ip.to_ne_bytes()))
    }

    /// Configured host-order destination port, `None` when the port check is disabled.
    pub fn dst_port(&self) -> Option<u16> {
        (self.dst_port != 0).then(|| u16::from_be_bytes(self.dst_port.to_ne_bytes()))
    }

    #[inline(always)]
    pub fn matches_ip(&self, daddr_wire: u32) -> bool {
        self.dst_ip == 0 || self.dst_ip == daddr_wire
    }

    #[inline(always)]
    pub fn matches_port(&self, dest_wire: u16) -> bool {
        self.dst_port == 0 || self.dst_port == dest_wire
    }
}
