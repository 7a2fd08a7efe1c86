//! Types and parsing logic shared between the packet hook and the collector.
//!
//! This crate is `no_std` and allocation-free so it can be compiled for both targets:
//! - `bpfel-unknown-none` (kernel-side hook)
//! - the host target (capture engine and collector in `huginn-syn`)
//!
//! Every loop in this crate is bounded by a compile-time constant
//! ([`frame::MAX_VLAN_DEPTH`], [`frame::TCPOPT_MAXLEN`], [`quirk_bits::ALL`]).
#![no_std]
#![deny(unsafe_code)]

pub mod filter;
pub mod frame;
pub mod quirks;
pub mod record;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use filter::FilterConfig;
pub use frame::{parse_frame, Ipv4Header, ParsedSyn, PassReason, TcpHeader};
pub use quirks::{capture_options, extract_features, extract_quirks, SynFeatures};
pub use record::{FlowKey, SynRecord, SYN_RECORD_LEN};

/// Quirk bitmask constants extracted from IP and TCP headers.
///
/// Bit positions are part of the record format read by the collector and
/// must not be renumbered.
pub mod quirk_bits {
    pub const DF: u32 = 1 << 0; // IP don't-fragment bit (df)
    pub const NONZERO_ID: u32 = 1 << 1; // non-zero IP ID with DF set (id+)
    pub const ZERO_ID: u32 = 1 << 2; // zero IP ID without DF (id-)
    pub const MUST_BE_ZERO: u32 = 1 << 3; // reserved bit in frag_off (0+)
    pub const ECN: u32 = 1 << 4; // ECE or CWR TCP flag (ecn)
    pub const SEQ_ZERO: u32 = 1 << 5; // TCP sequence number zero (seq-)
    pub const ACK_NONZERO: u32 = 1 << 6; // non-zero ACK in SYN (ack+)
    pub const NONZERO_URG: u32 = 1 << 7; // non-zero urgent pointer (uptr+)
    pub const URG: u32 = 1 << 8; // URG flag set (urgf+)
    pub const PUSH: u32 = 1 << 9; // PUSH flag set (pushf+)

    /// Every defined bit paired with its p0f short name, in bit order.
    pub const ALL: [(u32, &str); 10] = [
        (DF, "df"),
        (NONZERO_ID, "id+"),
        (ZERO_ID, "id-"),
        (MUST_BE_ZERO, "0+"),
        (ECN, "ecn"),
        (SEQ_ZERO, "seq-"),
        (ACK_NONZERO, "ack+"),
        (NONZERO_URG, "uptr+"),
        (URG, "urgf+"),
        (PUSH, "pushf+"),
    ];

    /// Mask of all bits currently assigned.
    pub const KNOWN: u32 = DF
        | NONZERO_ID
        | ZERO_ID
        | MUST_BE_ZERO
        | ECN
        | SEQ_ZERO
        | ACK_NONZERO
        | NONZERO_URG
        | URG
        | PUSH;

    /// p0f names of the bits set in `mask`, lowest bit first. Unknown bits are skipped.
    pub fn names(mask: u32) -> impl Iterator<Item = &'static str> {
        ALL.iter()
            .filter(move |(bit, _)| mask & bit != 0)
            .map(|(_, name)| *name)
    }

}
