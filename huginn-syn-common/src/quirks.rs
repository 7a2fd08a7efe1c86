use crate::frame::{
    Ipv4Header, ParsedSyn, TcpHeader, IPV4_HDR_LEN, TCPOPT_MAXLEN, TCP_CWR, TCP_ECE, TCP_HDR_LEN,
    TCP_PSH, TCP_URG,
};
use crate::quirk_bits;

/// Header-derived fingerprint features of an accepted SYN.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynFeatures {
    pub quirks: u32,
    /// IP header length beyond the fixed 20 bytes.
    pub ip_option_length: u8,
    /// Declared TCP options length (`doff * 4 - 20`), kept even when truncated.
    pub option_length: u16,
    pub options: [u8; TCPOPT_MAXLEN],
}

/// Quirk bitmask for an IPv4/TCP header pair. Each bit is evaluated independently.
pub fn extract_quirks(ip: &Ipv4Header<'_>, tcp: &TcpHeader<'_>) -> u32 {
    let mut quirks: u32 = 0;
    let df = ip.dont_fragment();
    let ip_id = ip.identification();

    if df {
        quirks |= quirk_bits::DF;
    }
    if df && ip_id != 0 {
        quirks |= quirk_bits::NONZERO_ID;
    }
    if !df && ip_id == 0 {
        quirks |= quirk_bits::ZERO_ID;
    }
    if ip.reserved_flag() {
        quirks |= quirk_bits::MUST_BE_ZERO;
    }
    if tcp.has_flag(TCP_ECE) || tcp.has_flag(TCP_CWR) {
        quirks |= quirk_bits::ECN;
    }
    if tcp.seq() == 0 {
        quirks |= quirk_bits::SEQ_ZERO;
    }
    if tcp.ack_seq() != 0 {
        quirks |= quirk_bits::ACK_NONZERO;
    }
    if tcp.urg_ptr() != 0 {
        quirks |= quirk_bits::NONZERO_URG;
    }
    if tcp.has_flag(TCP_URG) {
        quirks |= quirk_bits::URG;
    }
    if tcp.has_flag(TCP_PSH) {
        quirks |= quirk_bits::PUSH;
    }
    quirks
}

/// Copy TCP option bytes starting at `start`.
///
/// Stops at the smallest of `declared`, [`TCPOPT_MAXLEN`] and the end of `frame`;
/// the rest of the buffer stays zero. At most [`TCPOPT_MAXLEN`] iterations.
pub fn capture_options(frame: &[u8], start: usize, declared: usize) -> [u8; TCPOPT_MAXLEN] {
    let mut options = [0u8; TCPOPT_MAXLEN];
    let present = frame.get(start..).unwrap_or(&[]);
    for (slot, byte) in options.iter_mut().zip(present).take(declared) {
        *slot = *byte;
    }
    options
}

/// Quirks, option lengths and option bytes of an accepted SYN in `frame`.
pub fn extract_features(frame: &[u8], parsed: &ParsedSyn<'_>) -> SynFeatures {
    let ip_option_length = parsed.ip.header_len().saturating_sub(IPV4_HDR_LEN);
    let option_length = parsed.tcp.header_len().saturating_sub(TCP_HDR_LEN);
    SynFeatures {
        quirks: extract_quirks(&parsed.ip, &parsed.tcp),
        // ihl and doff are 4-bit fields, so both lengths are at most 40
        ip_option_length: u8::try_from(ip_option_length).unwrap_or(u8::MAX),
        option_length: u16::try_from(option_length).unwrap_or(u16::MAX),
        options: capture_options(frame, parsed.header_end, option_length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterConfig;
    use crate::frame::{parse_frame, TCP_ACK, TCP_SYN};
    use crate::testing::SynFrameBuilder;

    fn quirks_of(builder: SynFrameBuilder) -> u32 {
        let frame = builder.build();
        match parse_frame(frame.as_bytes(), &FilterConfig::ANY) {
            Ok(parsed) => extract_quirks(&parsed.ip, &parsed.tcp),
            Err(reason) => panic!("synthetic SYN rejected: {reason:?}"),
        }
    }

    /// Headers that trigger no quirk at all: DF clear with a non-zero IP ID,
    /// non-zero sequence, zero ACK and urgent pointer, only the SYN flag.
    fn clean() -> SynFrameBuilder {
        SynFrameBuilder::new()
            .dont_fragment(false)
            .ip_id(0x1234)
            .seq(1)
            .ack_seq(0)
            .urg_ptr(0)
            .flags(TCP_SYN)
    }

    #[test]
    fn test_clean_headers_have_no_quirks() {
        assert_eq!(quirks_of(clean()), 0);
    }

    #[test]
    fn test_each_quirk_individually() {
        let cases: [(SynFrameBuilder, u32); 9] = [
            (clean().ip_id(0), quirk_bits::ZERO_ID),
            (clean().reserved_bit(true), quirk_bits::MUST_BE_ZERO),
            (clean().flags(TCP_SYN | TCP_ECE), quirk_bits::ECN),
            (clean().flags(TCP_SYN | TCP_CWR), quirk_bits::ECN),
            (clean().seq(0), quirk_bits::SEQ_ZERO),
            (clean().ack_seq(7), quirk_bits::ACK_NONZERO),
            (clean().urg_ptr(1), quirk_bits::NONZERO_URG),
            (clean().flags(TCP_SYN | TCP_URG), quirk_bits::URG),
            (clean().flags(TCP_SYN | TCP_PSH), quirk_bits::PUSH),
        ];
        for (builder, expected) in cases {
            assert_eq!(quirks_of(builder), expected);
        }
    }

    #[test]
    fn test_df_quirks_depend_on_id() {
        // id+ only exists alongside df; with df set a zero ID adds nothing.
        assert_eq!(quirks_of(clean().dont_fragment(true).ip_id(0)), quirk_bits::DF);
        assert_eq!(
            quirks_of(clean().dont_fragment(true).ip_id(9)),
            quirk_bits::DF | quirk_bits::NONZERO_ID
        );
        assert_eq!(quirks_of(clean().dont_fragment(false).ip_id(0)), quirk_bits::ZERO_ID);
    }

    #[test]
    fn test_quirks_combine_by_or() {
        let builder = clean()
            .dont_fragment(true)
            .ip_id(0)
            .reserved_bit(true)
            .seq(0)
            .ack_seq(1)
            .urg_ptr(5)
            .flags(TCP_SYN | TCP_ECE | TCP_CWR | TCP_URG | TCP_PSH);
        let expected = quirk_bits::DF
            | quirk_bits::MUST_BE_ZERO
            | quirk_bits::ECN
            | quirk_bits::SEQ_ZERO
            | quirk_bits::ACK_NONZERO
            | quirk_bits::NONZERO_URG
            | quirk_bits::URG
            | quirk_bits::PUSH;
        assert_eq!(quirks_of(builder), expected);
    }

    #[test]
    fn test_ack_flag_is_not_a_quirk_source() {
        // SYN+ACK never reaches the extractor; the parser rejects it.
        let frame = clean().flags(TCP_SYN | TCP_ACK).build();
        assert!(parse_frame(frame.as_bytes(), &FilterConfig::ANY).is_err());
    }

    #[test]
    fn test_capture_options_stops_at_declared_length() {
        let frame = [9u8; 64];
        let options = capture_options(&frame, 10, 3);
        assert_eq!(&options[..3], &[9, 9, 9]);
        assert!(options[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_capture_options_stops_at_buffer_end() {
        let frame = [7u8; 30];
        let options = capture_options(&frame, 26, 40);
        assert_eq!(&options[..4], &[7, 7, 7, 7]);
        assert!(options[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_capture_options_caps_at_forty_bytes() {
        let frame = [5u8; 200];
        let options = capture_options(&frame, 0, usize::MAX);
        assert_eq!(options.len(), TCPOPT_MAXLEN);
        assert!(options.iter().all(|&b| b == 5));
    }

    #[test]
    fn test_capture_options_start_past_end() {
        let options = capture_options(&[1u8; 8], 100, 40);
        assert_eq!(options, [0u8; TCPOPT_MAXLEN]);
    }

    #[test]
    fn test_features_lengths() {
        let frame = SynFrameBuilder::new()
            .ip_options(&[0x94, 0x04, 0x00, 0x00])
            .tcp_options(&[2, 4, 0x05, 0xb4, 1, 3, 3, 7])
            .build();
        let Ok(parsed) = parse_frame(frame.as_bytes(), &FilterConfig::ANY) else {
            panic!("SYN with options rejected");
        };
        let features = extract_features(frame.as_bytes(), &parsed);
        assert_eq!(features.ip_option_length, 4);
        assert_eq!(features.option_length, 8);
        assert_eq!(&features.options[..8], &[2, 4, 0x05, 0xb4, 1, 3, 3, 7]);
        assert!(features.options[8..].iter().all(|&b| b == 0));
    }
}
