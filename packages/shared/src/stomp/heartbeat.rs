//! heart-beat header parsing and negotiation.

use std::{fmt, time::Duration};

use super::error::FrameError;

/// One side's heart-beat offer, in milliseconds.
///
/// `outgoing` is the smallest interval at which this side can send beats,
/// `incoming` the interval at which it would like to receive them. Zero
/// means "cannot" / "do not want".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartBeat {
    pub outgoing: u64,
    pub incoming: u64,
}

/// Heart-beat periods agreed for one connection, from the local point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NegotiatedHeartBeat {
    /// How often we must send something, if at all.
    pub send_every: Option<Duration>,
    /// How often we expect to receive something, if at all.
    pub expect_every: Option<Duration>,
}

impl HeartBeat {
    pub const fn new(outgoing: u64, incoming: u64) -> Self {
        Self { outgoing, incoming }
    }

    /// Heart-beating disabled in both directions.
    pub const fn disabled() -> Self {
        Self::new(0, 0)
    }

    /// Parse a `heart-beat` header value such as "4000,4000".
    pub fn parse(value: &str) -> Result<Self, FrameError> {
        let invalid = || FrameError::InvalidHeartBeat(value.to_string());
        let (outgoing, incoming) = value.split_once(',').ok_or_else(invalid)?;
        let outgoing = outgoing.trim().parse::<u64>().map_err(|_| invalid())?;
        let incoming = incoming.trim().parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(outgoing, incoming))
    }

    /// Agree on periods with the peer's offer.
    ///
    /// Each direction is enabled only when the sender can send and the
    /// receiver wants to receive; the period is the larger of the two values.
    pub fn negotiate(&self, remote: &HeartBeat) -> NegotiatedHeartBeat {
        NegotiatedHeartBeat {
            send_every: agreed_period(self.outgoing, remote.incoming),
            expect_every: agreed_period(self.incoming, remote.outgoing),
        }
    }
}

fn agreed_period(local: u64, remote: u64) -> Option<Duration> {
    if local == 0 || remote == 0 {
        None
    } else {
        Some(Duration::from_millis(local.max(remote)))
    }
}

impl fmt::Display for HeartBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.outgoing, self.incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heart_beat() {
        // テスト項目: "4000,4000" 形式の heart-beat を解析できる
        let result = HeartBeat::parse("4000, 10000");

        assert_eq!(result, Ok(HeartBeat::new(4000, 10000)));
    }

    #[test]
    fn test_parse_heart_beat_invalid() {
        // テスト項目: 不正な heart-beat はエラーになる
        assert_eq!(
            HeartBeat::parse("4000"),
            Err(FrameError::InvalidHeartBeat("4000".to_string()))
        );
        assert!(HeartBeat::parse("a,b").is_err());
        assert!(HeartBeat::parse("-1,0").is_err());
    }

    #[test]
    fn test_negotiate_takes_larger_period() {
        // テスト項目: 双方が有効な場合は大きい方の間隔が採用される
        // given (前提条件):
        let client = HeartBeat::new(4000, 4000);
        let server = HeartBeat::new(10000, 1000);

        // when (操作):
        let negotiated = client.negotiate(&server);

        // then (期待する結果):
        assert_eq!(negotiated.send_every, Some(Duration::from_millis(4000)));
        assert_eq!(negotiated.expect_every, Some(Duration::from_millis(10000)));
    }

    #[test]
    fn test_negotiate_disabled_direction() {
        // テスト項目: どちらかが 0 の方向は無効になる
        // given (前提条件):
        let client = HeartBeat::new(4000, 4000);
        let server = HeartBeat::new(0, 4000);

        // when (操作):
        let negotiated = client.negotiate(&server);

        // then (期待する結果):
        assert_eq!(negotiated.send_every, Some(Duration::from_millis(4000)));
        assert_eq!(negotiated.expect_every, None);
    }

    #[test]
    fn test_display_round_trips_header_value() {
        let heart_beat = HeartBeat::new(4000, 0);

        assert_eq!(heart_beat.to_string(), "4000,0");
    }
}
