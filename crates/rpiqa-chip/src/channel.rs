//! Receive channel selector and physical address map.
//!
//! Each channel owns three windows in the AXI address space of the Zynq:
//!
//! ```text
//! Channel  Config        Status        FIFO
//! ───────  ────────────  ────────────  ────────────
//!    1     0x4000_0000   0x4100_0000   0x4200_0000
//!    2     0x8000_0000   0x8100_0000   0x8200_0000
//! ```
//!
//! The configuration and status windows are one page each, the FIFO window is
//! [`crate::fifo::WINDOW_PAGES`] pages.

use std::fmt;
use std::str::FromStr;

/// One of the two independent receive paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    /// Input 1 (`IN1`).
    One = 1,
    /// Input 2 (`IN2`).
    Two = 2,
}

/// Physical base addresses of one channel's register windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWindows {
    /// Configuration window (reset, gpio, freq, sync, rate).
    pub config: u64,
    /// Status window (FIFO fill counter).
    pub status: u64,
    /// FIFO data window.
    pub fifo: u64,
}

impl ChannelWindows {
    /// The three bases in `[config, status, fifo]` order.
    #[must_use]
    pub const fn as_array(&self) -> [u64; 3] {
        [self.config, self.status, self.fifo]
    }
}

impl Channel {
    /// Both channels, in selector order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Physical base addresses for this channel.
    #[must_use]
    pub const fn windows(self) -> ChannelWindows {
        match self {
            Self::One => ChannelWindows {
                config: 0x4000_0000,
                status: 0x4100_0000,
                fifo: 0x4200_0000,
            },
            Self::Two => ChannelWindows {
                config: 0x8000_0000,
                status: 0x8100_0000,
                fifo: 0x8200_0000,
            },
        }
    }

    /// Selector value as given on the command line.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u32> for Channel {
    type Error = InvalidChannel;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(InvalidChannel::Number(other)),
        }
    }
}

impl FromStr for Channel {
    type Err = InvalidChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s
            .parse()
            .map_err(|_| InvalidChannel::Malformed(s.to_string()))?;
        Self::try_from(n)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A channel selector outside `{1, 2}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidChannel {
    /// Numeric, but not a channel.
    Number(u32),
    /// Not a decimal integer at all.
    Malformed(String),
}

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "invalid channel {n}, it should be 1 or 2"),
            Self::Malformed(s) => write!(f, "invalid channel {s:?}, it should be 1 or 2"),
        }
    }
}

impl std::error::Error for InvalidChannel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo;

    const PAGE: u64 = 4096;

    fn ranges(ch: Channel) -> [(u64, u64); 3] {
        let w = ch.windows();
        [
            (w.config, w.config + PAGE),
            (w.status, w.status + PAGE),
            (w.fifo, w.fifo + fifo::WINDOW_PAGES as u64 * PAGE),
        ]
    }

    #[test]
    fn fixed_address_map() {
        assert_eq!(
            Channel::One.windows().as_array(),
            [0x4000_0000, 0x4100_0000, 0x4200_0000]
        );
        assert_eq!(
            Channel::Two.windows().as_array(),
            [0x8000_0000, 0x8100_0000, 0x8200_0000]
        );
    }

    #[test]
    fn windows_pairwise_disjoint() {
        let all: Vec<_> = Channel::ALL.iter().flat_map(|c| ranges(*c)).collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(a.1 <= b.0 || b.1 <= a.0, "{a:x?} overlaps {b:x?}");
            }
        }
    }

    #[test]
    fn bases_are_page_aligned() {
        for ch in Channel::ALL {
            for base in ch.windows().as_array() {
                assert_eq!(base % PAGE, 0);
            }
        }
    }

    #[test]
    fn parse_selector() {
        assert_eq!("1".parse::<Channel>(), Ok(Channel::One));
        assert_eq!("2".parse::<Channel>(), Ok(Channel::Two));
        assert_eq!("3".parse::<Channel>(), Err(InvalidChannel::Number(3)));
        assert_eq!("0".parse::<Channel>(), Err(InvalidChannel::Number(0)));
        assert!(matches!(
            "1x".parse::<Channel>(),
            Err(InvalidChannel::Malformed(_))
        ));
        assert!("".parse::<Channel>().is_err());
    }
}
