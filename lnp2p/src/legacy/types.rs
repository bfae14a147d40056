// LNP P2P library, implementing legacy (BOLT) P2P messaging for the
// Lightning network protocol (LNP)
//
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@pandoracore.com>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the MIT License
// along with this software.
// If not, see <https://opensource.org/licenses/MIT>.

use std::io;
use std::str::FromStr;

use amplify::hex::{self, FromHex};
use amplify::{DumbDefault, Slice32, Wrapper};
use bitcoin::hashes::Hash;
use bitcoin::OutPoint;
use lightning_encoding::{LightningDecode, LightningEncode};

/// Legacy lightning network channel id: 256-bit number representing funding
/// txid XOR'ed with the 32-bit funding output number
#[derive(
    Wrapper,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Display,
    Default,
    From,
    LightningEncode,
    LightningDecode,
)]
#[display(LowerHex)]
#[wrapper(FromStr, LowerHex, UpperHex)]
pub struct ChannelId(Slice32);

impl FromHex for ChannelId {
    fn from_byte_iter<I>(iter: I) -> Result<Self, hex::Error>
    where
        I: Iterator<Item = Result<u8, hex::Error>>
            + ExactSizeIterator
            + DoubleEndedIterator,
    {
        Ok(Self(Slice32::from_byte_iter(iter)?))
    }
}

impl ChannelId {
    /// Derives the permanent channel id from the funding outpoint, per
    /// BOLT-2: txid XOR'ed with the big-endian output index in its last two
    /// bytes.
    pub fn with(funding_outpoint: OutPoint) -> Self {
        let mut slice = funding_outpoint.txid.into_inner();
        let vout = funding_outpoint.vout.to_be_bytes();
        slice[30] ^= vout[0];
        slice[31] ^= vout[1];
        ChannelId::from_inner(Slice32::from_inner(slice))
    }

    /// With some lightning messages (like error) channel id consisting of all
    /// zeros has a special meaning of "applicable to all opened channels".
    /// This function allows detecting this kind of [`ChannelId`].
    pub fn is_wildcard(&self) -> bool {
        self.to_inner().to_inner() == [0u8; 32]
    }
}

/// Lightning network temporary channel id, used until the funding outpoint
/// is known.
#[derive(
    Wrapper,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
    Display,
    From,
    LightningEncode,
    LightningDecode,
)]
#[display(LowerHex)]
#[wrapper(FromStr, LowerHex, UpperHex)]
pub struct TempChannelId(Slice32);

impl From<TempChannelId> for ChannelId {
    fn from(temp: TempChannelId) -> Self {
        Self(temp.into_inner())
    }
}

impl From<ChannelId> for TempChannelId {
    fn from(id: ChannelId) -> Self {
        Self(id.into_inner())
    }
}

impl FromHex for TempChannelId {
    fn from_byte_iter<I>(iter: I) -> Result<Self, hex::Error>
    where
        I: Iterator<Item = Result<u8, hex::Error>>
            + ExactSizeIterator
            + DoubleEndedIterator,
    {
        Ok(Self(Slice32::from_byte_iter(iter)?))
    }
}

impl TempChannelId {
    /// A temporary channel id with every bit set. BOLT-2 requires the MSB to
    /// be set and the id to be unique per peer; a node that never opens more
    /// than one channel to the same peer at a time can safely reuse this
    /// fixed value for every handshake.
    pub fn reserved_single_channel() -> Self {
        TempChannelId(Slice32::from_inner([0xFFu8; 32]))
    }

    /// Generates a fresh random temporary channel id with the most
    /// significant bit set, for nodes that may run more than one concurrent
    /// open against the same peer.
    pub fn random() -> Self {
        let mut id = Slice32::random();
        let mut bytes = id.to_inner();
        bytes[0] |= 0x80;
        id = Slice32::from_inner(bytes);
        TempChannelId(id)
    }
}

impl DumbDefault for TempChannelId {
    fn dumb_default() -> Self {
        Self(Default::default())
    }
}
