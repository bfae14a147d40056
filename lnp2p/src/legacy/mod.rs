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

mod bolt2;
mod types;

pub use bolt2::{AcceptChannel, FundingCreated, FundingSigned, OpenChannel};
pub use types::{ChannelId, TempChannelId};

use std::io;

use lightning_encoding::{self, LightningDecode, LightningEncode};

/// Default legacy Lightning port number
pub const LNP2P_LEGACY_PORT: u16 = 9735;

/// The subset of BOLT-1/2 peer messages relevant to the channel-opening
/// handshake: `open_channel`, `accept_channel`, `funding_created` and
/// `funding_signed`. Every message on the wire is framed as a big-endian
/// `u16` type field followed by its payload, per BOLT-1.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display(inner)]
#[non_exhaustive]
pub enum Messages {
    /// Proposes a new channel, sent by the funder
    OpenChannel(OpenChannel),

    /// The fundee's reply to `open_channel`
    AcceptChannel(AcceptChannel),

    /// Identifies the funding outpoint and carries the funder's signature
    FundingCreated(FundingCreated),

    /// Gives the funder the signature for their own first commitment
    /// transaction
    FundingSigned(FundingSigned),
}

impl Messages {
    /// The BOLT message type code carried in the 2-byte big-endian type
    /// prefix ahead of the payload.
    pub fn type_id(&self) -> u16 {
        match self {
            Messages::OpenChannel(_) => 32,
            Messages::AcceptChannel(_) => 33,
            Messages::FundingCreated(_) => 34,
            Messages::FundingSigned(_) => 35,
        }
    }

    /// Reads the 2-byte type prefix without consuming or decoding the
    /// payload, so a caller can dispatch on message kind before committing
    /// to a specific decoder.
    pub fn peek_type_id<D: io::Read>(mut d: D) -> Result<u16, lightning_encoding::Error> {
        u16::lightning_decode(&mut d)
    }
}

impl LightningEncode for Messages {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        Ok(match self {
            Messages::OpenChannel(msg) => {
                self.type_id().lightning_encode(&mut e)?
                    + msg.lightning_encode(&mut e)?
            }
            Messages::AcceptChannel(msg) => {
                self.type_id().lightning_encode(&mut e)?
                    + msg.lightning_encode(&mut e)?
            }
            Messages::FundingCreated(msg) => {
                self.type_id().lightning_encode(&mut e)?
                    + msg.lightning_encode(&mut e)?
            }
            Messages::FundingSigned(msg) => {
                self.type_id().lightning_encode(&mut e)?
                    + msg.lightning_encode(&mut e)?
            }
        })
    }
}

impl LightningDecode for Messages {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let type_id = u16::lightning_decode(&mut d)?;
        Ok(match type_id {
            32 => Messages::OpenChannel(OpenChannel::lightning_decode(&mut d)?),
            33 => {
                Messages::AcceptChannel(AcceptChannel::lightning_decode(&mut d)?)
            }
            34 => {
                Messages::FundingCreated(FundingCreated::lightning_decode(&mut d)?)
            }
            35 => {
                Messages::FundingSigned(FundingSigned::lightning_decode(&mut d)?)
            }
            unknown => {
                return Err(lightning_encoding::Error::EnumValueNotKnown(
                    "Messages",
                    unknown as usize,
                ))
            }
        })
    }
}

#[cfg(test)]
mod test {
    use amplify::DumbDefault;

    use super::*;

    #[test]
    fn open_channel_roundtrips() {
        let msg = Messages::OpenChannel(OpenChannel::dumb_default());
        let data = msg.lightning_serialize();
        assert_eq!(Messages::peek_type_id(data.as_slice()).unwrap(), 32);
        let decoded = Messages::lightning_deserialize(&data).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn accept_channel_roundtrips() {
        let msg = Messages::AcceptChannel(AcceptChannel::dumb_default());
        let data = msg.lightning_serialize();
        assert_eq!(Messages::peek_type_id(data.as_slice()).unwrap(), 33);
        let decoded = Messages::lightning_deserialize(&data).unwrap();
        assert_eq!(msg, decoded);
    }
}
