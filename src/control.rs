// Lightning Network channel-opening subsystem
// Written in 2022 by
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

//! Control-channel wire format: the typed commands the parent process sends
//! on fd 0 and the typed status messages this subsystem sends back on fd 1.
//! Framing matches the peer wire format in [`lnp2p::legacy`] — a big-endian
//! `u16` type prefix ahead of a [`lightning_encoding`]-derived payload — so
//! both channels share the same length-prefixed transport helpers in
//! [`crate::wire`].

use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::PublicKey;
use bitcoin::{OutPoint, Txid};
use lightning_encoding::{self, LightningDecode, LightningEncode};
use lnp2p::legacy::OpenChannel;
use std::io;

use crate::config::{ChannelConfig, PolicyBounds};
use crate::keys::Basepoints;

/// Opaque per-message cryptographic state of the encrypted peer transport.
/// The subsystem never inspects its contents: it receives one value at
/// `init`, passes it by value into every peer read/write, and threads the
/// value those operations return back out to the parent in the terminal
/// status message. Moving it (rather than cloning it) is the point: reusing
/// a stale value would desynchronize the transport's nonce state.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CryptoState(pub Vec<u8>);

impl LightningEncode for CryptoState {
    fn lightning_encode<E: io::Write>(
        &self,
        e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        self.0.as_slice().lightning_encode(e)
    }
}

impl LightningDecode for CryptoState {
    fn lightning_decode<D: io::Read>(
        d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        Ok(CryptoState(Box::<[u8]>::lightning_decode(d)?.into_vec()))
    }
}

/// Carries local config, policy bounds, the initial transport crypto state
/// and the root seed the subsystem derives all key material from.
#[derive(Clone, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct Init {
    pub local_config: ChannelConfig,
    pub policy: PolicyBounds,
    pub crypto_state: CryptoState,
    pub root_seed: [u8; 32],
}

/// Instructs the subsystem to run the funder handshake.
#[derive(Clone, Copy, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct Open {
    pub funding_satoshis: u64,
    pub push_msat: u64,
    pub feerate_per_kw: u32,
    pub max_minimum_depth: u32,
}

/// Instructs the subsystem to run the fundee handshake against the
/// `open_channel` the parent already read off the wire.
#[derive(Clone, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct Accept {
    pub min_feerate: u32,
    pub max_feerate: u32,
    pub open_channel: OpenChannel,
}

/// The parent's reply to `open_resp`, once the wallet has constructed the
/// funding transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct OpenFunding {
    pub funding_txid: Txid,
    pub funding_txout_index: u16,
}

/// A command read off the control channel.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Init(Init),
    Open(Open),
    Accept(Accept),
    OpenFunding(OpenFunding),
    ExitReq,
}

impl Command {
    fn type_id(&self) -> u16 {
        match self {
            Command::Init(_) => 0,
            Command::Open(_) => 1,
            Command::Accept(_) => 2,
            Command::OpenFunding(_) => 3,
            Command::ExitReq => 4,
        }
    }
}

impl LightningEncode for Command {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let type_len = self.type_id().lightning_encode(&mut e)?;
        let body_len = match self {
            Command::Init(msg) => msg.lightning_encode(&mut e)?,
            Command::Open(msg) => msg.lightning_encode(&mut e)?,
            Command::Accept(msg) => msg.lightning_encode(&mut e)?,
            Command::OpenFunding(msg) => msg.lightning_encode(&mut e)?,
            Command::ExitReq => 0,
        };
        Ok(type_len + body_len)
    }
}

impl LightningDecode for Command {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let type_id = u16::lightning_decode(&mut d)?;
        Ok(match type_id {
            0 => Command::Init(Init::lightning_decode(&mut d)?),
            1 => Command::Open(Open::lightning_decode(&mut d)?),
            2 => Command::Accept(Accept::lightning_decode(&mut d)?),
            3 => Command::OpenFunding(OpenFunding::lightning_decode(&mut d)?),
            4 => Command::ExitReq,
            unknown => {
                return Err(lightning_encoding::Error::EnumValueNotKnown(
                    "Command",
                    unknown as usize,
                ))
            }
        })
    }
}

/// Emitted by the funder path once `accept_channel` has passed policy
/// validation, so the parent can build the funding transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct OpenResp {
    pub local_funding_pubkey: PublicKey,
    pub remote_funding_pubkey: PublicKey,
}

/// Terminal handoff of the funder path: everything the parent needs to
/// record the channel and broadcast the funding transaction.
#[derive(Clone, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct OpenFundingResp {
    pub remote_config: ChannelConfig,
    pub remote_signature: Signature,
    pub crypto_state: CryptoState,
    pub remote_basepoints: Basepoints,
    pub next_per_commitment_point: PublicKey,
}

/// Terminal handoff of the fundee path.
#[derive(Clone, PartialEq, Eq, Debug, LightningEncode, LightningDecode)]
pub struct AcceptResp {
    pub funding_outpoint_txid: Txid,
    pub funding_outpoint_vout: u32,
    pub remote_config: ChannelConfig,
    pub remote_signature: Signature,
    pub crypto_state: CryptoState,
    pub remote_basepoints: Basepoints,
    pub next_per_commitment_point: PublicKey,
}

impl AcceptResp {
    pub fn funding_outpoint(&self) -> OutPoint {
        OutPoint::new(self.funding_outpoint_txid, self.funding_outpoint_vout)
    }
}

/// A status message written to fd 1: either a lifecycle event the funder or
/// fundee driver emits on success, or the terminal failure kind/diagnostic
/// pair every error site reports before the process exits.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Status {
    OpenResp(OpenResp),
    OpenFundingResp(OpenFundingResp),
    AcceptResp(AcceptResp),
    Failure { kind: String, diagnostic: String },
}

impl Status {
    fn type_id(&self) -> u16 {
        match self {
            Status::OpenResp(_) => 0,
            Status::OpenFundingResp(_) => 1,
            Status::AcceptResp(_) => 2,
            Status::Failure { .. } => 3,
        }
    }

    /// Builds the terminal failure status for `error`, using its stable
    /// [`crate::error::OpeningError::kind`] and human-readable [`Display`].
    pub fn failure(error: &crate::error::OpeningError) -> Self {
        Status::Failure {
            kind: error.kind().to_string(),
            diagnostic: error.to_string(),
        }
    }
}

impl LightningEncode for Status {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let type_len = self.type_id().lightning_encode(&mut e)?;
        let body_len = match self {
            Status::OpenResp(msg) => msg.lightning_encode(&mut e)?,
            Status::OpenFundingResp(msg) => msg.lightning_encode(&mut e)?,
            Status::AcceptResp(msg) => msg.lightning_encode(&mut e)?,
            Status::Failure { kind, diagnostic } => {
                kind.lightning_encode(&mut e)?
                    + diagnostic.lightning_encode(&mut e)?
            }
        };
        Ok(type_len + body_len)
    }
}

impl LightningDecode for Status {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let type_id = u16::lightning_decode(&mut d)?;
        Ok(match type_id {
            0 => Status::OpenResp(OpenResp::lightning_decode(&mut d)?),
            1 => Status::OpenFundingResp(OpenFundingResp::lightning_decode(
                &mut d,
            )?),
            2 => Status::AcceptResp(AcceptResp::lightning_decode(&mut d)?),
            3 => Status::Failure {
                kind: String::lightning_decode(&mut d)?,
                diagnostic: String::lightning_decode(&mut d)?,
            },
            unknown => {
                return Err(lightning_encoding::Error::EnumValueNotKnown(
                    "Status",
                    unknown as usize,
                ))
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exit_req_roundtrips() {
        let cmd = Command::ExitReq;
        let bytes = cmd.lightning_serialize();
        assert_eq!(Command::lightning_deserialize(&bytes).unwrap(), cmd);
    }

    #[test]
    fn open_roundtrips() {
        let cmd = Command::Open(Open {
            funding_satoshis: 1_000_000,
            push_msat: 0,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        });
        let bytes = cmd.lightning_serialize();
        assert_eq!(Command::lightning_deserialize(&bytes).unwrap(), cmd);
    }

    #[test]
    fn failure_status_roundtrips() {
        let status = Status::Failure {
            kind: "PEER_BAD_CONFIG".to_string(),
            diagnostic: "to_self_delay too large".to_string(),
        };
        let bytes = status.lightning_serialize();
        assert_eq!(Status::lightning_deserialize(&bytes).unwrap(), status);
    }
}
