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

//! The peer endpoint: a length-prefixed message stream framed inside an
//! authenticated, encrypted transport. The encryption itself (BOLT #8 noise
//! handshake and per-message key ratchet) is an external collaborator this
//! crate does not implement; what it owns is [`CryptoState`] threading it
//! linearly through every read and write so a caller can never accidentally
//! reuse a stale value.

use std::io::{Read, Write};

use lightning_encoding::{LightningDecode, LightningEncode};
use lnp2p::legacy::Messages;

use crate::control::CryptoState;
use crate::error::OpeningError;

/// A single turn of the encrypted peer transport: send one message, receive
/// one message. `crypto_state` is consumed by value and a new value is
/// returned, so the type system rules out reusing a state a prior call has
/// already advanced.
pub trait PeerTransport {
    fn recv(
        &mut self,
        crypto_state: CryptoState,
    ) -> Result<(Messages, CryptoState), OpeningError>;

    fn send(
        &mut self,
        crypto_state: CryptoState,
        message: &Messages,
    ) -> Result<CryptoState, OpeningError>;
}

/// Drives the peer endpoint over any [`Read`] + [`Write`] byte stream
/// (production: fd 3; tests: an in-memory duplex buffer), length-prefixing
/// each message with a big-endian `u32`. The underlying encrypted transport
/// is assumed to already be established by the time this subsystem starts;
/// `crypto_state` is carried through unchanged here because this subsystem
/// implements none of the actual BOLT #8 cryptography, only its threading
/// discipline — a real transport collaborator would mutate it on every call.
pub struct FramedPeerTransport<S> {
    stream: S,
}

impl<S: Read + Write> FramedPeerTransport<S> {
    pub fn new(stream: S) -> Self {
        FramedPeerTransport { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> PeerTransport for FramedPeerTransport<S> {
    fn recv(
        &mut self,
        crypto_state: CryptoState,
    ) -> Result<(Messages, CryptoState), OpeningError> {
        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf).map_err(|e| {
            OpeningError::peer_read_failed(format!(
                "reading peer message length: {}",
                e
            ))
        })?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload).map_err(|e| {
            OpeningError::peer_read_failed(format!(
                "reading peer message body: {}",
                e
            ))
        })?;
        let message = Messages::lightning_deserialize(&payload)
            .map_err(|e| OpeningError::peer_read_failed(e.to_string()))?;
        Ok((message, crypto_state))
    }

    fn send(
        &mut self,
        crypto_state: CryptoState,
        message: &Messages,
    ) -> Result<CryptoState, OpeningError> {
        let payload = message.lightning_serialize();
        let len = (payload.len() as u32).to_be_bytes();
        self.stream.write_all(&len).map_err(|e| {
            OpeningError::peer_write_failed(format!(
                "writing peer message length: {}",
                e
            ))
        })?;
        self.stream.write_all(&payload).map_err(|e| {
            OpeningError::peer_write_failed(format!(
                "writing peer message body: {}",
                e
            ))
        })?;
        Ok(crypto_state)
    }
}
