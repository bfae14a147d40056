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

//! The single error taxonomy the dispatcher and protocol drivers report
//! through: one variant per terminal failure kind. Every variant becomes a
//! status message to the parent process and a nonzero exit code.

use crate::policy::PolicyError;

/// Terminal failure of the channel-opening handshake. Each variant is
/// surfaced to the parent process as a typed status message; no variant is
/// ever recovered from locally.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum OpeningError {
    /// malformed or unexpected control message: {0}
    BadCommand(String),

    /// locally infeasible parameter `{field}` = {value} (threshold: {threshold})
    BadParam {
        field: &'static str,
        value: String,
        threshold: String,
    },

    /// key derivation produced invalid output: {0}
    KeyDerivationFailed(String),

    /// peer read failed: {0}
    PeerReadFailed(String),

    /// peer write failed: {0}
    PeerWriteFailed(String),

    /// first peer message did not parse as open_channel: {0}
    PeerBadInitialMessage(String),

    /// funding amount, push amount or fee rate out of bounds: {0}
    PeerBadFunding(String),

    /// remote channel configuration rejected by local policy: {0}
    #[from]
    PeerBadConfig(PolicyError),
}

impl OpeningError {
    /// The stable, machine-readable kind name reported on the status
    /// channel, independent of the diagnostic text in [`Display`].
    pub fn kind(&self) -> &'static str {
        match self {
            OpeningError::BadCommand(_) => "BAD_COMMAND",
            OpeningError::BadParam { .. } => "BAD_PARAM",
            OpeningError::KeyDerivationFailed(_) => "KEY_DERIVATION_FAILED",
            OpeningError::PeerReadFailed(_) => "PEER_READ_FAILED",
            OpeningError::PeerWriteFailed(_) => "PEER_WRITE_FAILED",
            OpeningError::PeerBadInitialMessage(_) => {
                "PEER_BAD_INITIAL_MESSAGE"
            }
            OpeningError::PeerBadFunding(_) => "PEER_BAD_FUNDING",
            OpeningError::PeerBadConfig(_) => "PEER_BAD_CONFIG",
        }
    }

    /// Builds a [`OpeningError::BadParam`] citing the offending field,
    /// value and violated threshold.
    pub fn bad_param(
        field: &'static str,
        value: impl ToString,
        threshold: impl ToString,
    ) -> Self {
        OpeningError::BadParam {
            field,
            value: value.to_string(),
            threshold: threshold.to_string(),
        }
    }

    /// Wraps a peer transport/codec failure encountered while reading.
    pub fn peer_read_failed(reason: impl ToString) -> Self {
        OpeningError::PeerReadFailed(reason.to_string())
    }

    /// Wraps a peer transport failure encountered while writing.
    pub fn peer_write_failed(reason: impl ToString) -> Self {
        OpeningError::PeerWriteFailed(reason.to_string())
    }
}
