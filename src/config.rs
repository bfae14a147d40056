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

//! The channel config record exchanged by both peers in `open_channel` and
//! `accept_channel`, and the local policy bounds supplied by the parent
//! process at `init`.

use lightning_encoding::{LightningDecode, LightningEncode};
use lnp2p::legacy::{AcceptChannel, OpenChannel};

/// Symmetric half of the channel configuration carried by `open_channel` and
/// `accept_channel`: the limits each side imposes on the other.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Hash,
    Default,
    LightningEncode,
    LightningDecode,
)]
pub struct ChannelConfig {
    /// The threshold below which outputs on commitment transactions
    /// broadcast by the sender are omitted
    pub dust_limit_satoshis: u64,

    /// The maximum inbound HTLC value in flight towards sender, in
    /// millisatoshi
    pub max_htlc_value_in_flight_msat: u64,

    /// The minimum value unencumbered by HTLCs the counterparty must keep in
    /// the channel
    pub channel_reserve_satoshis: u64,

    /// The minimum HTLC size incoming to sender, in millisatoshi
    pub htlc_minimum_msat: u64,

    /// The number of blocks the counterparty will have to wait to claim
    /// on-chain funds if they broadcast a commitment transaction
    pub to_self_delay: u16,

    /// The maximum number of inbound HTLCs towards sender
    pub max_accepted_htlcs: u16,

    /// Confirmations required before the channel is usable. Only
    /// meaningful for the fundee's side: `open_channel` carries no such
    /// field, so the funder's own config always reports zero here.
    pub minimum_depth: u32,
}

impl From<&OpenChannel> for ChannelConfig {
    fn from(msg: &OpenChannel) -> Self {
        ChannelConfig {
            dust_limit_satoshis: msg.dust_limit_satoshis,
            max_htlc_value_in_flight_msat: msg.max_htlc_value_in_flight_msat,
            channel_reserve_satoshis: msg.channel_reserve_satoshis,
            htlc_minimum_msat: msg.htlc_minimum_msat,
            to_self_delay: msg.to_self_delay,
            max_accepted_htlcs: msg.max_accepted_htlcs,
            minimum_depth: 0,
        }
    }
}

impl From<&AcceptChannel> for ChannelConfig {
    fn from(msg: &AcceptChannel) -> Self {
        ChannelConfig {
            dust_limit_satoshis: msg.dust_limit_satoshis,
            max_htlc_value_in_flight_msat: msg.max_htlc_value_in_flight_msat,
            channel_reserve_satoshis: msg.channel_reserve_satoshis,
            htlc_minimum_msat: msg.htlc_minimum_msat,
            to_self_delay: msg.to_self_delay,
            max_accepted_htlcs: msg.max_accepted_htlcs,
            minimum_depth: msg.minimum_depth,
        }
    }
}

/// Local policy bounds supplied by the parent process at `init`, against
/// which the counterparty's proposed [`ChannelConfig`] is validated.
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, Hash, LightningEncode, LightningDecode,
)]
pub struct PolicyBounds {
    /// Ceiling the remote may impose on our `to_self_delay`
    pub max_to_self_delay: u16,

    /// Floor on usable bandwidth after reserves and in-flight caps are
    /// applied
    pub min_effective_htlc_capacity_msat: u64,
}

/// Funding parameters for the channel under negotiation.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Hash,
    Default,
    LightningEncode,
    LightningDecode,
)]
pub struct FundingParams {
    /// The channel value
    pub funding_satoshis: u64,

    /// The amount to push to the counterparty as part of the open, in
    /// millisatoshi
    pub push_msat: u64,

    /// The fee rate per 1000-weight of the funder's commitment transaction
    pub feerate_per_kw: u32,
}

/// Upper limit on `funding_satoshis` imposed by the BOLT-2 wire format: the
/// field is serialized as if it fit in three bytes.
pub const MAX_FUNDING_SATOSHIS: u64 = 1 << 24;

/// The BOLT-2 bounds on `max_accepted_htlcs`.
pub const MAX_ACCEPTED_HTLCS_RANGE: std::ops::RangeInclusive<u16> = 1..=511;

/// Computes the 1%-of-funding channel reserve required by this subsystem's
/// own `channel_reserve_satoshis` proposal.
pub fn one_percent_reserve(funding_satoshis: u64) -> u64 {
    (funding_satoshis + 99) / 100
}
