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

//! Validates a counterparty-proposed [`ChannelConfig`] against local policy
//! bounds. `validate` is a pure function: no I/O, no mutable state, so it
//! can be exercised directly in tests without a transport.

use crate::config::{ChannelConfig, PolicyBounds, MAX_ACCEPTED_HTLCS_RANGE};

/// Reasons the policy validator may reject a remote channel configuration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, Error)]
#[display(doc_comments)]
pub enum PolicyError {
    /// remote `to_self_delay` {proposed} exceeds local policy limit of
    /// {allowed_maximum}
    ToSelfDelayTooLarge { proposed: u16, allowed_maximum: u16 },

    /// remote `channel_reserve_satoshis` {reserve} exceeds the funding
    /// amount of {funding_satoshis}
    ReserveExceedsFunding { reserve: u64, funding_satoshis: u64 },

    /// remote `htlc_minimum_msat` {htlc_minimum_msat} exceeds the effective
    /// channel capacity of {capacity_msat} msat
    HtlcMinimumExceedsCapacity {
        htlc_minimum_msat: u64,
        capacity_msat: u64,
    },

    /// effective channel capacity of {capacity_msat} msat is below the
    /// local policy floor of {required_minimum} msat
    EffectiveCapacityTooSmall {
        capacity_msat: u64,
        required_minimum: u64,
    },

    /// remote `max_accepted_htlcs` {proposed} is outside of the permitted
    /// range 1..=511
    MaxAcceptedHtlcsOutOfRange { proposed: u16 },
}

/// Validates `remote`'s proposed [`ChannelConfig`] against `local`'s own
/// config and the operator's [`PolicyBounds`], per the BOLT-2 channel
/// establishment rules. Checks run in a fixed order so the first violated
/// rule is always the one reported.
pub fn validate(
    remote: &ChannelConfig,
    funding_satoshis: u64,
    local: &ChannelConfig,
    policy: &PolicyBounds,
) -> Result<(), PolicyError> {
    if remote.to_self_delay > policy.max_to_self_delay {
        return Err(PolicyError::ToSelfDelayTooLarge {
            proposed: remote.to_self_delay,
            allowed_maximum: policy.max_to_self_delay,
        });
    }

    if remote.channel_reserve_satoshis > funding_satoshis {
        return Err(PolicyError::ReserveExceedsFunding {
            reserve: remote.channel_reserve_satoshis,
            funding_satoshis,
        });
    }

    let reserve_msat = remote
        .channel_reserve_satoshis
        .max(local.channel_reserve_satoshis)
        * 1000;
    let capacity_msat = (funding_satoshis * 1000)
        .saturating_sub(reserve_msat)
        .min(remote.max_htlc_value_in_flight_msat);

    if remote.htlc_minimum_msat * 1000 > capacity_msat {
        return Err(PolicyError::HtlcMinimumExceedsCapacity {
            htlc_minimum_msat: remote.htlc_minimum_msat,
            capacity_msat,
        });
    }

    if capacity_msat < policy.min_effective_htlc_capacity_msat {
        return Err(PolicyError::EffectiveCapacityTooSmall {
            capacity_msat,
            required_minimum: policy.min_effective_htlc_capacity_msat,
        });
    }

    if !MAX_ACCEPTED_HTLCS_RANGE.contains(&remote.max_accepted_htlcs) {
        return Err(PolicyError::MaxAcceptedHtlcsOutOfRange {
            proposed: remote.max_accepted_htlcs,
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn valid_config() -> ChannelConfig {
        ChannelConfig {
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            htlc_minimum_msat: 1000,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            minimum_depth: 3,
        }
    }

    fn default_policy() -> PolicyBounds {
        PolicyBounds {
            max_to_self_delay: 144,
            min_effective_htlc_capacity_msat: 1_000_000,
        }
    }

    #[test]
    fn accepts_happy_path_config() {
        let remote = valid_config();
        let local = valid_config();
        let policy = default_policy();
        assert!(validate(&remote, 1_000_000, &local, &policy).is_ok());
    }

    #[test]
    fn rejects_to_self_delay_over_limit() {
        let mut remote = valid_config();
        remote.to_self_delay = 145;
        let local = valid_config();
        let policy = default_policy();
        assert_eq!(
            validate(&remote, 1_000_000, &local, &policy),
            Err(PolicyError::ToSelfDelayTooLarge {
                proposed: 145,
                allowed_maximum: 144,
            })
        );
    }

    #[test]
    fn accepts_to_self_delay_at_limit() {
        let mut remote = valid_config();
        remote.to_self_delay = 144;
        let local = valid_config();
        let policy = default_policy();
        assert!(validate(&remote, 1_000_000, &local, &policy).is_ok());
    }

    #[test]
    fn rejects_reserve_exceeding_funding() {
        let mut remote = valid_config();
        remote.channel_reserve_satoshis = 2_000_000;
        let local = valid_config();
        let policy = default_policy();
        assert_eq!(
            validate(&remote, 1_000_000, &local, &policy),
            Err(PolicyError::ReserveExceedsFunding {
                reserve: 2_000_000,
                funding_satoshis: 1_000_000,
            })
        );
    }

    #[test]
    fn rejects_max_accepted_htlcs_zero() {
        let mut remote = valid_config();
        remote.max_accepted_htlcs = 0;
        let local = valid_config();
        let policy = default_policy();
        assert_eq!(
            validate(&remote, 1_000_000, &local, &policy),
            Err(PolicyError::MaxAcceptedHtlcsOutOfRange { proposed: 0 })
        );
    }

    #[test]
    fn accepts_max_accepted_htlcs_at_upper_bound() {
        let mut remote = valid_config();
        remote.max_accepted_htlcs = 511;
        let local = valid_config();
        let policy = default_policy();
        assert!(validate(&remote, 1_000_000, &local, &policy).is_ok());
    }

    #[test]
    fn rejects_max_accepted_htlcs_over_upper_bound() {
        let mut remote = valid_config();
        remote.max_accepted_htlcs = 512;
        let local = valid_config();
        let policy = default_policy();
        assert_eq!(
            validate(&remote, 1_000_000, &local, &policy),
            Err(PolicyError::MaxAcceptedHtlcsOutOfRange { proposed: 512 })
        );
    }
}
