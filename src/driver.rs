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

//! The funder and fundee handshakes: each a straight-line sequence over the
//! peer and control channels, with every failure edge mapped onto a typed
//! [`OpeningError`]. Neither function writes a terminal status message on
//! failure — only the dispatcher does that, per this crate's error taxonomy
//! plumbing — but the funder path does block on one mid-handshake status
//! round-trip (`open_resp` / `open_funding`) before it can continue.

use std::io::{Read, Write};

use bitcoin::OutPoint;
use lnp2p::legacy::{AcceptChannel, FundingCreated, FundingSigned, Messages, OpenChannel};
use log::{debug, warn};

use crate::commitment::{build_initial_commitment_tx, check_commit_sig, sign_remote_commit, Side};
use crate::config::{one_percent_reserve, ChannelConfig, PolicyBounds, MAX_FUNDING_SATOSHIS};
use crate::control::{Accept, Command, CryptoState, Open, OpenFundingResp, OpenResp, Status, AcceptResp};
use crate::error::OpeningError;
use crate::keys::{Basepoints, LocalSecrets};
use crate::policy;
use crate::transport::PeerTransport;
use crate::wire::{read_command, write_status};
use lnp2p::legacy::{ChannelId, TempChannelId};

/// Splits `funding_satoshis`/`push_msat` into the local/remote balances a
/// commitment transaction needs, from the funder's point of view (the
/// funder's own balance shrinks by the pushed amount).
fn split_balances(funding_satoshis: u64, push_msat: u64) -> (u64, u64) {
    let push_sat = push_msat / 1000;
    (funding_satoshis.saturating_sub(push_sat), push_sat)
}

/// Runs the funder side of the handshake to completion, blocking on peer
/// reads/writes and on one control-channel round trip for the funding
/// outpoint.
pub fn run_funder(
    transport: &mut impl PeerTransport,
    mut crypto_state: CryptoState,
    control_in: &mut impl Read,
    status_out: &mut impl Write,
    local_secrets: &LocalSecrets,
    local_basepoints: &Basepoints,
    first_per_commitment_point: &bitcoin::secp256k1::PublicKey,
    mut local_config: ChannelConfig,
    policy_bounds: &PolicyBounds,
    open: Open,
) -> Result<OpenFundingResp, OpeningError> {
    local_config.channel_reserve_satoshis =
        one_percent_reserve(open.funding_satoshis);
    let temporary_channel_id = TempChannelId::reserved_single_channel();

    if open.funding_satoshis >= MAX_FUNDING_SATOSHIS {
        return Err(OpeningError::bad_param(
            "funding_satoshis",
            open.funding_satoshis,
            MAX_FUNDING_SATOSHIS,
        ));
    }
    if open.funding_satoshis == MAX_FUNDING_SATOSHIS - 1 {
        warn!("funding_satoshis at the 2^24-1 ceiling");
    }
    if open.push_msat > 1000 * open.funding_satoshis {
        return Err(OpeningError::bad_param(
            "push_msat",
            open.push_msat,
            1000 * open.funding_satoshis,
        ));
    }

    let open_channel = OpenChannel {
        chain_hash: bitcoin::hashes::sha256d::Hash::default(),
        temporary_channel_id,
        funding_satoshis: open.funding_satoshis,
        push_msat: open.push_msat,
        dust_limit_satoshis: local_config.dust_limit_satoshis,
        max_htlc_value_in_flight_msat: local_config.max_htlc_value_in_flight_msat,
        channel_reserve_satoshis: local_config.channel_reserve_satoshis,
        htlc_minimum_msat: local_config.htlc_minimum_msat,
        feerate_per_kw: open.feerate_per_kw,
        to_self_delay: local_config.to_self_delay,
        max_accepted_htlcs: local_config.max_accepted_htlcs,
        funding_pubkey: local_basepoints.funding_pubkey,
        revocation_basepoint: local_basepoints.revocation_basepoint,
        payment_point: local_basepoints.payment_basepoint,
        delayed_payment_basepoint: local_basepoints.delayed_payment_basepoint,
        first_per_commitment_point: *first_per_commitment_point,
        channel_flags: 0,
    };
    debug!("sending open_channel");
    crypto_state = transport
        .send(crypto_state, &Messages::OpenChannel(open_channel))?;

    let (message, next_crypto_state) = transport.recv(crypto_state)?;
    crypto_state = next_crypto_state;
    let accept = match message {
        Messages::AcceptChannel(accept) => accept,
        other => {
            return Err(OpeningError::peer_read_failed(format!(
                "expected accept_channel, got message type {}",
                other_type_name(&other)
            )))
        }
    };
    debug!("received accept_channel");

    if accept.temporary_channel_id != temporary_channel_id {
        return Err(OpeningError::peer_read_failed(
            "accept_channel temporary_channel_id does not match open_channel",
        ));
    }
    if accept.minimum_depth > open.max_minimum_depth {
        return Err(OpeningError::bad_param(
            "minimum_depth",
            accept.minimum_depth,
            open.max_minimum_depth,
        ));
    }

    let remote_config = ChannelConfig::from(&accept);
    policy::validate(
        &remote_config,
        open.funding_satoshis,
        &local_config,
        policy_bounds,
    )?;
    let remote_basepoints = Basepoints::from(&accept);

    write_status(
        status_out,
        &Status::OpenResp(OpenResp {
            local_funding_pubkey: local_basepoints.funding_pubkey,
            remote_funding_pubkey: remote_basepoints.funding_pubkey,
        }),
    )
    .map_err(|e| OpeningError::peer_write_failed(e.to_string()))?;

    let funding = match read_command(control_in)? {
        Command::OpenFunding(funding) => funding,
        _ => {
            return Err(OpeningError::BadCommand(
                "expected open_funding reply".to_string(),
            ))
        }
    };
    let funding_outpoint =
        OutPoint::new(funding.funding_txid, funding.funding_txout_index as u32);

    let (local_amount_sat, remote_amount_sat) =
        split_balances(open.funding_satoshis, open.push_msat);

    let remote_tx = build_initial_commitment_tx(
        Side::Remote,
        funding_outpoint,
        local_basepoints,
        first_per_commitment_point,
        &remote_basepoints,
        &accept.first_per_commitment_point,
        local_amount_sat,
        remote_amount_sat,
        &local_config,
        &remote_config,
    )
    .map_err(|e| OpeningError::bad_param("commitment_tx", e.to_string(), "none"))?;

    let signature = sign_remote_commit(
        &remote_tx,
        open.funding_satoshis,
        &funding_secret_key(local_secrets),
        &local_basepoints.funding_pubkey,
        &remote_basepoints.funding_pubkey,
    );

    debug!("sending funding_created");
    crypto_state = transport.send(
        crypto_state,
        &Messages::FundingCreated(FundingCreated {
            temporary_channel_id,
            funding_txid: funding.funding_txid,
            funding_output_index: funding.funding_txout_index,
            signature,
        }),
    )?;

    let (message, next_crypto_state) = transport.recv(crypto_state)?;
    crypto_state = next_crypto_state;
    let funding_signed = match message {
        Messages::FundingSigned(msg) => msg,
        other => {
            return Err(OpeningError::peer_read_failed(format!(
                "expected funding_signed, got message type {}",
                other_type_name(&other)
            )))
        }
    };
    debug!("received funding_signed");

    if funding_signed.channel_id != ChannelId::from(temporary_channel_id) {
        return Err(OpeningError::peer_read_failed(
            "funding_signed channel_id does not match temporary_channel_id",
        ));
    }

    let local_tx = build_initial_commitment_tx(
        Side::Local,
        funding_outpoint,
        local_basepoints,
        first_per_commitment_point,
        &remote_basepoints,
        &accept.first_per_commitment_point,
        local_amount_sat,
        remote_amount_sat,
        &local_config,
        &remote_config,
    )
    .map_err(|e| OpeningError::bad_param("commitment_tx", e.to_string(), "none"))?;

    if !check_commit_sig(
        &local_tx,
        open.funding_satoshis,
        &local_basepoints.funding_pubkey,
        &remote_basepoints.funding_pubkey,
        &funding_signed.signature,
    ) {
        return Err(OpeningError::peer_read_failed(
            "funding_signed signature does not verify against local commitment tx",
        ));
    }

    Ok(OpenFundingResp {
        remote_config,
        remote_signature: funding_signed.signature,
        crypto_state,
        remote_basepoints,
        next_per_commitment_point: accept.first_per_commitment_point,
    })
}

/// Runs the fundee side of the handshake to completion, against the
/// `open_channel` the dispatcher already read off the wire before deciding
/// which role to run.
pub fn run_fundee(
    transport: &mut impl PeerTransport,
    mut crypto_state: CryptoState,
    local_secrets: &LocalSecrets,
    local_basepoints: &Basepoints,
    first_per_commitment_point: &bitcoin::secp256k1::PublicKey,
    mut local_config: ChannelConfig,
    policy_bounds: &PolicyBounds,
    accept_cmd: Accept,
) -> Result<AcceptResp, OpeningError> {
    let open = &accept_cmd.open_channel;
    let temporary_channel_id = open.temporary_channel_id;
    let remote_config = ChannelConfig::from(open);
    let remote_basepoints = Basepoints::from(open);

    if open.funding_satoshis >= MAX_FUNDING_SATOSHIS {
        return Err(OpeningError::PeerBadFunding(format!(
            "funding_satoshis {} too large",
            open.funding_satoshis
        )));
    }
    if open.push_msat > 1000 * open.funding_satoshis {
        return Err(OpeningError::PeerBadFunding(format!(
            "push_msat {} too large for funding_satoshis {}",
            open.push_msat, open.funding_satoshis
        )));
    }
    if open.feerate_per_kw < accept_cmd.min_feerate
        || open.feerate_per_kw > accept_cmd.max_feerate
    {
        return Err(OpeningError::PeerBadFunding(format!(
            "feerate_per_kw {} outside of [{}, {}]",
            open.feerate_per_kw, accept_cmd.min_feerate, accept_cmd.max_feerate
        )));
    }

    local_config.channel_reserve_satoshis =
        one_percent_reserve(open.funding_satoshis);
    policy::validate(
        &remote_config,
        open.funding_satoshis,
        &local_config,
        policy_bounds,
    )?;

    let accept_channel = AcceptChannel {
        temporary_channel_id,
        dust_limit_satoshis: local_config.dust_limit_satoshis,
        max_htlc_value_in_flight_msat: local_config.max_htlc_value_in_flight_msat,
        channel_reserve_satoshis: local_config.channel_reserve_satoshis,
        minimum_depth: local_config.minimum_depth,
        htlc_minimum_msat: local_config.htlc_minimum_msat,
        to_self_delay: local_config.to_self_delay,
        max_accepted_htlcs: local_config.max_accepted_htlcs,
        funding_pubkey: local_basepoints.funding_pubkey,
        revocation_basepoint: local_basepoints.revocation_basepoint,
        payment_point: local_basepoints.payment_basepoint,
        delayed_payment_basepoint: local_basepoints.delayed_payment_basepoint,
        first_per_commitment_point: *first_per_commitment_point,
    };
    debug!("sending accept_channel");
    crypto_state = transport
        .send(crypto_state, &Messages::AcceptChannel(accept_channel))?;

    let (message, next_crypto_state) = transport.recv(crypto_state)?;
    crypto_state = next_crypto_state;
    let funding_created = match message {
        Messages::FundingCreated(msg) => msg,
        other => {
            return Err(OpeningError::peer_read_failed(format!(
                "expected funding_created, got message type {}",
                other_type_name(&other)
            )))
        }
    };
    debug!("received funding_created");

    if funding_created.temporary_channel_id != temporary_channel_id {
        return Err(OpeningError::peer_read_failed(
            "funding_created temporary_channel_id does not match open_channel",
        ));
    }

    let funding_outpoint = OutPoint::new(
        funding_created.funding_txid,
        funding_created.funding_output_index as u32,
    );
    let (remote_amount_sat, local_amount_sat) =
        split_balances(open.funding_satoshis, open.push_msat);

    let local_tx = build_initial_commitment_tx(
        Side::Local,
        funding_outpoint,
        local_basepoints,
        first_per_commitment_point,
        &remote_basepoints,
        &open.first_per_commitment_point,
        local_amount_sat,
        remote_amount_sat,
        &local_config,
        &remote_config,
    )
    .map_err(|e| OpeningError::bad_param("commitment_tx", e.to_string(), "none"))?;

    if !check_commit_sig(
        &local_tx,
        open.funding_satoshis,
        &local_basepoints.funding_pubkey,
        &remote_basepoints.funding_pubkey,
        &funding_created.signature,
    ) {
        return Err(OpeningError::peer_read_failed(
            "funding_created signature does not verify against local commitment tx",
        ));
    }

    let remote_tx = build_initial_commitment_tx(
        Side::Remote,
        funding_outpoint,
        local_basepoints,
        first_per_commitment_point,
        &remote_basepoints,
        &open.first_per_commitment_point,
        local_amount_sat,
        remote_amount_sat,
        &local_config,
        &remote_config,
    )
    .map_err(|e| OpeningError::bad_param("commitment_tx", e.to_string(), "none"))?;

    let signature = sign_remote_commit(
        &remote_tx,
        open.funding_satoshis,
        &funding_secret_key(local_secrets),
        &local_basepoints.funding_pubkey,
        &remote_basepoints.funding_pubkey,
    );

    debug!("sending funding_signed");
    crypto_state = transport.send(
        crypto_state,
        &Messages::FundingSigned(FundingSigned {
            channel_id: ChannelId::from(temporary_channel_id),
            signature,
        }),
    )?;

    Ok(AcceptResp {
        funding_outpoint_txid: funding_outpoint.txid,
        funding_outpoint_vout: funding_outpoint.vout,
        remote_config,
        remote_signature: funding_created.signature,
        crypto_state,
        remote_basepoints,
        next_per_commitment_point: open.first_per_commitment_point,
    })
}

/// `derive_local_keys` already rejected an invalid scalar before returning
/// this [`LocalSecrets`], so the conversion back to a [`SecretKey`] here
/// cannot fail.
fn funding_secret_key(
    secrets: &LocalSecrets,
) -> bitcoin::secp256k1::SecretKey {
    bitcoin::secp256k1::SecretKey::from_slice(&secrets.funding_privkey)
        .expect("funding_privkey validated at key derivation time")
}

fn other_type_name(message: &Messages) -> &'static str {
    match message {
        Messages::OpenChannel(_) => "open_channel",
        Messages::AcceptChannel(_) => "accept_channel",
        Messages::FundingCreated(_) => "funding_created",
        Messages::FundingSigned(_) => "funding_signed",
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use bitcoin::hashes::Hash;
    use bitcoin::secp256k1::SecretKey;
    use bitcoin::Txid;
    use lnp2p::legacy::AcceptChannel;

    use super::*;
    use crate::control::OpenFunding;
    use crate::keys::derive_local_keys;

    struct ScriptedTransport {
        to_recv: Vec<Messages>,
        sent: Vec<Messages>,
    }

    impl PeerTransport for ScriptedTransport {
        fn recv(
            &mut self,
            crypto_state: CryptoState,
        ) -> Result<(Messages, CryptoState), OpeningError> {
            Ok((self.to_recv.remove(0), crypto_state))
        }

        fn send(
            &mut self,
            crypto_state: CryptoState,
            message: &Messages,
        ) -> Result<CryptoState, OpeningError> {
            self.sent.push(message.clone());
            Ok(crypto_state)
        }
    }

    fn keys(seed: u8) -> (LocalSecrets, Basepoints, bitcoin::secp256k1::PublicKey) {
        derive_local_keys(&[seed; 32]).unwrap()
    }

    fn local_config() -> ChannelConfig {
        ChannelConfig {
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 0,
            htlc_minimum_msat: 1,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            minimum_depth: 3,
        }
    }

    fn policy_bounds() -> PolicyBounds {
        PolicyBounds {
            max_to_self_delay: 144,
            min_effective_htlc_capacity_msat: 1,
        }
    }

    fn funding_outpoint() -> OutPoint {
        OutPoint::new(Txid::all_zeros(), 0)
    }

    fn remote_config_from(accept: &AcceptChannel) -> ChannelConfig {
        ChannelConfig {
            dust_limit_satoshis: accept.dust_limit_satoshis,
            max_htlc_value_in_flight_msat: accept.max_htlc_value_in_flight_msat,
            channel_reserve_satoshis: accept.channel_reserve_satoshis,
            htlc_minimum_msat: accept.htlc_minimum_msat,
            to_self_delay: accept.to_self_delay,
            max_accepted_htlcs: accept.max_accepted_htlcs,
            minimum_depth: accept.minimum_depth,
        }
    }

    #[test]
    fn funder_happy_path_completes_with_funding_signed() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x01);
        let (remote_secrets, remote_basepoints, remote_first_point) = keys(0x02);
        let open = Open {
            funding_satoshis: 1_000_000,
            push_msat: 0,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        };

        let accept = AcceptChannel {
            temporary_channel_id: TempChannelId::reserved_single_channel(),
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            minimum_depth: 3,
            htlc_minimum_msat: 1,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            funding_pubkey: remote_basepoints.funding_pubkey,
            revocation_basepoint: remote_basepoints.revocation_basepoint,
            payment_point: remote_basepoints.payment_basepoint,
            delayed_payment_basepoint: remote_basepoints.delayed_payment_basepoint,
            first_per_commitment_point: remote_first_point,
        };
        let remote_config = remote_config_from(&accept);

        let outpoint = funding_outpoint();
        let mut local_config_for_tx = local_config();
        local_config_for_tx.channel_reserve_satoshis = one_percent_reserve(1_000_000);
        let local_tx = build_initial_commitment_tx(
            Side::Local,
            outpoint,
            &local_basepoints,
            &local_first_point,
            &remote_basepoints,
            &remote_first_point,
            1_000_000,
            0,
            &local_config_for_tx,
            &remote_config,
        )
        .unwrap();
        let remote_secret_key =
            SecretKey::from_slice(&remote_secrets.funding_privkey).unwrap();
        let signature = sign_remote_commit(
            &local_tx,
            1_000_000,
            &remote_secret_key,
            &local_basepoints.funding_pubkey,
            &remote_basepoints.funding_pubkey,
        );
        let funding_signed = FundingSigned {
            channel_id: ChannelId::from(accept.temporary_channel_id),
            signature,
        };

        let mut transport = ScriptedTransport {
            to_recv: vec![
                Messages::AcceptChannel(accept.clone()),
                Messages::FundingSigned(funding_signed),
            ],
            sent: vec![],
        };
        let mut control_in = Cursor::new({
            let mut buf = vec![];
            write_status(
                &mut buf,
                &Command::OpenFunding(OpenFunding {
                    funding_txid: outpoint.txid,
                    funding_txout_index: outpoint.vout as u16,
                }),
            )
            .unwrap();
            buf
        });
        let mut status_out = vec![];

        let resp = run_funder(
            &mut transport,
            CryptoState::default(),
            &mut control_in,
            &mut status_out,
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            open,
        )
        .unwrap();

        assert_eq!(resp.remote_config, remote_config);
        assert_eq!(resp.next_per_commitment_point, remote_first_point);
        assert!(matches!(
            transport.sent.as_slice(),
            [Messages::FundingCreated(_)]
        ));
    }

    #[test]
    fn fundee_happy_path_completes_with_funding_created() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x03);
        let (remote_secrets, remote_basepoints, remote_first_point) = keys(0x02);

        let open_channel = OpenChannel {
            chain_hash: Default::default(),
            temporary_channel_id: TempChannelId::reserved_single_channel(),
            funding_satoshis: 1_000_000,
            push_msat: 0,
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            htlc_minimum_msat: 1,
            feerate_per_kw: 15_000,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            funding_pubkey: remote_basepoints.funding_pubkey,
            revocation_basepoint: remote_basepoints.revocation_basepoint,
            payment_point: remote_basepoints.payment_basepoint,
            delayed_payment_basepoint: remote_basepoints.delayed_payment_basepoint,
            first_per_commitment_point: remote_first_point,
            channel_flags: 0,
        };
        let remote_config = ChannelConfig::from(&open_channel);
        let accept_cmd = Accept {
            min_feerate: 1_000,
            max_feerate: 20_000,
            open_channel: open_channel.clone(),
        };

        let outpoint = funding_outpoint();
        let mut local_config_for_tx = local_config();
        local_config_for_tx.channel_reserve_satoshis = one_percent_reserve(1_000_000);
        let local_tx = build_initial_commitment_tx(
            Side::Local,
            outpoint,
            &local_basepoints,
            &local_first_point,
            &remote_basepoints,
            &remote_first_point,
            0,
            1_000_000,
            &local_config_for_tx,
            &remote_config,
        )
        .unwrap();
        let remote_secret_key =
            SecretKey::from_slice(&remote_secrets.funding_privkey).unwrap();
        let signature = sign_remote_commit(
            &local_tx,
            1_000_000,
            &remote_secret_key,
            &local_basepoints.funding_pubkey,
            &remote_basepoints.funding_pubkey,
        );
        let funding_created = FundingCreated {
            temporary_channel_id: open_channel.temporary_channel_id,
            funding_txid: outpoint.txid,
            funding_output_index: outpoint.vout as u16,
            signature,
        };

        let mut transport = ScriptedTransport {
            to_recv: vec![Messages::FundingCreated(funding_created)],
            sent: vec![],
        };

        let resp = run_fundee(
            &mut transport,
            CryptoState::default(),
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            accept_cmd,
        )
        .unwrap();

        assert_eq!(resp.funding_outpoint_txid, outpoint.txid);
        assert_eq!(resp.funding_outpoint_vout, outpoint.vout);
        assert_eq!(resp.remote_config, remote_config);
        assert_eq!(resp.next_per_commitment_point, remote_first_point);
        assert!(matches!(
            transport.sent.as_slice(),
            [Messages::AcceptChannel(_)]
        ));
    }

    #[test]
    fn funder_rejects_push_msat_exceeding_funding_value() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x01);
        let open = Open {
            funding_satoshis: 100,
            push_msat: 100_001,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        };
        let mut transport = ScriptedTransport {
            to_recv: vec![],
            sent: vec![],
        };
        let mut control_in = Cursor::new(vec![]);
        let mut status_out = vec![];

        let result = run_funder(
            &mut transport,
            CryptoState::default(),
            &mut control_in,
            &mut status_out,
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            open,
        );

        assert!(matches!(result, Err(OpeningError::BadParam { field: "push_msat", .. })));
    }

    #[test]
    fn funder_rejects_remote_reserve_exceeding_funding_value() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x01);
        let (_, remote_basepoints, remote_first_point) = keys(0x02);
        let open = Open {
            funding_satoshis: 1_000_000,
            push_msat: 0,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        };
        let accept = AcceptChannel {
            temporary_channel_id: TempChannelId::reserved_single_channel(),
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 1_000_001,
            minimum_depth: 3,
            htlc_minimum_msat: 1,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            funding_pubkey: remote_basepoints.funding_pubkey,
            revocation_basepoint: remote_basepoints.revocation_basepoint,
            payment_point: remote_basepoints.payment_basepoint,
            delayed_payment_basepoint: remote_basepoints.delayed_payment_basepoint,
            first_per_commitment_point: remote_first_point,
        };
        let mut transport = ScriptedTransport {
            to_recv: vec![Messages::AcceptChannel(accept)],
            sent: vec![],
        };
        let mut control_in = Cursor::new(vec![]);
        let mut status_out = vec![];

        let result = run_funder(
            &mut transport,
            CryptoState::default(),
            &mut control_in,
            &mut status_out,
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            open,
        );

        assert!(matches!(result, Err(OpeningError::PeerBadConfig(_))));
    }

    #[test]
    fn funder_rejects_accept_channel_with_mismatched_temporary_id() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x01);
        let (_, remote_basepoints, remote_first_point) = keys(0x02);
        let open = Open {
            funding_satoshis: 1_000_000,
            push_msat: 0,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        };
        let accept = AcceptChannel {
            temporary_channel_id: TempChannelId::random(),
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            minimum_depth: 3,
            htlc_minimum_msat: 1,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            funding_pubkey: remote_basepoints.funding_pubkey,
            revocation_basepoint: remote_basepoints.revocation_basepoint,
            payment_point: remote_basepoints.payment_basepoint,
            delayed_payment_basepoint: remote_basepoints.delayed_payment_basepoint,
            first_per_commitment_point: remote_first_point,
        };
        let mut transport = ScriptedTransport {
            to_recv: vec![Messages::AcceptChannel(accept)],
            sent: vec![],
        };
        let mut control_in = Cursor::new(vec![]);
        let mut status_out = vec![];

        let result = run_funder(
            &mut transport,
            CryptoState::default(),
            &mut control_in,
            &mut status_out,
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            open,
        );

        assert!(matches!(result, Err(OpeningError::PeerReadFailed(_))));
    }

    #[test]
    fn funder_rejects_funding_signed_with_signature_from_wrong_key() {
        let (local_secrets, local_basepoints, local_first_point) = keys(0x01);
        let (_, remote_basepoints, remote_first_point) = keys(0x02);
        let (impostor_secrets, _, _) = keys(0x09);
        let open = Open {
            funding_satoshis: 1_000_000,
            push_msat: 0,
            feerate_per_kw: 15_000,
            max_minimum_depth: 10,
        };
        let accept = AcceptChannel {
            temporary_channel_id: TempChannelId::reserved_single_channel(),
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            minimum_depth: 3,
            htlc_minimum_msat: 1,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            funding_pubkey: remote_basepoints.funding_pubkey,
            revocation_basepoint: remote_basepoints.revocation_basepoint,
            payment_point: remote_basepoints.payment_basepoint,
            delayed_payment_basepoint: remote_basepoints.delayed_payment_basepoint,
            first_per_commitment_point: remote_first_point,
        };
        let remote_config = remote_config_from(&accept);

        let outpoint = funding_outpoint();
        let mut local_config_for_tx = local_config();
        local_config_for_tx.channel_reserve_satoshis = one_percent_reserve(1_000_000);
        let local_tx = build_initial_commitment_tx(
            Side::Local,
            outpoint,
            &local_basepoints,
            &local_first_point,
            &remote_basepoints,
            &remote_first_point,
            1_000_000,
            0,
            &local_config_for_tx,
            &remote_config,
        )
        .unwrap();
        // Signed by a third party's key instead of the fundee's, so
        // verification against `remote_basepoints.funding_pubkey` must fail.
        let impostor_secret_key =
            SecretKey::from_slice(&impostor_secrets.funding_privkey).unwrap();
        let signature = sign_remote_commit(
            &local_tx,
            1_000_000,
            &impostor_secret_key,
            &local_basepoints.funding_pubkey,
            &remote_basepoints.funding_pubkey,
        );
        let funding_signed = FundingSigned {
            channel_id: ChannelId::from(accept.temporary_channel_id),
            signature,
        };

        let mut transport = ScriptedTransport {
            to_recv: vec![
                Messages::AcceptChannel(accept),
                Messages::FundingSigned(funding_signed),
            ],
            sent: vec![],
        };
        let mut control_in = Cursor::new({
            let mut buf = vec![];
            write_status(
                &mut buf,
                &Command::OpenFunding(OpenFunding {
                    funding_txid: outpoint.txid,
                    funding_txout_index: outpoint.vout as u16,
                }),
            )
            .unwrap();
            buf
        });
        let mut status_out = vec![];

        let result = run_funder(
            &mut transport,
            CryptoState::default(),
            &mut control_in,
            &mut status_out,
            &local_secrets,
            &local_basepoints,
            &local_first_point,
            local_config(),
            &policy_bounds(),
            open,
        );

        assert!(matches!(result, Err(OpeningError::PeerReadFailed(_))));
    }
}
