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

//! Builds the initial (HTLC-free) commitment transaction for either side of
//! the channel and binds it to the 2-of-2 funding output: signing the
//! counterparty's view and verifying the signature the counterparty sends
//! back on ours.
//!
//! Full BOLT #3 commitment-transaction construction (weight/fee accounting,
//! HTLC outputs, anchor outputs) is out of scope here; this module builds
//! only the two-output skeleton a freshly-opened channel with no in-flight
//! HTLCs needs, per this crate's scope boundary.

use bitcoin::blockdata::opcodes::all::{
    OP_CHECKMULTISIG, OP_CHECKSIG, OP_CSV, OP_DROP, OP_ELSE, OP_ENDIF, OP_IF,
};
use bitcoin::blockdata::script::Builder;
use bitcoin::secp256k1::ecdsa::Signature;
use bitcoin::secp256k1::{Message, PublicKey};
use bitcoin::util::sighash::SighashCache;
use bitcoin::{
    EcdsaSighashType, OutPoint, PackedLockTime, Script, Sequence, Transaction,
    TxIn, TxOut, Witness,
};

use crate::config::ChannelConfig;
use crate::keys::{derive_pubkey, derive_revocation_pubkey, Basepoints};

/// Which party's broadcastable view of the commitment transaction is being
/// built. The funder always signs the `Remote` view and verifies the
/// `Local` view; the fundee does the opposite.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
#[display(Debug)]
pub enum Side {
    Local,
    Remote,
}

/// Error building an initial commitment transaction: the only way this
/// fails is a locally-infeasible parameter (e.g. dust limits that consume
/// the whole funding amount), surfaced by the driver as `BAD_PARAM`.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum CommitmentError {
    /// funding amount {funding_satoshis} is too small to cover both
    /// commitment outputs above their dust limits
    BelowDustLimits { funding_satoshis: u64 },

    /// per-commitment point tweak produced a point outside the curve
    InvalidTweak,
}

impl From<bitcoin::secp256k1::Error> for CommitmentError {
    fn from(_: bitcoin::secp256k1::Error) -> Self {
        CommitmentError::InvalidTweak
    }
}

/// The 2-of-2 witness script guarding the funding output, with the two
/// funding pubkeys in BOLT-3 canonical (lexicographic) order.
pub fn funding_redeem_script(
    pubkey_a: &PublicKey,
    pubkey_b: &PublicKey,
) -> Script {
    let mut keys = [*pubkey_a, *pubkey_b];
    keys.sort_by_key(|k| k.serialize());
    Builder::new()
        .push_int(2)
        .push_slice(&keys[0].serialize())
        .push_slice(&keys[1].serialize())
        .push_int(2)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script()
}

/// The `to_local` output script: immediately spendable with the revocation
/// key, or after `to_self_delay` blocks with the delayed payment key.
fn to_local_script(
    revocation_pubkey: &PublicKey,
    delayed_payment_pubkey: &PublicKey,
    to_self_delay: u16,
) -> Script {
    Builder::new()
        .push_opcode(OP_IF)
        .push_slice(&revocation_pubkey.serialize())
        .push_opcode(OP_ELSE)
        .push_int(to_self_delay as i64)
        .push_opcode(OP_CSV)
        .push_opcode(OP_DROP)
        .push_slice(&delayed_payment_pubkey.serialize())
        .push_opcode(OP_ENDIF)
        .push_opcode(OP_CHECKSIG)
        .into_script()
}

/// The `to_remote` output: a plain P2WPKH payment to `remotepubkey`, per the
/// original (non-`option_anchors`) BOLT-3 commitment format. The anchor
/// variant wraps this in a P2WSH `CHECKSIG` + 1-block CSV script instead;
/// that format is out of this module's scope.
fn to_remote_script(payment_pubkey: &PublicKey) -> Script {
    let pubkey = bitcoin::PublicKey::new(*payment_pubkey);
    Script::new_v0_p2wpkh(
        &pubkey
            .wpubkey_hash()
            .expect("bitcoin::PublicKey::new always sets compressed = true"),
    )
}

/// Builds the initial (commitment index 0, no HTLCs) commitment transaction
/// for `viewpoint`'s broadcastable side, spending `funding_outpoint`.
///
/// `local_amount_sat`/`remote_amount_sat` are the balances from the
/// perspective of the local side (i.e. after `push_msat` has moved funds to
/// the remote side). Per BOLT #3, each side's `channel_config` constrains the
/// *other* side's broadcastable transaction: `to_self_delay` comes from the
/// config the non-broadcaster sent, while the dust limit that trims an
/// output comes from the broadcaster's own config.
pub fn build_initial_commitment_tx(
    viewpoint: Side,
    funding_outpoint: OutPoint,
    local_basepoints: &Basepoints,
    local_per_commitment_point: &PublicKey,
    remote_basepoints: &Basepoints,
    remote_per_commitment_point: &PublicKey,
    local_amount_sat: u64,
    remote_amount_sat: u64,
    local_config: &ChannelConfig,
    remote_config: &ChannelConfig,
) -> Result<Transaction, CommitmentError> {
    // Every output's pubkey is tweaked by the per-commitment point of the
    // side that broadcasts this particular transaction, never the other
    // side's — BOLT #3 ties a commitment transaction to exactly one point.
    let per_commitment_point = match viewpoint {
        Side::Local => local_per_commitment_point,
        Side::Remote => remote_per_commitment_point,
    };
    let (broadcaster_config, to_self_delay) = match viewpoint {
        Side::Local => (local_config, remote_config.to_self_delay),
        Side::Remote => (remote_config, local_config.to_self_delay),
    };
    let dust_limit_satoshis = broadcaster_config.dust_limit_satoshis;

    if local_amount_sat < dust_limit_satoshis
        && remote_amount_sat < dust_limit_satoshis
    {
        return Err(CommitmentError::BelowDustLimits {
            funding_satoshis: local_amount_sat + remote_amount_sat,
        });
    }

    let (to_local_amount, to_remote_amount) = match viewpoint {
        Side::Local => (local_amount_sat, remote_amount_sat),
        Side::Remote => (remote_amount_sat, local_amount_sat),
    };

    let mut outputs = Vec::with_capacity(2);
    if to_local_amount >= dust_limit_satoshis {
        // The broadcaster's own `to_local` output is always revocable by the
        // counterparty's revocation basepoint, tweaked per commitment point.
        let revocation_basepoint = match viewpoint {
            Side::Local => remote_basepoints.revocation_basepoint,
            Side::Remote => local_basepoints.revocation_basepoint,
        };
        let delayed_basepoint = match viewpoint {
            Side::Local => local_basepoints.delayed_payment_basepoint,
            Side::Remote => remote_basepoints.delayed_payment_basepoint,
        };
        let revocation_pubkey = derive_revocation_pubkey(
            &revocation_basepoint,
            per_commitment_point,
        )?;
        let delayed_pubkey =
            derive_pubkey(&delayed_basepoint, per_commitment_point)?;
        let script = to_local_script(
            &revocation_pubkey,
            &delayed_pubkey,
            to_self_delay,
        );
        outputs.push(TxOut {
            value: to_local_amount,
            script_pubkey: script.to_v0_p2wsh(),
        });
    }
    if to_remote_amount >= dust_limit_satoshis {
        let payment_basepoint = match viewpoint {
            Side::Local => remote_basepoints.payment_basepoint,
            Side::Remote => local_basepoints.payment_basepoint,
        };
        let remotepubkey =
            derive_pubkey(&payment_basepoint, per_commitment_point)?;
        outputs.push(TxOut {
            value: to_remote_amount,
            script_pubkey: to_remote_script(&remotepubkey),
        });
    }

    Ok(Transaction {
        version: 2,
        lock_time: PackedLockTime(0),
        input: vec![TxIn {
            previous_output: funding_outpoint,
            script_sig: Script::new(),
            sequence: Sequence(0xFFFF_FFFF),
            witness: Witness::new(),
        }],
        output: outputs,
    })
}

/// Signs `tx`'s sole input (the funding outpoint) with the local funding
/// private key, against the 2-of-2 redeem script for `local_funding_pubkey`
/// / `remote_funding_pubkey`.
pub fn sign_remote_commit(
    tx: &Transaction,
    funding_satoshis: u64,
    local_funding_privkey: &bitcoin::secp256k1::SecretKey,
    local_funding_pubkey: &PublicKey,
    remote_funding_pubkey: &PublicKey,
) -> Signature {
    let redeem_script =
        funding_redeem_script(local_funding_pubkey, remote_funding_pubkey);
    let mut cache = SighashCache::new(tx);
    let sighash = cache
        .segwit_signature_hash(
            0,
            &redeem_script,
            funding_satoshis,
            EcdsaSighashType::All,
        )
        .expect("single-input commitment tx always has input index 0");
    let message = Message::from_slice(&sighash[..])
        .expect("SHA256-sized sighash is a valid message");
    bitcoin::secp256k1::SECP256K1.sign_ecdsa(&message, local_funding_privkey)
}

/// Verifies a counterparty-supplied commitment signature against the 2-of-2
/// redeem script for `local_funding_pubkey` / `remote_funding_pubkey`.
pub fn check_commit_sig(
    tx: &Transaction,
    funding_satoshis: u64,
    local_funding_pubkey: &PublicKey,
    remote_funding_pubkey: &PublicKey,
    signature: &Signature,
) -> bool {
    let redeem_script =
        funding_redeem_script(local_funding_pubkey, remote_funding_pubkey);
    let mut cache = SighashCache::new(tx);
    let sighash = match cache.segwit_signature_hash(
        0,
        &redeem_script,
        funding_satoshis,
        EcdsaSighashType::All,
    ) {
        Ok(sighash) => sighash,
        Err(_) => return false,
    };
    let message = match Message::from_slice(&sighash[..]) {
        Ok(message) => message,
        Err(_) => return false,
    };
    bitcoin::secp256k1::SECP256K1
        .verify_ecdsa(&message, signature, remote_funding_pubkey)
        .is_ok()
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::Hash;
    use bitcoin::secp256k1::SecretKey;
    use bitcoin::Txid;

    use super::*;

    fn dumb_basepoints(byte: u8) -> (SecretKey, Basepoints) {
        let secret = SecretKey::from_slice(&[byte; 32]).unwrap();
        let pubkey = PublicKey::from_secret_key(
            bitcoin::secp256k1::SECP256K1,
            &secret,
        );
        (
            secret,
            Basepoints {
                funding_pubkey: pubkey,
                revocation_basepoint: pubkey,
                payment_basepoint: pubkey,
                delayed_payment_basepoint: pubkey,
            },
        )
    }

    fn dumb_point(byte: u8) -> PublicKey {
        let secret = SecretKey::from_slice(&[byte; 32]).unwrap();
        PublicKey::from_secret_key(bitcoin::secp256k1::SECP256K1, &secret)
    }

    fn dumb_config() -> ChannelConfig {
        ChannelConfig {
            dust_limit_satoshis: 546,
            max_htlc_value_in_flight_msat: 990_000_000,
            channel_reserve_satoshis: 10_000,
            htlc_minimum_msat: 1000,
            to_self_delay: 144,
            max_accepted_htlcs: 483,
            minimum_depth: 0,
        }
    }

    #[test]
    fn signature_round_trips_through_verification() {
        let (local_secret, local_points) = dumb_basepoints(0x01);
        let (_, remote_points) = dumb_basepoints(0x02);
        let outpoint = OutPoint::new(Txid::all_zeros(), 0);
        let tx = build_initial_commitment_tx(
            Side::Remote,
            outpoint,
            &local_points,
            &dumb_point(0x11),
            &remote_points,
            &dumb_point(0x12),
            900_000,
            100_000,
            &dumb_config(),
            &dumb_config(),
        )
        .unwrap();

        let sig = sign_remote_commit(
            &tx,
            1_000_000,
            &local_secret,
            &local_points.funding_pubkey,
            &remote_points.funding_pubkey,
        );

        assert!(check_commit_sig(
            &tx,
            1_000_000,
            &local_points.funding_pubkey,
            &remote_points.funding_pubkey,
            &sig,
        ));
    }

    #[test]
    fn wrong_key_signature_is_rejected() {
        let (local_secret, local_points) = dumb_basepoints(0x01);
        let (other_secret, _) = dumb_basepoints(0x03);
        let (_, remote_points) = dumb_basepoints(0x02);
        let outpoint = OutPoint::new(Txid::all_zeros(), 0);
        let tx = build_initial_commitment_tx(
            Side::Remote,
            outpoint,
            &local_points,
            &dumb_point(0x11),
            &remote_points,
            &dumb_point(0x12),
            900_000,
            100_000,
            &dumb_config(),
            &dumb_config(),
        )
        .unwrap();

        let bad_sig = sign_remote_commit(
            &tx,
            1_000_000,
            &other_secret,
            &local_points.funding_pubkey,
            &remote_points.funding_pubkey,
        );
        let _ = local_secret;

        assert!(!check_commit_sig(
            &tx,
            1_000_000,
            &local_points.funding_pubkey,
            &remote_points.funding_pubkey,
            &bad_sig,
        ));
    }

    #[test]
    fn to_remote_output_is_p2wpkh() {
        let (_, local_points) = dumb_basepoints(0x01);
        let (_, remote_points) = dumb_basepoints(0x02);
        let outpoint = OutPoint::new(Txid::all_zeros(), 0);
        let tx = build_initial_commitment_tx(
            Side::Remote,
            outpoint,
            &local_points,
            &dumb_point(0x11),
            &remote_points,
            &dumb_point(0x12),
            900_000,
            100_000,
            &dumb_config(),
            &dumb_config(),
        )
        .unwrap();

        let to_remote = tx
            .output
            .iter()
            .find(|out| out.value == 100_000)
            .expect("to_remote output present above dust");
        assert!(to_remote.script_pubkey.is_v0_p2wpkh());
    }

    #[test]
    fn below_dust_limits_is_rejected() {
        let (_, local_points) = dumb_basepoints(0x01);
        let (_, remote_points) = dumb_basepoints(0x02);
        let outpoint = OutPoint::new(Txid::all_zeros(), 0);
        let mut config = dumb_config();
        config.dust_limit_satoshis = 1000;
        let result = build_initial_commitment_tx(
            Side::Local,
            outpoint,
            &local_points,
            &dumb_point(0x11),
            &remote_points,
            &dumb_point(0x12),
            500,
            500,
            &config,
            &config,
        );
        assert!(result.is_err());
    }
}
