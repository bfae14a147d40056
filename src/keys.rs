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

//! Expands the 256-bit root seed handed to the subsystem at `init` into the
//! four basepoint secrets, the `shaseed`, and the per-commitment hash chain
//! used to derive the local `first_per_commitment_point`.

use bitcoin::hashes::{sha256, Hash, HashEngine};
use bitcoin::secp256k1::{PublicKey, SecretKey};
use hkdf::Hkdf;
use lightning_encoding::{LightningDecode, LightningEncode};
use lnp2p::legacy::{AcceptChannel, OpenChannel};
use sha2::Sha256;
use zeroize::Zeroize;

/// Application-specific HKDF info string scoping the derivation to this
/// subsystem, analogous to the `"c-lightning"` info tag the reference
/// implementation mixes into its basepoint HKDF.
const HKDF_INFO: &[u8] = b"lnp-openingd basepoints";

/// The per-commitment hash chain starts at this index and counts down, per
/// BOLT #3.
pub const FIRST_PER_COMMITMENT_INDEX: u64 = 281_474_976_710_655;

/// The four private scalars derived from the root seed, plus the shaseed
/// from which every per-commitment secret is generated. Zeroized on drop so
/// no copy of the key material outlives the subsystem.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct LocalSecrets {
    pub funding_privkey: [u8; 32],
    pub revocation_basepoint_secret: [u8; 32],
    pub payment_basepoint_secret: [u8; 32],
    pub delayed_payment_basepoint_secret: [u8; 32],
    pub shaseed: [u8; 32],
}

/// The four public basepoints corresponding to a [`LocalSecrets`] (or to a
/// counterparty's announced configuration).
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, LightningEncode, LightningDecode,
)]
pub struct Basepoints {
    pub funding_pubkey: PublicKey,
    pub revocation_basepoint: PublicKey,
    pub payment_basepoint: PublicKey,
    pub delayed_payment_basepoint: PublicKey,
}

impl From<&OpenChannel> for Basepoints {
    fn from(msg: &OpenChannel) -> Self {
        Basepoints {
            funding_pubkey: msg.funding_pubkey,
            revocation_basepoint: msg.revocation_basepoint,
            payment_basepoint: msg.payment_point,
            delayed_payment_basepoint: msg.delayed_payment_basepoint,
        }
    }
}

impl From<&AcceptChannel> for Basepoints {
    fn from(msg: &AcceptChannel) -> Self {
        Basepoints {
            funding_pubkey: msg.funding_pubkey,
            revocation_basepoint: msg.revocation_basepoint,
            payment_basepoint: msg.payment_point,
            delayed_payment_basepoint: msg.delayed_payment_basepoint,
        }
    }
}

/// Error produced when the seed's HKDF expansion yields a scalar that is not
/// a valid secp256k1 private key (probability is negligible for any sane
/// hash function, but the check is cheap and the caller must have a typed
/// failure to report).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub struct KeyDerivationError(pub(crate) &'static str);

/// Expands `root_seed` via HKDF-SHA256 into [`LocalSecrets`] and their
/// corresponding [`Basepoints`], then derives `first_per_commitment_point`
/// for commitment index [`FIRST_PER_COMMITMENT_INDEX`].
pub fn derive_local_keys(
    root_seed: &[u8; 32],
) -> Result<(LocalSecrets, Basepoints, PublicKey), KeyDerivationError> {
    let hkdf = Hkdf::<Sha256>::new(None, root_seed);
    let mut okm = [0u8; 160];
    hkdf.expand(HKDF_INFO, &mut okm)
        .map_err(|_| KeyDerivationError("HKDF output length rejected"))?;

    let mut take32 = |offset: usize| -> [u8; 32] {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&okm[offset..offset + 32]);
        buf
    };

    let secrets = LocalSecrets {
        funding_privkey: take32(0),
        revocation_basepoint_secret: take32(32),
        payment_basepoint_secret: take32(64),
        delayed_payment_basepoint_secret: take32(96),
        shaseed: take32(128),
    };
    okm.zeroize();

    let secp = bitcoin::secp256k1::SECP256K1;
    let to_pubkey = |scalar: &[u8; 32]| -> Result<PublicKey, KeyDerivationError> {
        let secret = SecretKey::from_slice(scalar)
            .map_err(|_| KeyDerivationError("derived scalar is not a valid secp256k1 key"))?;
        Ok(PublicKey::from_secret_key(secp, &secret))
    };

    let basepoints = Basepoints {
        funding_pubkey: to_pubkey(&secrets.funding_privkey)?,
        revocation_basepoint: to_pubkey(&secrets.revocation_basepoint_secret)?,
        payment_basepoint: to_pubkey(&secrets.payment_basepoint_secret)?,
        delayed_payment_basepoint: to_pubkey(
            &secrets.delayed_payment_basepoint_secret,
        )?,
    };

    let first_secret =
        per_commitment_secret(&secrets.shaseed, FIRST_PER_COMMITMENT_INDEX);
    let first_per_commitment_point = to_pubkey(&first_secret)?;

    Ok((secrets, basepoints, first_per_commitment_point))
}

/// Generates the per-commitment secret for hash-chain `index` from
/// `shaseed`, per BOLT #3's `generate_from_seed`: each of the 48 index bits,
/// from most to least significant, flips the corresponding bit of the
/// running hash and re-hashes with SHA-256.
pub fn per_commitment_secret(shaseed: &[u8; 32], index: u64) -> [u8; 32] {
    let mut hash = *shaseed;
    for i in 0..48u32 {
        let b = 47 - i;
        if index & (1u64 << b) != 0 {
            hash[(b / 8) as usize] ^= 1 << (b % 8);
            hash = sha256::Hash::hash(&hash).into_inner();
        }
    }
    hash
}

/// Derives a BOLT #3 `*pubkey` (`localpubkey`/`remotepubkey`/
/// `local_delayedpubkey`/`remote_delayedpubkey`/`*_htlcpubkey`) from a
/// basepoint and the per-commitment point of the commitment transaction the
/// key is used in: `basepoint + SHA256(per_commitment_point || basepoint)*G`.
pub fn derive_pubkey(
    basepoint: &PublicKey,
    per_commitment_point: &PublicKey,
) -> Result<PublicKey, bitcoin::secp256k1::Error> {
    let secp = bitcoin::secp256k1::SECP256K1;
    let tweak = tweak_hash(per_commitment_point, basepoint)?;
    basepoint.add_exp_tweak(secp, &tweak)
}

/// Derives the BOLT #3 `revocationpubkey` from the revocation basepoint and
/// the per-commitment point:
/// `revocation_basepoint*SHA256(revocation_basepoint || per_commitment_point)
/// + per_commitment_point*SHA256(per_commitment_point || revocation_basepoint)`.
pub fn derive_revocation_pubkey(
    revocation_basepoint: &PublicKey,
    per_commitment_point: &PublicKey,
) -> Result<PublicKey, bitcoin::secp256k1::Error> {
    let secp = bitcoin::secp256k1::SECP256K1;
    let tweak_basepoint =
        tweak_hash(revocation_basepoint, per_commitment_point)?;
    let tweak_point = tweak_hash(per_commitment_point, revocation_basepoint)?;
    let term1 = revocation_basepoint.mul_tweak(secp, &tweak_basepoint)?;
    let term2 = per_commitment_point.mul_tweak(secp, &tweak_point)?;
    term1.combine(&term2)
}

/// `SHA256(a || b)` as a secp256k1 scalar, as used by every BOLT #3 pubkey
/// tweak formula.
fn tweak_hash(
    a: &PublicKey,
    b: &PublicKey,
) -> Result<bitcoin::secp256k1::Scalar, bitcoin::secp256k1::Error> {
    let mut engine = sha256::Hash::engine();
    engine.input(&a.serialize());
    engine.input(&b.serialize());
    let digest = sha256::Hash::from_engine(engine).into_inner();
    bitcoin::secp256k1::Scalar::from_be_bytes(digest)
        .map_err(|_| bitcoin::secp256k1::Error::InvalidTweak)
}
