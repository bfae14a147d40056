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

//! `openingd` is the short-lived, single-shot protocol engine that
//! negotiates a new Lightning payment channel with a single remote peer and
//! hands a fully-formed channel record back to the parent node process. It
//! is spawned once per channel-open attempt, speaks to its parent and to the
//! peer over three length-prefixed typed message streams (control, peer,
//! status), and exits after the handshake concludes — see [`dispatch`] for
//! the entry point a `main` wires the three real file descriptors into.

#![recursion_limit = "256"]
// Coding conventions
#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports,
    dead_code,
    //missing_docs
)]

#[macro_use]
extern crate amplify;

pub extern crate lnp2p as p2p;

pub mod commitment;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod keys;
pub mod policy;
pub mod transport;
pub mod wire;

pub use commitment::Side;
pub use control::{Command, Init, Status};
pub use dispatcher::dispatch;
pub use error::OpeningError;
pub use keys::{derive_local_keys, Basepoints, LocalSecrets};
pub use transport::{FramedPeerTransport, PeerTransport};
