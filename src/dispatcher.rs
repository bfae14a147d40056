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

//! Reads `init`, derives keys, reads the next command, runs the funder or
//! fundee driver, hands the peer socket back to the parent, then waits for
//! `exit_req`. This is the one place an [`OpeningError`] is turned into a
//! [`Status`] message: every driver failure bubbles up here, is logged at
//! `error!`, and is reported before the process exits.

use std::io::{Read, Write};

use log::{error, info};

use crate::control::{Command, Init, Status};
use crate::driver::{run_funder, run_fundee};
use crate::error::OpeningError;
use crate::keys::derive_local_keys;
use crate::transport::PeerTransport;
use crate::wire::{read_command, write_status};

/// Runs one full channel-opening attempt. `hand_back_peer` is invoked once
/// the handshake has completed successfully, and is this crate's seam for
/// the OS-specific mechanics of passing the peer file descriptor back to the
/// parent process — a concern this subsystem's portable core does not own.
pub fn dispatch(
    transport: &mut impl PeerTransport,
    control_in: &mut impl Read,
    status_out: &mut impl Write,
    hand_back_peer: impl FnOnce() -> std::io::Result<()>,
) -> Result<(), OpeningError> {
    let init = match read_command(control_in)? {
        Command::Init(init) => init,
        _ => {
            return Err(fail(
                status_out,
                OpeningError::BadCommand("expected init".to_string()),
            ))
        }
    };
    run(transport, control_in, status_out, hand_back_peer, init)
}

fn run(
    transport: &mut impl PeerTransport,
    control_in: &mut impl Read,
    status_out: &mut impl Write,
    hand_back_peer: impl FnOnce() -> std::io::Result<()>,
    init: Init,
) -> Result<(), OpeningError> {
    let (secrets, basepoints, first_per_commitment_point) =
        match derive_local_keys(&init.root_seed) {
            Ok(keys) => keys,
            Err(e) => {
                return Err(fail(
                    status_out,
                    OpeningError::KeyDerivationFailed(e.to_string()),
                ))
            }
        };
    info!("channel-opening subsystem started, keys derived");

    let command = match read_command(control_in) {
        Ok(command) => command,
        Err(e) => return Err(fail(status_out, e)),
    };

    let result = match command {
        Command::Open(open) => {
            info!("running as funder");
            run_funder(
                transport,
                init.crypto_state,
                control_in,
                status_out,
                &secrets,
                &basepoints,
                &first_per_commitment_point,
                init.local_config,
                &init.policy,
                open,
            )
            .map(Status::OpenFundingResp)
        }
        Command::Accept(accept) => {
            info!("running as fundee");
            run_fundee(
                transport,
                init.crypto_state,
                &secrets,
                &basepoints,
                &first_per_commitment_point,
                init.local_config,
                &init.policy,
                accept,
            )
            .map(Status::AcceptResp)
        }
        _ => Err(OpeningError::BadCommand(
            "expected open or accept".to_string(),
        )),
    };

    let status = match result {
        Ok(status) => status,
        Err(e) => return Err(fail(status_out, e)),
    };
    write_status(status_out, &status)
        .map_err(|e| OpeningError::peer_write_failed(e.to_string()))?;
    info!("handshake complete, handing peer socket back to parent");

    hand_back_peer()
        .map_err(|e| OpeningError::peer_write_failed(e.to_string()))?;

    match read_command(control_in)? {
        Command::ExitReq => {}
        _ => {
            return Err(OpeningError::BadCommand(
                "expected exit_req".to_string(),
            ))
        }
    }
    info!("exit_req received, tearing down");
    Ok(())
}

/// Logs and reports a terminal failure, then returns it unchanged so the
/// caller can propagate it as a nonzero exit code.
fn fail(status_out: &mut impl Write, e: OpeningError) -> OpeningError {
    error!("{}", e);
    let _ = write_status(status_out, &Status::failure(&e));
    e
}
