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

//! Length-prefixed framing for the control and status channels: a
//! big-endian `u32` byte count ahead of a [`lightning_encoding`]-encoded
//! payload. The peer channel has its own framing in [`crate::transport`]
//! since it additionally threads the transport crypto state.

use std::io::{Read, Write};

use lightning_encoding::{LightningDecode, LightningEncode};

use crate::control::Command;
use crate::error::OpeningError;

/// Reads one [`Command`] off the control channel. Any I/O or decode failure
/// is a malformed/unexpected control message: fatal, per §7.
pub fn read_command(r: &mut impl Read) -> Result<Command, OpeningError> {
    read_framed(r).map_err(|e| OpeningError::BadCommand(e.to_string()))
}

fn read_framed<T: LightningDecode>(
    r: &mut impl Read,
) -> Result<T, lightning_encoding::Error> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    T::lightning_deserialize(&payload)
}

/// Writes one status message, framed the same way as control messages.
pub fn write_status<T: LightningEncode>(
    w: &mut impl Write,
    message: &T,
) -> std::io::Result<()> {
    let payload = message.lightning_serialize();
    w.write_all(&(payload.len() as u32).to_be_bytes())?;
    w.write_all(&payload)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::control::Open;

    #[test]
    fn command_roundtrips_through_framing() {
        let cmd = Command::Open(Open {
            funding_satoshis: 500_000,
            push_msat: 0,
            feerate_per_kw: 10_000,
            max_minimum_depth: 6,
        });
        let mut buf = vec![];
        write_status(&mut buf, &cmd).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = read_command(&mut cursor).unwrap();
        assert_eq!(decoded, cmd);
    }
}
