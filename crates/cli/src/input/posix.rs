use std::io;
use std::time::Duration;

use super::keys::ByteSource;

const STDIN_FD: libc::c_int = 0;

/// Unbuffered bytes from the process's standard input.
#[derive(Debug, Default)]
pub struct StdinBytes;

impl ByteSource for StdinBytes {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        let timeout_ms: libc::c_int = match timeout {
            Some(timeout) => timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
            None => -1,
        };

        loop {
            let mut poll_fd = libc::pollfd {
                fd: STDIN_FD,
                events: libc::POLLIN,
                revents: 0,
            };
            // SAFETY: `poll_fd` is a valid pollfd for the duration of the call.
            let ready = unsafe { libc::poll(&mut poll_fd, 1, timeout_ms) };
            if ready < 0 {
                let error = io::Error::last_os_error();
                if error.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(error);
            }
            if ready == 0 {
                return Ok(None);
            }

            let mut byte: u8 = 0;
            // SAFETY: reads at most one byte into a valid, writable u8.
            let read = unsafe { libc::read(STDIN_FD, (&mut byte as *mut u8).cast(), 1) };
            match read {
                1 => return Ok(Some(byte)),
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "standard input closed",
                    ))
                }
                _ => {
                    let error = io::Error::last_os_error();
                    if error.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }
}
