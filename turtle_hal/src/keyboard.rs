//! Keyboard input for the manual console.
//!
//! `RawTerminal` switches the controlling terminal into non-canonical,
//! no-echo, non-blocking mode for as long as it lives and restores the
//! saved settings when dropped, on every exit path that unwinds.

use std::collections::VecDeque;
use std::io::{self, Read, Stdin};

use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use tracing::{debug, warn};

use crate::console::KEY_ESCAPE;

/// Non-blocking source of single key codes.
pub trait KeySource {
    /// Return the next buffered key, or `None` if nothing was typed.
    fn poll_key(&mut self) -> io::Result<Option<u8>>;
}

/// Scripted keys, one per poll; `None` entries model idle cycles.
impl KeySource for VecDeque<Option<u8>> {
    fn poll_key(&mut self) -> io::Result<Option<u8>> {
        Ok(self.pop_front().flatten())
    }
}

/// Splits raw terminal input into key codes.
///
/// Arrow and function keys arrive as `ESC [ ...` (CSI) or `ESC O x` (SS3)
/// and are dropped whole. Any other ESC is reported as [`KEY_ESCAPE`].
#[derive(Debug, Default)]
pub struct KeyDecoder {
    pending: Option<u8>,
}

impl KeyDecoder {
    /// Decode the next key from `input`, or `None` if nothing usable is buffered.
    pub fn next_key(&mut self, input: &mut impl Read) -> io::Result<Option<u8>> {
        if let Some(key) = self.pending.take() {
            return Ok(Some(key));
        }
        let Some(byte) = read_byte(input)? else {
            return Ok(None);
        };
        if byte != KEY_ESCAPE {
            return Ok(Some(byte));
        }

        match read_byte(input)? {
            None => Ok(Some(KEY_ESCAPE)),
            Some(b'[' | b'O') => {
                // Parameter and intermediate bytes run up to a final byte in 0x40..=0x7E.
                while let Some(next) = read_byte(input)? {
                    if (0x40..=0x7E).contains(&next) {
                        break;
                    }
                }
                debug!("Dropped terminal escape sequence");
                Ok(None)
            }
            Some(other) => {
                self.pending = Some(other);
                Ok(Some(KEY_ESCAPE))
            }
        }
    }
}

fn read_byte(input: &mut impl Read) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    match input.read(&mut buf) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(buf[0])),
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Scoped raw-mode acquisition of stdin.
pub struct RawTerminal {
    stdin: Stdin,
    saved: Termios,
    decoder: KeyDecoder,
}

impl RawTerminal {
    /// Save the current terminal settings and enter raw mode.
    ///
    /// `ISIG` stays enabled so Ctrl+C still reaches the signal handler.
    ///
    /// # Errors
    /// Fails if stdin is not a terminal or the settings cannot be applied.
    pub fn acquire() -> io::Result<Self> {
        let stdin = io::stdin();
        let saved = termios::tcgetattr(&stdin)?;

        let mut raw = saved.clone();
        raw.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 0;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw)?;

        debug!("Terminal switched to raw mode");
        Ok(Self {
            stdin,
            saved,
            decoder: KeyDecoder::default(),
        })
    }
}

impl KeySource for RawTerminal {
    fn poll_key(&mut self) -> io::Result<Option<u8>> {
        self.decoder.next_key(&mut self.stdin.lock())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        match termios::tcsetattr(&self.stdin, SetArg::TCSANOW, &self.saved) {
            Ok(()) => debug!("Terminal settings restored"),
            Err(e) => warn!("Failed to restore terminal settings: {}", e),
        }
    }
}
