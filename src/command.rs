//! Command dispatcher: tokenize a frame payload, validate it, run the
//! matching action.
//!
//! Every failure here is non-fatal and purely observational — a diagnostic
//! line and a counter bump. The frame was already fully received, so there
//! is nothing to retry; the only recovery is the remote side sending a
//! corrected frame. No command is ever partially applied.

use core::fmt::Write;

use crate::state::{AppState, LinkStats};

/// Version string (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");

/// Maximum positional arguments any keyword takes.
pub const MAX_ARGS: usize = 4;

/// A tokenized frame payload.
///
/// Split on `,` with empty tokens preserved — `PID,,2` has an empty first
/// argument, and a trailing comma contributes an empty trailing argument.
/// Arguments beyond [`MAX_ARGS`] are not stored but still counted, so an
/// over-long list fails arity validation instead of being silently clipped.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    /// The command keyword (first token).
    pub keyword: &'a str,
    args: [Option<&'a str>; MAX_ARGS],
    argc: usize,
}

impl<'a> Tokens<'a> {
    /// Tokenize a payload.
    pub fn parse(payload: &'a str) -> Self {
        let mut parts = payload.split(',');

        // split() always yields at least one token, "" for an empty payload
        let keyword = parts.next().unwrap_or("");

        let mut args = [None; MAX_ARGS];
        let mut argc = 0;
        for arg in parts {
            if argc < MAX_ARGS {
                args[argc] = Some(arg);
            }
            argc += 1;
        }

        Self { keyword, args, argc }
    }

    /// Get argument by index (0-based).
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied().flatten()
    }

    /// Total argument count, including any beyond [`MAX_ARGS`].
    pub fn argc(&self) -> usize {
        self.argc
    }
}

/// Dispatch error with code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// E01: Keyword not in the command set
    UnknownCommand,
    /// E02: Argument count does not match the keyword
    MissingParams,
    /// E03: Payload is not valid text
    BadPayload,
    /// E04: Enumerated argument outside its allowed set
    BadArgument,
}

impl DispatchError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::MissingParams => "E02",
            Self::BadPayload => "E03",
            Self::BadArgument => "E04",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::MissingParams => "missing parameters",
            Self::BadPayload => "payload is not valid text",
            Self::BadArgument => "unusable argument value",
        }
    }
}

impl core::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// What the action hooks may touch.
pub struct DispatchCtx<'a> {
    pub state: &'a AppState,
    pub stats: &'a LinkStats,
}

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    /// Exact argument count this keyword requires.
    pub arg_count: usize,
    pub brief: &'static str,
    pub handler:
        fn(&Tokens<'_>, &DispatchCtx<'_>, &mut dyn Write) -> Result<(), DispatchError>,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "PID",
        arg_count: 3,
        brief: "Set the three controller gains",
        handler: cmd_pid,
    },
    CommandDescriptor {
        name: "LED",
        arg_count: 1,
        brief: "Drive the LED output (ON/OFF)",
        handler: cmd_led,
    },
    CommandDescriptor {
        name: "STATUS",
        arg_count: 0,
        brief: "Report version and link counters",
        handler: cmd_status,
    },
];

/// Dispatch one complete frame payload.
///
/// Tokenizes, matches the keyword case-sensitively, validates the exact
/// argument count, then invokes exactly one action. The confirmation or
/// diagnostic text goes to `out`; the error (if any) is also returned so
/// the caller can account it.
pub fn dispatch(
    payload: &[u8],
    cx: &DispatchCtx<'_>,
    out: &mut dyn Write,
) -> Result<(), DispatchError> {
    let text = core::str::from_utf8(payload).map_err(|_| DispatchError::BadPayload)?;
    let tokens = Tokens::parse(text);

    let cmd = COMMANDS
        .iter()
        .find(|c| c.name == tokens.keyword)
        .ok_or(DispatchError::UnknownCommand)?;

    if tokens.argc() != cmd.arg_count {
        return Err(DispatchError::MissingParams);
    }

    (cmd.handler)(&tokens, cx, out)
}

/// Best-effort text-to-float conversion.
///
/// Parses the longest leading numeric prefix (optional sign, digits with an
/// optional decimal point, optional exponent) and returns `0.0` when no
/// numeric prefix exists — `"abc"` is 0.0, `"1.5x"` is 1.5. The grammar has
/// no `nan`/`inf` forms, so text can never produce a NaN.
pub fn parse_float_lenient(s: &str) -> f32 {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let start = i;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0.0;
    }

    let mut end = i;
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // Only take the exponent if it has at least one digit
        if j > exp_digits_start {
            end = j;
        }
    }

    s[start..end].parse().unwrap_or(0.0)
}

// --- Command Implementations ---

fn cmd_pid(
    tokens: &Tokens<'_>,
    cx: &DispatchCtx<'_>,
    out: &mut dyn Write,
) -> Result<(), DispatchError> {
    let p = parse_float_lenient(tokens.arg(0).unwrap_or(""));
    let i = parse_float_lenient(tokens.arg(1).unwrap_or(""));
    let d = parse_float_lenient(tokens.arg(2).unwrap_or(""));

    // One group: three adjacent stores, no suspension point in between.
    cx.state.set_gains(p, i, d);

    let _ = write!(out, "PID gains set: P={} I={} D={}", p, i, d);
    Ok(())
}

fn cmd_led(
    tokens: &Tokens<'_>,
    cx: &DispatchCtx<'_>,
    out: &mut dyn Write,
) -> Result<(), DispatchError> {
    let on = match tokens.arg(0) {
        Some("ON") => true,
        Some("OFF") => false,
        _ => return Err(DispatchError::BadArgument),
    };

    cx.state.set_led(on);
    let _ = write!(out, "LED {}", if on { "ON" } else { "OFF" });
    Ok(())
}

fn cmd_status(
    _tokens: &Tokens<'_>,
    cx: &DispatchCtx<'_>,
    out: &mut dyn Write,
) -> Result<(), DispatchError> {
    let snap = cx.stats.snapshot();
    let (p, i, d) = cx.state.gains();

    let _ = write!(
        out,
        "{} frames={} drops={} overflows={} errors={} timeouts={} P={} I={} D={} LED={}",
        VERSION,
        snap.frames_ok,
        snap.rx_dropped,
        snap.frame_overflows,
        snap.cmd_errors,
        snap.recv_timeouts,
        p,
        i,
        d,
        if cx.state.led() { "ON" } else { "OFF" },
    );
    Ok(())
}
