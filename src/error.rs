use core::fmt;

/// Represents an error while decoding a standalone MIDI packet.
///
/// Only the packet-decoding API ([`Event::parse`](crate::Event::parse)) produces errors.
/// The streaming [`Parser`](crate::Parser) recovers from malformed input silently and never
/// fails: a byte it cannot use simply produces no event.
///
/// This type is a newtype wrapper around a `&'static ErrorKind`, so creating and passing one
/// around never allocates, even without the `alloc` feature.
///
/// If the `std` feature is enabled, this type implements `std::error::Error`.
#[derive(Clone)]
pub struct Error {
    inner: &'static ErrorKind,
}
impl Error {
    /// Create a new error with the given `ErrorKind`.
    #[inline]
    pub fn new(kind: &'static ErrorKind) -> Error {
        Error::from(kind)
    }

    /// More information about the error itself.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        *self.inner
    }
}
impl From<&'static ErrorKind> for Error {
    #[inline]
    fn from(inner: &'static ErrorKind) -> Error {
        Error { inner }
    }
}
impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}
#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The type of error that occurred while decoding a packet.
///
/// As a library consumer, detailed errors about what specific part of the MIDI spec was
/// violated are not very useful.
/// For this reason, errors are broadly categorized into 2 classes, and specific error info is
/// provided as a non-normative string literal.
#[derive(Copy, Clone, Debug)]
pub enum ErrorKind {
    /// The packet cannot be decoded at all: it is empty, truncated, or does not start with a
    /// status byte.
    Invalid(&'static str),

    /// The packet is decodable but does not respect the MIDI spec, for example a data byte with
    /// its top bit set.
    ///
    /// This kind of error is not emitted by default, only if the `strict` crate feature is
    /// enabled. Without it, offending bits are masked away instead.
    Malformed(&'static str),
}
impl ErrorKind {
    /// Get the informative message on what exact part of the MIDI format was not respected.
    #[inline]
    pub fn message(&self) -> &'static str {
        match *self {
            ErrorKind::Invalid(msg) => msg,
            ErrorKind::Malformed(msg) => msg,
        }
    }
}
impl fmt::Display for ErrorKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Invalid(msg) => write!(f, "invalid midi: {}", msg),
            ErrorKind::Malformed(msg) => write!(f, "malformed midi: {}", msg),
        }
    }
}

macro_rules! err_invalid {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Invalid($msg);
        ERR_KIND
    }};
}
macro_rules! err_malformed {
    ($msg:expr) => {{
        const ERR_KIND: &'static ErrorKind = &ErrorKind::Malformed($msg);
        ERR_KIND
    }};
}

/// The result type used by the packet decoder.
pub type Result<T> = StdResult<T, Error>;
pub(crate) use core::result::Result as StdResult;
