use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

#[cfg(feature = "backtrace")]
use std::backtrace::Backtrace;

pub type GensimResult<T> = Result<T, GensimError>;

/// Coarse classification of an error, useful for embedding applications that
/// want to dispatch on kind without matching the full enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Config,
    Invariant,
    Runtime,
    Recoverable,
    Io,
    Multiple,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

/// Errors raised by the genetic-state engine.
///
/// The core never catches its own errors (see spec §7 "Propagation"); every
/// fallible operation threads a `GensimResult` up to the species coordinator's
/// public API, which is the boundary an embedding application is expected to
/// handle.
#[derive(Debug)]
pub enum GensimError {
    /// Invalid rate map, overlapping genomic elements, contradictory stacking
    /// policy, or any other malformed configuration supplied before the
    /// simulation starts.
    Config { message: ErrString },

    /// A runtime invariant was broken: access to a null haplosome, an
    /// out-of-range mutrun index, an unmatched bulk-operation start/end, or
    /// growing the mutation block inside a parallel region. These indicate a
    /// programming error in the core or its caller, never user data.
    Invariant { message: ErrString },

    /// A user-caused runtime error: adding a mutation that is already fixed,
    /// adding a mutation to a non-age-0 individual while recording trees,
    /// modifying a non-focal haplosome in a callback, or exceeding the
    /// mutation block's hard ceiling of 2^31 live mutations.
    Runtime { message: ErrString },

    /// A warning that does not abort the operation that raised it: an
    /// unmatched bulk-operation end detected at the start of the next
    /// operation, or a stale cross-check mismatch downgraded to a warning by
    /// the caller. Callers may choose to escalate these.
    Recoverable { message: ErrString },

    /// File-level errors: missing input, unparseable header, a
    /// segsites/positions count mismatch, or a CHROM-field mismatch.
    Io { message: ErrString },

    Multiple(MultiDisplay),

    Context {
        context: ErrorContext,
        source: Box<GensimError>,
        #[cfg(feature = "backtrace")]
        backtrace: Backtrace,
    },
}

impl GensimError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config { .. } => ErrorCode::Config,
            Self::Invariant { .. } => ErrorCode::Invariant,
            Self::Runtime { .. } => ErrorCode::Runtime,
            Self::Recoverable { .. } => ErrorCode::Recoverable,
            Self::Io { .. } => ErrorCode::Io,
            Self::Multiple(_) => ErrorCode::Multiple,
            Self::Context { .. } => ErrorCode::Context,
        }
    }

    pub fn config(msg: impl Into<ErrString>) -> Self {
        Self::Config { message: msg.into() }
    }

    pub fn invariant(msg: impl Into<ErrString>) -> Self {
        Self::Invariant { message: msg.into() }
    }

    pub fn runtime(msg: impl Into<ErrString>) -> Self {
        Self::Runtime { message: msg.into() }
    }

    pub fn recoverable(msg: impl Into<ErrString>) -> Self {
        Self::Recoverable { message: msg.into() }
    }

    pub fn io(msg: impl Into<ErrString>) -> Self {
        Self::Io { message: msg.into() }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable { .. })
    }

    pub fn with_context(self, msg: impl Into<String>) -> Self {
        GensimError::Context {
            context: ErrorContext::new(msg),
            source: Box::new(self),
            #[cfg(feature = "backtrace")]
            backtrace: Backtrace::capture(),
        }
    }
}

impl Display for GensimError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message } => write!(f, "invalid configuration: {}", message),
            Self::Invariant { message } => write!(f, "internal invariant violated: {}", message),
            Self::Runtime { message } => write!(f, "runtime error: {}", message),
            Self::Recoverable { message } => write!(f, "warning: {}", message),
            Self::Io { message } => write!(f, "I/O error: {}", message),
            Self::Multiple(m) => write!(f, "multiple errors:\n{}", m),
            Self::Context { context, source, .. } => write!(f, "{}\nCaused by: {}", context, source),
        }
    }
}

impl std::error::Error for GensimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ErrorContext {
    message: String,
}

impl ErrorContext {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug)]
pub struct MultiDisplay(pub Vec<GensimError>);

impl Display for MultiDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            writeln!(f, "  {}: {}", i, err)?;
        }
        Ok(())
    }
}
