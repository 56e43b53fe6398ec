// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error type shared by every stage of stream construction.
//!
//! Constructors are `#[cold]` and `#[track_caller]` so that error paths stay out
//! of the way of the writer's hot paths.

use std::borrow::Cow;

use thiserror::Error;

/// Global flag to check if DSERIAL_PANIC_ON_ERROR environment variable is set at compile time.
/// Set DSERIAL_PANIC_ON_ERROR=1 at compile time to enable panic on error.
pub const PANIC_ON_ERROR: bool = option_env!("DSERIAL_PANIC_ON_ERROR").is_some();

/// Error type for stream construction.
///
/// Always create errors through the constructor functions (`Error::already_assigned`,
/// `Error::invalid_state`, ...) rather than the variants, so that
/// `DSERIAL_PANIC_ON_ERROR` can turn every failure into a panic at its origin.
///
/// ```rust
/// use dserial_core::error::Error;
///
/// let err = Error::invalid_state("slot written before descriptors");
/// assert_eq!(err.to_string(), "slot written before descriptors");
/// ```
///
/// ## Debug Mode: DSERIAL_PANIC_ON_ERROR
///
/// ```bash
/// RUST_BACKTRACE=1 DSERIAL_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An index was assigned to a handle which already has one.
    ///
    /// Do not construct this variant directly; use [`Error::already_assigned`] instead.
    #[error("Object index has already been assigned: {0}")]
    AlreadyAssigned(Cow<'static, str>),

    /// A handle was read before an index was assigned to it.
    ///
    /// Do not construct this variant directly; use [`Error::not_assigned_yet`] instead.
    #[error("Object index has not been assigned yet")]
    NotAssignedYet,

    /// The builder failed earlier and refuses further writes.
    ///
    /// Do not construct this variant directly; use [`Error::poisoned`] instead.
    #[error("Stream is unusable after an earlier failure: {0}")]
    Poisoned(Cow<'static, str>),

    /// Builder call made in a state where it is not allowed.
    ///
    /// Do not construct this variant directly; use [`Error::invalid_state`] instead.
    #[error("{0}")]
    InvalidState(Cow<'static, str>),

    /// Buffer boundary violation while patching previously written bytes.
    ///
    /// Do not construct this variant directly; use [`Error::buffer_out_of_bound`] instead.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// A value cannot be represented on the wire.
    ///
    /// Do not construct this variant directly; use [`Error::encode_error`] instead.
    #[error("{0}")]
    EncodeError(Cow<'static, str>),

    /// Maximum object nesting depth exceeded.
    ///
    /// Do not construct this variant directly; use [`Error::depth_exceed`] instead.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Type name, descriptor or field value does not fit its declaration.
    ///
    /// Do not construct this variant directly; use [`Error::type_error`] instead.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// Generic unknown error.
    ///
    /// Do not construct this variant directly; use [`Error::unknown`] instead.
    #[error("{0}")]
    Unknown(Cow<'static, str>),

    /// Error raised by user supplied write hooks.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a new [`Error::AlreadyAssigned`] naming the offending handle.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn already_assigned<S: Into<Cow<'static, str>>>(handle: S) -> Self {
        let err = Error::AlreadyAssigned(handle.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::NotAssignedYet`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_assigned_yet() -> Self {
        let err = Error::NotAssignedYet;
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Poisoned`] carrying the message of the first failure.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn poisoned<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::Poisoned(s.into())
    }

    /// Creates a new [`Error::InvalidState`] from a string or static message.
    ///
    /// ```
    /// use dserial_core::error::Error;
    ///
    /// let err = Error::invalid_state(format!("{} objects still open", 2));
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_state<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidState(s.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::BufferOutOfBound`] with the given bounds.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::EncodeError`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encode_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::EncodeError(s.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::DepthExceed`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeError`] from a string or static message.
    ///
    /// ```
    /// use dserial_core::error::Error;
    ///
    /// let err = Error::type_error("Not a primitive type: java.lang.String");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::TypeError(s.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Unknown`] from a string or static message.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("DSERIAL_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Returns whether this error reports a broken handle invariant.
    pub fn is_handle_violation(&self) -> bool {
        matches!(self, Error::AlreadyAssigned(_) | Error::NotAssignedYet)
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// # Examples
/// ```
/// use dserial_core::ensure;
/// use dserial_core::error::Error;
///
/// fn check_len(n: usize) -> Result<(), Error> {
///     ensure!(n <= 0xFFFF, "string too long");
///     ensure!(n > 0, Error::encode_error("empty"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}
