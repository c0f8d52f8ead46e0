//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

/// A convenience wrapper around `Result` for `yang_schema::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by schema operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    pub errcode: ErrorCode,
    pub msg: Option<String>,
    pub path: Option<String>,
}

/// Status codes.
///
/// The numeric values are stable and match the status codes reported by
/// other NETCONF tooling working on the same modules.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    /// A required reference was missing or stale.
    InternalPointer = 2,
    InternalMemory = 3,
    /// An enumeration or discriminant had an unexpected value.
    InternalValue = 4,
    BufferOverflow = 106,
    EntryExists = 223,
    WrongType = 231,
    MissingParameter = 233,
    DefNotFound = 250,
    InvalidValue = 258,
    UnknownType = 299,
    DefLoop = 325,
    MultipleMatches = 381,
}

// ===== impl ErrorCode =====

impl ErrorCode {
    /// Short description of the status code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InternalPointer => "NULL pointer",
            ErrorCode::InternalMemory => "malloc failed",
            ErrorCode::InternalValue => "invalid internal value",
            ErrorCode::BufferOverflow => "buffer overflow error",
            ErrorCode::EntryExists => "entry exists",
            ErrorCode::WrongType => "wrong type",
            ErrorCode::MissingParameter => "missing parameter",
            ErrorCode::DefNotFound => "definition not found",
            ErrorCode::InvalidValue => "invalid value",
            ErrorCode::UnknownType => "unknown type",
            ErrorCode::DefLoop => "definition loop detected",
            ErrorCode::MultipleMatches => "multiple matches found",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ===== impl Error =====

impl Error {
    pub fn new(errcode: ErrorCode) -> Error {
        Error {
            errcode,
            msg: None,
            path: None,
        }
    }

    pub fn with_msg(errcode: ErrorCode, msg: impl Into<String>) -> Error {
        Error {
            errcode,
            msg: Some(msg.into()),
            path: None,
        }
    }

    /// Attach the schema path the error refers to.
    pub fn path(mut self, path: impl Into<String>) -> Error {
        self.path = Some(path.into());
        self
    }
}

impl From<ErrorCode> for Error {
    fn from(errcode: ErrorCode) -> Error {
        Error::new(errcode)
    }
}

impl std::fmt::Display for Error {
    // Print only the base error message by default.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{}", msg)
        } else {
            write!(f, "Unknown error: {}", self.errcode)
        }
    }
}

impl std::error::Error for Error {}
