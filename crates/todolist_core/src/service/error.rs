//! Error type shared by the list, task and transfer services.

use crate::model::task::TaskId;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error category, one per user-facing failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    InvalidName,
    InvalidInput,
    DuplicateName,
    NotFound,
    ParseError,
    InvalidFormat,
    EmptyDocument,
    Storage,
}

/// Errors from service operations.
///
/// Every variant except `Store` is recoverable by the user and is raised
/// before any write happens.
#[derive(Debug)]
pub enum ServiceError {
    /// List name is blank after trim or too long.
    InvalidName { name: String, reason: &'static str },
    /// Task text is blank after trim.
    InvalidInput(&'static str),
    /// A list with this exact name already exists.
    DuplicateName(String),
    /// Named list does not exist.
    ListNotFound(String),
    /// Task id does not exist in the named list.
    TaskNotFound { list: String, task_id: TaskId },
    /// Import payload is not valid JSON.
    ParseError(String),
    /// Import payload is JSON but not a recognized envelope.
    InvalidFormat(String),
    /// Export requested while no lists exist.
    EmptyDocument,
    /// Storage backend failure.
    Store(StoreError),
}

impl ServiceError {
    pub fn kind(&self) -> ServiceErrorKind {
        match self {
            Self::InvalidName { .. } => ServiceErrorKind::InvalidName,
            Self::InvalidInput(_) => ServiceErrorKind::InvalidInput,
            Self::DuplicateName(_) => ServiceErrorKind::DuplicateName,
            Self::ListNotFound(_) | Self::TaskNotFound { .. } => ServiceErrorKind::NotFound,
            Self::ParseError(_) => ServiceErrorKind::ParseError,
            Self::InvalidFormat(_) => ServiceErrorKind::InvalidFormat,
            Self::EmptyDocument => ServiceErrorKind::EmptyDocument,
            Self::Store(_) => ServiceErrorKind::Storage,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName { name, reason } => write!(f, "invalid list name `{name}`: {reason}"),
            Self::InvalidInput(reason) => write!(f, "invalid input: {reason}"),
            Self::DuplicateName(name) => write!(f, "a list named `{name}` already exists"),
            Self::ListNotFound(name) => write!(f, "list not found: `{name}`"),
            Self::TaskNotFound { list, task_id } => {
                write!(f, "task {task_id} not found in list `{list}`")
            }
            Self::ParseError(details) => write!(f, "import is not valid JSON: {details}"),
            Self::InvalidFormat(details) => write!(f, "invalid import format: {details}"),
            Self::EmptyDocument => write!(f, "no lists to export"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
