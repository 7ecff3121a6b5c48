use crate::error::RpcError;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::any::{Any, type_name};
use std::fmt;

/// A type-erased message as seen by interceptors.
pub type DynMessage = Box<dyn Any + Send>;

/// A lazily consumed stream of type-erased messages.
///
/// An `Err` item is terminal: producers stop after yielding one.
pub type MessageStream = BoxStream<'static, Result<DynMessage, RpcError>>;

/// The payload of a call context.
pub enum DataVariant {
    Single(DynMessage),
    Stream(MessageStream),
    Error(RpcError),
    Empty,
}

impl DataVariant {
    pub fn single<T: Send + 'static>(value: T) -> Self {
        DataVariant::Single(Box::new(value))
    }

    pub fn stream<S, T>(items: S) -> Self
    where
        S: Stream<Item = Result<T, RpcError>> + Send + 'static,
        T: Send + 'static,
    {
        DataVariant::Stream(
            items
                .map(|item| item.map(|value| Box::new(value) as DynMessage))
                .boxed(),
        )
    }

    pub fn error(error: RpcError) -> Self {
        DataVariant::Error(error)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DataVariant::Single(_) => "single",
            DataVariant::Stream(_) => "stream",
            DataVariant::Error(_) => "error",
            DataVariant::Empty => "empty",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DataVariant::Error(_))
    }

    /// Borrows a single value if it is a `T`.
    pub fn single_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            DataVariant::Single(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Replaces the stream as a whole. Any other variant is returned as is.
    pub fn map_stream(self, f: impl FnOnce(MessageStream) -> MessageStream) -> Self {
        match self {
            DataVariant::Stream(items) => DataVariant::Stream(f(items)),
            other => other,
        }
    }

    /// Extracts a single `T`, surfacing an `Error` variant as the error.
    pub fn into_single<T: 'static>(self) -> Result<T, RpcError> {
        match self {
            DataVariant::Single(value) => {
                value
                    .downcast::<T>()
                    .map(|value| *value)
                    .map_err(|_| RpcError::UnexpectedData {
                        expected: type_name::<T>(),
                        found: "single value of another type",
                    })
            }
            DataVariant::Error(error) => Err(error),
            other => Err(RpcError::UnexpectedData {
                expected: type_name::<T>(),
                found: other.kind_name(),
            }),
        }
    }

    /// Converts into a stream of `T`.
    ///
    /// `Empty` becomes an empty stream and `Error` a stream yielding only that
    /// error. A single value is an interceptor mistake and yields
    /// `UnexpectedData`.
    pub fn into_stream<T: Send + 'static>(self) -> BoxStream<'static, Result<T, RpcError>> {
        match self {
            DataVariant::Stream(items) => items
                .map(|item| {
                    item.and_then(|value| {
                        value
                            .downcast::<T>()
                            .map(|value| *value)
                            .map_err(|_| RpcError::UnexpectedData {
                                expected: type_name::<T>(),
                                found: "stream item of another type",
                            })
                    })
                })
                .boxed(),
            DataVariant::Empty => stream::empty().boxed(),
            DataVariant::Error(error) => stream::once(async move { Err(error) }).boxed(),
            DataVariant::Single(_) => stream::once(async move {
                Err(RpcError::UnexpectedData {
                    expected: "stream",
                    found: "single",
                })
            })
            .boxed(),
        }
    }
}

impl fmt::Debug for DataVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataVariant::Error(error) => f.debug_tuple("Error").field(error).finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}
