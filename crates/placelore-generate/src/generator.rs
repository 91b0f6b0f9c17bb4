use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use crate::error::GenerateError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text produced by one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    /// Per-call id, carried through the logs.
    pub id: Uuid,
    pub model: String,
    pub text: String,
}

/// Something that can describe a place.
///
/// Implemented by [`crate::client::GenerationClient`]; the server only sees
/// `Arc<dyn Generator>`. Methods return boxed futures for dyn compatibility.
pub trait Generator: Send + Sync {
    /// Produce a description of `place`. Exactly one upstream request per call.
    fn generate<'a>(&'a self, place: &'a str)
    -> BoxFuture<'a, Result<GeneratedText, GenerateError>>;
}
