use std::{fmt, io, io::Read, sync::Arc};

use bytes::Bytes;
use http::{Request, Response};

pub type PluginRequest = Request<Bytes>;
pub type PluginResponse = Response<Body>;

/// Capability supplied by the host for reaching another plugin's HTTP handler.
///
/// Returning `None` means the host could not deliver the request at all.
pub trait PluginApi: Send + Sync {
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse>;
}

impl<T: PluginApi + ?Sized> PluginApi for &T {
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse> {
        (**self).plugin_http(request)
    }
}

impl<T: PluginApi + ?Sized> PluginApi for Arc<T> {
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse> {
        (**self).plugin_http(request)
    }
}

impl<T: PluginApi + ?Sized> PluginApi for Box<T> {
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse> {
        (**self).plugin_http(request)
    }
}

/// Adapts a closure into a [`PluginApi`].
pub fn plugin_api_fn<F>(f: F) -> PluginApiFn<F>
where
    F: Fn(PluginRequest) -> Option<PluginResponse> + Send + Sync,
{
    PluginApiFn { f }
}

#[derive(Clone, Copy)]
pub struct PluginApiFn<F> {
    f: F,
}

impl<F> PluginApi for PluginApiFn<F>
where
    F: Fn(PluginRequest) -> Option<PluginResponse> + Send + Sync,
{
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse> {
        (self.f)(request)
    }
}

impl<F> fmt::Debug for PluginApiFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginApiFn").finish_non_exhaustive()
    }
}

/// Response body handed back by the host.
///
/// The body is a blocking reader so hosts can stream it; it is released as
/// soon as the owning response is dropped.
pub struct Body {
    reader: Box<dyn Read + Send>,
}

impl Body {
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Drains the remaining body into memory.
    pub fn read_all(mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").finish_non_exhaustive()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::from_reader(io::Cursor::new(bytes))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from(Bytes::from_static(text.as_bytes()))
    }
}
