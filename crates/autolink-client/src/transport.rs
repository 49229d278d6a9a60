use crate::{
    error::ClientError,
    plugin::{PluginApi, PluginRequest, PluginResponse},
};

/// Request transport that hands every request to the host instead of a socket.
#[derive(Debug, Clone)]
pub struct PluginTransport<A> {
    api: A,
}

impl<A: PluginApi> PluginTransport<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn round_trip(&self, request: PluginRequest) -> Result<PluginResponse, ClientError> {
        self.api.plugin_http(request).ok_or(ClientError::Dispatch)
    }
}
