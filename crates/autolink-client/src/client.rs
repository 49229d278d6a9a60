use anyhow::Result;
use autolink_sdk::{Autolink, AUTOLINK_NAME_QUERY_PARAM};
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};

use crate::{
    config::ClientConfig,
    error::{ClientError, Operation},
    plugin::{PluginApi, PluginRequest, PluginResponse},
    transport::PluginTransport,
};

/// Client for the autolink plugin's link API, reached through the host.
///
/// Calls block until the host returns. The client keeps no state between
/// calls, so a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Client<A> {
    transport: PluginTransport<A>,
    route: String,
}

impl<A: PluginApi> Client<A> {
    /// Binds a client to the default autolink plugin route.
    pub fn new(api: A) -> Self {
        Self {
            transport: PluginTransport::new(api),
            route: ClientConfig::default().route(),
        }
    }

    pub fn with_config(api: A, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport: PluginTransport::new(api),
            route: config.route(),
        })
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn transport(&self) -> &PluginTransport<A> {
        &self.transport
    }

    /// Installs `links` one at a time, in order.
    ///
    /// Stops at the first failure. Links before the failing one have already
    /// been installed on the plugin side when the error is returned; use
    /// [`Client::add_each`] to attempt every link regardless.
    pub fn add(&self, links: &[Autolink]) -> Result<(), ClientError> {
        for link in links {
            self.add_one(link)?;
        }
        Ok(())
    }

    /// Installs every link, collecting failures instead of stopping.
    pub fn add_each(&self, links: &[Autolink]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, link) in links.iter().enumerate() {
            report.record(index, &link.name, self.add_one(link));
        }
        report
    }

    /// Deletes the links with the given names one at a time, in order.
    ///
    /// Same abort-on-first-error contract as [`Client::add`].
    pub fn delete<S: AsRef<str>>(&self, names: &[S]) -> Result<(), ClientError> {
        for name in names {
            self.delete_one(name.as_ref())?;
        }
        Ok(())
    }

    /// Deletes every named link, collecting failures instead of stopping.
    pub fn delete_each<S: AsRef<str>>(&self, names: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, name) in names.iter().enumerate() {
            let name = name.as_ref();
            report.record(index, name, self.delete_one(name));
        }
        report
    }

    /// Fetches the links matching `name`, in the order the plugin returns them.
    ///
    /// `name` is sent as-is; an empty name is not given any meaning here.
    pub fn get(&self, name: &str) -> Result<Vec<Autolink>, ClientError> {
        let request = self.request(Method::GET, Some(&name_query(name)?), Bytes::new())?;
        let response = self.send(Operation::Get, request)?;
        let status = response.status();
        let body = response.into_body().read_all().map_err(ClientError::Read)?;

        if status != StatusCode::OK {
            return Err(ClientError::Remote {
                operation: Operation::Get,
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(ClientError::Decode)
    }

    fn add_one(&self, link: &Autolink) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(link).map_err(ClientError::Encode)?;
        let request = self.request(Method::POST, None, Bytes::from(payload))?;
        let response = self.send(Operation::Add, request)?;
        ensure_ok(Operation::Add, response)
    }

    fn delete_one(&self, name: &str) -> Result<(), ClientError> {
        let request = self.request(Method::DELETE, Some(&name_query(name)?), Bytes::new())?;
        let response = self.send(Operation::Delete, request)?;
        ensure_ok(Operation::Delete, response)
    }

    fn request(
        &self,
        method: Method,
        query: Option<&str>,
        body: Bytes,
    ) -> Result<PluginRequest, ClientError> {
        let uri = match query {
            Some(query) => format!("{}?{}", self.route, query),
            None => self.route.clone(),
        };
        let mut builder = Request::builder().method(method).uri(uri);
        if !body.is_empty() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        Ok(builder.body(body)?)
    }

    fn send(
        &self,
        operation: Operation,
        request: PluginRequest,
    ) -> Result<PluginResponse, ClientError> {
        let span = tracing::debug_span!(
            "interplugin_request",
            operation = operation.as_str(),
            method = %request.method(),
            path = %request.uri().path(),
            status = tracing::field::Empty,
        );
        let _enter = span.enter();

        let outcome = self.transport.round_trip(request);
        let label = match &outcome {
            Ok(resp) => {
                span.record("status", resp.status().as_u16());
                if resp.status() == StatusCode::OK {
                    "ok"
                } else {
                    "remote_error"
                }
            }
            Err(_) => "dispatch_error",
        };
        metrics::counter!(
            "autolink_client_requests_total",
            "operation" => operation.as_str(),
            "outcome" => label
        )
        .increment(1);
        tracing::debug!(outcome = label, "interplugin request finished");
        outcome
    }
}

/// Outcome of an [`Client::add_each`] or [`Client::delete_each`] call.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of items the plugin accepted.
    pub applied: usize,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the item in the submitted batch.
    pub index: usize,
    pub name: String,
    pub error: ClientError,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, index: usize, name: &str, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(error) => self.failures.push(BatchFailure {
                index,
                name: name.to_string(),
                error,
            }),
        }
    }
}

fn name_query(name: &str) -> Result<String, ClientError> {
    Ok(serde_urlencoded::to_string([(AUTOLINK_NAME_QUERY_PARAM, name)].as_slice())?)
}

/// Maps a non-200 response to [`ClientError::Remote`], reading the body on a best-effort basis.
fn ensure_ok(operation: Operation, response: PluginResponse) -> Result<(), ClientError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(());
    }
    let body = response.into_body().read_all().unwrap_or_default();
    Err(ClientError::Remote {
        operation,
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
