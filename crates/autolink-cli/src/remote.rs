use std::str::FromStr;

use anyhow::{Context, Result};
use autolink_client::{Body, PluginApi, PluginRequest, PluginResponse};
use bytes::Bytes;
use http::{header, HeaderValue, Request, Response, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::runtime::{self, Runtime};

use crate::config::ServerConfig;

type HttpClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Delivers plugin requests to a server's external `/plugins/{id}` routes.
///
/// Stands in for the in-process host dispatch when the client runs outside
/// the server. Delivery failures are reported as a missing response.
pub struct HttpPluginApi {
    runtime: Runtime,
    client: HttpClient,
    base: Uri,
    plugins_prefix: String,
    authorization: Option<HeaderValue>,
    user_agent: HeaderValue,
}

impl HttpPluginApi {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let runtime = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start http runtime")?;
        let client = {
            let _guard = runtime.enter();
            Client::builder(TokioExecutor::new()).build(build_connector())
        };
        let base = Uri::from_str(&server.url)
            .with_context(|| format!("invalid server url `{}`", server.url))?;
        let authorization = server
            .token()
            .map(|token| HeaderValue::from_str(&format!("Bearer {token}")))
            .transpose()
            .context("token is not a valid header value")?
            .map(|mut value| {
                value.set_sensitive(true);
                value
            });
        let user_agent = HeaderValue::from_str(&format!(
            "autolink-cli/{}",
            autolink_client::version()
        ))?;
        Ok(Self {
            runtime,
            client,
            base,
            plugins_prefix: server.plugins_prefix.trim_end_matches('/').to_string(),
            authorization,
            user_agent,
        })
    }

    async fn forward(&self, request: PluginRequest) -> Result<PluginResponse> {
        let (mut parts, body) = request.into_parts();
        parts.uri = plugin_uri(&self.base, &self.plugins_prefix, &parts.uri)?;
        if let Some(authorization) = &self.authorization {
            parts
                .headers
                .insert(header::AUTHORIZATION, authorization.clone());
        }
        parts
            .headers
            .insert(header::USER_AGENT, self.user_agent.clone());

        let response = self
            .client
            .request(Request::from_parts(parts, Full::new(body)))
            .await?;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        Ok(Response::from_parts(parts, Body::from(bytes)))
    }
}

impl PluginApi for HttpPluginApi {
    fn plugin_http(&self, request: PluginRequest) -> Option<PluginResponse> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        match self.runtime.block_on(self.forward(request)) {
            Ok(response) => Some(response),
            Err(err) => {
                tracing::warn!(error = %err, %method, path, "plugin request was not delivered");
                None
            }
        }
    }
}

/// Connector for `http` and `https` server urls, trusting the webpki roots.
fn build_connector() -> HttpsConnector<HttpConnector> {
    HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build()
}

/// Joins the server url, the plugins prefix and the plugin-relative request target.
fn plugin_uri(base: &Uri, plugins_prefix: &str, incoming: &Uri) -> Result<Uri> {
    let mut parts = base.clone().into_parts();
    let base_path = base.path().trim_end_matches('/');
    let target = incoming
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    parts.path_and_query = Some(format!("{base_path}{plugins_prefix}{target}").parse()?);
    Uri::from_parts(parts).context("failed to construct plugin uri")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        Uri::from_str(s).unwrap()
    }

    #[test]
    fn plugin_uri_keeps_query_and_server_subpath() {
        let target = uri("/mattermost-autolink/api/v1/link?autolinkName=a+b");
        assert_eq!(
            plugin_uri(&uri("http://localhost:8065"), "/plugins", &target).unwrap(),
            "http://localhost:8065/plugins/mattermost-autolink/api/v1/link?autolinkName=a+b"
        );
        assert_eq!(
            plugin_uri(&uri("http://chat.internal/mm/"), "/plugins", &target).unwrap(),
            "http://chat.internal/mm/plugins/mattermost-autolink/api/v1/link?autolinkName=a+b"
        );
    }

    #[test]
    fn unreachable_server_reads_as_missing_response() {
        let server = ServerConfig {
            url: "http://127.0.0.1:1".into(),
            token: Some("secret".into()),
            ..ServerConfig::default()
        };
        let api = HttpPluginApi::new(&server).unwrap();
        let request = Request::get("/mattermost-autolink/api/v1/link?autolinkName=")
            .body(Bytes::new())
            .unwrap();
        assert!(api.plugin_http(request).is_none());
    }

    #[test]
    fn https_servers_get_a_tls_capable_client() {
        let server = ServerConfig {
            url: "https://127.0.0.1:1".into(),
            ..ServerConfig::default()
        };
        let api = HttpPluginApi::new(&server).unwrap();
        let request = Request::delete("/mattermost-autolink/api/v1/link?autolinkName=x")
            .body(Bytes::new())
            .unwrap();
        assert!(api.plugin_http(request).is_none());
    }
}
