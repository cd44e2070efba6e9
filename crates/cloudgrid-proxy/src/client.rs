//! HTTP client for the CSP proxy (CB-Spider compatible REST API)

use crate::error::{ProxyError, Result};
use crate::proxy::CspProxy;
use crate::types::{
    BoolResult, ConnectionConfigInfo, ConnectionOnly, DiskInfo, DiskReqInfo, DiskUpsizeReqInfo,
    Envelope, ImageInfo, KeyPairInfo, KeyPairReqInfo, RuleReqInfo, SecurityInfo,
    SecurityReqInfo, SecurityRuleInfo, SubnetReqInfo, VmSpecInfo, VpcInfo, VpcReqInfo,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Longest error body echoed into debug logs
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Connection settings for [`SpiderClient`]
#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Base URL including the API root, e.g. `http://localhost:1024/spider`
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SpiderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// CSP proxy REST client
#[derive(Clone)]
pub struct SpiderClient {
    client: reqwest::Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
}

impl SpiderClient {
    pub fn new(config: SpiderConfig) -> Result<Self> {
        let mut base = Url::parse(&config.endpoint).map_err(|e| {
            ProxyError::InvalidConfig(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(ProxyError::InvalidConfig(format!(
                "endpoint '{}' cannot be used as a base URL",
                config.endpoint
            )));
        }
        // normalize so that segment pushes never produce `//`
        if base.path().ends_with('/') {
            let trimmed = base.path().trim_end_matches('/').to_string();
            base.set_path(&trimmed);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("cloudgrid/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base,
            username: config.username,
            password: config.password,
        })
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::InvalidConfig("endpoint cannot be a base".to_string()))?
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Send and return the body of a 2xx response; anything else becomes `ProxyError::Api`
    async fn send(&self, builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status = status.as_u16(),
                "CSP proxy error: {}",
                truncate_for_log(&body)
            );
            return Err(ProxyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], connection: &str) -> Result<T> {
        let url = self.url(segments)?;
        tracing::debug!(%url, connection, "GET");
        let body = self
            .send(
                self.request(Method::GET, url)
                    .query(&[("ConnectionName", connection)]),
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        connection: &str,
        list_key: &str,
    ) -> Result<Vec<T>> {
        let value: serde_json::Value = self.get_json(segments, connection).await?;
        extract_list(value, list_key)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.url(segments)?;
        tracing::debug!(%url, %method, "send");
        let body = self.send(self.request(method, url).json(body)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Calls that answer `{"Result": "true"|"false"}`
    async fn send_ack<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let result: BoolResult = self.send_json(method, segments, body).await?;
        if result.is_true() {
            Ok(())
        } else {
            Err(ProxyError::Rejected(format!("Result: {}", result.result)))
        }
    }
}

/// Pull `{list_key: [...]}` out of a list response; `null` means empty
fn extract_list<T: DeserializeOwned>(mut value: serde_json::Value, list_key: &str) -> Result<Vec<T>> {
    let list = match value.get_mut(list_key) {
        Some(v) => v.take(),
        None => {
            return Err(ProxyError::InvalidResponse(format!(
                "missing '{}' in list response",
                list_key
            )));
        }
    };
    if list.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(list)?)
}

fn truncate_for_log(body: &str) -> String {
    if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [{} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    }
}

#[async_trait]
impl CspProxy for SpiderClient {
    async fn get_connection_config(&self, connection: &str) -> Result<ConnectionConfigInfo> {
        let url = self.url(&["connectionconfig", connection])?;
        let body = self.send(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_image(&self, connection: &str, csp_image_name: &str) -> Result<ImageInfo> {
        self.get_json(&["vmimage", csp_image_name], connection).await
    }

    async fn list_images(&self, connection: &str) -> Result<Vec<ImageInfo>> {
        self.get_list(&["vmimage"], connection, "image").await
    }

    async fn get_spec(&self, connection: &str, csp_spec_name: &str) -> Result<VmSpecInfo> {
        self.get_json(&["vmspec", csp_spec_name], connection).await
    }

    async fn list_specs(&self, connection: &str) -> Result<Vec<VmSpecInfo>> {
        self.get_list(&["vmspec"], connection, "vmspec").await
    }

    async fn create_key_pair(
        &self,
        connection: &str,
        req: &KeyPairReqInfo,
    ) -> Result<KeyPairInfo> {
        let envelope = Envelope {
            connection_name: connection,
            req_info: req,
        };
        self.send_json(Method::POST, &["keypair"], &envelope).await
    }

    async fn get_key_pair(&self, connection: &str, name: &str) -> Result<KeyPairInfo> {
        self.get_json(&["keypair", name], connection).await
    }

    async fn list_key_pairs(&self, connection: &str) -> Result<Vec<KeyPairInfo>> {
        self.get_list(&["keypair"], connection, "keypair").await
    }

    async fn delete_key_pair(&self, connection: &str, name: &str) -> Result<()> {
        let body = ConnectionOnly {
            connection_name: connection,
        };
        self.send_ack(Method::DELETE, &["keypair", name], &body).await
    }

    async fn create_vpc(&self, connection: &str, req: &VpcReqInfo) -> Result<VpcInfo> {
        let envelope = Envelope {
            connection_name: connection,
            req_info: req,
        };
        self.send_json(Method::POST, &["vpc"], &envelope).await
    }

    async fn get_vpc(&self, connection: &str, name: &str) -> Result<VpcInfo> {
        self.get_json(&["vpc", name], connection).await
    }

    async fn list_vpcs(&self, connection: &str) -> Result<Vec<VpcInfo>> {
        self.get_list(&["vpc"], connection, "vpc").await
    }

    async fn delete_vpc(&self, connection: &str, name: &str) -> Result<()> {
        let body = ConnectionOnly {
            connection_name: connection,
        };
        self.send_ack(Method::DELETE, &["vpc", name], &body).await
    }

    async fn add_subnet(
        &self,
        connection: &str,
        vpc_name: &str,
        req: &SubnetReqInfo,
    ) -> Result<VpcInfo> {
        let envelope = Envelope {
            connection_name: connection,
            req_info: req,
        };
        self.send_json(Method::POST, &["vpc", vpc_name, "subnet"], &envelope)
            .await
    }

    async fn remove_subnet(
        &self,
        connection: &str,
        vpc_name: &str,
        subnet_name: &str,
    ) -> Result<()> {
        let body = ConnectionOnly {
            connection_name: connection,
        };
        self.send_ack(
            Method::DELETE,
            &["vpc", vpc_name, "subnet", subnet_name],
            &body,
        )
        .await
    }

    async fn create_security_group(
        &self,
        connection: &str,
        req: &SecurityReqInfo,
    ) -> Result<SecurityInfo> {
        let envelope = Envelope {
            connection_name: connection,
            req_info: req,
        };
        self.send_json(Method::POST, &["securitygroup"], &envelope)
            .await
    }

    async fn get_security_group(&self, connection: &str, name: &str) -> Result<SecurityInfo> {
        self.get_json(&["securitygroup", name], connection).await
    }

    async fn list_security_groups(&self, connection: &str) -> Result<Vec<SecurityInfo>> {
        self.get_list(&["securitygroup"], connection, "securitygroup")
            .await
    }

    async fn delete_security_group(&self, connection: &str, name: &str) -> Result<()> {
        let body = ConnectionOnly {
            connection_name: connection,
        };
        self.send_ack(Method::DELETE, &["securitygroup", name], &body)
            .await
    }

    async fn add_rules(
        &self,
        connection: &str,
        sg_name: &str,
        rules: &[SecurityRuleInfo],
    ) -> Result<SecurityInfo> {
        let req = RuleReqInfo {
            rule_info_list: rules.to_vec(),
        };
        let envelope = Envelope {
            connection_name: connection,
            req_info: &req,
        };
        self.send_json(Method::POST, &["securitygroup", sg_name, "rules"], &envelope)
            .await
    }

    async fn remove_rules(
        &self,
        connection: &str,
        sg_name: &str,
        rules: &[SecurityRuleInfo],
    ) -> Result<()> {
        let req = RuleReqInfo {
            rule_info_list: rules.to_vec(),
        };
        let envelope = Envelope {
            connection_name: connection,
            req_info: &req,
        };
        self.send_ack(
            Method::DELETE,
            &["securitygroup", sg_name, "rules"],
            &envelope,
        )
        .await
    }

    async fn create_disk(&self, connection: &str, req: &DiskReqInfo) -> Result<DiskInfo> {
        let envelope = Envelope {
            connection_name: connection,
            req_info: req,
        };
        self.send_json(Method::POST, &["disk"], &envelope).await
    }

    async fn get_disk(&self, connection: &str, name: &str) -> Result<DiskInfo> {
        self.get_json(&["disk", name], connection).await
    }

    async fn list_disks(&self, connection: &str) -> Result<Vec<DiskInfo>> {
        self.get_list(&["disk"], connection, "disk").await
    }

    async fn delete_disk(&self, connection: &str, name: &str) -> Result<()> {
        let body = ConnectionOnly {
            connection_name: connection,
        };
        self.send_ack(Method::DELETE, &["disk", name], &body).await
    }

    async fn upsize_disk(&self, connection: &str, name: &str, size_gb: u64) -> Result<()> {
        let req = DiskUpsizeReqInfo {
            size: size_gb.to_string(),
        };
        let envelope = Envelope {
            connection_name: connection,
            req_info: &req,
        };
        self.send_ack(Method::PUT, &["disk", name, "size"], &envelope)
            .await
    }
}
