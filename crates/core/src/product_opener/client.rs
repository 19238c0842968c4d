//! reqwest-backed Product Opener client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::config::{CredentialsConfig, RemoteConfig};

use super::{ProductDatabase, ProductOpenerError, ProductResponse, RemoteProduct};

/// The staging instance; production data must not be touched.
pub const DEFAULT_BASE_URL: &str = "https://openfoodfacts.net";

const WRITE_PRODUCT_PATH: &str = "/cgi/product_jqm_multilingual.pl";
const READ_PRODUCT_PATH: &str = "/api/v2/product";

/// Product Opener client.
pub struct ProductOpenerClient {
    client: Client,
    base_url: String,
    credentials: CredentialsConfig,
}

impl ProductOpenerClient {
    /// Create a client for openfoodfacts.net.
    pub fn new(
        credentials: CredentialsConfig,
        remote: &RemoteConfig,
    ) -> Result<Self, ProductOpenerError> {
        Self::with_base_url(DEFAULT_BASE_URL, credentials, remote)
    }

    /// Create a client against another Product Opener instance.
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: CredentialsConfig,
        remote: &RemoteConfig,
    ) -> Result<Self, ProductOpenerError> {
        let mut builder = Client::builder().user_agent(concat!(
            "po-percentages/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = remote.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn write_product_url(&self) -> String {
        format!("{}{}", self.base_url, WRITE_PRODUCT_PATH)
    }

    fn read_product_url(&self, code: &str) -> String {
        format!("{}{}/{}", self.base_url, READ_PRODUCT_PATH, code)
    }

    /// Basic auth and JSON accept header, shared by both calls.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(
                &self.credentials.basic_auth_username,
                Some(&self.credentials.basic_auth_password),
            )
            .header(ACCEPT, "application/json")
    }

    /// Send and return the body, failing on anything but 200.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<String, ProductOpenerError> {
        let response = request.send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ProductOpenerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ProductDatabase for ProductOpenerClient {
    async fn submit_ingredients(
        &self,
        code: &str,
        ingredients_text: &str,
    ) -> Result<(), ProductOpenerError> {
        let url = self.write_product_url();
        debug!("Product Opener write: code={}, ingredients='{}'", code, ingredients_text);

        let params = [
            ("code", code),
            ("ingredients_text_en", ingredients_text),
            ("password", self.credentials.productopener_password.as_str()),
            ("user_id", self.credentials.productopener_username.as_str()),
        ];
        let request = self.authorize(self.client.post(&url)).form(&params);

        self.send(request, &url).await?;
        Ok(())
    }

    async fn fetch_product(&self, code: &str) -> Result<RemoteProduct, ProductOpenerError> {
        let url = self.read_product_url(code);
        debug!("Product Opener read: code={}", code);

        let request = self.authorize(self.client.get(&url));
        let body = self.send(request, &url).await?;

        let response = ProductResponse::parse(&body)?;
        debug!(
            "Product Opener returned {} ingredients for code={}",
            response.product.ingredients.len(),
            code
        );
        Ok(response.product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product_opener::RemoteIngredient;
    use mockito::Matcher;

    /// `off:off` base64 encoded.
    const BASIC_AUTH: &str = "Basic b2ZmOm9mZg==";

    fn credentials() -> CredentialsConfig {
        CredentialsConfig {
            productopener_username: "alice".to_string(),
            productopener_password: "s3cret".to_string(),
            basic_auth_username: "off".to_string(),
            basic_auth_password: "off".to_string(),
        }
    }

    fn client_for(server: &mockito::Server) -> ProductOpenerClient {
        ProductOpenerClient::with_base_url(server.url(), credentials(), &RemoteConfig::default())
            .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = ProductOpenerClient::new(credentials(), &RemoteConfig::default()).unwrap();
        assert_eq!(
            client.write_product_url(),
            "https://openfoodfacts.net/cgi/product_jqm_multilingual.pl"
        );
        assert_eq!(
            client.read_product_url("1337"),
            "https://openfoodfacts.net/api/v2/product/1337"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ProductOpenerClient::with_base_url(
            "http://localhost:8080/",
            credentials(),
            &RemoteConfig {
                timeout_secs: Some(5),
            },
        )
        .unwrap();
        assert_eq!(
            client.read_product_url("1"),
            "http://localhost:8080/api/v2/product/1"
        );
    }

    #[tokio::test]
    async fn test_submit_ingredients_sends_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cgi/product_jqm_multilingual.pl")
            .match_header("authorization", BASIC_AUTH)
            .match_header("accept", "application/json")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "alice".into()),
                Matcher::UrlEncoded("password".into(), "s3cret".into()),
                Matcher::UrlEncoded("code".into(), "1337".into()),
                Matcher::UrlEncoded("ingredients_text_en".into(), "salt,sugar".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status": 1, "status_verbose": "fields saved"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        client.submit_ingredients("1337", "salt,sugar").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_ingredients_non_200_carries_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/cgi/product_jqm_multilingual.pl")
            .with_status(403)
            .with_body("Access denied")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.submit_ingredients("1337", "salt").await.unwrap_err();

        match err {
            ProductOpenerError::Status { url, status, body } => {
                assert!(url.ends_with("/cgi/product_jqm_multilingual.pl"));
                assert_eq!(status, 403);
                assert_eq!(body, "Access denied");
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_only_200_counts_as_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/cgi/product_jqm_multilingual.pl")
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.submit_ingredients("1337", "salt").await.unwrap_err();
        assert!(matches!(err, ProductOpenerError::Status { status: 201, .. }));
    }

    #[tokio::test]
    async fn test_fetch_product_parses_estimates() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/product/1337")
            .match_header("authorization", BASIC_AUTH)
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code": "1337", "product": {"ingredients": [
                    {"id": "en:salt", "percent_estimate": 12.5},
                    {"id": "en:sugar", "percent_estimate": 87.5}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let product = client.fetch_product("1337").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            product.ingredients,
            vec![
                RemoteIngredient::new("en:salt", 12.5),
                RemoteIngredient::new("en:sugar", 87.5),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_product_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/product/1337")
            .with_status(404)
            .with_body(r#"{"status": 0, "status_verbose": "product not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_product("1337").await.unwrap_err();
        match err {
            ProductOpenerError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("product not found"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_product_unexpected_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/product/1337")
            .with_status(200)
            .with_body(r#"{"product": {"ingredients": "salt"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_product("1337").await.unwrap_err();
        assert!(matches!(err, ProductOpenerError::UnexpectedShape(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        let client = ProductOpenerClient::with_base_url(
            "http://127.0.0.1:1",
            credentials(),
            &RemoteConfig::default(),
        )
        .unwrap();
        let err = client.fetch_product("1337").await.unwrap_err();
        assert!(matches!(err, ProductOpenerError::Http(_)));
    }
}
