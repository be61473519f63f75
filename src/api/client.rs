// RepNet HTTP client — JSON over HTTP with bearer authentication.
//
// A thin reqwest wrapper: one generic request/decode helper plus a typed
// method per endpoint. Non-2xx responses map into the ApiError taxonomy —
// a body with a decodable {"message"} becomes Server, anything else
// InvalidResponse. The bearer token comes from the injected credential
// provider on every request, so the client itself holds no auth state.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::dto::{
    Evidence, Impact, RawReport, ReportQuery, ServerMessage, Site, Tag, VoteKind, VotePayload,
};
use crate::api::error::ApiError;
use crate::api::traits::RepNetApi;
use crate::credentials::CredentialProvider;

/// Default RepNet API endpoint for local development.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// HTTP client for the RepNet JSON API.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpClient {
    /// Create a client pointing at the given base URL.
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent("repnet/0.1")
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Start a request to an endpoint path, attaching the bearer token
    /// when the credential provider supplies one.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, &url);
        if let Some(token) = self.credentials.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode the 2xx JSON response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(ApiError::Network)?;
        let response = Self::check_status(response).await?;
        response.json::<T>().await.map_err(ApiError::Decoding)
    }

    /// Send a request where only the status matters, discarding any body.
    async fn send_expect_ok(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await.map_err(ApiError::Network)?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Pass 2xx responses through; map everything else to the taxonomy.
    ///
    /// The server reports handled failures as `{"message": "..."}` with a
    /// non-2xx status. When that shape decodes it wins; otherwise the
    /// bare status code is all we can say.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match response.json::<ServerMessage>().await {
            Ok(body) => Err(ApiError::Server(body.message)),
            Err(_) => Err(ApiError::InvalidResponse(status.as_u16())),
        }
    }

    /// Reject authenticated operations early when no token is configured,
    /// instead of burning a round trip on a guaranteed 401.
    fn require_token(&self) -> Result<(), ApiError> {
        if self.credentials.bearer_token().is_none() {
            return Err(ApiError::MissingCredentials);
        }
        Ok(())
    }
}

/// Evidence collection path; evidences are nested under their report.
fn evidences_path(report_id: i64) -> String {
    format!("/reports/{report_id}/evidences")
}

/// Path of one evidence attachment within its report.
fn evidence_path(report_id: i64, evidence_id: i64) -> String {
    format!("{}/{evidence_id}", evidences_path(report_id))
}

#[async_trait]
impl RepNetApi for HttpClient {
    async fn fetch_tags(&self) -> Result<Vec<Tag>, ApiError> {
        debug!("GET /tags");
        self.send_json(self.request(reqwest::Method::GET, "/tags"))
            .await
    }

    async fn fetch_impacts(&self) -> Result<Vec<Impact>, ApiError> {
        debug!("GET /impacts");
        self.send_json(self.request(reqwest::Method::GET, "/impacts"))
            .await
    }

    async fn fetch_reports(&self, query: &ReportQuery) -> Result<Vec<RawReport>, ApiError> {
        let params = query.to_params();
        debug!(params = params.len(), "GET /reports");
        self.send_json(
            self.request(reqwest::Method::GET, "/reports")
                .query(&params),
        )
        .await
    }

    async fn fetch_report(&self, id: i64) -> Result<RawReport, ApiError> {
        debug!(report_id = id, "GET /reports/{{id}}");
        self.send_json(self.request(reqwest::Method::GET, &format!("/reports/{id}")))
            .await
    }

    async fn search_sites(&self, domain: &str, page: u32) -> Result<Option<Site>, ApiError> {
        // Queries without a domain extension never match; skip the
        // round trip.
        if !domain.contains('.') {
            debug!(domain, "site search skipped, query is not a domain");
            return Ok(None);
        }

        debug!(domain, page, "GET /sites");
        let page = page.to_string();
        let response = self
            .request(reqwest::Method::GET, "/sites")
            .query(&[("siteDomain", domain), ("page", page.as_str())])
            .send()
            .await
            .map_err(ApiError::Network)?;

        // An unknown domain answers 404, which means "no site here".
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check_status(response).await?;
        response
            .json::<Site>()
            .await
            .map(Some)
            .map_err(ApiError::Decoding)
    }

    async fn cast_vote(&self, report_id: i64, kind: VoteKind) -> Result<(), ApiError> {
        self.require_token()?;
        debug!(report_id, kind = kind.as_str(), "POST toggleVote");
        self.send_expect_ok(
            self.request(
                reqwest::Method::POST,
                &format!("/reports/{report_id}/toggleVote"),
            )
            .json(&VotePayload { vote_type: kind }),
        )
        .await
    }

    async fn fetch_evidences(&self, report_id: i64) -> Result<Vec<Evidence>, ApiError> {
        debug!(report_id, "GET evidences");
        self.send_json(self.request(reqwest::Method::GET, &evidences_path(report_id)))
            .await
    }

    async fn upload_evidence(
        &self,
        report_id: i64,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Evidence, ApiError> {
        self.require_token()?;
        debug!(report_id, filename, size = bytes.len(), "POST evidence");
        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes).file_name(filename.to_string()),
        );
        self.send_json(
            self.request(reqwest::Method::POST, &evidences_path(report_id))
                .multipart(form),
        )
        .await
    }

    async fn delete_evidence(&self, report_id: i64, evidence_id: i64) -> Result<(), ApiError> {
        self.require_token()?;
        debug!(report_id, evidence_id, "DELETE evidence");
        self.send_expect_ok(self.request(
            reqwest::Method::DELETE,
            &evidence_path(report_id, evidence_id),
        ))
        .await
    }
}
