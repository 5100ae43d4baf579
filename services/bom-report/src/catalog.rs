//! PLM Catalog Client
//!
//! Typed read-side client for the remote part catalog: part lookup by
//! number or id, and child BOM relationship queries.

use std::time::Duration;

use async_trait::async_trait;
use partline_models::{BomEdge, Part, PartId};
use partline_utils::{CatalogConfig, PartlineError, PartlineResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Interface onto the part catalog consumed by the report engine.
///
/// The engine only reads through this trait; tests substitute an in-memory
/// fake for the HTTP client.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Resolve a part by its human-facing part number. `Ok(None)` means the
    /// catalog answered but no part matched.
    async fn get_part(&self, part_number: &str) -> PartlineResult<Option<Part>>;

    /// Fetch a part's attributes by catalog id.
    async fn get_part_by_id(&self, id: &PartId) -> PartlineResult<Part>;

    /// Fetch the direct child relationships of a part, in catalog order.
    async fn get_child_relationships(&self, parent: &PartId) -> PartlineResult<Vec<BomEdge>>;
}

/// HTTP client for the remote PLM part catalog.
///
/// One client instance represents one authenticated connection; the session
/// layer hands a clone of it to each request that presents the matching
/// session token.
#[derive(Clone)]
pub struct PlmCatalogClient {
    client: Client,
    base_url: String,
    database: String,
    auth_token: String,
    user_id: Option<String>,
}

impl PlmCatalogClient {
    /// Authenticate against the catalog and return a connected client.
    pub async fn login(
        config: &CatalogConfig,
        username: &str,
        password: &str,
    ) -> PartlineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PartlineError::configuration(e.to_string()))?;

        let url = format!("{}/api/auth/token", config.base_url);
        let response = client
            .post(&url)
            .json(&AuthTokenRequest {
                database: config.database.clone(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(PartlineError::authentication("Catalog rejected credentials"));
        }
        if !response.status().is_success() {
            return Err(PartlineError::catalog(format!(
                "Catalog login failed with status {}",
                response.status()
            )));
        }

        let token: AuthTokenResponse = response.json().await?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            database: config.database.clone(),
            auth_token: token.token,
            user_id: token.user_id,
        })
    }

    /// User id reported by the catalog at login, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.auth_token)
            .header("X-Catalog-Database", &self.database)
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl CatalogSource for PlmCatalogClient {
    async fn get_part(&self, part_number: &str) -> PartlineResult<Option<Part>> {
        let response = self
            .get(&format!("/api/parts?number={}", part_number))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PartlineError::catalog(format!(
                "Part lookup failed with status {}",
                response.status()
            )));
        }

        let data: PartSearchResponse = response.json().await?;
        Ok(data.parts.into_iter().next().map(PartDto::into_part))
    }

    async fn get_part_by_id(&self, id: &PartId) -> PartlineResult<Part> {
        let response = self.get(&format!("/api/parts/{}", id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(PartlineError::not_found(format!("Part {}", id)));
        }
        if !response.status().is_success() {
            return Err(PartlineError::catalog(format!(
                "Part detail fetch failed with status {}",
                response.status()
            )));
        }

        let dto: PartDto = response.json().await?;
        Ok(dto.into_part())
    }

    async fn get_child_relationships(&self, parent: &PartId) -> PartlineResult<Vec<BomEdge>> {
        let response = self.get(&format!("/api/parts/{}/bom", parent)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(PartlineError::catalog(format!(
                "BOM relationship fetch failed with status {}",
                response.status()
            )));
        }

        let data: BomLinesResponse = response.json().await?;
        Ok(data
            .relationships
            .into_iter()
            .filter(|line| !line.child_id.is_empty())
            .map(BomLineDto::into_edge)
            .collect())
    }
}

#[derive(Debug, Serialize)]
struct AuthTokenRequest {
    database: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthTokenResponse {
    token: String,
    user_id: Option<String>,
}

/// Part search response
#[derive(Debug, Deserialize)]
struct PartSearchResponse {
    parts: Vec<PartDto>,
}

/// Part attributes as the catalog returns them. Absent attributes fall back
/// to the catalog's display defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartDto {
    id: String,
    item_number: Option<String>,
    name: Option<String>,
    major_rev: Option<String>,
    state: Option<String>,
    classification: Option<String>,
}

impl PartDto {
    fn into_part(self) -> Part {
        Part {
            id: PartId::new(self.id),
            part_number: self.item_number.unwrap_or_else(|| "(Unknown)".to_string()),
            name: self.name.unwrap_or_else(|| "(Unknown)".to_string()),
            revision: self.major_rev.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            classification: self.classification.unwrap_or_default(),
        }
    }
}

/// BOM line response
#[derive(Debug, Deserialize)]
struct BomLinesResponse {
    relationships: Vec<BomLineDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BomLineDto {
    child_id: String,
    quantity: Option<String>,
}

impl BomLineDto {
    fn into_edge(self) -> BomEdge {
        let quantity = match self.quantity {
            Some(q) if !q.trim().is_empty() => q,
            _ => "1".to_string(),
        };
        BomEdge::new(self.child_id.as_str(), quantity)
    }
}
