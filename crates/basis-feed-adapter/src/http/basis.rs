/*
[INPUT]:  Backend base URL
[OUTPUT]: Basis snapshots (all tracked pairs, backend timestamp)
[POS]:    HTTP layer - public basis endpoint (no auth required)
[UPDATE]: When the /api/basis response format changes
*/

use reqwest::Method;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};

use crate::http::{BasisClient, Result};
use crate::types::{BasisResponse, BasisSnapshot};

pub const BASIS_ENDPOINT: &str = "/api/basis";

impl BasisClient {
    /// Fetch the full basis table
    ///
    /// GET /api/basis (cache bypassed)
    pub async fn fetch_basis(&self) -> Result<BasisSnapshot> {
        let response = self.query_basis().await?;
        response.into_snapshot()
    }

    /// Fetch the raw response envelope without interpreting `success`
    pub async fn query_basis(&self) -> Result<BasisResponse> {
        let builder = self
            .request(Method::GET, BASIS_ENDPOINT)?
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache");
        self.send_json(builder).await
    }
}
