use std::time::Duration;

use anyhow::{Context, Result};

use super::{AnnotationPage, AnnotationSource};

pub struct HttpAnnotationSource {
    client: reqwest::blocking::Client,
    base_url: String,
    annotation: String,
    heading_type: String,
}

impl HttpAnnotationSource {
    pub fn new(
        base_url: &str,
        annotation: &str,
        heading_type: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build annotation http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            annotation: annotation.to_string(),
            heading_type: heading_type.to_string(),
        })
    }
}

impl AnnotationSource for HttpAnnotationSource {
    fn total_pages(&self) -> Result<u32> {
        Ok(self.page(1)?.annotations.total_pages)
    }

    fn page(&self, page_no: u32) -> Result<AnnotationPage> {
        let url = build_page_url(&self.base_url, &self.annotation, &self.heading_type, page_no);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("annotation request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("annotation request rejected: {url}"))?;

        response
            .json()
            .with_context(|| format!("failed to decode annotation page: {url}"))
    }
}

pub(super) fn build_page_url(
    base_url: &str,
    annotation: &str,
    heading_type: &str,
    page_no: u32,
) -> String {
    let annotation = annotation.replace(' ', "%20");
    format!("{base_url}/{annotation}/JSON?heading_type={heading_type}&page={page_no}")
}
