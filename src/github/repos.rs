//! Paginated organization repository listing

use crate::github::crawler::{RepositoryCrawler, MAX_PER_PAGE};
use crate::github::types::RepositoryDescriptor;

impl RepositoryCrawler {
    /// Page size used for a listing capped at `limit`
    ///
    /// A limit that fits in one page is requested as the page size itself.
    pub fn page_size_for(&self, limit: Option<usize>) -> usize {
        match limit {
            Some(limit) if (1..=MAX_PER_PAGE).contains(&limit) => limit,
            _ => self.per_page,
        }
    }

    /// Lists the organization's repositories, page by page
    ///
    /// Stops at the first empty page or once `limit` repositories are
    /// collected (the last page is truncated). A non-throttling failure ends
    /// the listing early and returns what was collected so far.
    pub async fn list_repositories(
        &self,
        organization: &str,
        limit: Option<usize>,
    ) -> Vec<RepositoryDescriptor> {
        let limit = limit.filter(|limit| *limit > 0);
        let per_page = self.page_size_for(limit).to_string();
        let resource = format!("orgs/{}/repos", organization);

        let mut repositories = Vec::new();
        let mut page = 1usize;

        loop {
            let page_number = page.to_string();
            let url = match self.endpoint(
                &resource,
                &[("per_page", per_page.as_str()), ("page", page_number.as_str())],
            ) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(organization, "Cannot build listing URL: {}", e);
                    break;
                }
            };

            let batch: Vec<RepositoryDescriptor> = match self.client.get_json(&url).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(
                        organization,
                        page,
                        collected = repositories.len(),
                        "Repository listing stopped early: {}",
                        e
                    );
                    break;
                }
            };

            if batch.is_empty() {
                break;
            }

            tracing::debug!(organization, page, count = batch.len(), "Listed repository page");
            repositories.extend(batch);

            if let Some(limit) = limit {
                if repositories.len() >= limit {
                    repositories.truncate(limit);
                    break;
                }
            }

            page += 1;
        }

        repositories
    }
}
