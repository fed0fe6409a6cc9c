use std::sync::Arc;

use serde::Serialize;

use crate::intake::domain::{ApplicationId, ApplicationRecord};
use crate::intake::repository::{
    ApplicationRepository, RepositoryError, ResumeStore, StorageError,
};

/// One page of the admin listing plus the derived pagination facts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListing {
    pub applications: Vec<ApplicationRecord>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// View + download URLs for a stored resume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLinks {
    pub view_url: String,
    pub download_url: String,
    pub suggested_file_name: String,
}

/// Error raised by the admin application views.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("application not found")]
    NotFound,
    #[error("application has no resume on file")]
    NoResume,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Paginated listing, detail, delete, and resume links for the admin panel.
pub struct AdminApplicationService<R, S> {
    repository: Arc<R>,
    resumes: Arc<S>,
    page_size: usize,
}

impl<R, S> AdminApplicationService<R, S>
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
{
    pub fn new(repository: Arc<R>, resumes: Arc<S>, page_size: usize) -> Self {
        Self {
            repository,
            resumes,
            page_size,
        }
    }

    /// Fetch page `page` (1-based), newest applications first.
    pub fn page(&self, page: usize) -> Result<ApplicationListing, AdminError> {
        let page = page.max(1);
        let offset = (page - 1) * self.page_size;
        let fetched = self.repository.page(self.page_size, offset)?;
        let total_pages = fetched.total.div_ceil(self.page_size);

        Ok(ApplicationListing {
            applications: fetched.records,
            total: fetched.total,
            page,
            total_pages,
        })
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, AdminError> {
        self.repository.fetch(id)?.ok_or(AdminError::NotFound)
    }

    /// Delete a record and report which page the panel should show next: the
    /// current one, unless it just became empty and is not page 1.
    pub fn delete(&self, id: &ApplicationId, current_page: usize) -> Result<usize, AdminError> {
        match self.repository.delete(id) {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => return Err(AdminError::NotFound),
            Err(err) => return Err(err.into()),
        }

        let current_page = current_page.max(1);
        let listing = self.page(current_page)?;
        if listing.applications.is_empty() && current_page > 1 {
            Ok(current_page - 1)
        } else {
            Ok(current_page)
        }
    }

    pub fn resume_links(&self, id: &ApplicationId) -> Result<ResumeLinks, AdminError> {
        let record = self.get(id)?;
        let file_id = record.resume_file.as_ref().ok_or(AdminError::NoResume)?;

        Ok(ResumeLinks {
            view_url: self.resumes.file_view_url(file_id)?,
            download_url: self.resumes.download_url(file_id)?,
            suggested_file_name: format!("{}_resume.pdf", record.applicant_name()),
        })
    }
}
