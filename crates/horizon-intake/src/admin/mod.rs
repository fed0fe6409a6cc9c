//! Admin panel services: paginated application views, interest-field CRUD,
//! password change, and the session seam over the managed account service.

pub mod applications;
pub mod auth;
pub mod router;
pub mod settings;

pub use applications::{AdminApplicationService, AdminError, ApplicationListing, ResumeLinks};
pub use auth::{bearer_token, AccountError, AccountService, AdminSession, SessionToken};
pub use router::{admin_router, AdminApi};
pub use settings::{
    change_password, InterestFieldService, PasswordChangeError, SettingsError,
};
