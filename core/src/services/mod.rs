//! Business services containing domain logic and use cases.

pub mod auth;
pub mod business;
pub mod guard;
pub mod otp;
pub mod password;
pub mod rights;
pub mod token;
pub mod users;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, Registration};
pub use business::BusinessService;
pub use guard::{bearer_token, AccessPolicy, Authorizer, GuardService};
pub use otp::{OtpNotifier, OtpService, OtpServiceConfig};
pub use password::PasswordHasher;
pub use rights::RightsService;
pub use token::{TokenService, TokenServiceConfig};
pub use users::{UserService, UserUpdate};
