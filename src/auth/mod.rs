//! Authentication: tokens, password hashing, request extraction and account handlers.

mod extract;
mod handlers;
mod jwt;
mod password;

pub use extract::{ValidatedForm, ValidatedJson};
pub use handlers::{
    forgot_password, login, reset_password, signup, ForgotPasswordRequest, LoginRequest,
    LoginResponse, MessageResponse, ResetPasswordForm, SignupRequest, SignupResponse, UserInfo,
};
pub use jwt::{
    ClaimSet, ResetClaims, TokenError, TokenService, DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
    DEFAULT_RESET_TOKEN_TTL_MINUTES,
};
pub use password::{hash_password, verify_password};
