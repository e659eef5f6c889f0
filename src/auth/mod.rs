pub mod context;
pub mod jwt;
pub mod token;

pub use context::{
    Authentication, AuthenticationDetails, InMemoryUserDetailsService, SecurityContext, UserDetails,
    UserDetailsService,
};
pub use jwt::HmacTokenService;
pub use token::{Claims, SigningKey, TokenError, TokenService};
