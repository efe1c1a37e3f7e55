pub mod currency;
pub mod error;
pub mod validation;

pub use currency::{format_percent, format_rupiah};
pub use error::{AppError, Result};
pub use validation::{body_snippet, is_valid_email, validate_base_url};
