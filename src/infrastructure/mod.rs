pub mod error;
pub mod logging;

pub use error::{PlatformError, ValidationError};
pub use logging::{setup_logging, LogFormat, LoggingConfig};
