mod method;
mod status;
mod version;

pub use self::method::Method;
pub use self::status::*;
pub use self::version::*;
