//! 첫 번째 경로 세그먼트 기반 서비스 라우팅을 제공하는 모듈입니다.

mod error;
mod path;
mod registry;
mod target;

pub use error::{RoutingError, RegistryError};
pub use path::{resolve_route, split_segments, RouteDecision};
pub use registry::{FallbackTarget, ServiceRegistry};
pub use target::ProxyTarget;
