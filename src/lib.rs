//! Path Proxy는 첫 번째 경로 세그먼트로 백엔드 서비스를 찾아 요청을 전달하는 경량 리버스 프록시입니다.
//!
//! # 주요 기능
//!
//! - 경로 기반 서비스 라우팅 (`/{service}/...` -> `http://{service}:{port}/...`)
//! - 등록되지 않은 서비스는 원래 경로 그대로 fallback 대상에 전달
//! - 요청/응답 메서드, 헤더, 본문을 그대로 중계
//!
//! # 예제
//!
//! ```
//! use path_proxy::routing::{resolve_route, FallbackTarget, RouteDecision, ServiceRegistry};
//!
//! let registry: ServiceRegistry = [("svc", 9001)].into_iter().collect();
//! let fallback = FallbackTarget::default();
//!
//! // 등록된 서비스: 서비스 세그먼트가 제거됩니다
//! match resolve_route("/svc/a/b", Some("x=1"), &registry, &fallback).unwrap() {
//!     RouteDecision::Forward(target) => assert_eq!(target.url(), "http://svc:9001/a/b?x=1"),
//!     RouteDecision::HealthCheck => unreachable!(),
//! }
//!
//! // 등록되지 않은 서비스: 경로를 그대로 fallback 대상에 전달합니다
//! match resolve_route("/ghost/a/b", None, &registry, &fallback).unwrap() {
//!     RouteDecision::Forward(target) => assert_eq!(target.url(), "http://tmpserver:8000/ghost/a/b"),
//!     RouteDecision::HealthCheck => unreachable!(),
//! }
//! ```

pub mod logging;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod settings;
