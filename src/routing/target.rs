use hyper::Uri;

use crate::routing::RoutingError;

/// 해석이 끝난 전달 대상입니다.
///
/// `host`는 서비스 이름 그대로이며 IP 해석은 시스템 리졸버(컨테이너 DNS 등)에 맡깁니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
    /// 레지스트리에 없는 서비스라서 fallback으로 보낸 경우
    pub is_fallback: bool,
}

impl ProxyTarget {
    /// `http://host:port/path?query` 형태의 URL 문자열
    pub fn url(&self) -> String {
        let mut url = format!("http://{}:{}{}", self.host, self.port, self.path);
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub fn uri(&self) -> Result<Uri, RoutingError> {
        let url = self.url();
        url.parse::<Uri>().map_err(|e| RoutingError::InvalidTarget {
            reason: e.to_string(),
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &str, path: &str, query: Option<&str>) -> ProxyTarget {
        ProxyTarget {
            host: host.to_string(),
            port: 9001,
            path: path.to_string(),
            query: query.map(str::to_string),
            is_fallback: false,
        }
    }

    #[test]
    fn test_url_keeps_query_verbatim() {
        let t = target("svc", "/a/b", Some("x=1&y=%20z"));
        assert_eq!(t.url(), "http://svc:9001/a/b?x=1&y=%20z");

        let uri = t.uri().unwrap();
        assert_eq!(uri.host(), Some("svc"));
        assert_eq!(uri.port_u16(), Some(9001));
        assert_eq!(uri.path(), "/a/b");
        assert_eq!(uri.query(), Some("x=1&y=%20z"));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let t = target("bad host", "/", None);
        assert!(matches!(t.uri(), Err(RoutingError::InvalidTarget { .. })));
    }
}
