use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const LARGE_BODY_SIZE: usize = 20_000;

// 백엔드가 받은 요청 기록
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

// 테스트용 백엔드 서버
//
// - /redirect      -> 302, Location: /elsewhere
// - /status/{code} -> 해당 상태 코드
// - /large         -> LARGE_BODY_SIZE 바이트 본문
// - 그 외           -> 200, "backend:{path}"
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorded = recorded.clone();
                        async move { Ok::<_, hyper::Error>(respond(req, recorded).await) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("backend received no request")
    }
}

async fn respond(
    req: Request<Incoming>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    let path = parts.uri.path().to_string();

    recorded.lock().unwrap().push(RecordedRequest {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers: parts.headers,
        body,
    });

    if path == "/redirect" {
        return Response::builder()
            .status(StatusCode::FOUND)
            .header("location", "/elsewhere")
            .body(Full::new(Bytes::new()))
            .unwrap();
    }

    if let Some(code) = path.strip_prefix("/status/") {
        let status = StatusCode::from_u16(code.parse().unwrap()).unwrap();
        return Response::builder()
            .status(status)
            .header("x-backend", "mock")
            .body(Full::new(Bytes::from(format!("status:{}", code))))
            .unwrap();
    }

    if path == "/large" {
        let body: Vec<u8> = (0..LARGE_BODY_SIZE).map(|i| (i % 251) as u8).collect();
        return Response::new(Full::new(Bytes::from(body)));
    }

    Response::builder()
        .header("x-backend", "mock")
        .header("set-cookie", "a=1")
        .header("set-cookie", "b=2")
        .body(Full::new(Bytes::from(format!("backend:{}", path))))
        .unwrap()
}

// 아무도 듣고 있지 않은 포트
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

pub fn large_body() -> Vec<u8> {
    (0..LARGE_BODY_SIZE).map(|i| (i % 251) as u8).collect()
}

pub const TRUNCATED_BODY: &str = "partial";

// 헤더와 본문 일부만 보내고 연결을 끊는 백엔드
pub async fn truncating_backend() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => received.extend_from_slice(&buf[..n]),
                }
            }

            let head = "HTTP/1.1 200 OK\r\ncontent-length: 100\r\nx-backend: truncating\r\n\r\n";
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(TRUNCATED_BODY.as_bytes()).await;
            let _ = stream.flush().await;
        }
    });

    port
}
