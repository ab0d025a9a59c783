use std::fmt::Display;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use bytes::Bytes;
use hyper::body::{Body, Frame, SizeHint};
use tracing::{debug, error};

/// 백엔드 응답 본문을 클라이언트로 옮길 때 한 번에 내보내는 최대 크기
pub const RELAY_BUFFER_SIZE: usize = 8 * 1024;

/// 백엔드 응답 본문을 고정 크기 청크로 나누어 그대로 흘려보내는 본문입니다.
///
/// 상태 코드와 헤더는 이미 전송된 뒤이므로 스트리밍 중 에러는 로그로만 남깁니다.
/// 본문이 drop되면 백엔드 연결도 함께 정리됩니다.
pub struct RelayBody<B> {
    inner: B,
    pending: Bytes,
    relayed: u64,
    target: String,
    finished: bool,
}

impl<B> RelayBody<B> {
    pub fn new(inner: B, target: impl Into<String>) -> Self {
        Self {
            inner,
            pending: Bytes::new(),
            relayed: 0,
            target: target.into(),
            finished: false,
        }
    }

    pub fn relayed_bytes(&self) -> u64 {
        self.relayed
    }

    fn next_chunk(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            return None;
        }
        let len = self.pending.len().min(RELAY_BUFFER_SIZE);
        self.relayed += len as u64;
        Some(self.pending.split_to(len))
    }
}

impl<B> Body for RelayBody<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Display,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = this.next_chunk() {
                return Poll::Ready(Some(Ok(Frame::data(chunk))));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) => this.pending = data,
                    // trailers는 그대로 전달
                    Err(frame) => return Poll::Ready(Some(Ok(frame))),
                },
                Some(Err(e)) => {
                    this.finished = true;
                    error!(
                        target_url = %this.target,
                        relayed_bytes = this.relayed,
                        error = %e,
                        "Error copying response body"
                    );
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.finished = true;
                    debug!(
                        target_url = %this.target,
                        relayed_bytes = this.relayed,
                        "응답 본문 전달 완료"
                    );
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.pending.is_empty() && (self.finished || self.inner.is_end_stream())
    }

    fn size_hint(&self) -> SizeHint {
        if self.finished {
            return SizeHint::with_exact(self.pending.len() as u64);
        }

        let pending = self.pending.len() as u64;
        let inner = self.inner.size_hint();
        let mut hint = SizeHint::new();
        if let Some(upper) = inner.upper() {
            hint.set_upper(upper + pending);
        }
        hint.set_lower(inner.lower() + pending);
        hint
    }
}

impl<B> Drop for RelayBody<B> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                target_url = %self.target,
                relayed_bytes = self.relayed,
                "응답 본문 전달이 끝나기 전에 연결 종료"
            );
        }
    }
}
