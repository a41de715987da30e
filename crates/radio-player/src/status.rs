//! Status reader: turns a backend's output into "now playing" titles.
//!
//! The backend writes stdout and stderr into one shared pipe, so lines
//! arrive in the order the process wrote them.  The task ends on EOF (every
//! process holding the pipe has exited) or on the first read error.

use regex::Regex;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, trace};

use crate::backend::BackendKind;
use crate::error::PlayerError;
use crate::sink::OutputSink;

/// Compiled title format of one backend kind.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    prefix: &'static str,
    regex: Regex,
}

impl TitleMatcher {
    /// `Ok(None)` when the kind has no title format.
    pub fn for_backend(kind: BackendKind) -> Result<Option<Self>, PlayerError> {
        let Some(format) = kind.title_format() else {
            return Ok(None);
        };
        Ok(Some(Self {
            prefix: format.prefix,
            regex: Regex::new(format.pattern)?,
        }))
    }

    /// Title carried by an already cleaned line.  A line with the right
    /// prefix that the pattern cannot capture from yields an empty title.
    pub fn extract(&self, line: &str) -> Option<String> {
        if !line.starts_with(self.prefix) {
            return None;
        }
        let title = self
            .regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        Some(title)
    }
}

/// Decode (lossily) and normalise one raw output line.
pub fn clean_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().replace('\r', "")
}

/// Read until the output closes, forwarding titles to `sink`.
pub async fn read_status<R>(
    output: R,
    matcher: Option<TitleMatcher>,
    sink: Arc<dyn OutputSink>,
) -> Result<(), PlayerError>
where
    R: AsyncRead + Unpin,
{
    debug!("status reader: started");
    let mut output = BufReader::new(output);
    let mut line = Vec::new();

    loop {
        line.clear();
        match output.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = clean_line(&line);
                match matcher.as_ref().and_then(|m| m.extract(&text)) {
                    Some(title) => {
                        debug!("status reader: title {:?}", title);
                        sink.write(&title);
                    }
                    None => trace!("status reader: {}", text),
                }
            }
            Err(e) => return Err(PlayerError::ReaderFailed(e)),
        }
    }

    debug!("status reader: output closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;
    use tokio::sync::mpsc;

    fn matcher(kind: BackendKind) -> TitleMatcher {
        TitleMatcher::for_backend(kind).unwrap().unwrap()
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(t) = rx.try_recv() {
            out.push(t);
        }
        out
    }

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("pipe exploded")))
        }
    }

    #[test]
    fn test_mplayer_title() {
        let m = matcher(BackendKind::MPlayer);
        assert_eq!(
            m.extract("ICY Info: StreamTitle='Night Jazz';").as_deref(),
            Some("Night Jazz")
        );
        assert_eq!(
            m.extract("ICY Info: StreamTitle='Artist - Song';StreamUrl='';").as_deref(),
            Some("Artist - Song")
        );
        assert_eq!(m.extract("Night Jazz"), None);
    }

    #[test]
    fn test_mplayer_unparseable_icy_line_is_empty_title() {
        let m = matcher(BackendKind::MPlayer);
        assert_eq!(m.extract("ICY Info: garbage").as_deref(), Some(""));
        assert_eq!(m.extract("ICY Info: StreamTitle='';").as_deref(), Some(""));
    }

    #[test]
    fn test_mpv_title() {
        let m = matcher(BackendKind::Mpv);
        assert_eq!(m.extract("icy-title: Night Jazz").as_deref(), Some("Night Jazz"));
        assert_eq!(m.extract("icy-title:").as_deref(), Some(""));
        assert_eq!(m.extract("Night Jazz"), None);
        assert_eq!(m.extract(" icy-title: indented"), None);
    }

    #[test]
    fn test_vlc_has_no_matcher() {
        assert!(TitleMatcher::for_backend(BackendKind::Vlc).unwrap().is_none());
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line(b"  icy-title: x\r\n"), "icy-title: x");
        assert_eq!(clean_line(b"A:  1.0\rICY Info: y\n"), "A:  1.0ICY Info: y");
        assert_eq!(clean_line(b"caf\xff\n"), "caf\u{fffd}");
    }

    #[tokio::test]
    async fn test_reader_forwards_only_matching_lines() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let output: &[u8] =
            b"Playing http://x\nNight Jazz\r\nCache fill: 10%\nICY Info: StreamTitle='Night Jazz';\n";
        read_status(output, Some(matcher(BackendKind::MPlayer)), Arc::new(tx))
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), ["Night Jazz"]);
    }

    #[tokio::test]
    async fn test_reader_keeps_order_and_unterminated_last_line() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let output: &[u8] = b"icy-title: First\nnoise\nicy-title: Second";
        read_status(output, Some(matcher(BackendKind::Mpv)), Arc::new(tx))
            .await
            .unwrap();
        assert_eq!(drain(&mut rx), ["First", "Second"]);
    }

    #[tokio::test]
    async fn test_reader_without_matcher_drains_silently() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stdout: &[u8] = b"icy-title: nope\nICY Info: StreamTitle='nope';\n";
        read_status(stdout, None, Arc::new(tx)).await.unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_reader_error_ends_task() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let res = read_status(FailingReader, Some(matcher(BackendKind::Mpv)), Arc::new(tx)).await;
        assert!(matches!(res, Err(PlayerError::ReaderFailed(_))));
    }
}
