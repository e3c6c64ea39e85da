//! Transparent `Content-Encoding` decoding.

use crate::body::{AsyncDecoder, Body};
use crate::error::{ErrorKind, Result};
use bytes::Bytes;
use futures::io::AsyncRead;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, HeaderMap, HeaderValue};
use http::Response;
use squash_compress::{Codec, CodecExt, CompressionProvider, CompressionType, Options};
use std::io::Read;
use std::sync::Arc;
use tracing::instrument;

/// The codecs a response's `Content-Encoding` headers call for.
#[derive(Debug)]
pub enum Chain {
    /// No `Content-Encoding` header, or only empty tokens.
    Absent,
    /// The first token that cannot be decoded here, as it appeared on the
    /// wire.
    Unsupported(String),
    /// Codecs in the order they are listed: the outermost (last applied)
    /// encoding first.
    Resolved(Vec<Arc<dyn Codec>>),
}

/// What [`DecompressionHandler::decode`] did to a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Untouched,
    /// Decoded through these formats, in the order they were undone.
    Decoded(Vec<CompressionType>),
}

/// Decodes HTTP response bodies according to their `Content-Encoding`
/// headers, using the codecs registered with a [`CompressionProvider`].
///
/// A response whose encodings cannot all be decoded is passed through
/// unchanged, headers and body alike. A response whose codecs fail (corrupt
/// data) is an error.
///
/// ```
/// use bytes::Bytes;
/// use http::Response;
/// use squash_compress::{CompressionProvider, Options};
/// use squash_http::{DecompressionHandler, Outcome};
/// use std::sync::Arc;
///
/// let provider = Arc::new(CompressionProvider::default());
/// let body = provider.compress("gzip", "Hello, World!", &Options::new()).unwrap();
/// let mut response = Response::builder()
///     .header("Content-Encoding", "gzip")
///     .body(Bytes::from(body))
///     .unwrap();
///
/// let handler = DecompressionHandler::new(provider);
/// assert!(matches!(handler.decode(&mut response).unwrap(), Outcome::Decoded(_)));
/// assert_eq!(response.body(), "Hello, World!");
/// assert!(response.headers().get("Content-Encoding").is_none());
/// ```
#[derive(Clone, Debug)]
pub struct DecompressionHandler {
    provider: Arc<CompressionProvider>,
}

impl DecompressionHandler {
    pub fn new(provider: Arc<CompressionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<CompressionProvider> {
        &self.provider
    }

    /// Read every `Content-Encoding` header value, in order, and map each
    /// comma-separated token to a registered codec.
    pub fn resolve_chain(&self, headers: &HeaderMap) -> Chain {
        let mut codecs = Vec::new();
        for value in headers.get_all(CONTENT_ENCODING) {
            let Ok(value) = value.to_str() else {
                return Chain::Unsupported(String::from_utf8_lossy(value.as_bytes()).into_owned());
            };
            for token in value.split(',').map(str::trim).filter(|token| !token.is_empty()) {
                let codec = self
                    .provider
                    .resolver()
                    .resolve(token)
                    .filter(CompressionType::is_wire_encoding)
                    .and_then(|kind| self.provider.get(kind));
                match codec {
                    Some(codec) => codecs.push(Arc::clone(codec)),
                    None => return Chain::Unsupported(token.to_string()),
                }
            }
        }
        if codecs.is_empty() { Chain::Absent } else { Chain::Resolved(codecs) }
    }

    /// The codecs to apply, or `None` when the response must pass through.
    fn decodable(&self, headers: &HeaderMap) -> Option<Vec<Arc<dyn Codec>>> {
        match self.resolve_chain(headers) {
            Chain::Absent => None,
            Chain::Unsupported(token) => {
                tracing::debug!(%token, "unsupported content encoding, passing response through");
                None
            },
            Chain::Resolved(codecs) => Some(codecs),
        }
    }

    /// Decode a fully buffered response in place.
    ///
    /// On success `Content-Encoding` is removed and `Content-Length`, if
    /// present, is updated to the decoded size. On failure the response is
    /// left as it was.
    #[instrument(skip_all, fields(status = %response.status(), decoded_size))]
    pub fn decode(&self, response: &mut Response<Bytes>) -> Result<Outcome> {
        let Some(codecs) = self.decodable(response.headers()) else {
            return Ok(Outcome::Untouched);
        };
        let mut body = response.body().clone();
        // The last applied encoding is listed first, so undo them in the
        // order they are listed.
        for codec in &codecs {
            body = Bytes::from(codec.decompress(&body[..], &Options::new()).map_err(ErrorKind::compression)?);
        }
        Ok(self.finish(response, body, &codecs))
    }

    /// Async counterpart of [`decode`](Self::decode).
    #[instrument(skip_all, fields(status = %response.status(), decoded_size))]
    pub async fn decode_async(&self, response: &mut Response<Bytes>) -> Result<Outcome> {
        let Some(codecs) = self.decodable(response.headers()) else {
            return Ok(Outcome::Untouched);
        };
        let mut body = response.body().clone();
        for codec in &codecs {
            let decoded =
                codec.decompress_async(&body[..], &Options::new()).await.map_err(ErrorKind::compression)?;
            body = Bytes::from(decoded);
        }
        Ok(self.finish(response, body, &codecs))
    }

    fn finish(&self, response: &mut Response<Bytes>, body: Bytes, codecs: &[Arc<dyn Codec>]) -> Outcome {
        let headers = response.headers_mut();
        headers.remove(CONTENT_ENCODING);
        if headers.contains_key(CONTENT_LENGTH) {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        tracing::Span::current().record("decoded_size", body.len());
        *response.body_mut() = body;

        let undone: Vec<_> = codecs.iter().map(|codec| codec.compression_type()).collect();
        tracing::debug!(chain = ?undone, "decoded response body");
        Outcome::Decoded(undone)
    }

    /// Decode a response as it is read, by wrapping its body in one decoder
    /// per encoding.
    ///
    /// The decoded length is unknown up front, so both `Content-Encoding` and
    /// `Content-Length` are removed. Corrupt data surfaces as a read error on
    /// the returned body.
    #[instrument(skip_all, fields(status = %response.status()))]
    pub fn decode_reader<R: Read + 'static>(&self, response: Response<R>) -> Result<Response<Body<R>>> {
        let Some(codecs) = self.decodable(response.headers()) else {
            return Ok(response.map(Body::Untouched));
        };
        let (mut parts, body) = response.into_parts();
        let mut reader: Box<dyn Read> = Box::new(body);
        for codec in &codecs {
            reader = codec.wrap_reader(reader).map_err(ErrorKind::compression)?;
        }
        strip_encoding_headers(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::Decoded(reader)))
    }

    /// Async counterpart of [`decode_reader`](Self::decode_reader).
    #[instrument(skip_all, fields(status = %response.status()))]
    pub fn decode_async_reader<R>(&self, response: Response<R>) -> Response<Body<R, AsyncDecoder>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let Some(codecs) = self.decodable(response.headers()) else {
            return response.map(Body::Untouched);
        };
        let (mut parts, body) = response.into_parts();
        let mut reader: AsyncDecoder = Box::new(body);
        for codec in &codecs {
            reader = codec.async_wrap_reader(reader);
        }
        strip_encoding_headers(&mut parts.headers);
        Response::from_parts(parts, Body::Decoded(reader))
    }
}

fn strip_encoding_headers(headers: &mut HeaderMap) {
    headers.remove(CONTENT_ENCODING);
    headers.remove(CONTENT_LENGTH);
}

/// The `Accept-Encoding` value advertising every codec registered with
/// `provider` (never `none`).
pub fn accept_encoding(provider: &CompressionProvider) -> HeaderValue {
    HeaderValue::from_str(&provider.accept_encoding()).expect("encoding names are visible ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use rstest::rstest;
    use squash_compress::error::ErrorKind as CompressionErrorKind;
    use squash_compress::{Level, Settings, StandardCodec};

    const TEXT: &str = "Hello, World!";

    fn provider() -> Arc<CompressionProvider> {
        Arc::new(CompressionProvider::standard(Settings::default()))
    }

    fn handler() -> DecompressionHandler {
        DecompressionHandler::new(provider())
    }

    /// Encode `body` so that `encodings` lists the outermost encoding first,
    /// and return a response advertising them.
    fn encoded(encodings: &[&str], body: &[u8]) -> Response<Bytes> {
        let provider = provider();
        let mut body = body.to_vec();
        for encoding in encodings.iter().rev() {
            body = provider.compress(*encoding, &body, &Options::new()).unwrap();
        }
        Response::builder()
            .header(CONTENT_ENCODING, encodings.join(", "))
            .header(CONTENT_LENGTH, body.len())
            .header(CONTENT_TYPE, "text/plain")
            .body(Bytes::from(body))
            .unwrap()
    }

    fn plain(encoding: &str, body: &'static [u8]) -> Response<Bytes> {
        Response::builder()
            .header(CONTENT_ENCODING, encoding)
            .header(CONTENT_LENGTH, body.len())
            .body(Bytes::from_static(body))
            .unwrap()
    }

    #[rstest]
    #[case(&["gzip"], &[CompressionType::Gzip])]
    #[case(&["deflate"], &[CompressionType::Deflate])]
    #[case(&["gzip", "br"], &[CompressionType::Gzip, CompressionType::Brotli])]
    #[case(&["deflate", "gzip"], &[CompressionType::Deflate, CompressionType::Gzip])]
    fn test_decode_chain(#[case] encodings: &[&str], #[case] undone: &[CompressionType]) {
        let mut response = encoded(encodings, TEXT.as_bytes());
        let outcome = handler().decode(&mut response).unwrap();

        assert_eq!(outcome, Outcome::Decoded(undone.to_vec()));
        assert_eq!(response.body(), TEXT);
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        assert_eq!(response.headers()[CONTENT_LENGTH], TEXT.len().to_string());
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_brotli_then_gzip() {
        let provider = provider();
        let brotli = provider.compress(CompressionType::Brotli, TEXT, &Options::new()).unwrap();
        let gzip = provider.compress(CompressionType::Gzip, &brotli, &Options::new()).unwrap();
        let mut response = Response::builder().header(CONTENT_ENCODING, "gzip, br").body(Bytes::from(gzip)).unwrap();

        let outcome = handler().decode(&mut response).unwrap();
        assert_eq!(outcome, Outcome::Decoded(vec![CompressionType::Gzip, CompressionType::Brotli]));
        assert_eq!(response.body(), TEXT);
    }

    #[test]
    fn test_chain_across_header_values() {
        let provider = provider();
        let inner = provider.compress("gzip", TEXT, &Options::new()).unwrap();
        let outer = provider.compress("deflate", &inner, &Options::new()).unwrap();
        let mut response = Response::builder()
            .header(CONTENT_ENCODING, "deflate")
            .header(CONTENT_ENCODING, " GZIP ,")
            .body(Bytes::from(outer))
            .unwrap();

        let outcome = handler().decode(&mut response).unwrap();
        assert_eq!(outcome, Outcome::Decoded(vec![CompressionType::Deflate, CompressionType::Gzip]));
        assert_eq!(response.body(), TEXT);
        // Only rewritten when the response had one.
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
    }

    #[rstest]
    #[case("bogus-scheme")]
    #[case("identity")]
    #[case("none")]
    #[case("gzip, lzma")]
    #[case("x-gzip")]
    fn test_unsupported_passes_through(#[case] encoding: &str) {
        let mut response = plain(encoding, b"opaque payload");
        let outcome = handler().decode(&mut response).unwrap();

        assert_eq!(outcome, Outcome::Untouched);
        assert_eq!(response.body(), "opaque payload");
        assert_eq!(response.headers()[CONTENT_ENCODING], encoding);
        assert_eq!(response.headers()[CONTENT_LENGTH], "14");
    }

    #[test]
    fn test_non_ascii_token_passes_through() {
        let mut response = Response::builder()
            .header(CONTENT_ENCODING, HeaderValue::from_bytes(b"gz\xffip").unwrap())
            .body(Bytes::from_static(b"payload"))
            .unwrap();
        assert!(matches!(handler().resolve_chain(response.headers()), Chain::Unsupported(_)));
        assert_eq!(handler().decode(&mut response).unwrap(), Outcome::Untouched);
        assert_eq!(response.body(), "payload");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some(" , "))]
    fn test_absent_header(#[case] encoding: Option<&str>) {
        let mut builder = Response::builder();
        if let Some(encoding) = encoding {
            builder = builder.header(CONTENT_ENCODING, encoding);
        }
        let mut response = builder.body(Bytes::from_static(b"plain")).unwrap();
        assert!(matches!(handler().resolve_chain(response.headers()), Chain::Absent));
        assert_eq!(handler().decode(&mut response).unwrap(), Outcome::Untouched);
        assert_eq!(response.body(), "plain");
    }

    #[test]
    fn test_unregistered_codec_passes_through() {
        let gzip_only = CompressionProvider::new([
            Arc::new(StandardCodec::new(CompressionType::Gzip, Settings::default()).unwrap()) as Arc<dyn Codec>
        ]);
        let handler = DecompressionHandler::new(Arc::new(gzip_only));
        let mut response = encoded(&["deflate"], TEXT.as_bytes());
        let original = response.body().clone();

        match handler.resolve_chain(response.headers()) {
            Chain::Unsupported(token) => assert_eq!(token, "deflate"),
            other => panic!("expected an unsupported chain, got {other:?}"),
        }
        assert_eq!(handler.decode(&mut response).unwrap(), Outcome::Untouched);
        assert_eq!(response.body(), &original);
    }

    #[test]
    fn test_corrupt_body_is_an_error() {
        let mut response = plain("gzip", b"definitely not gzip");
        let err = handler().decode(&mut response).unwrap_err();
        assert_eq!(*err, ErrorKind::Compression(CompressionErrorKind::InvalidData));
        // Nothing was modified.
        assert_eq!(response.headers()[CONTENT_ENCODING], "gzip");
        assert_eq!(response.body(), "definitely not gzip");
    }

    #[test]
    fn test_decode_reader() {
        let response = encoded(&["deflate", "gzip"], TEXT.as_bytes()).map(|body| std::io::Cursor::new(body.to_vec()));
        let response = handler().decode_reader(response).unwrap();

        assert!(response.body().is_decoded());
        assert!(response.headers().get(CONTENT_ENCODING).is_none());
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.into_body().into_bytes().unwrap(), TEXT);
    }

    #[test]
    fn test_decode_reader_passes_through() {
        let response = plain("bogus-scheme", b"opaque").map(|body| std::io::Cursor::new(body.to_vec()));
        let response = handler().decode_reader(response).unwrap();
        assert!(!response.body().is_decoded());
        assert_eq!(response.headers()[CONTENT_ENCODING], "bogus-scheme");
        assert_eq!(response.into_body().into_bytes().unwrap(), "opaque");
    }

    #[test]
    fn test_decode_reader_corrupt_body() {
        let response = plain("gzip", b"definitely not gzip").map(|body| std::io::Cursor::new(body.to_vec()));
        let body = handler().decode_reader(response).unwrap().into_body();
        let err = body.into_bytes().unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }

    #[test]
    fn test_level_does_not_matter() {
        let smallest = CompressionProvider::standard(Settings { level: Level::SmallestSize, ..Settings::default() });
        let body = smallest.compress(CompressionType::Gzip, TEXT, &Options::new()).unwrap();
        let mut response = Response::builder().header(CONTENT_ENCODING, "gzip").body(Bytes::from(body)).unwrap();
        handler().decode(&mut response).unwrap();
        assert_eq!(response.body(), TEXT);
    }

    #[test]
    fn test_accept_encoding() {
        let value = accept_encoding(&CompressionProvider::default());
        let value = value.to_str().unwrap();
        assert!(value.split(", ").any(|token| token == "gzip"));
        assert!(value.split(", ").any(|token| token == "deflate"));
        assert!(!value.split(", ").any(|token| token == "none"));
    }

    mod async_decoding {
        use super::*;
        use futures::io::Cursor as AsyncCursor;

        #[tokio::test]
        #[rstest]
        #[case(&["gzip"])]
        #[case(&["gzip", "br"])]
        async fn test_decode_async(#[case] encodings: &[&str]) {
            let mut response = encoded(encodings, TEXT.as_bytes());
            let outcome = handler().decode_async(&mut response).await.unwrap();
            assert!(matches!(outcome, Outcome::Decoded(_)));
            assert_eq!(response.body(), TEXT);
            assert_eq!(response.headers()[CONTENT_LENGTH], TEXT.len().to_string());
        }

        #[tokio::test]
        async fn test_decode_async_passes_through() {
            let mut response = plain("bogus-scheme", b"opaque");
            assert_eq!(handler().decode_async(&mut response).await.unwrap(), Outcome::Untouched);
            assert_eq!(response.body(), "opaque");
        }

        #[tokio::test]
        async fn test_decode_async_reader() {
            let response = encoded(&["gzip", "deflate"], TEXT.as_bytes()).map(|body| AsyncCursor::new(body.to_vec()));
            let response = handler().decode_async_reader(response);
            assert!(response.headers().get(CONTENT_LENGTH).is_none());
            let body = response.into_body().into_bytes_async().await.unwrap();
            assert_eq!(body, TEXT);
        }

        #[tokio::test]
        async fn test_decode_async_reader_corrupt_body() {
            let response = plain("gzip", b"definitely not gzip").map(|body| AsyncCursor::new(body.to_vec()));
            let err = handler().decode_async_reader(response).into_body().into_bytes_async().await.unwrap_err();
            assert_eq!(*err, ErrorKind::Io);
        }
    }
}
