use chardetng::EncodingDetector;
use citation_logging::cite_debug;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding: &'static str,
    /// Malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Decodes a response body to UTF-8.
///
/// Precedence: byte order mark, then the `charset` parameter of the
/// Content-Type header, then `chardetng` detection. Metadata extraction
/// tolerates a few replacement characters, so decoding never fails.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> DecodedPage {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| {
            content_type
                .and_then(charset_param)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, used, lossy) = encoding.decode(bytes);
    if lossy {
        cite_debug!("page decoded as {} with replacement characters", used.name());
    }
    DecodedPage {
        html: text.into_owned(),
        encoding: used.name(),
        lossy,
    }
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
