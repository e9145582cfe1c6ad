use chardetng::EncodingDetector;
use encoding_rs::UTF_8;

#[derive(Debug)]
pub struct DecodedSource {
    pub text: String,
    pub encoding: String,
    pub lossy: bool,
}

/// Decodes raw tabular-source bytes to text. Sheet exports are UTF-8, but
/// locally maintained CSVs arrive in whatever the user's editor wrote, so
/// the encoding is sniffed rather than assumed.
pub fn decode_source(bytes: &[u8]) -> DecodedSource {
    // BOM UTF-8 (EF BB BF)
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        let (text, had_errors) = UTF_8.decode_without_bom_handling(&bytes[3..]);
        return DecodedSource {
            text: text.into_owned(),
            encoding: "utf-8-sig".into(),
            lossy: had_errors,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);

    let encoding = detector.guess(None, true);
    let (text, used, had_errors) = encoding.decode(bytes);

    DecodedSource {
        text: text.into_owned(),
        encoding: used.name().to_lowercase(),
        lossy: had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("from_content,to_content\n".as_bytes());

        let decoded = decode_source(&bytes);

        assert_eq!(decoded.encoding, "utf-8-sig");
        assert!(!decoded.lossy);
        assert!(decoded.text.starts_with("from_content"));
    }

    #[test]
    fn decodes_malayalam_utf8() {
        let decoded = decode_source("hello,ഹലോ\n".as_bytes());

        assert!(!decoded.lossy);
        assert!(decoded.text.contains("ഹലോ"));
    }

    #[test]
    fn arbitrary_bytes_never_panic() {
        let decoded = decode_source(&[0xFF, 0xFE, 0x00, 0x41, 0x9C]);
        let _ = decoded.text;
    }
}
