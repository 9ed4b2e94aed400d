//! Text decoding for spreadsheet exports of unknown encoding.

use std::borrow::Cow;

use encoding_rs::GBK;
use tracing::debug;

/// Decode raw bytes as UTF-8, falling back to GBK when they are not valid UTF-8.
///
/// The GBK fallback is lossy and never fails: malformed sequences become U+FFFD.
/// A leading byte-order mark is dropped in either case.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(err) => {
            debug!(
                valid_up_to = err.valid_up_to(),
                "input is not valid UTF-8, decoding as GBK"
            );

            let (text, had_errors) = GBK.decode_without_bom_handling(bytes);

            if had_errors {
                debug!("GBK decoding replaced malformed sequences");
            }

            text
        }
    };

    strip_bom(text)
}

fn strip_bom(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(text) => Cow::Borrowed(text.strip_prefix('\u{feff}').unwrap_or(text)),
        Cow::Owned(text) => match text.strip_prefix('\u{feff}') {
            Some(rest) => Cow::Owned(rest.to_string()),
            None => Cow::Owned(text),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_returned_unchanged() {
        let text = "货号,品名,零售价\nA1,茶具,599\n";

        assert_eq!(decode_text(text.as_bytes()), text);
    }

    #[test]
    fn valid_utf8_is_borrowed() {
        assert!(matches!(decode_text(b"sku,name"), Cow::Borrowed(_)));
    }

    #[test]
    fn gbk_bytes_fall_back_to_gbk() {
        let (bytes, _, _) = GBK.encode("货号,品名\nA1,茶具");

        assert!(std::str::from_utf8(&bytes).is_err());
        assert_eq!(decode_text(&bytes), "货号,品名\nA1,茶具");
    }

    #[test]
    fn garbage_never_fails() {
        let bytes = [0xff, 0xfe, 0x81, 0x00, 0xc3];

        let text = decode_text(&bytes);

        assert!(!text.is_empty());
    }

    #[test]
    fn leading_bom_is_removed() {
        assert_eq!(decode_text("\u{feff}sku,name".as_bytes()), "sku,name");
    }
}
