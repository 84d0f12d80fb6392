//! URL fragment codec for [`ViewState`].
//!
//! The fragment is `&`-joined `key=value` pairs after the `#`, e.g.
//! `zoom=7.3&center=2.6874,47.481&category=Q6465&filter=loire`. Values are
//! percent-encoded only where a character would break the pair structure.
//! Decoding never fails: malformed numbers leave their field absent, unknown
//! keys are ignored, and a duplicate key overwrites the earlier occurrence.

use foundation::{LngLat, format_sig};

use crate::state::ViewState;

/// Significant digits kept for zoom and center, roughly 1 m of position.
pub const SIG_DIGITS: u32 = 5;

pub fn decode(fragment: &str) -> ViewState {
    let mut state = ViewState::default();
    for pair in fragment.trim_start_matches('#').split('&') {
        if pair.is_empty() {
            continue;
        }
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = percent_decode(kv.next().unwrap_or(""));
        match key {
            "zoom" => state.zoom = parse_finite(&value),
            "center" => state.center = parse_center(&value),
            "category" => {
                if !value.is_empty() {
                    state.category = Some(value);
                }
            }
            "filter" => {
                if !value.is_empty() {
                    state.filter = Some(value);
                }
            }
            _ => {}
        }
    }
    state
}

pub fn encode(state: &ViewState) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(zoom) = state.zoom {
        parts.push(format!("zoom={}", format_sig(zoom, SIG_DIGITS)));
    }
    if let Some(center) = state.center {
        parts.push(format!(
            "center={},{}",
            format_sig(center.lng, SIG_DIGITS),
            format_sig(center.lat, SIG_DIGITS)
        ));
    }
    if let Some(category) = non_empty(state.category.as_deref()) {
        parts.push(format!("category={}", percent_encode(category)));
    }
    if let Some(filter) = non_empty(state.filter.as_deref()) {
        parts.push(format!("filter={}", percent_encode(filter)));
    }
    parts.join("&")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `lng,lat`; both parts must parse or the whole center is absent. Extra
/// comma-separated junk after the first two parts is ignored.
fn parse_center(text: &str) -> Option<LngLat> {
    let mut parts = text.split(',');
    let lng = parse_finite(parts.next()?)?;
    let lat = parse_finite(parts.next()?)?;
    Some(LngLat::new(lng, lat))
}

/// Percent-encodes the bytes that would break `key=value&` structure or the
/// fragment itself, plus controls, spaces and non-ASCII. Everything else
/// stays literal so fragments remain readable.
fn percent_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if must_escape(byte) {
            out.push('%');
            out.push(hex_digit(byte >> 4));
            out.push(hex_digit(byte & 0x0f));
        } else {
            out.push(byte as char);
        }
    }
    out
}

fn must_escape(byte: u8) -> bool {
    matches!(byte, b'%' | b'&' | b'=' | b'#' | b'?') || byte <= b' ' || byte >= 0x7f
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(nibble as u32, 16)
        .unwrap_or('0')
        .to_ascii_uppercase()
}

/// Decodes `%XX` escapes; anything malformed passes through literally, and
/// byte sequences that are not valid UTF-8 are replaced rather than refused.
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(high), Some(low)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push((high << 4) | low);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_a_full_fragment() {
        let state = decode("zoom=7.3&center=2.6874,47.481&category=Q6465&filter=loire");
        assert_eq!(state.zoom, Some(7.3));
        assert_eq!(state.center, Some(LngLat::new(2.6874, 47.481)));
        assert_eq!(state.category.as_deref(), Some("Q6465"));
        assert_eq!(state.filter.as_deref(), Some("loire"));
    }

    #[test]
    fn leading_hash_and_empty_pairs_are_tolerated() {
        let state = decode("#zoom=3&&category=Q1");
        assert_eq!(state.zoom, Some(3.0));
        assert_eq!(state.category.as_deref(), Some("Q1"));
    }

    #[test]
    fn malformed_numbers_fail_closed() {
        let state = decode("zoom=abc&center=1,2");
        assert_eq!(state.zoom, None);
        assert_eq!(state.center, Some(LngLat::new(1.0, 2.0)));

        let state = decode("center=abc,2&zoom=inf");
        assert_eq!(state.center, None);
        assert_eq!(state.zoom, None);
    }

    #[test]
    fn partial_center_is_absent() {
        assert_eq!(decode("center=5").center, None);
        assert_eq!(decode("center=").center, None);
        assert_eq!(decode("center=1,2,99").center, Some(LngLat::new(1.0, 2.0)));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let state = decode("bearing=45&zoom=2");
        assert_eq!(state.zoom, Some(2.0));
        assert_eq!(state, decode("zoom=2"));
    }

    #[test]
    fn pair_order_does_not_matter() {
        let canonical = decode("zoom=2&center=1,1&category=Q1&filter=x");
        let shuffled = decode("filter=x&category=Q1&center=1,1&zoom=2");
        assert_eq!(shuffled, canonical);
    }

    #[test]
    fn encode_emits_only_present_fields() {
        assert_eq!(encode(&ViewState::default()), "");

        let state = ViewState {
            zoom: Some(7.3),
            center: Some(LngLat::new(2.6874, 47.481)),
            category: Some("Q6465".to_string()),
            filter: Some("loire".to_string()),
        };
        assert_eq!(
            encode(&state),
            "zoom=7.3&center=2.6874,47.481&category=Q6465&filter=loire"
        );

        let state = ViewState {
            filter: Some(String::new()),
            ..ViewState::default()
        };
        assert_eq!(encode(&state), "");
    }

    #[test]
    fn numbers_shorten_to_five_significant_digits() {
        let state = ViewState {
            zoom: Some(7.29999995),
            center: Some(LngLat::new(2.68742913, 47.4810552)),
            ..ViewState::default()
        };
        assert_eq!(encode(&state), "zoom=7.3&center=2.6874,47.481");
    }

    #[test]
    fn round_trip_is_exact_at_codec_precision() {
        let original = ViewState {
            zoom: Some(7.3),
            center: Some(LngLat::new(-2.6874, 47.481)),
            category: Some("Q484170".to_string()),
            filter: Some("saint étienne".to_string()),
        };
        assert_eq!(decode(&encode(&original)), original);
    }

    #[test]
    fn filter_text_survives_reserved_characters() {
        let original = ViewState {
            filter: Some("a&b=c#d %e".to_string()),
            ..ViewState::default()
        };
        let fragment = encode(&original);
        assert!(!fragment.contains("a&b"));
        assert_eq!(decode(&fragment), original);
    }

    #[test]
    fn stray_percent_sequences_pass_through() {
        let state = decode("filter=50%25%zz");
        assert_eq!(state.filter.as_deref(), Some("50%%zz"));
    }
}
