const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a over the UTF-8 bytes of `key`.
///
/// Unlike `DefaultHasher` the result is fixed across toolchains and process
/// restarts, which the shape seeds depend on.
pub fn stable_hash(key: &str) -> u32 {
    key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Rounds `value` to the nearest multiple of `step` and returns the multiple.
pub fn quantize(value: f32, step: f32) -> i32 {
    if !value.is_finite() || step <= 0.0 {
        return 0;
    }
    ((value / step).round() * step) as i32
}

pub fn short_label(title: &str, max_chars: usize) -> String {
    let mut chars = title.chars();
    let head = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_hash_matches_reference_vectors() {
        assert_eq!(stable_hash(""), 0x811c_9dc5);
        assert_eq!(stable_hash("a"), 0xe40c_292c);
        assert_eq!(stable_hash("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn quantize_rounds_to_nearest_step() {
        assert_eq!(quantize(0.0, 10.0), 0);
        assert_eq!(quantize(14.9, 10.0), 10);
        assert_eq!(quantize(15.0, 10.0), 20);
        assert_eq!(quantize(f32::NAN, 10.0), 0);
    }

    #[test]
    fn short_label_truncates_on_char_boundary() {
        assert_eq!(short_label("plan", 10), "plan");
        assert_eq!(short_label("écrire le rapport", 6), "écrire…");
    }
}
