#![no_main]

use logtally::hash::HashMarkers;
use libfuzzer_sys::fuzz_target;

const MAX_MARKER_LEN: usize = 8;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let trim = (data[0] & 0x7) as usize;
    let start_len = (data[1] as usize % MAX_MARKER_LEN) + 1;
    let end_len = (data[2] as usize % MAX_MARKER_LEN) + 1;
    let rest = String::from_utf8_lossy(&data[3..]);
    let chars: Vec<char> = rest.chars().collect();
    if chars.len() < start_len + end_len {
        return;
    }

    let start: String = chars[..start_len].iter().collect();
    let end: String = chars[start_len..start_len + end_len].iter().collect();
    let line: String = chars[start_len + end_len..].iter().collect();

    let markers = HashMarkers::new(start, end, trim);
    let hash = markers.extract(&line);

    // The hash is always a slice of the line
    if !hash.is_empty() {
        assert!(line.contains(hash));
    }
});
