#![no_main]

use logtally::timestamp::parse_filename_date;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let name = String::from_utf8_lossy(data);
    if let Ok(date) = parse_filename_date(&name) {
        let digits = date.format("%d%m%Y").to_string();
        assert!(name.contains(&digits));
    }
});
