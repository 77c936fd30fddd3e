#![no_main]
use libfuzzer_sys::fuzz_target;

use zipex::{evaluate, evaluate_chain};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let deep = evaluate(s);
        let flat = evaluate_chain(s);
        if let (Ok(d), Ok(f)) = (deep, flat) {
            assert!(d == f || (d.is_nan() && f.is_nan()));
        }
    }
});
