#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use portfix_domain::{strip_fence, wrap_fence};

#[derive(Debug, Arbitrary)]
struct Input {
    code: String,
    info: String,
}

fuzz_target!(|input: Input| {
    // Info strings are single-line words in practice.
    if input.info.contains(['\n', '\r', '`']) {
        return;
    }
    let wrapped = wrap_fence(&input.code, &input.info);
    assert_eq!(strip_fence(&wrapped), input.code);

    let _ = strip_fence(&input.code);
});
