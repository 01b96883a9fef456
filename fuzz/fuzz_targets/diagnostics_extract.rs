#![no_main]

use camino::Utf8Path;
use libfuzzer_sys::fuzz_target;
use portfix_diagnostics::{BUILTIN_GRAMMARS, DiagnosticGrammar, extract};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(output) = std::str::from_utf8(rest) else {
        return;
    };

    let name = BUILTIN_GRAMMARS[selector as usize % BUILTIN_GRAMMARS.len()];
    let Ok(grammar) = DiagnosticGrammar::builtin(name) else {
        return;
    };

    let set = extract(output, Utf8Path::new("/work/out"), &grammar);

    // Every stored diagnostic came from one matching line.
    let matching = output
        .lines()
        .filter(|l| grammar.parse_line(l.strip_suffix('\r').unwrap_or(l)).is_some())
        .count();
    assert_eq!(set.total(), matching);
    for (path, diags) in set.iter() {
        assert!(!path.as_str().is_empty());
        assert!(!diags.is_empty());
    }
});
