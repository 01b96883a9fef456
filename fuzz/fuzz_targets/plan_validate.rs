#![no_main]

use libfuzzer_sys::fuzz_target;
use portfix_domain::validate_plan;
use std::collections::HashSet;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    match validate_plan(s) {
        Ok(plan) => {
            // Accepted plans are never ambiguous about where a file goes.
            let sources: HashSet<_> = plan.file_mappings.iter().map(|m| &m.source_file).collect();
            let targets: HashSet<_> = plan.file_mappings.iter().map(|m| &m.target_path).collect();
            assert_eq!(sources.len(), plan.file_mappings.len());
            assert_eq!(targets.len(), plan.file_mappings.len());

            let json = serde_json::to_string(&plan).expect("serialize accepted plan");
            let again = validate_plan(&json).expect("accepted plan revalidates");
            assert_eq!(again, plan);
        }
        Err(e) => {
            assert!(e.path.starts_with('$'));
            assert_eq!(e.raw, s);
        }
    }
});
