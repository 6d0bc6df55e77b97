#![no_main]

use hostfn::{Context, FunctionTemplate, Isolate};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes -> JSON -> engine values -> a dispatch round -> JSON.
// Exercises value construction, property materialization, and the bridge's
// result path; nothing here may panic.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(json) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };

    let isolate = Isolate::new();
    let context = Context::new(&isolate);
    let value = context.from_json(&json);
    let _ = value.to_json();

    let template = FunctionTemplate::new_simple(&isolate, |info| {
        info.args().first().cloned()
    });
    if let Ok(function) = template.get_function(&context) {
        let _ = function.call(&context.undefined(), &[value]);
    }
});
