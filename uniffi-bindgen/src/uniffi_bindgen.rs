//! Generates Kotlin and Swift bindings for `mdmkit-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
