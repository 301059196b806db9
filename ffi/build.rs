//! Regenerate `include/quickmail.h` from the `extern "C"` surface.

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("QUICKMAIL_H")
        .generate()
    {
        Ok(bindings) => {
            let include = format!("{crate_dir}/include");
            if let Err(e) = std::fs::create_dir_all(&include) {
                println!("cargo:warning=cannot create {include}: {e}");
                return;
            }
            bindings.write_to_file(format!("{include}/quickmail.h"));
        }
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
