//! Generates `blog.h` from the `extern "C"` surface into `OUT_DIR`.
//!
//! The build never writes into the source tree. Hosts copy the header from
//! the path printed by `cargo build -vv` or from `target/*/build/blog-ffi-*/out`.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let Ok(out_dir) = std::env::var("OUT_DIR") else {
        println!("cargo:warning=header generation skipped: OUT_DIR is not set");
        println!("cargo:rustc-env=BLOG_FFI_HEADER=");
        return;
    };
    let header = PathBuf::from(out_dir).join("blog.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("BLOG_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
            println!("cargo:rustc-env=BLOG_FFI_HEADER={}", header.display());
        }
        Err(e) => {
            println!("cargo:warning=header generation skipped: {e}");
            println!("cargo:rustc-env=BLOG_FFI_HEADER=");
        }
    }
}
