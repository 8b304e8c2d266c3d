// File: crates/pullscope-render-skia/build.rs
// Summary: Link advapi32 on Windows; Skia's font manager reads registry keys.

fn main() {
    #[cfg(target_os = "windows")]
    println!("cargo:rustc-link-lib=advapi32");
}
