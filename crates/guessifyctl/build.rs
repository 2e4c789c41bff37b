// Build script for guessifyctl - embeds version at compile time

fn main() {
    // Release pipelines may set GUESSIFY_VERSION; otherwise use Cargo.toml
    let version =
        std::env::var("GUESSIFY_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=GUESSIFY_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=GUESSIFY_VERSION");
}
