//! Build script for planfw
//!
//! Embeds build-time information (git commit, dirty status, build timestamp)
//! for the `--version` output.

fn main() {
    // Re-run build if packagers override the system config root
    println!("cargo:rerun-if-env-changed=PLANFW_SYSTEM_CONFIG_DIR");

    // Embed git commit, build time, and dirty status
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
