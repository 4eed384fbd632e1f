//! Build script for collecting information about the build, for inclusion in output metadata.
fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");
}
