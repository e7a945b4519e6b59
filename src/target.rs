//! Cross-build targets
//!
//! The template ships native modules for a physical device and for the
//! simulator. Each target names its meson cross file, its build directory
//! and the Xcode SDK its staged packages belong to.

use std::fmt;

/// iOS build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// arm64 iPhone/iPad hardware
    Device,
    /// arm64 iOS simulator
    Simulator,
}

impl Target {
    /// Build order used by the pipeline
    pub const ALL: [Target; 2] = [Target::Device, Target::Simulator];

    /// Target identifier used in cross file and build directory names
    pub fn triple(&self) -> &'static str {
        match self {
            Target::Device => "ios-arm64",
            Target::Simulator => "ios-arm64-simulator",
        }
    }

    /// Xcode SDK label used for `app_packages.<sdk>`
    pub fn sdk(&self) -> &'static str {
        match self {
            Target::Device => "iphoneos",
            Target::Simulator => "iphonesimulator",
        }
    }

    /// Meson build directory, relative to the source tree
    pub fn build_dir_name(&self) -> String {
        format!("build-{}", self.triple())
    }

    /// Meson cross file name
    pub fn cross_file_name(&self) -> String {
        format!("{}-crossbuild.txt", self.triple())
    }

    /// Staging directory name inside the Xcode app directory
    pub fn app_packages_dir_name(&self) -> String {
        format!("app_packages.{}", self.sdk())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.triple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_names() {
        let target = Target::Device;
        assert_eq!(target.build_dir_name(), "build-ios-arm64");
        assert_eq!(target.cross_file_name(), "ios-arm64-crossbuild.txt");
        assert_eq!(target.app_packages_dir_name(), "app_packages.iphoneos");
    }

    #[test]
    fn test_simulator_names() {
        let target = Target::Simulator;
        assert_eq!(target.build_dir_name(), "build-ios-arm64-simulator");
        assert_eq!(target.cross_file_name(), "ios-arm64-simulator-crossbuild.txt");
        assert_eq!(target.app_packages_dir_name(), "app_packages.iphonesimulator");
        assert_eq!(target.to_string(), "ios-arm64-simulator");
    }

    #[test]
    fn test_build_order() {
        assert_eq!(Target::ALL, [Target::Device, Target::Simulator]);
    }
}
