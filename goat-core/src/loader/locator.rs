//! The Locator contract: a pluggable component mapping a
//! package pattern to [`PackageInfo`] records. Two implementations
//! ship — [`ToolchainLocator`] shells out to the host toolchain's
//! package-listing facility, [`ModuleDescriptorLocator`] walks the
//! nearest module-descriptor file and does path arithmetic directly.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::errors::LoaderError;

use super::workdir::with_working_dir;

/// `{importPath, directory, [sourceFilePath], [dependencyImportPath]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub import_path: String,
    pub directory: PathBuf,
    pub source_files: Vec<PathBuf>,
    pub dependencies: Vec<String>,
}

/// Ambient build configuration a Locator may need — kept intentionally
/// small since the core does not resolve across build constraints
/// like build tags or cross-compilation targets.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    pub working_dir: PathBuf,
}

pub trait Locator: Send + Sync {
    fn locate(&self, pattern: &str, ctx: &BuildContext) -> Result<Vec<PackageInfo>, LoaderError>;
}

/// Shells out to the host toolchain's package-listing utility,
/// requesting JSON metadata (modeled on `go list -json`'s package
/// object: `ImportPath`, `Dir`, `GoFiles`, `Imports`).
pub struct ToolchainLocator {
    pub command: Vec<String>,
}

impl Default for ToolchainLocator {
    fn default() -> Self {
        ToolchainLocator {
            command: vec!["go".to_string(), "list".to_string(), "-json".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolchainPackage {
    #[serde(rename = "ImportPath")]
    import_path: String,
    #[serde(rename = "Dir")]
    dir: String,
    #[serde(rename = "GoFiles", default)]
    go_files: Vec<String>,
    #[serde(rename = "Imports", default)]
    imports: Vec<String>,
}

impl Locator for ToolchainLocator {
    fn locate(&self, pattern: &str, ctx: &BuildContext) -> Result<Vec<PackageInfo>, LoaderError> {
        let command = self.command.clone();
        let pattern = pattern.to_string();
        let output = with_working_dir(&ctx.working_dir, move || {
            let mut cmd = Command::new(&command[0]);
            cmd.args(&command[1..]).arg(&pattern);
            cmd.output()
        })
        .map_err(|cause| LoaderError::Locate {
            pattern: pattern.clone(),
            cause: cause.to_string(),
        })?
        .map_err(|cause| LoaderError::Locate {
            pattern: pattern.clone(),
            cause: cause.to_string(),
        })?;

        if !output.status.success() {
            return Err(LoaderError::Locate {
                pattern,
                cause: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_go_list_stream(&output.stdout).map_err(|cause| LoaderError::Locate {
            pattern,
            cause,
        })
    }
}

/// `go list -json` emits a stream of concatenated JSON objects, not a
/// single array; `serde_json::Deserializer::into_iter` handles that.
fn parse_go_list_stream(bytes: &[u8]) -> Result<Vec<PackageInfo>, String> {
    let stream = serde_json::Deserializer::from_slice(bytes).into_iter::<ToolchainPackage>();
    let mut out = Vec::new();
    for pkg in stream {
        let pkg = pkg.map_err(|e| e.to_string())?;
        let dir = PathBuf::from(&pkg.dir);
        out.push(PackageInfo {
            import_path: pkg.import_path,
            source_files: pkg.go_files.iter().map(|f| dir.join(f)).collect(),
            directory: dir,
            dependencies: pkg.imports,
        });
    }
    Ok(out)
}

/// Reads the nearest module-descriptor file upward from a starting
/// directory (the `module <path>` declaration line) and synthesizes a
/// [`PackageInfo`] via minimal path arithmetic, without invoking any
/// external process.
pub struct ModuleDescriptorLocator {
    pub descriptor_file_name: String,
}

impl Default for ModuleDescriptorLocator {
    fn default() -> Self {
        ModuleDescriptorLocator {
            descriptor_file_name: "go.mod".to_string(),
        }
    }
}

impl ModuleDescriptorLocator {
    fn find_descriptor(&self, start: &Path) -> Option<(PathBuf, String)> {
        let mut dir = start;
        loop {
            let candidate = dir.join(&self.descriptor_file_name);
            if candidate.is_file() {
                if let Ok(contents) = std::fs::read_to_string(&candidate) {
                    return Some((dir.to_path_buf(), contents));
                }
            }
            dir = dir.parent()?;
        }
    }

    fn module_path(contents: &str) -> Option<String> {
        contents.lines().find_map(|line| {
            let line = line.trim();
            line.strip_prefix("module ").map(|p| p.trim().to_string())
        })
    }
}

impl Locator for ModuleDescriptorLocator {
    fn locate(&self, pattern: &str, ctx: &BuildContext) -> Result<Vec<PackageInfo>, LoaderError> {
        let start = if pattern == "." || pattern.is_empty() {
            ctx.working_dir.clone()
        } else {
            ctx.working_dir.join(pattern)
        };
        let (module_root, contents) =
            self.find_descriptor(&start).ok_or_else(|| LoaderError::Locate {
                pattern: pattern.to_string(),
                cause: format!("no {} found above {}", self.descriptor_file_name, start.display()),
            })?;
        let module_path = Self::module_path(&contents).ok_or_else(|| LoaderError::Locate {
            pattern: pattern.to_string(),
            cause: format!("{} has no module declaration", self.descriptor_file_name),
        })?;

        let relative = start.strip_prefix(&module_root).unwrap_or(Path::new(""));
        let import_path = if relative.as_os_str().is_empty() {
            module_path
        } else {
            format!("{}/{}", module_path, relative.to_string_lossy().replace('\\', "/"))
        };

        let source_files = std::fs::read_dir(&start)
            .map_err(|cause| LoaderError::Locate {
                pattern: pattern.to_string(),
                cause: cause.to_string(),
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "go"))
            .collect();

        Ok(vec![PackageInfo {
            import_path,
            directory: start,
            source_files,
            dependencies: Vec::new(),
        }])
    }
}
