//!
//! Contract workspaces scaffolded from template directories.
//!

use crate::{
    ThisError,
    config::schema::TemplateConfig,
    log::{Diagnostics, Topic},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Token replaced by the project name in template file and directory names.
pub const NAME_TOKEN: &str = "CONTRACT_NAME";

/// Token replaced by the project name in template file contents.
pub const CONTENT_TOKEN: &str = "${CONTRACT_NAME}";

///
/// TemplateError
///

#[derive(Debug, ThisError)]
pub enum TemplateError {
    #[error("template {0} not found")]
    NotFound(PathBuf),

    #[error("project {0} already exists; pass remove_existing to replace it")]
    Exists(PathBuf),

    #[error("template i/o on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

impl TemplateError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Create `project` from `template` (a path, or a name under the templates
/// directory; the configured default when absent). A relative project name
/// lands in the templates workspace. Returns the project directory.
pub fn create_workspace(
    cfg: &TemplateConfig,
    project: &str,
    template: Option<&str>,
    remove_existing: bool,
    diag: &Diagnostics,
) -> Result<PathBuf, TemplateError> {
    let template_dir = template_dir(cfg, template.unwrap_or(&cfg.default));
    if !template_dir.is_dir() {
        return Err(TemplateError::NotFound(template_dir));
    }

    let project_dir = project_dir(cfg, project);
    let project_name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project.to_string());

    if project_dir.exists() {
        if !remove_existing {
            return Err(TemplateError::Exists(project_dir));
        }
        fs::remove_dir_all(&project_dir).map_err(|e| TemplateError::io(&project_dir, e))?;
        crate::log!(diag, Topic::Template, Trace, "removed {}", project_dir.display());
    }

    copy_tree(&template_dir, &project_dir, &project_name)?;

    let build = project_dir.join("build");
    fs::create_dir_all(&build).map_err(|e| TemplateError::io(&build, e))?;

    crate::log!(
        diag,
        Topic::Template,
        Info,
        "contract workspace '{project_name}' created from {} in {}",
        template_dir.display(),
        project_dir.display()
    );

    Ok(project_dir)
}

fn template_dir(cfg: &TemplateConfig, template: &str) -> PathBuf {
    let as_path = Path::new(template);
    if as_path.is_absolute() || as_path.is_dir() {
        as_path.to_path_buf()
    } else {
        Path::new(&cfg.dir).join(template)
    }
}

fn project_dir(cfg: &TemplateConfig, project: &str) -> PathBuf {
    let as_path = Path::new(project);
    if as_path.is_absolute() {
        as_path.to_path_buf()
    } else {
        Path::new(&cfg.workspace).join(project)
    }
}

fn copy_tree(from: &Path, to: &Path, name: &str) -> Result<(), TemplateError> {
    fs::create_dir_all(to).map_err(|e| TemplateError::io(to, e))?;

    for entry in fs::read_dir(from).map_err(|e| TemplateError::io(from, e))? {
        let entry = entry.map_err(|e| TemplateError::io(from, e))?;
        let source = entry.path();
        let file_name = entry.file_name().to_string_lossy().replace(NAME_TOKEN, name);
        let target = to.join(file_name);

        if source.is_dir() {
            copy_tree(&source, &target, name)?;
            continue;
        }

        let bytes = fs::read(&source).map_err(|e| TemplateError::io(&source, e))?;
        let bytes = match String::from_utf8(bytes) {
            Ok(text) => text.replace(CONTENT_TOKEN, name).into_bytes(),
            Err(raw) => raw.into_bytes(),
        };
        fs::write(&target, bytes).map_err(|e| TemplateError::io(&target, e))?;
    }

    Ok(())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TemplateConfig) {
        let root = tempfile::tempdir().expect("tempdir");
        let src = root.path().join("templates").join("hello_world").join("src");
        fs::create_dir_all(&src).expect("template tree");
        fs::write(
            src.join("CONTRACT_NAME.cpp"),
            "#include \"${CONTRACT_NAME}.hpp\"\nCONTRACT ${CONTRACT_NAME} {};\n",
        )
        .expect("template source");
        fs::write(src.join("logo.bin"), [0xff_u8, 0xfe, 0x00]).expect("binary");

        let cfg = TemplateConfig {
            dir: root.path().join("templates").display().to_string(),
            workspace: root.path().join("contracts").display().to_string(),
            default: "hello_world".to_string(),
        };

        (root, cfg)
    }

    #[test]
    fn names_are_substituted_in_paths_and_contents() {
        let (_root, cfg) = setup();

        let project = create_workspace(&cfg, "greeter", None, false, &Diagnostics::silent())
            .expect("workspace");

        let text = fs::read_to_string(project.join("src").join("greeter.cpp")).expect("source");
        assert_eq!(text, "#include \"greeter.hpp\"\nCONTRACT greeter {};\n");
        assert_eq!(fs::read(project.join("src").join("logo.bin")).expect("bin"), [0xff, 0xfe, 0x00]);
        assert!(project.join("build").is_dir());
    }

    #[test]
    fn existing_project_needs_remove_existing() {
        let (_root, cfg) = setup();
        let diag = Diagnostics::silent();

        create_workspace(&cfg, "greeter", None, false, &diag).expect("first");
        let err = create_workspace(&cfg, "greeter", None, false, &diag).expect_err("exists");
        assert!(matches!(err, TemplateError::Exists(_)));

        create_workspace(&cfg, "greeter", None, true, &diag).expect("replaced");
    }

    #[test]
    fn unknown_template_is_reported() {
        let (_root, cfg) = setup();

        let err = create_workspace(&cfg, "greeter", Some("nope"), false, &Diagnostics::silent())
            .expect_err("no template");
        assert!(matches!(err, TemplateError::NotFound(_)));
    }
}
